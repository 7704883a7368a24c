//! End-to-end tests of the request pipeline: dispatch, validation, the
//! in-memory store and the error envelope, without opening a socket.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::Full;
use serde_json::{Map, Value, json};

use burrow::routes::{self, Store};
use burrow::store::{Collection, MemoryStore, Record, Repository, StoreError, StoreResult};
use burrow::{MAX_BODY_BYTES, Response, Router, Status, dispatch};

const BACKEND_CAUSE: &str = "connection refused by backend";

/// A repository whose every call fails, standing in for an unreachable database.
struct FailingStore;

#[async_trait]
impl Repository for FailingStore {
    async fn find_all(&self, _: Collection) -> StoreResult<Vec<Record>> {
        Err(StoreError::Backend(BACKEND_CAUSE.to_owned()))
    }

    async fn find_by_id(&self, _: Collection, _: &str) -> StoreResult<Option<Record>> {
        Err(StoreError::Backend(BACKEND_CAUSE.to_owned()))
    }

    async fn create(&self, _: Collection, _: Map<String, Value>) -> StoreResult<Record> {
        Err(StoreError::Backend(BACKEND_CAUSE.to_owned()))
    }

    async fn delete_by_id(&self, _: Collection, _: &str) -> StoreResult<Option<Record>> {
        Err(StoreError::Backend(BACKEND_CAUSE.to_owned()))
    }
}

fn broken_app() -> Router<Store> {
    routes::app(Arc::new(FailingStore))
}

fn internal_error_envelope() -> Value {
    json!({ "error": "InternalError", "message": "Internal server error", "details": null })
}

fn app() -> Router<Store> {
    routes::app(Arc::new(MemoryStore::new()))
}

async fn call(app: &Router<Store>, method: &str, uri: &str, body: &str) -> Response {
    let req = http::Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(body.to_owned())))
        .unwrap();
    dispatch(app, req).await
}

fn json_body(res: &Response) -> Value {
    serde_json::from_slice(res.body()).unwrap()
}

async fn list(app: &Router<Store>, uri: &str) -> Vec<Value> {
    let res = call(app, "GET", uri, "").await;
    assert_eq!(res.status_code(), Status::Ok);
    match json_body(&res) {
        Value::Array(items) => items,
        other => panic!("expected an array, got {other}"),
    }
}

#[tokio::test]
async fn root_greets() {
    let res = call(&app(), "GET", "/", "").await;
    assert_eq!(res.status_code(), Status::Ok);
    assert_eq!(json_body(&res), json!({ "message": "Hello World!" }));
}

#[tokio::test]
async fn todo_lifecycle() {
    let app = app();

    let res = call(&app, "POST", "/todo", r#"{"message":"buy milk"}"#).await;
    assert_eq!(res.status_code(), Status::Created);
    let created = json_body(&res);
    assert_eq!(created["message"], "OK");
    assert_eq!(created["todo"]["message"], "buy milk");
    let id = created["todo"]["_id"].as_str().unwrap().to_owned();
    assert!(!id.is_empty());

    assert_eq!(list(&app, "/todo").await, vec![created["todo"].clone()]);

    let res = call(&app, "DELETE", &format!("/todo/{id}"), "").await;
    assert_eq!(res.status_code(), Status::Ok);
    assert_eq!(json_body(&res), created["todo"]);

    assert!(list(&app, "/todo").await.is_empty());
}

#[tokio::test]
async fn created_todo_serialises_message_before_id() {
    let res = call(&app(), "POST", "/todo", r#"{"message":"buy milk"}"#).await;
    let text = std::str::from_utf8(res.body()).unwrap();
    assert!(text.starts_with(r#"{"message":"OK","todo":{"message":"buy milk","_id":""#), "{text}");
}

#[tokio::test]
async fn every_posted_message_is_listed() {
    let app = app();
    let messages = ["a", "with spaces", "ünïcödé", "\"quoted\""];
    for m in messages {
        let body = json!({ "message": m }).to_string();
        assert_eq!(call(&app, "POST", "/todo", &body).await.status_code(), Status::Created);
    }
    let listed: Vec<Value> = list(&app, "/todo").await.into_iter().map(|t| t["message"].clone()).collect();
    for m in messages {
        assert!(listed.contains(&Value::from(m)), "{m} missing from {listed:?}");
    }
}

#[tokio::test]
async fn deleting_twice_is_404_the_second_time() {
    let app = app();
    let created = json_body(&call(&app, "POST", "/todo", r#"{"message":"x"}"#).await);
    let uri = format!("/todo/{}", created["todo"]["_id"].as_str().unwrap());

    assert_eq!(call(&app, "DELETE", &uri, "").await.status_code(), Status::Ok);

    let res = call(&app, "DELETE", &uri, "").await;
    assert_eq!(res.status_code(), Status::NotFound);
    assert_eq!(json_body(&res)["message"], "Todo not found");
}

#[tokio::test]
async fn user_create_and_fetch() {
    let app = app();

    let res = call(&app, "POST", "/users", r#"{"name":"ada","email":"ada@example.com","admin":true}"#).await;
    assert_eq!(res.status_code(), Status::Created);
    let created = json_body(&res);
    assert_eq!(created["message"], "User created successfully!");
    assert_eq!(created["user"]["name"], "ada");
    assert!(created["user"].get("admin").is_none());

    let id = created["user"]["_id"].as_str().unwrap();
    let res = call(&app, "GET", &format!("/users/{id}"), "").await;
    assert_eq!(res.status_code(), Status::Ok);
    assert_eq!(json_body(&res), created["user"]);

    assert_eq!(list(&app, "/users").await, vec![created["user"].clone()]);
}

#[tokio::test]
async fn unknown_ids_are_404() {
    let app = app();
    for id in ["nope", "507f1f77bcf86cd799439011"] {
        let res = call(&app, "GET", &format!("/users/{id}"), "").await;
        assert_eq!(res.status_code(), Status::NotFound);
        assert_eq!(json_body(&res)["message"], "User not found");

        let res = call(&app, "DELETE", &format!("/todo/{id}"), "").await;
        assert_eq!(res.status_code(), Status::NotFound);
        assert_eq!(json_body(&res)["message"], "Todo not found");
    }
}

#[tokio::test]
async fn invalid_user_is_rejected_and_not_stored() {
    let app = app();
    for body in [r#"{"email":"x@example.com"}"#, r#"{"name":""}"#, r#"{"name":42}"#, "not json", ""] {
        let res = call(&app, "POST", "/users", body).await;
        assert_eq!(res.status_code(), Status::InternalServerError, "{body}");
        assert_eq!(json_body(&res)["error"], "ValidationError");
    }
    assert!(list(&app, "/users").await.is_empty());
}

#[tokio::test]
async fn invalid_todo_names_the_field() {
    let res = call(&app(), "POST", "/todo", r#"{"msg":"typo"}"#).await;
    let body = json_body(&res);
    assert_eq!(body["error"], "ValidationError");
    assert_eq!(body["details"], "message");
}

#[tokio::test]
async fn options_is_204_without_body_on_any_path() {
    let app = app();
    for path in ["/", "/todo", "/users/1/2", "/anything/else"] {
        let res = call(&app, "OPTIONS", path, "").await;
        assert_eq!(res.status_code(), Status::NoContent);
        assert!(res.body().is_empty());
        assert_eq!(res.header("access-control-allow-origin"), Some("*"));
    }
}

#[tokio::test]
async fn extra_segments_are_not_routed() {
    let app = app();
    for (method, path) in [("GET", "/users/1/2"), ("DELETE", "/todo/1/2"), ("GET", "/users/")] {
        let res = call(&app, method, path, "").await;
        assert_eq!(res.status_code(), Status::NotFound, "{method} {path}");
        assert_eq!(json_body(&res)["message"], "Not Found");
    }
}

#[tokio::test]
async fn unmatched_method_and_path_pairs_are_404() {
    let app = app();
    for (method, path) in [("POST", "/"), ("PUT", "/todo"), ("DELETE", "/users/1"), ("GET", "/missing")] {
        assert_eq!(call(&app, method, path, "").await.status_code(), Status::NotFound, "{method} {path}");
    }
}

#[tokio::test]
async fn unsupported_method_is_405() {
    let res = call(&app(), "PURGE", "/todo", "").await;
    assert_eq!(res.status_code(), Status::MethodNotAllowed);
    assert_eq!(json_body(&res)["error"], "TransportError");
}

#[tokio::test]
async fn missing_path_is_404() {
    // Authority-form targets carry no path.
    let res = call(&app(), "GET", "example.com:80", "").await;
    assert_eq!(res.status_code(), Status::NotFound);
}

#[tokio::test]
async fn cors_headers_on_every_response() {
    let app = app();
    for res in [
        call(&app, "GET", "/", "").await,
        call(&app, "GET", "/missing", "").await,
        call(&app, "POST", "/todo", "{}").await,
    ] {
        assert_eq!(res.header("access-control-allow-origin"), Some("*"));
        assert!(res.header("access-control-allow-methods").is_some());
        assert!(res.header("access-control-allow-headers").is_some());
        assert!(res.header("access-control-max-age").is_some());
    }
}

#[tokio::test]
async fn store_failures_render_a_generic_500() {
    let app = broken_app();
    for (method, uri, body) in [
        ("GET", "/users", ""),
        ("GET", "/users/abc", ""),
        ("POST", "/todo", r#"{"message":"buy milk"}"#),
        ("DELETE", "/todo/abc", ""),
    ] {
        let res = call(&app, method, uri, body).await;
        assert_eq!(res.status_code(), Status::InternalServerError, "{method} {uri}");
        assert_eq!(json_body(&res), internal_error_envelope(), "{method} {uri}");
        let text = String::from_utf8_lossy(res.body());
        assert!(!text.contains(BACKEND_CAUSE), "{method} {uri} leaked the cause: {text}");
        assert_eq!(res.header("access-control-allow-origin"), Some("*"));
    }
}

#[tokio::test]
async fn store_failures_are_logged_with_their_cause() {
    let captured = Arc::new(Mutex::new(Vec::<u8>::new()));
    let sink = Arc::clone(&captured);
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(move || LogSink(Arc::clone(&sink)))
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let res = call(&broken_app(), "DELETE", "/todo/abc", "").await;
    assert_eq!(res.status_code(), Status::InternalServerError);

    let logs = String::from_utf8(captured.lock().unwrap().clone()).unwrap();
    let line = logs
        .lines()
        .find(|l| l.contains("request failed"))
        .unwrap_or_else(|| panic!("no failure event in:\n{logs}"));
    assert!(line.contains("ERROR"), "{line}");
    assert!(line.contains("InternalError"), "{line}");
    assert!(line.contains(BACKEND_CAUSE), "{line}");
}

/// `io::Write` into a shared buffer, so a test can read back what was logged.
struct LogSink(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn oversized_body_is_413() {
    let app = app();
    let message = "x".repeat(MAX_BODY_BYTES);
    let body = json!({ "message": message }).to_string();

    let res = call(&app, "POST", "/todo", &body).await;
    assert_eq!(res.status_code(), Status::ContentTooLarge);
    assert_eq!(json_body(&res)["error"], "TransportError");
    assert!(list(&app, "/todo").await.is_empty());
}
