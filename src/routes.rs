//! The service's route table and handlers.
//!
//! | Method | Path | Success |
//! |---|---|---|
//! | GET | `/` | `200 {"message":"Hello World!"}` |
//! | GET | `/users` | `200 [User…]` |
//! | POST | `/users` | `201 {"message":"User created successfully!","user":User}` |
//! | GET | `/users/{id}` | `200 User`, else `404 User not found` |
//! | GET | `/todo` | `200 [Todo…]` |
//! | POST | `/todo` | `201 {"message":"OK","todo":Todo}` |
//! | DELETE | `/todo/{id}` | `200 Todo`, else `404 Todo not found` |
//!
//! `OPTIONS` on any path and unmatched requests are answered by the
//! dispatcher before these handlers are consulted.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use crate::handler::HandlerResult;
use crate::method::Method;
use crate::request::Request;
use crate::responder::ApiError;
use crate::response::{IntoResponse, Json};
use crate::router::Router;
use crate::schema;
use crate::status::Status;
use crate::store::{Collection, Record, Repository};

/// The repository handle every handler receives.
pub type Store = Arc<dyn Repository>;

/// Builds the routing table over `store`.
pub fn app(store: Store) -> Router<Store> {
    Router::with_state(store)
        .on(Method::Get,    "/",           hello)
        .on(Method::Get,    "/users",      list_users)
        .on(Method::Post,   "/users",      create_user)
        .on(Method::Get,    "/users/{id}", get_user)
        .on(Method::Get,    "/todo",       list_todos)
        .on(Method::Post,   "/todo",       create_todo)
        .on(Method::Delete, "/todo/{id}",  delete_todo)
}

/// Mutation envelope for `POST /users`.
#[derive(Serialize)]
struct UserCreated {
    message: &'static str,
    user: Record,
}

/// Mutation envelope for `POST /todo`.
#[derive(Serialize)]
struct TodoCreated {
    message: &'static str,
    todo: Record,
}

fn id_param(req: &Request) -> Result<&str, ApiError> {
    // The router only matches these routes with a non-empty `{id}`.
    req.param("id").ok_or_else(ApiError::route_not_found)
}

async fn hello(_req: Request, _store: Store) -> HandlerResult {
    Ok(Json(json!({ "message": "Hello World!" })).into_response())
}

// ── Users ─────────────────────────────────────────────────────────────────────

async fn list_users(_req: Request, store: Store) -> Result<Json<Vec<Record>>, ApiError> {
    Ok(Json(store.find_all(Collection::Users).await?))
}

async fn create_user(req: Request, store: Store) -> HandlerResult {
    let fields = schema::USER.parse(req.body())?;
    let user = store.create(Collection::Users, fields).await?;
    let body = UserCreated { message: "User created successfully!", user };
    Ok((Status::Created, Json(body)).into_response())
}

async fn get_user(req: Request, store: Store) -> Result<Json<Record>, ApiError> {
    let id = id_param(&req)?;
    store
        .find_by_id(Collection::Users, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("User not found"))
}

// ── Todos ─────────────────────────────────────────────────────────────────────

async fn list_todos(_req: Request, store: Store) -> Result<Json<Vec<Record>>, ApiError> {
    Ok(Json(store.find_all(Collection::Todos).await?))
}

async fn create_todo(req: Request, store: Store) -> HandlerResult {
    let fields = schema::TODO.parse(req.body())?;
    let todo = store.create(Collection::Todos, fields).await?;
    Ok((Status::Created, Json(TodoCreated { message: "OK", todo })).into_response())
}

async fn delete_todo(req: Request, store: Store) -> Result<Json<Record>, ApiError> {
    let id = id_param(&req)?;
    store
        .delete_by_id(Collection::Todos, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Todo not found"))
}
