//! Handler trait and type erasure.
//!
//! # How async handlers are stored
//!
//! The router holds handlers of *different* types in one radix tree per
//! method, so each is hidden behind a trait object (`dyn ErasedHandler<S>`).
//!
//! ```text
//! async fn get_user(req: Request, store: Store) -> Result<Json<Record>, ApiError>
//!        ↓ router.on(Method::Get, "/users/{id}", get_user)
//! get_user.into_boxed_handler()                  ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(get_user))                  ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler<S> = Arc<dyn ErasedHandler<S>>
//! handler.call(req, state.clone())  per request  ← one vtable dispatch
//!        ↓
//! Box::pin(async { get_user(req, state).await.map(IntoResponse::into_response) })
//! ```
//!
//! Handlers never write an error response themselves. They return the
//! [`ApiError`] and the dispatcher delivers it.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::responder::ApiError;
use crate::response::{IntoResponse, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// What every erased handler resolves to.
pub type HandlerResult = Result<Response, ApiError>;

/// A heap-allocated, type-erased future that resolves to a [`HandlerResult`].
#[doc(hidden)]
pub type BoxFuture = Pin<Box<dyn Future<Output = HandlerResult> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler<S> {
    fn call(&self, req: Request, state: S) -> BoxFuture;
}

/// A heap-allocated, type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler<S> = Arc<dyn ErasedHandler<S> + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// Automatically satisfied for any `async fn` with the signature:
///
/// ```text
/// async fn name(req: Request, state: S) -> Result<impl IntoResponse, ApiError>
/// ```
///
/// The trait is **sealed**: only the blanket impl below can satisfy it.
pub trait Handler<S>: private::Sealed<S> + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler<S>;
}

mod private {
    pub trait Sealed<S> {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut, R, S> private::Sealed<S> for F
where
    F: Fn(Request, S) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, ApiError>> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R, S> Handler<S> for F
where
    F: Fn(Request, S) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, ApiError>> + Send + 'static,
    R: IntoResponse + Send + 'static,
    S: 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler<S> {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Bridges a concrete handler `F` into the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R, S> ErasedHandler<S> for FnHandler<F>
where
    F: Fn(Request, S) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R, ApiError>> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request, state: S) -> BoxFuture {
        let fut = (self.0)(req, state);
        Box::pin(async move { fut.await.map(IntoResponse::into_response) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::Method;
    use crate::status::Status;

    async fn echo_state(_req: Request, state: u16) -> Result<String, ApiError> {
        Ok(state.to_string())
    }

    async fn always_missing(_req: Request, _state: u16) -> Result<Status, ApiError> {
        Err(ApiError::not_found("gone"))
    }

    fn request() -> Request {
        Request::new(
            Method::Get,
            "/".to_owned(),
            http::HeaderMap::new(),
            bytes::Bytes::new(),
            Default::default(),
        )
    }

    #[tokio::test]
    async fn boxed_handler_receives_state() {
        let handler = Handler::<u16>::into_boxed_handler(echo_state);
        let res = handler.call(request(), 7).await.unwrap();
        assert_eq!(res.body(), b"7");
    }

    #[tokio::test]
    async fn errors_are_returned_not_rendered() {
        let handler = Handler::<u16>::into_boxed_handler(always_missing);
        let err = handler.call(request(), 0).await.unwrap_err();
        assert_eq!(err.status(), Status::NotFound);
    }
}
