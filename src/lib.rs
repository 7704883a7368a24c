//! # burrow
//!
//! A small JSON service for two resources, users and todos, kept in a
//! document store.
//!
//! ## The request pipeline
//!
//! Every request takes the same path:
//!
//! 1. **Dispatch**: the method is parsed, `OPTIONS` is answered with `204`,
//!    and the path is matched against one radix tree per method via
//!    [`matchit`]. No match is a `404`.
//! 2. **Validate**: handlers that take a body decode it as JSON and check it
//!    against a declarative [`schema::Schema`].
//! 3. **Persist**: one [`store::Repository`] call.
//! 4. **Respond**: the handler's value is serialised. A failure at any step
//!    is an [`ApiError`] value, rendered once by [`responder::respond`].
//!
//! CORS headers go on every response.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use burrow::{routes, store, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), burrow::Error> {
//!     let repo = store::connect("memory://").await?;
//!     Server::bind("127.0.0.1:3000".parse().unwrap())
//!         .serve(routes::app(repo))
//!         .await
//! }
//! ```

mod error;
mod handler;
mod method;
mod middleware;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod config;
pub mod logging;
pub mod responder;
pub mod routes;
pub mod schema;
pub mod store;

pub use error::Error;
pub use handler::{Handler, HandlerResult};
pub use method::{Method, UnknownMethod};
pub use request::Request;
pub use responder::ApiError;
pub use response::{IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use server::{MAX_BODY_BYTES, Server, dispatch};
pub use status::Status;
