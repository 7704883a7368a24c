//! Request-level errors and their delivery.
//!
//! An [`ApiError`] is only a value: kind, status, message, optional details.
//! Building one writes nothing. The dispatcher catches it from the handler
//! and makes exactly one [`respond`] call, so a response is either the
//! success body or the error envelope, never both.

use serde::Serialize;

use crate::response::{IntoResponse, Json, Response};
use crate::schema::ValidationError;
use crate::status::Status;
use crate::store::StoreError;

/// Message sent for every store failure. The cause is logged, not sent.
pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// A failed request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The body was not JSON or did not satisfy the resource schema.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// No route, or no record with the requested identifier.
    #[error("{message}")]
    NotFound { message: String },

    /// The repository failed.
    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        cause: Option<StoreError>,
    },

    /// The request was rejected before reaching a handler: no path, an
    /// unsupported method, or a body over the size limit.
    #[error("{message}")]
    Transport { status: Status, message: String },
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound { message: message.into() }
    }

    /// Generic 404 for requests no route accepts.
    pub fn route_not_found() -> Self {
        Self::not_found("Not Found")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into(), cause: None }
    }

    pub fn method_not_allowed() -> Self {
        Self::Transport {
            status: Status::MethodNotAllowed,
            message: "Method Not Allowed".to_owned(),
        }
    }

    pub fn missing_path() -> Self {
        Self::Transport { status: Status::NotFound, message: "Not Found".to_owned() }
    }

    pub fn body_too_large() -> Self {
        Self::Transport {
            status: Status::ContentTooLarge,
            message: "Content Too Large".to_owned(),
        }
    }

    pub fn status(&self) -> Status {
        match self {
            // Validation failures are reported as 500, matching the deployed API.
            Self::Validation(_) => Status::InternalServerError,
            Self::NotFound { .. } => Status::NotFound,
            Self::Internal { .. } => Status::InternalServerError,
            Self::Transport { status, .. } => *status,
        }
    }

    /// The `error` field of the envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "ValidationError",
            Self::NotFound { .. } => "NotFoundError",
            Self::Internal { .. } => "InternalError",
            Self::Transport { .. } => "TransportError",
        }
    }

    /// Client-facing detail. Store causes are deliberately absent.
    pub fn details(&self) -> Option<String> {
        match self {
            Self::Validation(e) => e.field().map(str::to_owned),
            _ => None,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::Internal { message: INTERNAL_MESSAGE.to_owned(), cause: Some(e) }
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    error: &'a str,
    message: String,
    details: Option<String>,
}

/// Builds the one and only response for a failed request:
/// `{ "error": <kind>, "message": <message>, "details": <details|null> }`.
pub fn respond(err: &ApiError) -> Response {
    let body = Envelope {
        error: err.kind(),
        message: err.to_string(),
        details: err.details(),
    };
    (err.status(), Json(body)).into_response()
}
