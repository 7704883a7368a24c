//! HTTP status codes as a typed enum.
//!
//! Only the codes this service actually emits are listed. Use [`Status`]
//! anywhere a status code is accepted: `Response::status()`,
//! `Response::builder().status()`, or paired with a body as `(Status, Json(..))`.
//!
//! ```rust
//! use burrow::{Json, Response, Status};
//!
//! Response::status(Status::NoContent);
//!
//! Response::builder()
//!     .status(Status::Created)
//!     .json(br#"{"message":"OK"}"#.to_vec());
//!
//! let _created = (Status::Created, Json(serde_json::json!({ "message": "OK" })));
//! ```

/// HTTP status codes used by the service.
#[allow(clippy::enum_variant_names)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Status {
    // ── 2xx Success ───────────────────────────────────────────────────────────
    Ok,                            // 200
    Created,                       // 201
    NoContent,                     // 204

    // ── 4xx Client errors ─────────────────────────────────────────────────────
    NotFound,                      // 404
    MethodNotAllowed,              // 405
    ContentTooLarge,               // 413

    // ── 5xx Server errors ─────────────────────────────────────────────────────
    InternalServerError,           // 500
}

impl Status {
    pub fn as_u16(self) -> u16 {
        match self {
            Status::Ok                  => 200,
            Status::Created             => 201,
            Status::NoContent           => 204,
            Status::NotFound            => 404,
            Status::MethodNotAllowed    => 405,
            Status::ContentTooLarge     => 413,
            Status::InternalServerError => 500,
        }
    }

    /// `true` for 5xx codes.
    pub fn is_server_error(self) -> bool {
        self.as_u16() >= 500
    }
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        s.as_u16()
    }
}
