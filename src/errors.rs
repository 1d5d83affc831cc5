//! Request error taxonomy
//!
//! Every handler failure is one of these variants; the router turns them
//! into `{"message": ...}` JSON responses.

use hyper::StatusCode;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Requested file is absent from the upload directory
    #[error("File not found")]
    FileNotFound,

    /// No route matches the request path
    #[error("Not Found")]
    RouteNotFound,

    /// Route exists but does not accept this method
    #[error("Method Not Allowed")]
    MethodNotAllowed { allow: &'static str },

    /// Client-supplied filename cannot be used as a storage key
    #[error("Invalid filename '{name}'")]
    InvalidFilename { name: String },

    /// Malformed request, e.g. broken multipart body
    #[error("{message}")]
    BadRequest { message: String },

    /// Multipart body lacks a usable `file` field
    #[error("Missing file field")]
    MissingFile,

    /// Request body exceeds the configured limit
    #[error("Payload Too Large (limit {limit} bytes)")]
    PayloadTooLarge { limit: u64 },

    /// Preflight asking for an origin, method or header outside the policy
    #[error("Disallowed CORS {what}")]
    DisallowedCors { what: &'static str },

    /// Filesystem failure while reading or writing
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::FileNotFound | Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::InvalidFilename { .. }
            | Self::BadRequest { .. }
            | Self::DisallowedCors { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::MissingFile => StatusCode::UNPROCESSABLE_ENTITY,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe message, without leaking filesystem details
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidFilename { .. } => "Invalid filename".to_string(),
            Self::PayloadTooLarge { .. } => "Payload Too Large".to_string(),
            Self::Io(_) => "Internal Server Error".to_string(),
            other => other.to_string(),
        }
    }

    /// Server-side faults get logged at error level, client errors do not
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

impl From<multer::Error> for Error {
    fn from(err: multer::Error) -> Self {
        match err {
            multer::Error::StreamSizeExceeded { limit }
            | multer::Error::FieldSizeExceeded { limit, .. } => Self::PayloadTooLarge { limit },
            other => Self::BadRequest {
                message: format!("Failed to parse multipart data: {other}"),
            },
        }
    }
}
