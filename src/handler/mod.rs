//! Request handler module
//!
//! Routing dispatch, CORS and the upload / list / download handlers.

pub mod cors;
pub mod files;
pub mod router;
pub mod upload;

// Re-export main entry point
pub use router::handle_request;
