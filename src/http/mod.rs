//! HTTP protocol layer module
//!
//! Protocol helpers shared by the handlers: validators, ranges, content
//! types, path decoding and response builders.

pub mod cache;
pub mod mime;
pub mod path;
pub mod range;
pub mod response;

pub use response::{error_response, json_response};
