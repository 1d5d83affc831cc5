//! Storage module
//!
//! The upload directory and the rules for naming entries in it.

pub mod filename;
mod store;

pub use store::{FileStore, StagedUpload};
