//! modup-core - Core traits and types for the mod upload service
//!
//! This crate provides the request/receipt models, the generated file
//! identifier, and the `UploadBackend` abstraction that the HTTP layer and
//! the cloud-function adapter both drive.

pub mod backend;
pub mod error;
pub mod file_id;
pub mod models;

pub use backend::{AcknowledgeBackend, UploadBackend};
pub use error::{UploadError, UploadResult};
pub use file_id::FileId;
pub use models::*;
