//! HTTP request handlers for the upload API
//!
//! These handlers use the UploadBackend trait and are backend-agnostic.

pub mod files;
