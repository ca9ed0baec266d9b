//! Request and response models for the upload endpoint

use serde::{Deserialize, Serialize};

use crate::error::{UploadError, UploadResult};
use crate::file_id::FileId;

/// Default name given to an upload that arrives without `fileName`
pub const DEFAULT_FILE_NAME: &str = "mod.exe";

/// Message returned by the retrieval endpoint
pub const RETRIEVAL_PLACEHOLDER: &str = "File retrieval placeholder";

/// POST body as sent by the client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    /// Original file name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Base64 file content (never decoded here)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_content: Option<String>,
    /// Mod the file belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mod_id: Option<String>,
}

impl UploadRequest {
    /// Parse a raw request body. An empty body is treated as `{}`.
    pub fn from_json(body: &[u8]) -> UploadResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        Ok(serde_json::from_slice(body)?)
    }

    /// Check required fields and apply the default file name.
    ///
    /// The default only replaces an absent (or `null`) `fileName`; an empty
    /// name is kept as sent.
    pub fn into_upload(self, default_file_name: &str) -> UploadResult<Upload> {
        let file_content = self.file_content.filter(|c| !c.is_empty());
        let mod_id = self.mod_id.filter(|m| !m.is_empty());

        let (Some(file_content), Some(mod_id)) = (file_content, mod_id) else {
            return Err(UploadError::MissingUploadFields);
        };

        let file_name = self
            .file_name
            .unwrap_or_else(|| default_file_name.to_string());

        Ok(Upload {
            file_name,
            file_content,
            mod_id,
        })
    }
}

/// An upload with all required fields present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub file_content: String,
    pub mod_id: String,
}

/// Acknowledgment for an accepted upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    /// Generated acknowledgment token
    pub file_id: FileId,
    pub file_name: String,
    pub mod_id: String,
    /// Content echoed back unchanged
    pub file_content: String,
    /// Always true for a receipt
    pub uploaded: bool,
}

impl UploadReceipt {
    /// Build a receipt for the given upload
    pub fn acknowledge(upload: Upload, file_id: FileId) -> Self {
        Self {
            file_id,
            file_name: upload.file_name,
            mod_id: upload.mod_id,
            file_content: upload.file_content,
            uploaded: true,
        }
    }
}

/// Answer of the retrieval endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalNotice {
    pub message: String,
}

impl Default for RetrievalNotice {
    fn default() -> Self {
        Self {
            message: RETRIEVAL_PLACEHOLDER.to_string(),
        }
    }
}
