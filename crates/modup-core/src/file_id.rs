//! Generated acknowledgment identifiers
//!
//! A file ID has the form `{modId}_{suffix}` where the suffix is the first
//! eight lowercase hex digits of a random v4 UUID. It is only an
//! acknowledgment token and does not address any stored object.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of hex characters taken from the UUID
pub const SUFFIX_LEN: usize = 8;

/// Acknowledgment token returned for an accepted upload
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    /// Generate a fresh ID for the given mod
    pub fn generate(mod_id: &str) -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self(format!("{}_{}", mod_id, &hex[..SUFFIX_LEN]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Mod ID portion (everything before the last `_`)
    pub fn mod_id(&self) -> &str {
        self.0.rsplit_once('_').map(|(m, _)| m).unwrap_or(&self.0)
    }

    /// Random hex suffix
    pub fn suffix(&self) -> &str {
        self.0.rsplit_once('_').map(|(_, s)| s).unwrap_or("")
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FileId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_lower_hex(s: &str) -> bool {
        s.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
    }

    #[test]
    fn test_generate_format() {
        let id = FileId::generate("42");
        assert!(id.as_str().starts_with("42_"));
        assert_eq!(id.suffix().len(), SUFFIX_LEN);
        assert!(is_lower_hex(id.suffix()));
        assert_eq!(id.as_str().len(), "42_".len() + SUFFIX_LEN);
    }

    #[test]
    fn test_mod_id_with_underscores() {
        let id = FileId::generate("my_cool_mod");
        assert_eq!(id.mod_id(), "my_cool_mod");
        assert_eq!(id.suffix().len(), SUFFIX_LEN);
    }

    #[test]
    fn test_ids_differ() {
        let a = FileId::generate("7");
        let b = FileId::generate("7");
        assert_ne!(a, b);
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = FileId::generate("7");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
    }
}
