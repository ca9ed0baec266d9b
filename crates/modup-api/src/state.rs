//! Application state for the upload API

use std::sync::Arc;

use modup_core::{AcknowledgeBackend, UploadBackend};

use crate::config::{CorsPolicy, UploadSettings};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    backend: Arc<dyn UploadBackend>,
    settings: Arc<UploadSettings>,
    cors: Arc<CorsPolicy>,
}

impl AppState {
    /// Create a new AppState with default settings
    pub fn new(backend: Arc<dyn UploadBackend>) -> Self {
        Self::with_settings(backend, UploadSettings::default(), CorsPolicy::default())
    }

    /// Create a new AppState with explicit settings and CORS policy
    pub fn with_settings(
        backend: Arc<dyn UploadBackend>,
        settings: UploadSettings,
        cors: CorsPolicy,
    ) -> Self {
        Self {
            backend,
            settings: Arc::new(settings),
            cors: Arc::new(cors),
        }
    }

    /// State backed by the acknowledging backend
    pub fn acknowledging() -> Self {
        Self::new(Arc::new(AcknowledgeBackend::new()))
    }

    pub fn backend(&self) -> &Arc<dyn UploadBackend> {
        &self.backend
    }

    pub fn settings(&self) -> &UploadSettings {
        &self.settings
    }

    pub fn cors(&self) -> &CorsPolicy {
        &self.cors
    }
}
