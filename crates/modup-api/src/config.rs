//! Handler settings and CORS policy
//!
//! Both types deserialize with every field defaulted, so the daemon can embed
//! them directly in its TOML config.

use std::collections::BTreeMap;
use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, Method};
use modup_core::DEFAULT_FILE_NAME;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

/// Path of the liveness route served next to the upload function
pub const HEALTH_PATH: &str = "/health";

/// Settings that cannot be served
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Route path {0} collides with the health route")]
    RoutePathConflict(String),
}

/// Upload handler settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSettings {
    /// Path the upload function is mounted on
    #[serde(default = "default_route_path")]
    pub route_path: String,

    /// Name used when a request carries no `fileName`
    #[serde(default = "default_file_name")]
    pub default_file_name: String,

    /// Largest request body accepted, in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_route_path() -> String {
    "/".to_string()
}

fn default_file_name() -> String {
    DEFAULT_FILE_NAME.to_string()
}

fn default_max_body_bytes() -> usize {
    32 * 1024 * 1024
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            route_path: default_route_path(),
            default_file_name: default_file_name(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl UploadSettings {
    /// Route path with a guaranteed leading `/`
    pub fn normalized_route_path(&self) -> String {
        let trimmed = self.route_path.trim();
        if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{}", trimmed)
        }
    }

    /// Reject settings the router cannot be built from
    pub fn validate(&self) -> Result<(), ConfigError> {
        let route_path = self.normalized_route_path();
        if route_path == HEALTH_PATH {
            return Err(ConfigError::RoutePathConflict(route_path));
        }
        Ok(())
    }
}

/// Cross-origin policy advertised by the upload function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorsPolicy {
    /// `*` or a single exact origin
    #[serde(default = "default_allow_origin")]
    pub allow_origin: String,

    #[serde(default = "default_allow_methods")]
    pub allow_methods: Vec<String>,

    #[serde(default = "default_allow_headers")]
    pub allow_headers: Vec<String>,

    /// Preflight cache lifetime in seconds
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,
}

fn default_allow_origin() -> String {
    "*".to_string()
}

fn default_allow_methods() -> Vec<String> {
    vec!["POST".to_string(), "OPTIONS".to_string()]
}

fn default_allow_headers() -> Vec<String> {
    vec!["Content-Type".to_string(), "X-User-Id".to_string()]
}

fn default_max_age_secs() -> u64 {
    86400
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self {
            allow_origin: default_allow_origin(),
            allow_methods: default_allow_methods(),
            allow_headers: default_allow_headers(),
            max_age_secs: default_max_age_secs(),
        }
    }
}

impl CorsPolicy {
    /// Build the tower-http layer for the HTTP server.
    ///
    /// Entries that are not valid methods or header names are skipped with a
    /// warning. An unparsable origin allows no origin at all.
    pub fn layer(&self) -> CorsLayer {
        let origin = if self.allow_origin == "*" {
            AllowOrigin::any()
        } else {
            match HeaderValue::from_str(&self.allow_origin) {
                Ok(value) => AllowOrigin::exact(value),
                Err(e) => {
                    tracing::warn!(
                        origin = %self.allow_origin,
                        error = %e,
                        "Invalid CORS origin"
                    );
                    AllowOrigin::list(Vec::<HeaderValue>::new())
                }
            }
        };

        let methods: Vec<Method> = self
            .allow_methods
            .iter()
            .filter_map(|m| match Method::from_bytes(m.trim().as_bytes()) {
                Ok(method) => Some(method),
                Err(_) => {
                    tracing::warn!(method = %m, "Ignoring invalid CORS method");
                    None
                }
            })
            .collect();

        let headers: Vec<HeaderName> = self
            .allow_headers
            .iter()
            .filter_map(|h| match HeaderName::from_bytes(h.trim().as_bytes()) {
                Ok(name) => Some(name),
                Err(_) => {
                    tracing::warn!(header = %h, "Ignoring invalid CORS header");
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(AllowMethods::list(methods))
            .allow_headers(AllowHeaders::list(headers))
            .max_age(Duration::from_secs(self.max_age_secs))
    }

    /// Headers attached to every non-preflight function response
    pub fn response_headers(&self) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        headers.insert(
            "Access-Control-Allow-Origin".to_string(),
            self.allow_origin.clone(),
        );
        headers
    }

    /// Headers of a function preflight response, in canonical casing
    pub fn preflight_headers(&self) -> BTreeMap<String, String> {
        let mut headers = self.response_headers();
        headers.insert(
            "Access-Control-Allow-Methods".to_string(),
            self.allow_methods.join(", "),
        );
        headers.insert(
            "Access-Control-Allow-Headers".to_string(),
            self.allow_headers.join(", "),
        );
        headers.insert(
            "Access-Control-Max-Age".to_string(),
            self.max_age_secs.to_string(),
        );
        headers
    }
}
