//! Cloud-function entry point
//!
//! Serverless platforms hand the handler a JSON event describing the HTTP
//! request and expect a JSON response document back. `handle_event` runs
//! the same upload logic as the axum router and renders the result in that
//! shape, with identical status codes, bodies and CORS headers.

use std::collections::{BTreeMap, HashMap};

use axum::http::StatusCode;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::Instrument;

use crate::error::ApiError;
use crate::handlers::files::{accept_upload, locate_file, USER_ID_HEADER};
use crate::state::AppState;

/// Request event as delivered by the platform
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionEvent {
    /// Defaults to GET when absent
    #[serde(default)]
    pub http_method: Option<String>,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
    /// Set when the platform delivers the body base64-encoded
    #[serde(default)]
    pub is_base64_encoded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_context: Option<serde_json::Value>,
}

impl FunctionEvent {
    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.as_ref().and_then(|headers| {
            headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        })
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_string_parameters
            .as_ref()
            .and_then(|params| params.get(name))
            .map(String::as_str)
    }

    /// Method names are case-sensitive, as in HTTP; `post` is not POST
    fn method(&self) -> String {
        self.http_method
            .clone()
            .unwrap_or_else(|| "GET".to_string())
    }

    /// Raw body bytes, decoding base64 when the platform flagged it
    fn body_bytes(&self) -> Result<Vec<u8>, ApiError> {
        let body = self.body.as_deref().unwrap_or("");
        if self.is_base64_encoded {
            STANDARD
                .decode(body)
                .map_err(|_| ApiError::BadRequest("Invalid base64 request body".to_string()))
        } else {
            Ok(body.as_bytes().to_vec())
        }
    }
}

/// Invocation metadata supplied by the platform
#[derive(Debug, Clone, Default)]
pub struct FunctionContext {
    pub request_id: String,
}

impl FunctionContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }
}

/// Response document returned to the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl FunctionResponse {
    /// Empty 200 answering a CORS preflight
    pub fn preflight(state: &AppState) -> Self {
        Self {
            status_code: StatusCode::OK.as_u16(),
            headers: state.cors().preflight_headers(),
            body: String::new(),
            is_base64_encoded: false,
        }
    }

    /// JSON response with the CORS response headers
    pub fn json<T: Serialize>(state: &AppState, status: StatusCode, value: &T) -> Self {
        let mut headers = state.cors().response_headers();
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        match serde_json::to_string(value) {
            Ok(body) => Self {
                status_code: status.as_u16(),
                headers,
                body,
                is_base64_encoded: false,
            },
            Err(e) => Self::error(state, ApiError::Internal(e.to_string())),
        }
    }

    pub fn error(state: &AppState, err: ApiError) -> Self {
        let (status, body) = err.into_body();
        Self::json(state, status, &body)
    }

    fn from_result<T: Serialize>(state: &AppState, result: Result<T, ApiError>) -> Self {
        match result {
            Ok(value) => Self::json(state, StatusCode::OK, &value),
            Err(err) => Self::error(state, err),
        }
    }
}

/// Handle one function invocation
pub async fn handle_event(
    state: &AppState,
    event: FunctionEvent,
    context: &FunctionContext,
) -> FunctionResponse {
    let method = event.method();
    let span = tracing::info_span!(
        "invoke",
        request_id = %context.request_id,
        method = %method
    );

    async move {
        let response = match method.as_str() {
            "OPTIONS" => FunctionResponse::preflight(state),
            "POST" => {
                let result = match event.body_bytes() {
                    Ok(body) => accept_upload(state, &body, event.header(USER_ID_HEADER)).await,
                    Err(err) => Err(err),
                };
                FunctionResponse::from_result(state, result)
            }
            "GET" => {
                let result = locate_file(state, event.query_param("fileId")).await;
                FunctionResponse::from_result(state, result)
            }
            _ => FunctionResponse::error(state, ApiError::MethodNotAllowed),
        };

        tracing::debug!(status = response.status_code, "Invocation finished");
        response
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CorsPolicy, UploadSettings};
    use base64::Engine as _;
    use modup_core::AcknowledgeBackend;
    use std::sync::Arc;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn event(value: Value) -> FunctionEvent {
        serde_json::from_value(value).unwrap()
    }

    async fn invoke(value: Value) -> FunctionResponse {
        handle_event(
            &AppState::acknowledging(),
            event(value),
            &FunctionContext::new("req-1"),
        )
        .await
    }

    fn body(response: &FunctionResponse) -> Value {
        serde_json::from_str(&response.body).unwrap()
    }

    #[tokio::test]
    async fn test_options_preflight() {
        let response = invoke(json!({"httpMethod": "OPTIONS"})).await;
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, "");
        assert_eq!(
            response.headers["Access-Control-Allow-Methods"],
            "POST, OPTIONS"
        );
        assert_eq!(
            response.headers["Access-Control-Allow-Headers"],
            "Content-Type, X-User-Id"
        );
        assert_eq!(response.headers["Access-Control-Max-Age"], "86400");
        assert_eq!(response.headers["Access-Control-Allow-Origin"], "*");
    }

    #[tokio::test]
    async fn test_post_acknowledges() {
        let response = invoke(json!({
            "httpMethod": "POST",
            "body": r#"{"fileName":"tank.pak","fileContent":"UEsDBA==","modId":"31"}"#,
        }))
        .await;

        assert_eq!(response.status_code, 200);
        assert_eq!(response.headers["Content-Type"], "application/json");
        assert_eq!(response.headers["Access-Control-Allow-Origin"], "*");

        let body = body(&response);
        assert_eq!(body["fileName"], "tank.pak");
        assert_eq!(body["modId"], "31");
        assert_eq!(body["fileContent"], "UEsDBA==");
        assert_eq!(body["uploaded"], true);
        let file_id = body["fileId"].as_str().unwrap();
        assert!(file_id.starts_with("31_"));
        assert_eq!(file_id.len(), "31_".len() + 8);
    }

    #[tokio::test]
    async fn test_post_base64_encoded_body() {
        let raw = r#"{"fileContent":"QUJD","modId":"8"}"#;
        let response = invoke(json!({
            "httpMethod": "POST",
            "body": STANDARD.encode(raw),
            "isBase64Encoded": true,
        }))
        .await;
        assert_eq!(response.status_code, 200);
        assert_eq!(body(&response)["fileName"], "mod.exe");

        let response = invoke(json!({
            "httpMethod": "POST",
            "body": "%%%",
            "isBase64Encoded": true,
        }))
        .await;
        assert_eq!(response.status_code, 400);
        assert_eq!(body(&response), json!({"error": "Invalid base64 request body"}));
    }

    #[tokio::test]
    async fn test_post_body_too_large() {
        let state = AppState::with_settings(
            Arc::new(AcknowledgeBackend::new()),
            UploadSettings {
                max_body_bytes: 64,
                ..Default::default()
            },
            CorsPolicy::default(),
        );
        let payload = json!({"fileContent": "A".repeat(256), "modId": "3"}).to_string();
        let response = handle_event(
            &state,
            event(json!({"httpMethod": "POST", "body": payload})),
            &FunctionContext::new("req-2"),
        )
        .await;

        assert_eq!(response.status_code, 413);
        assert_eq!(response.headers["Access-Control-Allow-Origin"], "*");
        assert!(body(&response)["error"].is_string());
    }

    #[tokio::test]
    async fn test_post_malformed_json() {
        let response = invoke(json!({"httpMethod": "POST", "body": "{\"modId\": "})).await;
        assert_eq!(response.status_code, 400);
        assert_eq!(response.headers["Content-Type"], "application/json");
        assert!(body(&response)["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid request body"));
    }

    #[tokio::test]
    async fn test_post_missing_fields() {
        let response = invoke(json!({"httpMethod": "POST"})).await;
        assert_eq!(response.status_code, 400);
        assert_eq!(
            body(&response),
            json!({"error": "Missing file content or mod ID"})
        );
    }

    #[tokio::test]
    async fn test_get_placeholder() {
        let response = invoke(json!({
            "httpMethod": "GET",
            "queryStringParameters": {"fileId": "31_0a1b2c3d"},
        }))
        .await;
        assert_eq!(response.status_code, 200);
        assert_eq!(
            body(&response),
            json!({"message": "File retrieval placeholder"})
        );
    }

    #[tokio::test]
    async fn test_missing_method_defaults_to_get() {
        let response = invoke(json!({"queryStringParameters": null})).await;
        assert_eq!(response.status_code, 400);
        assert_eq!(body(&response), json!({"error": "Missing file ID"}));
    }

    #[tokio::test]
    async fn test_unsupported_method() {
        for method in ["DELETE", "HEAD", "PUT"] {
            let response = invoke(json!({"httpMethod": method})).await;
            assert_eq!(response.status_code, 405);
            assert_eq!(body(&response), json!({"error": "Method not allowed"}));
        }
    }

    #[tokio::test]
    async fn test_method_is_case_sensitive() {
        for method in ["post", "get", "options"] {
            let response = invoke(json!({
                "httpMethod": method,
                "body": r#"{"fileContent":"QUJD","modId":"8"}"#,
                "queryStringParameters": {"fileId": "8_0a1b2c3d"},
            }))
            .await;
            assert_eq!(response.status_code, 405, "method {}", method);
            assert_eq!(body(&response), json!({"error": "Method not allowed"}));
        }
    }

    #[test]
    fn test_response_header_names_are_canonical() {
        let response = FunctionResponse::json(
            &AppState::acknowledging(),
            StatusCode::OK,
            &json!({}),
        );
        let names: Vec<&str> = response.headers.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Access-Control-Allow-Origin", "Content-Type"]);
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let event = event(json!({"headers": {"X-User-Id": "u-9"}}));
        assert_eq!(event.header("x-user-id"), Some("u-9"));
        assert_eq!(event.header("content-type"), None);
    }
}
