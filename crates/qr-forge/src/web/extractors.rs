//! Request extractors and query parameters

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use serde::Deserialize;
use uuid::Uuid;

/// Query parameters accepted by `POST /generate`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateParams {
    /// `json` selects the structured response instead of a redirect
    #[serde(default)]
    pub format: Option<String>,
}

/// Query parameters accepted by `GET /qr/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FetchParams {
    /// Serve as an attachment instead of inline
    #[serde(default)]
    pub download: bool,
}

/// How the client wants results reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// `ApiResponse` JSON with a meaningful status code
    Json,
    /// `303 See Other` back to the form page
    Redirect,
}

impl ResponseMode {
    /// JSON when asked for via `?format=json` or an `Accept: application/json` header.
    pub fn negotiate(params: &GenerateParams, headers: &HeaderMap) -> Self {
        let format_json = params
            .format
            .as_deref()
            .is_some_and(|format| format.eq_ignore_ascii_case("json"));

        let accepts_json = headers
            .get(header::ACCEPT)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|accept| accept.contains("application/json"));

        if format_json || accepts_json {
            Self::Json
        } else {
            Self::Redirect
        }
    }
}

/// Request context for logging
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user_agent: Option<String>,
    pub real_ip: Option<String>,
    pub request_id: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self {
            user_agent: None,
            real_ip: None,
            request_id: Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now(),
        }
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string());

        let real_ip = parts
            .headers
            .get("x-real-ip")
            .or_else(|| parts.headers.get("x-forwarded-for"))
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.split(',').next())
            .map(|s| s.trim().to_string());

        Ok(Self {
            user_agent,
            real_ip,
            request_id: Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now(),
        })
    }
}
