//! Web utility functions

use axum::{
    http::{HeaderMap, HeaderValue, Method, Uri, header},
    response::Redirect,
};
use tracing::info;

use super::extractors::RequestContext;

/// Log an incoming HTTP request
pub fn log_request(method: &Method, uri: &Uri, context: &RequestContext) {
    info!(
        method = %method,
        uri = %uri,
        request_id = %context.request_id,
        user_agent = ?context.user_agent,
        real_ip = ?context.real_ip,
        "HTTP request"
    );
}

/// Headers that stop browsers and proxies from keeping a copy
pub fn no_store_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store, no-cache, must-revalidate, max-age=0"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(
        header::EXPIRES,
        HeaderValue::from_static("Thu, 01 Jan 1970 00:00:00 GMT"),
    );
    headers
}

/// `Content-Disposition` for a served QR image
pub fn content_disposition(id: &str, download: bool) -> String {
    let disposition = if download { "attachment" } else { "inline" };
    format!("{disposition}; filename=\"qr-{id}.png\"")
}

/// Redirect back to the form page showing a freshly generated artifact
pub fn redirect_to_artifact(id: &str) -> Redirect {
    Redirect::to(&format!("/?artifact={id}"))
}

/// Redirect back to the form page showing an error message
pub fn redirect_with_error(message: &str) -> Redirect {
    Redirect::to(&format!("/?error={}", urlencoding::encode(message)))
}
