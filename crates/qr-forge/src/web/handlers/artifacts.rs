//! Artifact retrieval handler

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderValue, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};

use crate::web::{
    AppState,
    extractors::{FetchParams, RequestContext},
    responses::handle_error,
    utils::{content_disposition, log_request, no_store_headers},
};

/// Serve a generated QR code by id
///
/// Never cacheable. Unknown, malformed and expired ids are all 404s, with the
/// message telling expired apart from never issued.
pub async fn get_qr(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<FetchParams>,
    context: RequestContext,
) -> Response {
    log_request(&Method::GET, &Uri::from_static("/qr"), &context);

    let artifact = match state.pipeline.fetch(&id).await {
        Ok(artifact) => artifact,
        Err(error) => {
            let mut response = handle_error(error);
            response.headers_mut().extend(no_store_headers());
            return response;
        }
    };

    let mut headers = no_store_headers();
    let content_type = HeaderValue::from_str(&artifact.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    headers.insert(header::CONTENT_TYPE, content_type);
    if let Ok(disposition) =
        HeaderValue::from_str(&content_disposition(artifact.id.as_str(), params.download))
    {
        headers.insert(header::CONTENT_DISPOSITION, disposition);
    }

    (StatusCode::OK, headers, Body::from(artifact.bytes.clone())).into_response()
}
