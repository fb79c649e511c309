//! Index page handler
//!
//! Serves the embedded form page. The page reads `?artifact=` and `?error=`
//! itself, so the handler stays static.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse},
};

use crate::{assets::StaticAssets, web::extractors::RequestContext};

/// Serve the index page from embedded static assets
pub async fn index(_context: RequestContext) -> impl IntoResponse {
    match StaticAssets::get_asset("static/index.html") {
        Some(file) => {
            let content = String::from_utf8_lossy(&file.data);
            Html(content.into_owned()).into_response()
        }
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html("<h1>500 Internal Server Error</h1><p>Form page not found</p>".to_string()),
        )
            .into_response(),
    }
}
