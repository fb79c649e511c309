//! QR generation handler
//!
//! `POST /generate` takes a multipart form with a `text` field and an optional
//! `logo` file. Browsers get redirected back to the form page; API clients
//! asking for JSON get an [`ApiResponse`] with the new artifact's URLs.

use axum::{
    Json,
    extract::{
        Multipart, Query, State,
        multipart::MultipartError,
    },
    http::{HeaderMap, Method, Uri},
    response::{IntoResponse, Response},
};
use bytes::Bytes;

use crate::{
    errors::AppError,
    web::{
        AppState,
        extractors::{GenerateParams, RequestContext, ResponseMode},
        responses::{ApiResponse, GenerateResponse, created, handle_error, public_message},
        utils::{log_request, redirect_to_artifact, redirect_with_error},
    },
};

/// Fields read from the generate form
#[derive(Debug, Default)]
struct GenerateForm {
    text: String,
    logo: Option<Bytes>,
}

async fn read_form(mut multipart: Multipart) -> Result<GenerateForm, MultipartError> {
    let mut form = GenerateForm::default();

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("text") => form.text = field.text().await?,
            Some("logo") => form.logo = Some(field.bytes().await?),
            _ => {} // Ignore other fields
        }
    }

    Ok(form)
}

/// Generate a QR code from form input
pub async fn generate_qr(
    State(state): State<AppState>,
    Query(params): Query<GenerateParams>,
    headers: HeaderMap,
    context: RequestContext,
    multipart: Multipart,
) -> Response {
    log_request(&Method::POST, &Uri::from_static("/generate"), &context);
    let mode = ResponseMode::negotiate(&params, &headers);

    let form = match read_form(multipart).await {
        Ok(form) => form,
        Err(e) => {
            tracing::debug!(request_id = %context.request_id, error = %e, "Rejected multipart body");
            return match mode {
                ResponseMode::Json => {
                    (e.status(), Json(ApiResponse::<()>::error(e.body_text()))).into_response()
                }
                ResponseMode::Redirect => redirect_with_error(&e.body_text()).into_response(),
            };
        }
    };

    match state.pipeline.generate_detailed(&form.text, form.logo).await {
        Ok(generated) => {
            let id = generated.id.to_string();
            match mode {
                ResponseMode::Json => created(GenerateResponse {
                    image_url: format!("/qr/{id}"),
                    download_url: format!("/qr/{id}?download=true"),
                    id,
                    text: generated.text,
                    expires_at: generated.expires_at,
                })
                .into_response(),
                ResponseMode::Redirect => redirect_to_artifact(&id).into_response(),
            }
        }
        Err(error) => respond_with_error(mode, error),
    }
}

fn respond_with_error(mode: ResponseMode, error: AppError) -> Response {
    match mode {
        ResponseMode::Json => handle_error(error),
        ResponseMode::Redirect => {
            if !error.is_user_error() {
                tracing::error!(error = %error, "QR generation failed");
            }
            redirect_with_error(&public_message(&error)).into_response()
        }
    }
}
