//! Web layer module
//!
//! The HTTP interface for qr-forge. Handlers are thin and delegate to the
//! [`QrPipeline`] for all real work.
//!
//! # Architecture
//!
//! - **Handlers**: HTTP request handlers organized by concern
//! - **Responses**: Standardized response types and error mapping
//! - **Extractors**: Request context and query parameters
//! - **Middleware**: Request logging and security headers
//! - **Utils**: Header and redirect helpers

use anyhow::Result;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

use crate::{config::Config, pipeline::QrPipeline};

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod responses;
pub mod utils;

pub use extractors::RequestContext;
pub use responses::{ApiResponse, handle_error};

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(config: &Config, pipeline: QrPipeline) -> Result<Self> {
        let app = create_router(AppState::new(pipeline), config.web.max_request_size);
        let addr: SocketAddr = format!("{}:{}", config.web.host, config.web.port).parse()?;

        Ok(Self { app, addr })
    }

    /// Serve until `shutdown` is cancelled, signalling once bound (or failed to bind).
    pub async fn serve_with_signal(
        self,
        ready_signal: tokio::sync::oneshot::Sender<Result<()>>,
        shutdown: CancellationToken,
    ) -> Result<()> {
        match tokio::net::TcpListener::bind(&self.addr).await {
            Ok(listener) => {
                let _ = ready_signal.send(Ok(()));

                axum::serve(listener, self.app)
                    .with_graceful_shutdown(async move {
                        shutdown.cancelled().await;
                        tracing::info!("Web server received shutdown signal, shutting down gracefully");
                    })
                    .await?;
                Ok(())
            }
            Err(bind_error) => {
                let bind_err_msg = format!("Failed to bind to {}: {}", self.addr, bind_error);
                let _ = ready_signal.send(Err(anyhow::anyhow!("{}", bind_err_msg)));
                Err(anyhow::anyhow!("{}", bind_err_msg))
            }
        }
    }

    /// Get the host address
    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    /// Get the port number
    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

/// Create the router with all routes and middleware
pub fn create_router(state: AppState, max_request_size: usize) -> Router {
    Router::new()
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/live", get(handlers::health::liveness_check))
        // Form page
        .route("/", get(handlers::index::index))
        // Generate and fetch
        .route("/generate", post(handlers::generate::generate_qr))
        .route("/qr/{id}", get(handlers::artifacts::get_qr))
        // Middleware (applied in reverse order)
        .layer(DefaultBodyLimit::max(max_request_size))
        .layer(CorsLayer::permissive())
        .layer(axum::middleware::from_fn(middleware::security_headers_middleware))
        .layer(axum::middleware::from_fn(middleware::request_logging_middleware))
        .with_state(state)
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: QrPipeline,
    /// Application start time for uptime calculation
    pub start_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(pipeline: QrPipeline) -> Self {
        Self {
            pipeline,
            start_time: chrono::Utc::now(),
        }
    }
}
