//! HTTP surface for the call-analytics service.
//!
//! Exposes the transcription webhook, the dashboard metrics query, and a
//! health probe. Everything behavioral lives in `domain`; this crate only
//! maps HTTP to domain operations and domain errors back to status codes.

pub(crate) mod controller;
pub mod error;
pub(crate) mod middleware;
pub(crate) mod params;
pub mod router;

pub use error::{Error, Result};
pub use service::AppState;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, Method};
use domain::error::{DomainErrorKind, Error as DomainError, InternalErrorKind};
use log::*;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Bind the configured interface/port and serve the router until shutdown.
pub async fn init_server(app_state: AppState) -> Result<()> {
    let config = &app_state.config;
    let interface = config.interface.as_deref().unwrap_or("127.0.0.1");
    let listen_addr = format!("{}:{}", interface, config.port);

    info!("Starting server; listening on http://{listen_addr}");

    let allowed_origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    debug!("Allowed CORS origins: {:?}", config.allowed_origins);

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            CONTENT_TYPE,
            HeaderName::from_static("x-api-key"),
            HeaderName::from_static("x-webhook-secret"),
        ])
        .allow_origin(AllowOrigin::list(allowed_origins));

    let router = router::define_routes(app_state).layer(cors);

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .map_err(|e| DomainError {
            source: Some(Box::new(e)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(format!(
                "Failed to bind {listen_addr}"
            ))),
        })?;

    axum::serve(listener, router).await.map_err(|e| DomainError {
        source: Some(Box::new(e)),
        error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
            "Server terminated unexpectedly".to_string(),
        )),
    })?;

    Ok(())
}
