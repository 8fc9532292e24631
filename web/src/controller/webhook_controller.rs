//! Controller for handling webhooks from the transcription pipeline.
//!
//! Receives completed call analyses (transcript segments plus sentiment and
//! topic annotations), runs them through the analysis pipeline, and persists
//! the resulting record.

use crate::controller::ApiResponse;
use crate::{AppState, Error};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

use domain::gateway::call_store::CallStoreClient;
use domain::ingestion;
use domain::RoleLexicon;
use log::*;
use serde::Serialize;
use utoipa::ToSchema;

/// Response for webhook acknowledgment
#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
}

/// POST /webhooks/calls
///
/// Handles webhook callbacks from the transcription pipeline with completed
/// call analyses. This endpoint does not use the API key; deliveries are
/// validated via the shared webhook secret when one is configured.
#[utoipa::path(
    post,
    path = "/webhooks/calls",
    request_body = serde_json::Value,
    responses(
        (status = 201, description = "Call analysis accepted and stored", body = WebhookResponse),
        (status = 401, description = "Invalid webhook secret"),
        (status = 502, description = "Record store unreachable")
    )
)]
pub async fn call_analysis_webhook(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<serde_json::Value>,
) -> Result<impl IntoResponse, Error> {
    debug!("Received call analysis webhook");

    let config = &app_state.config;

    // Validate webhook secret if configured
    if let Some(expected_secret) = config.webhook_secret() {
        let provided_secret = headers
            .get("x-webhook-secret")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if provided_secret != expected_secret {
            warn!("Invalid webhook secret received");
            return Ok((
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::new(
                    StatusCode::UNAUTHORIZED.into(),
                    WebhookResponse {
                        status: "unauthorized".to_string(),
                        call_id: None,
                    },
                )),
            ));
        }
    }

    let store = CallStoreClient::new(
        &config.call_store_api_key().unwrap_or_default(),
        config.call_store_base_url(),
    )?;

    let record = ingestion::ingest(&store, &payload, &RoleLexicon::default()).await?;
    info!("Stored analysis for call {}", record.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            StatusCode::CREATED.into(),
            WebhookResponse {
                status: "processed".to_string(),
                call_id: Some(record.id),
            },
        )),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use clap::Parser;
    use mockito::Server;
    use serde_json::json;
    use service::config::Config;
    use tower::ServiceExt;

    fn app_state(store_url: &str, webhook_secret: Option<&str>) -> AppState {
        let mut args = vec![
            "talkintel_rs".to_string(),
            "--call-store-base-url".to_string(),
            store_url.to_string(),
            "--call-store-api-key".to_string(),
            "store_key".to_string(),
        ];
        if let Some(secret) = webhook_secret {
            args.push("--webhook-secret".to_string());
            args.push(secret.to_string());
        }
        AppState::new(Config::parse_from(args))
    }

    fn webhook_request(secret: Option<&str>) -> Request<Body> {
        let payload = json!({
            "id": "call_webhook_test",
            "timestamp": "2026-05-01T10:00:00Z",
            "segments": [
                {"speaker_id": "Agente Lia", "start_time": 0.0, "end_time": 4.0, "text": "Aqui é a Lia do suporte."},
                {"speaker_id": "Cliente", "start_time": 4.5, "end_time": 8.0, "text": "Olá, preciso de ajuda."}
            ],
            "sentiment_analysis": [{"label": "satisfação", "score": 0.9}]
        });

        let mut builder = Request::builder()
            .method("POST")
            .uri("/webhooks/calls")
            .header("content-type", "application/json");
        if let Some(secret) = secret {
            builder = builder.header("x-webhook-secret", secret);
        }
        builder.body(Body::from(payload.to_string())).unwrap()
    }

    #[tokio::test]
    async fn webhook_stores_record_and_returns_call_id() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/records")
            .with_status(201)
            .create_async()
            .await;

        let app = crate::router::define_routes(app_state(&server.url(), None));
        let response = app.oneshot(webhook_request(None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["data"]["status"], "processed");
        assert_eq!(value["data"]["call_id"], "call_webhook_test");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn webhook_rejects_wrong_secret() {
        let server = Server::new_async().await;
        let app = crate::router::define_routes(app_state(&server.url(), Some("s3cret")));

        let response = app.oneshot(webhook_request(Some("wrong"))).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn webhook_accepts_matching_secret() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/records")
            .with_status(201)
            .create_async()
            .await;

        let app = crate::router::define_routes(app_state(&server.url(), Some("s3cret")));
        let response = app.oneshot(webhook_request(Some("s3cret"))).await.unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
