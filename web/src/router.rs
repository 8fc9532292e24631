use crate::controller::{health_check_controller, metrics_controller, webhook_controller};
use crate::{middleware::auth::require_api_key, AppState};
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "TalkIntel Analytics API"
        ),
        paths(
            health_check_controller::health_check,
            metrics_controller::index,
            webhook_controller::call_analysis_webhook,
        ),
        components(
            schemas(
                domain::metrics::DashboardMetrics,
                domain::metrics::AgentMetrics,
                domain::metrics::CompanyMetrics,
                domain::metrics::SentimentDistribution,
                domain::metrics::TopicFrequency,
                domain::metrics::TrendDirection,
                domain::record::CallAnalysisRecord,
                domain::record::AgentKind,
                domain::record::SentimentLabel,
                webhook_controller::WebhookResponse,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "talkintel_rs", description = "Call transcription analytics API")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Defines the API-key header requirement for gaining access to the metrics
// endpoints for OpenAPI.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "x-api-key",
                    "API key granting read access to dashboard metrics",
                ))),
            )
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(metrics_routes(app_state.clone()))
        .merge(webhook_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

/// Routes for dashboard metrics queries, guarded by the configured API key
fn metrics_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(metrics_controller::index))
        .route_layer(from_fn_with_state(app_state.clone(), require_api_key))
        .with_state(app_state)
}

/// Routes for external service webhooks (no API key - validated by webhook secret)
fn webhook_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/webhooks/calls",
            post(webhook_controller::call_analysis_webhook),
        )
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use axum::{
        body::Body,
        http::{self, Request, StatusCode},
    };
    use clap::Parser;
    use service::config::Config;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let config = Config::parse_from(["talkintel_rs"]);
        define_routes(AppState::new(config))
    }

    #[tokio::test]
    async fn health_route_is_reachable() -> Result<()> {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method(http::Method::GET)
                    .uri("/health")
                    .body(Body::empty())?,
            )
            .await?;

        assert_eq!(response.status(), StatusCode::OK);

        Ok(())
    }

    #[tokio::test]
    async fn unknown_route_returns_not_found() -> Result<()> {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method(http::Method::GET)
                    .uri("/no/such/route")
                    .body(Body::empty())?,
            )
            .await?;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        Ok(())
    }
}
