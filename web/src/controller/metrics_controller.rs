//! Controller for dashboard metrics queries.

use crate::controller::ApiResponse;
use crate::params::metrics::IndexParams;
use crate::{AppState, Error};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use domain::gateway::call_store::CallStoreClient;
use domain::insights::{self, MetricsQuery};
use log::*;

/// GET aggregated agent and company metrics for a date window.
///
/// Trends compare the requested window against the immediately preceding
/// window of equal length.
#[utoipa::path(
    get,
    path = "/metrics",
    params(IndexParams),
    responses(
        (status = 200, description = "Aggregated metrics for the requested window", body = domain::metrics::DashboardMetrics),
        (status = 401, description = "Missing or invalid API key"),
        (status = 502, description = "Record store unreachable")
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn index(
    State(app_state): State<AppState>,
    Query(params): Query<IndexParams>,
) -> Result<impl IntoResponse, Error> {
    debug!(
        "GET metrics from {} to {}",
        params.from_date, params.to_date
    );

    let config = &app_state.config;
    let store = CallStoreClient::new(
        &config.call_store_api_key().unwrap_or_default(),
        config.call_store_base_url(),
    )?;

    let query = MetricsQuery {
        from_date: params.from_date,
        to_date: params.to_date,
        agent_id: params.agent_id,
        campaign: params.campaign,
    };
    let metrics = insights::dashboard_metrics(&store, &query).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), metrics)))
}
