//! Dashboard insight queries over stored call records.

use crate::error::Error;
use crate::gateway::call_store::{CallStoreClient, RecordQuery};
use analysis::aggregation;
use analysis::types::metrics::DashboardMetrics;
use chrono::{Days, NaiveDate};
use log::*;

/// A dashboard metrics query for one date window.
#[derive(Debug, Clone)]
pub struct MetricsQuery {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub agent_id: Option<String>,
    pub campaign: Option<String>,
}

/// Aggregate metrics for the requested window, with trends computed against
/// the immediately preceding window of equal length.
pub async fn dashboard_metrics(
    store: &CallStoreClient,
    query: &MetricsQuery,
) -> Result<DashboardMetrics, Error> {
    let current = store.fetch_records(&record_query(query, query.from_date, query.to_date))
        .await?;

    let previous = match preceding_window(query.from_date, query.to_date) {
        Some((prev_from, prev_to)) => {
            store
                .fetch_records(&record_query(query, prev_from, prev_to))
                .await?
        }
        None => Vec::new(),
    };

    debug!(
        "Aggregating {} current and {} prior record(s) for {}..{}",
        current.len(),
        previous.len(),
        query.from_date,
        query.to_date
    );

    Ok(aggregation::aggregate_windows(&current, &previous, None))
}

fn record_query(query: &MetricsQuery, from_date: NaiveDate, to_date: NaiveDate) -> RecordQuery {
    RecordQuery {
        from_date,
        to_date,
        agent_id: query.agent_id.clone(),
        campaign: query.campaign.clone(),
    }
}

/// The window of equal length ending the day before `from`. Returns `None`
/// for inverted input windows rather than producing a nonsense range.
fn preceding_window(from: NaiveDate, to: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    if to < from {
        return None;
    }
    let length_days = (to - from).num_days() as u64;
    let prev_to = from.checked_sub_days(Days::new(1))?;
    let prev_from = prev_to.checked_sub_days(Days::new(length_days))?;
    Some((prev_from, prev_to))
}
