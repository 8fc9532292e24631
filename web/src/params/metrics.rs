use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub(crate) struct IndexParams {
    /// First day of the query window (inclusive), `YYYY-MM-DD`
    pub(crate) from_date: NaiveDate,
    /// Last day of the query window (inclusive), `YYYY-MM-DD`
    pub(crate) to_date: NaiveDate,
    /// Restrict metrics to one agent id
    pub(crate) agent_id: Option<String>,
    /// Restrict metrics to one campaign
    pub(crate) campaign: Option<String>,
}
