//! The immutable per-call analysis record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Whether the agent on a call was a person or an automated agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Human,
    Ai,
}

/// Call-level emotional tone classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

/// Normalized analysis of one call, immutable once built.
///
/// This is the unit the aggregation engine consumes. The builder guarantees
/// one well-formed record per input payload, even for malformed inputs, so
/// downstream aggregation never needs null-handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CallAnalysisRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub duration_seconds: i64,
    pub agent_id: String,
    pub agent_name: String,
    pub agent_kind: AgentKind,
    /// Mean normalized sentiment, in [0, 1].
    pub satisfaction_score: f64,
    pub sentiment_label: SentimentLabel,
    pub resolved: bool,
    /// Mean agent response gap, in seconds.
    pub response_time_seconds: f64,
    /// Call quality on a 0–5 scale.
    pub quality_score: f64,
    /// At most 10 entries.
    pub topics: Vec<String>,
    /// At most 5 slug-form entries.
    pub tags: Vec<String>,
    pub summary: String,
    /// At most 3 human-readable highlights.
    pub key_insights: Vec<String>,
    pub cost: f64,
    pub currency: String,
}
