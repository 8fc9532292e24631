//! Aggregated dashboard metrics.
//!
//! Metrics are pure functions of a record set and a time window, recomputed
//! on demand. They carry no identity beyond the `agent_id` grouping key and
//! are never incrementally mutated.
//!
//! Rounding contract for external transmission: percentage fields carry one
//! decimal, 0–1 scores carry two.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::record::AgentKind;

/// Signed comparison of a KPI average between two adjacent time windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

/// Percentage share of each sentiment label across a record set.
///
/// Sums to 100 (within rounding) for any non-empty record set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SentimentDistribution {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

/// How often a topic appeared across a record set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TopicFrequency {
    pub topic: String,
    pub count: u64,
}

/// Per-agent performance rollup over a queried time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AgentMetrics {
    pub agent_id: String,
    pub name: String,
    pub kind: AgentKind,
    pub total_calls: u64,
    /// Mean call duration, in seconds.
    pub average_duration: f64,
    /// Mean satisfaction, in [0, 1].
    pub satisfaction_score: f64,
    pub resolution_rate_pct: f64,
    pub average_response_time: f64,
    /// Mean call quality, 0–5.
    pub call_quality: f64,
    pub sentiment_distribution_pct: SentimentDistribution,
    pub top_topics: Vec<String>,
    pub top_tags: Vec<String>,
    pub trend: TrendDirection,
    /// Signed percentage delta of satisfaction vs. the preceding window.
    pub trend_value_pct: f64,
    /// Weighted composite ranking score, 0–100.
    pub composite_score: u32,
}

/// Company-level rollup across all agents in a queried window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CompanyMetrics {
    pub total_calls: u64,
    pub total_agents: u64,
    pub average_satisfaction: f64,
    pub average_duration: f64,
    pub resolution_rate_pct: f64,
    pub sentiment_distribution_pct: SentimentDistribution,
    /// Share of negative-sentiment calls that still scored acceptably
    /// (satisfaction rescaled to 0–10 at or above 6).
    pub recovery_rate_pct: f64,
    pub top_topics: Vec<TopicFrequency>,
    /// Agent ids ranked descending by composite score.
    pub top_performers: Vec<String>,
    /// Agent ids ranked ascending by composite score.
    pub bottom_performers: Vec<String>,
}

impl CompanyMetrics {
    /// The explicit all-zero metrics object returned for an empty record
    /// set, so an empty aggregation query is never an error.
    pub fn empty() -> Self {
        Self {
            total_calls: 0,
            total_agents: 0,
            average_satisfaction: 0.0,
            average_duration: 0.0,
            resolution_rate_pct: 0.0,
            sentiment_distribution_pct: SentimentDistribution::default(),
            recovery_rate_pct: 0.0,
            top_topics: Vec::new(),
            top_performers: Vec::new(),
            bottom_performers: Vec::new(),
        }
    }
}

/// Combined response for a dashboard metrics query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DashboardMetrics {
    pub agents: Vec<AgentMetrics>,
    pub company: CompanyMetrics,
}
