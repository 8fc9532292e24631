//! Aggregation engine: rolls call analysis records up into per-agent and
//! company metrics.
//!
//! Aggregation is a full in-memory recomputation over the record set the
//! caller supplies for a query window. There is no incremental update model
//! and no partial-failure path: an empty or missing slice contributes
//! explicit zeros, never an error.

use std::collections::BTreeMap;

use crate::builder::record_resolution_pct;
use crate::scoring::{round1, round2};
use crate::types::metrics::{
    AgentMetrics, CompanyMetrics, DashboardMetrics, SentimentDistribution, TopicFrequency,
    TrendDirection,
};
use crate::types::record::{CallAnalysisRecord, SentimentLabel};
use crate::weights::{composite_score, SubKpis, WeightProfile, STANDARD_PROFILE};

/// Cap on per-agent top topic/tag lists.
const TOP_ITEMS: usize = 5;
/// Cap on the company topic frequency table.
const COMPANY_TOPICS: usize = 10;
/// Cap on company top/bottom performer lists.
const PERFORMERS: usize = 3;
/// KPI delta, on the metric's native scale, below which a trend is stable.
const TREND_THRESHOLD: f64 = 0.1;
/// Response gaps are capped here by the scorer; used to normalize the
/// conversation-flow sub-KPI.
const RESPONSE_TIME_CEILING: f64 = 30.0;
/// A negative-sentiment call counts as recovered when its satisfaction,
/// rescaled to 0–10, reaches this value.
const RECOVERY_FLOOR: f64 = 6.0;

/// Aggregate one window of records into agent and company metrics.
///
/// Trends are reported as stable; use [`aggregate_windows`] when the
/// immediately preceding window is available for comparison.
pub fn aggregate(
    records: &[CallAnalysisRecord],
    profile: Option<&WeightProfile>,
) -> DashboardMetrics {
    let agents = agent_metrics(records, profile.unwrap_or(&STANDARD_PROFILE));
    let company = company_metrics(records, &agents);
    DashboardMetrics { agents, company }
}

/// Aggregate the current window and fill per-agent satisfaction trends from
/// the immediately preceding window of equal length.
pub fn aggregate_windows(
    current: &[CallAnalysisRecord],
    previous: &[CallAnalysisRecord],
    profile: Option<&WeightProfile>,
) -> DashboardMetrics {
    let mut metrics = aggregate(current, profile);
    let previous_by_agent = group_by_agent(previous);

    for agent in &mut metrics.agents {
        let Some(previous_slice) = previous_by_agent.get(agent.agent_id.as_str()) else {
            continue; // no prior data: stays stable at 0
        };
        let previous_satisfaction =
            mean(previous_slice.iter().map(|r| r.satisfaction_score));
        let (direction, value_pct) = trend(agent.satisfaction_score, previous_satisfaction);
        agent.trend = direction;
        agent.trend_value_pct = value_pct;
    }
    metrics
}

/// Per-agent rollups, grouped by `agent_id` in deterministic (sorted) order.
pub fn agent_metrics(
    records: &[CallAnalysisRecord],
    profile: &WeightProfile,
) -> Vec<AgentMetrics> {
    group_by_agent(records)
        .into_iter()
        .map(|(_, slice)| metrics_for_agent(&slice, profile))
        .collect()
}

fn group_by_agent(records: &[CallAnalysisRecord]) -> BTreeMap<&str, Vec<&CallAnalysisRecord>> {
    let mut groups: BTreeMap<&str, Vec<&CallAnalysisRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.agent_id.as_str()).or_default().push(record);
    }
    groups
}

fn metrics_for_agent(slice: &[&CallAnalysisRecord], profile: &WeightProfile) -> AgentMetrics {
    let total = slice.len() as u64;
    let resolved = slice.iter().filter(|r| r.resolved).count() as f64;
    let sub_kpis = derive_sub_kpis(slice);
    // All records in a group share the agent identity by construction.
    let first = slice[0];

    AgentMetrics {
        agent_id: first.agent_id.clone(),
        name: first.agent_name.clone(),
        kind: first.agent_kind,
        total_calls: total,
        average_duration: round1(mean(slice.iter().map(|r| r.duration_seconds as f64))),
        satisfaction_score: round2(mean(slice.iter().map(|r| r.satisfaction_score))),
        resolution_rate_pct: round1(100.0 * resolved / total as f64),
        average_response_time: round1(mean(slice.iter().map(|r| r.response_time_seconds))),
        call_quality: round2(mean(slice.iter().map(|r| r.quality_score))),
        sentiment_distribution_pct: sentiment_distribution(slice.iter().copied()),
        top_topics: frequency_ranked(slice.iter().flat_map(|r| r.topics.iter()), TOP_ITEMS),
        top_tags: frequency_ranked(slice.iter().flat_map(|r| r.tags.iter()), TOP_ITEMS),
        trend: TrendDirection::Stable,
        trend_value_pct: 0.0,
        composite_score: composite_score(&sub_kpis, profile),
    }
}

/// Company-level rollup across the whole record set.
pub fn company_metrics(
    records: &[CallAnalysisRecord],
    agents: &[AgentMetrics],
) -> CompanyMetrics {
    if records.is_empty() {
        return CompanyMetrics::empty();
    }

    let resolved = records.iter().filter(|r| r.resolved).count() as f64;
    let ranked = rank_descending(agents);

    CompanyMetrics {
        total_calls: records.len() as u64,
        total_agents: agents.len() as u64,
        average_satisfaction: round2(mean(records.iter().map(|r| r.satisfaction_score))),
        average_duration: round1(mean(records.iter().map(|r| r.duration_seconds as f64))),
        resolution_rate_pct: round1(100.0 * resolved / records.len() as f64),
        sentiment_distribution_pct: sentiment_distribution(records.iter()),
        recovery_rate_pct: recovery_rate(records),
        top_topics: topic_frequencies(records),
        top_performers: ranked
            .iter()
            .take(PERFORMERS)
            .map(|a| a.agent_id.clone())
            .collect(),
        bottom_performers: rank_ascending(agents)
            .iter()
            .take(PERFORMERS)
            .map(|a| a.agent_id.clone())
            .collect(),
    }
}

/// Share of initially-negative calls that still ended with an acceptable
/// satisfaction score (0–10 rescale at or above 6).
pub fn recovery_rate(records: &[CallAnalysisRecord]) -> f64 {
    let negatives: Vec<&CallAnalysisRecord> = records
        .iter()
        .filter(|r| r.sentiment_label == SentimentLabel::Negative)
        .collect();
    if negatives.is_empty() {
        return 0.0;
    }
    let recovered = negatives
        .iter()
        .filter(|r| r.satisfaction_score * 10.0 >= RECOVERY_FLOOR)
        .count() as f64;
    round1(100.0 * recovered / negatives.len() as f64)
}

/// Compare a KPI average between two adjacent windows on its native scale.
///
/// The returned percentage is the signed delta relative to the previous
/// window; a KPI rising from zero reports +100%.
pub fn trend(current: f64, previous: f64) -> (TrendDirection, f64) {
    let delta = current - previous;
    let direction = if delta > TREND_THRESHOLD {
        TrendDirection::Up
    } else if delta < -TREND_THRESHOLD {
        TrendDirection::Down
    } else {
        TrendDirection::Stable
    };
    let value_pct = if previous == 0.0 {
        if current == 0.0 {
            0.0
        } else {
            100.0
        }
    } else {
        round1(100.0 * delta / previous)
    };
    (direction, value_pct)
}

/// Derive the eight ranking sub-KPIs from an agent's record slice.
///
/// The upstream pipeline emits only call records, so the ranking inputs are
/// derived proxies; the mapping is fixed here so every profile scores the
/// same evidence.
fn derive_sub_kpis(slice: &[&CallAnalysisRecord]) -> SubKpis {
    if slice.is_empty() {
        return SubKpis::default();
    }
    let unit = |v: f64| v.clamp(0.0, 1.0);
    let positive_share = slice
        .iter()
        .filter(|r| r.sentiment_label == SentimentLabel::Positive)
        .count() as f64
        / slice.len() as f64;
    let resolved_share =
        slice.iter().filter(|r| r.resolved).count() as f64 / slice.len() as f64;

    SubKpis {
        customer_sentiment: unit(mean(slice.iter().map(|r| r.satisfaction_score))),
        agent_empathy: unit(positive_share),
        first_contact_resolution: unit(
            mean(slice.iter().map(|r| record_resolution_pct(r))) / 100.0,
        ),
        conversation_flow: unit(
            1.0 - mean(slice.iter().map(|r| r.response_time_seconds)) / RESPONSE_TIME_CEILING,
        ),
        script_adherence: unit(mean(slice.iter().map(|r| r.quality_score)) / 5.0),
        personalization: unit(mean(slice.iter().map(|r| r.key_insights.len() as f64 / 3.0))),
        agent_knowledge: unit(mean(slice.iter().map(|r| r.topics.len() as f64 / 10.0))),
        call_wrap_up: unit(resolved_share),
    }
}

/// Agents ranked descending by composite score; ties broken by total call
/// count descending, then by agent id for determinism.
pub fn rank_descending(agents: &[AgentMetrics]) -> Vec<&AgentMetrics> {
    let mut ranked: Vec<&AgentMetrics> = agents.iter().collect();
    ranked.sort_by(|a, b| {
        b.composite_score
            .cmp(&a.composite_score)
            .then(b.total_calls.cmp(&a.total_calls))
            .then(a.agent_id.cmp(&b.agent_id))
    });
    ranked
}

/// Agents ranked ascending by composite score, with the same tie-breaks as
/// `rank_descending` (call count descending, then agent id). Reversing the
/// descending ranking would invert the tie-breaks.
pub fn rank_ascending(agents: &[AgentMetrics]) -> Vec<&AgentMetrics> {
    let mut ranked: Vec<&AgentMetrics> = agents.iter().collect();
    ranked.sort_by(|a, b| {
        a.composite_score
            .cmp(&b.composite_score)
            .then(b.total_calls.cmp(&a.total_calls))
            .then(a.agent_id.cmp(&b.agent_id))
    });
    ranked
}

fn sentiment_distribution<'a, I>(records: I) -> SentimentDistribution
where
    I: Iterator<Item = &'a CallAnalysisRecord>,
{
    let mut positive = 0u64;
    let mut neutral = 0u64;
    let mut negative = 0u64;
    for record in records {
        match record.sentiment_label {
            SentimentLabel::Positive => positive += 1,
            SentimentLabel::Neutral => neutral += 1,
            SentimentLabel::Negative => negative += 1,
        }
    }
    let total = (positive + neutral + negative) as f64;
    if total == 0.0 {
        return SentimentDistribution::default();
    }
    SentimentDistribution {
        positive: round1(100.0 * positive as f64 / total),
        neutral: round1(100.0 * neutral as f64 / total),
        negative: round1(100.0 * negative as f64 / total),
    }
}

fn topic_frequencies(records: &[CallAnalysisRecord]) -> Vec<TopicFrequency> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for topic in records.iter().flat_map(|r| r.topics.iter()) {
        *counts.entry(topic.as_str()).or_default() += 1;
    }
    let mut table: Vec<TopicFrequency> = counts
        .into_iter()
        .map(|(topic, count)| TopicFrequency {
            topic: topic.to_string(),
            count,
        })
        .collect();
    table.sort_by(|a, b| b.count.cmp(&a.count).then(a.topic.cmp(&b.topic)));
    table.truncate(COMPANY_TOPICS);
    table
}

/// Values ranked by frequency (descending), ties alphabetical, capped.
fn frequency_ranked<'a, I>(values: I, cap: usize) -> Vec<String>
where
    I: Iterator<Item = &'a String>,
{
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for value in values {
        *counts.entry(value.as_str()).or_default() += 1;
    }
    let mut ranked: Vec<(&str, u64)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    ranked.into_iter().take(cap).map(|(v, _)| v.to_string()).collect()
}

fn mean<I>(values: I) -> f64
where
    I: Iterator<Item = f64>,
{
    let mut sum = 0.0;
    let mut count = 0usize;
    for value in values {
        sum += value;
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::record::AgentKind;
    use chrono::{TimeZone, Utc};

    fn record(agent: &str, satisfaction: f64, resolved: bool) -> CallAnalysisRecord {
        let label = crate::scoring::sentiment_label(satisfaction);
        CallAnalysisRecord {
            id: format!("call_{agent}_{satisfaction}"),
            timestamp: Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap(),
            duration_seconds: 120,
            agent_id: format!("agent_{agent}"),
            agent_name: agent.to_string(),
            agent_kind: AgentKind::Human,
            satisfaction_score: satisfaction,
            sentiment_label: label,
            resolved,
            response_time_seconds: 4.0,
            quality_score: 4.0,
            topics: vec!["billing".to_string()],
            tags: vec!["billing".to_string()],
            summary: String::new(),
            key_insights: vec!["insight".to_string()],
            cost: 0.1,
            currency: "BRL".to_string(),
        }
    }

    #[test]
    fn empty_record_set_yields_zero_metrics() {
        let metrics = aggregate(&[], None);
        assert!(metrics.agents.is_empty());
        assert_eq!(metrics.company.total_calls, 0);
        assert_eq!(metrics.company.resolution_rate_pct, 0.0);
        assert_eq!(metrics.company.average_satisfaction, 0.0);
        assert_eq!(metrics.company.recovery_rate_pct, 0.0);
    }

    #[test]
    fn resolution_rate_counts_resolved_share() {
        let records = vec![record("maria", 0.8, true), record("maria", 0.7, false)];
        let metrics = aggregate(&records, None);
        assert_eq!(metrics.agents.len(), 1);
        assert_eq!(metrics.agents[0].resolution_rate_pct, 50.0);
        assert_eq!(metrics.agents[0].total_calls, 2);
        assert_eq!(metrics.agents[0].satisfaction_score, 0.75);
    }

    #[test]
    fn sentiment_distribution_sums_to_one_hundred() {
        let records = vec![
            record("a", 0.9, true),  // positive
            record("a", 0.5, true),  // neutral
            record("a", 0.5, true),  // neutral
            record("b", 0.2, false), // negative
            record("b", 0.9, true),  // positive
            record("b", 0.9, true),  // positive
            record("c", 0.3, false), // negative
        ];
        let dist = aggregate(&records, None).company.sentiment_distribution_pct;
        let sum = dist.positive + dist.neutral + dist.negative;
        assert!((sum - 100.0).abs() <= 1.0, "distribution sums to {sum}");
    }

    #[test]
    fn recovery_rate_measures_acceptable_negative_calls() {
        let mut high_negative = record("a", 0.65, false);
        // Label is negative even though the overall score ended acceptable.
        high_negative.sentiment_label = SentimentLabel::Negative;
        let records = vec![high_negative, record("a", 0.2, false), record("a", 0.9, true)];

        // Two negative-label calls, one of which scored >= 6 on a 0-10 scale.
        assert_eq!(recovery_rate(&records), 50.0);
    }

    #[test]
    fn recovery_rate_without_negatives_is_zero() {
        assert_eq!(recovery_rate(&[record("a", 0.9, true)]), 0.0);
    }

    #[test]
    fn trend_labels_follow_native_scale_threshold() {
        assert_eq!(trend(0.9, 0.7), (TrendDirection::Up, round1(100.0 * 0.2 / 0.7)));
        assert_eq!(trend(0.5, 0.7).0, TrendDirection::Down);
        assert_eq!(trend(0.75, 0.7).0, TrendDirection::Stable);
        assert_eq!(trend(0.0, 0.0), (TrendDirection::Stable, 0.0));
        assert_eq!(trend(0.5, 0.0), (TrendDirection::Up, 100.0));
    }

    #[test]
    fn windows_fill_per_agent_trend() {
        let current = vec![record("maria", 0.9, true)];
        let previous = vec![record("maria", 0.5, true), record("jose", 0.8, true)];

        let metrics = aggregate_windows(&current, &previous, None);
        assert_eq!(metrics.agents[0].trend, TrendDirection::Up);
        assert_eq!(metrics.agents[0].trend_value_pct, 80.0);
    }

    #[test]
    fn agents_without_prior_window_stay_stable() {
        let metrics = aggregate_windows(&[record("nova", 0.9, true)], &[], None);
        assert_eq!(metrics.agents[0].trend, TrendDirection::Stable);
        assert_eq!(metrics.agents[0].trend_value_pct, 0.0);
    }

    #[test]
    fn ranking_breaks_ties_by_call_count_then_id() {
        let records = vec![
            record("ana", 0.8, true),
            record("bia", 0.8, true),
            record("bia", 0.8, true),
        ];
        let metrics = aggregate(&records, None);
        let ranked = rank_descending(&metrics.agents);
        assert_eq!(ranked[0].agent_id, "agent_bia"); // more calls
        assert_eq!(ranked[1].agent_id, "agent_ana");

        // With composites tied the same tie-breaks apply to both lists.
        let company = metrics.company;
        assert_eq!(company.top_performers[0], "agent_bia");
        assert_eq!(company.bottom_performers[0], "agent_bia");
    }

    #[test]
    fn bottom_performers_keep_tie_break_order() {
        let records = vec![
            record("cid", 0.8, true),
            record("cid", 0.8, true),
            record("cid", 0.8, true),
            record("ana", 0.8, true),
            record("ana", 0.8, true),
            record("bia", 0.8, true),
        ];
        let company = aggregate(&records, None).company;

        // Identical per-record stats give every agent the same composite
        // score, so ordering falls entirely to the tie-breaks: call count
        // descending, then agent id. Both lists must agree on those.
        assert_eq!(
            company.top_performers,
            vec!["agent_cid", "agent_ana", "agent_bia"]
        );
        assert_eq!(
            company.bottom_performers,
            vec!["agent_cid", "agent_ana", "agent_bia"]
        );
    }

    #[test]
    fn company_topic_table_counts_frequencies() {
        let mut with_refund = record("a", 0.8, true);
        with_refund.topics = vec!["refund".to_string(), "billing".to_string()];
        let records = vec![with_refund, record("b", 0.7, true)];

        let topics = aggregate(&records, None).company.top_topics;
        assert_eq!(topics[0].topic, "billing");
        assert_eq!(topics[0].count, 2);
        assert_eq!(topics[1].topic, "refund");
        assert_eq!(topics[1].count, 1);
    }

    #[test]
    fn aggregation_is_deterministic() {
        let records = vec![
            record("maria", 0.9, true),
            record("jose", 0.4, false),
            record("maria", 0.6, true),
        ];
        let first = aggregate(&records, None);
        assert_eq!(first, aggregate(&records, None));
        // Grouping is sorted by agent id regardless of input order.
        assert_eq!(first.agents[0].agent_id, "agent_jose");
        assert_eq!(first.agents[1].agent_id, "agent_maria");
    }
}
