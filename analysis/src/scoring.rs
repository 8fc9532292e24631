//! Sentiment and quality scoring.
//!
//! Reduces per-fragment sentiment annotations into call-level scalar
//! metrics. Producers disagree on score scale (0–1, 0–10, 0–100), so every
//! externally-sourced score goes through `normalize_score` before use.

use crate::types::record::SentimentLabel;
use crate::types::webhook::{Segment, SentimentAnnotation};

/// Neutral midpoint returned when a call carries no usable sentiment.
pub const NEUTRAL_SATISFACTION: f64 = 0.5;

/// Default mean response gap, in seconds, when too few gaps qualify.
pub const DEFAULT_RESPONSE_TIME: f64 = 5.0;

/// Gaps at or above this many seconds are hold/silence, not response time.
const MAX_RESPONSE_GAP: f64 = 30.0;

/// Normalize a score of unknown scale to [0, 1].
///
/// Values at or below 1 are taken as already 0–1; at or below 10 as 0–10;
/// anything larger as 0–100. Scale-invariant by construction:
/// `normalize_score(0.8) == normalize_score(8.0) == normalize_score(80.0)`.
pub fn normalize_score(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let normalized = if value <= 1.0 {
        value
    } else if value <= 10.0 {
        value / 10.0
    } else {
        value / 100.0
    };
    normalized.clamp(0.0, 1.0)
}

/// Call-level satisfaction: mean normalized sentiment score, rounded to two
/// decimals; the neutral midpoint when no valid scores exist.
pub fn satisfaction_score(annotations: &[SentimentAnnotation]) -> f64 {
    let scores: Vec<f64> = annotations
        .iter()
        .filter(|a| a.score.is_finite())
        .map(|a| normalize_score(a.score))
        .collect();
    if scores.is_empty() {
        return NEUTRAL_SATISFACTION;
    }
    round2(scores.iter().sum::<f64>() / scores.len() as f64)
}

/// Label the normalized average: positive at or above 0.6, negative at or
/// below 0.4, neutral in between.
pub fn sentiment_label(normalized_average: f64) -> SentimentLabel {
    if normalized_average >= 0.6 {
        SentimentLabel::Positive
    } else if normalized_average <= 0.4 {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

/// Call quality on a 0–5 scale: mean of the satisfaction component
/// (satisfaction rescaled to 0–5) and a segment-density proxy.
pub fn quality_score(satisfaction: f64, segment_count: usize) -> f64 {
    let sentiment_component = satisfaction.clamp(0.0, 1.0) * 5.0;
    let segment_density_component = if segment_count > 5 { 4.5 } else { 3.5 };
    round2((sentiment_component + segment_density_component) / 2.0)
}

/// Mean of consecutive segment gaps that look like actual response latency.
///
/// Gaps outside (0, 30) seconds are overlap or hold/silence and do not
/// qualify; with fewer than two qualifying gaps the default applies.
pub fn response_time_seconds(segments: &[Segment]) -> f64 {
    let gaps: Vec<f64> = segments
        .windows(2)
        .map(|pair| pair[1].start_time - pair[0].end_time)
        .filter(|gap| *gap > 0.0 && *gap < MAX_RESPONSE_GAP)
        .collect();
    if gaps.len() < 2 {
        return DEFAULT_RESPONSE_TIME;
    }
    round2(gaps.iter().sum::<f64>() / gaps.len() as f64)
}

/// Call duration: end time of the last segment, rounded to whole seconds.
/// Assumes segments are already in canonical start-time order.
pub fn duration_seconds(segments: &[Segment]) -> i64 {
    segments
        .last()
        .map(|s| s.end_time.round() as i64)
        .unwrap_or(0)
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
