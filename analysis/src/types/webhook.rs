//! Canonical webhook record types.
//!
//! These are the fully-defaulted, typed shapes produced by the normalizer.
//! Downstream components (role inference, scoring, extraction) assume these
//! are completely populated and never re-check for missing fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One timed speech fragment attributed to a single speaker.
///
/// Segments are ordered by `start_time` within a call and always satisfy
/// `end_time >= start_time` after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub speaker_id: String,
    /// Offset from call start, in seconds.
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
}

/// External-model output scoring the emotional valence of a fragment.
///
/// `score` is on a producer-defined scale (commonly 0–1, sometimes 0–10 or
/// 0–100); consumers must normalize it with `scoring::normalize_score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentAnnotation {
    pub label: String,
    pub score: f64,
    #[serde(default)]
    pub time_range: String,
    #[serde(default)]
    pub excerpt: String,
}

/// External-model output labeling a fragment's subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicAnnotation {
    pub label: String,
    /// Confidence in [0, 1].
    pub confidence: f64,
    #[serde(default)]
    pub time_range: String,
    #[serde(default)]
    pub excerpt: String,
}

/// Resolution outcome as delivered by the upstream pipeline.
///
/// The custom "resolution" insight is usually a boolean, but some producer
/// configurations return free text ("sim, resolvido") instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Resolution {
    Flag(bool),
    Text(String),
}

impl Default for Resolution {
    fn default() -> Self {
        Resolution::Flag(false)
    }
}

/// Canonical webhook payload: one transcribed call with its annotations.
///
/// Produced exclusively by `normalizer::normalize`; every field is populated
/// (optional declared names excepted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub segments: Vec<Segment>,
    pub full_text: String,
    pub summary: String,
    pub sentiment_annotations: Vec<SentimentAnnotation>,
    pub topic_annotations: Vec<TopicAnnotation>,
    pub resolution: Resolution,
    /// Agent name declared by the upstream custom insight, if spoken.
    pub agent_name: Option<String>,
    /// Customer name declared by the upstream custom insight, if spoken.
    pub customer_name: Option<String>,
    pub cost: f64,
    pub currency: String,
}
