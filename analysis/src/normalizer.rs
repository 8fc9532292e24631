//! Format normalizer for incoming webhook payloads.
//!
//! Upstream producers are inconsistent: some deliver the transcription
//! result flat, others nest it under an envelope key; field names drifted
//! between producer versions (`sentiment_analysis` vs
//! `sentiment_annotations`, segment `speaker` vs `speaker_id`). This module
//! is the single place where that mess is resolved. Everything downstream
//! assumes a fully-populated, typed `WebhookPayload`.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::Error;
use crate::types::webhook::{
    Resolution, Segment, SentimentAnnotation, TopicAnnotation, WebhookPayload,
};

/// Envelope keys a producer may nest the real payload under.
const WRAPPER_KEYS: &[&str] = &["data", "payload", "result", "transcription"];

/// Keys that identify an object as carrying transcript content.
const CONTENT_KEYS: &[&str] = &["segments", "sentiment_analysis", "topic_detection", "summarization"];

/// Billing currency assumed when the usage block omits one.
pub const DEFAULT_CURRENCY: &str = "BRL";

/// Adapt an arbitrary JSON structure into a canonical `WebhookPayload`.
///
/// Missing optional fields are always defaulted and never an error; the only
/// failure is input that is not a JSON object at all (even after unwrapping
/// a producer envelope).
pub fn normalize(raw: &Value) -> Result<WebhookPayload, Error> {
    let obj = unwrap_envelope(raw).ok_or_else(|| Error::MalformedPayload(describe(raw)))?;

    let timestamp = obj
        .get("timestamp")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);

    let id = str_field(obj, &["id"]).unwrap_or_else(|| generated_id(&timestamp));

    let mut segments = parse_segments(obj.get("segments"));
    // Canonical order; downstream gap and duration math relies on it.
    segments.sort_by(|a, b| {
        a.start_time
            .partial_cmp(&b.start_time)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let full_text = str_field(obj, &["full_text", "transcript"]).unwrap_or_else(|| {
        segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    });

    Ok(WebhookPayload {
        id,
        timestamp,
        full_text,
        summary: str_field(obj, &["summarization", "summary", "summary_text"]).unwrap_or_default(),
        sentiment_annotations: parse_sentiments(
            obj.get("sentiment_analysis")
                .or_else(|| obj.get("sentiment_annotations")),
        ),
        topic_annotations: parse_topics(
            obj.get("topic_detection")
                .or_else(|| obj.get("topic_annotations")),
        ),
        resolution: parse_resolution(obj.get("resolution")),
        agent_name: str_field(obj, &["agent_name", "agent", "declared_agent_name"]),
        customer_name: str_field(obj, &["customer_name", "client", "declared_customer_name"]),
        cost: obj
            .get("usage")
            .and_then(|u| u.get("cost"))
            .or_else(|| obj.get("cost"))
            .and_then(Value::as_f64)
            .unwrap_or(0.0),
        currency: obj
            .get("usage")
            .and_then(|u| u.get("currency"))
            .or_else(|| obj.get("currency"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        segments,
    })
}

/// Locate the object actually carrying the call data. A flat object is used
/// as-is; otherwise a single level of producer envelope is unwrapped.
fn unwrap_envelope(raw: &Value) -> Option<&Map<String, Value>> {
    let obj = raw.as_object()?;
    if CONTENT_KEYS.iter().any(|k| obj.contains_key(*k)) {
        return Some(obj);
    }
    for key in WRAPPER_KEYS {
        if let Some(inner) = obj.get(*key).and_then(Value::as_object) {
            if CONTENT_KEYS.iter().any(|k| inner.contains_key(*k)) {
                return Some(inner);
            }
        }
    }
    // An object with none of the known content keys still normalizes to an
    // empty call; only non-objects are malformed.
    Some(obj)
}

fn describe(raw: &Value) -> String {
    match raw {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::String(_) => "string".to_string(),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}

fn generated_id(timestamp: &DateTime<Utc>) -> String {
    format!("call_{}", timestamp.timestamp_millis())
}

/// First non-empty string under any of the candidate keys.
fn str_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn item_str(item: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|k| item.get(*k))
        .filter_map(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .next()
        .unwrap_or_default()
}

fn item_f64(item: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|k| item.get(*k))
        .filter_map(Value::as_f64)
        .find(|v| v.is_finite())
}

fn parse_segments(value: Option<&Value>) -> Vec<Segment> {
    objects_of(value)
        .map(|item| {
            let start_time = item_f64(item, &["start_time", "start"]).unwrap_or(0.0);
            let end_time = item_f64(item, &["end_time", "end"]).unwrap_or(start_time);
            Segment {
                speaker_id: item_str(item, &["speaker", "speaker_id"]),
                start_time,
                // Producers occasionally emit end < start on clipped audio.
                end_time: end_time.max(start_time),
                text: item_str(item, &["text"]),
            }
        })
        .collect()
}

fn parse_sentiments(value: Option<&Value>) -> Vec<SentimentAnnotation> {
    objects_of(value)
        .filter_map(|item| {
            // Entries without a finite numeric score carry no signal for the
            // scorer and are dropped here, once, instead of being re-checked
            // at every consumer.
            let score = item_f64(item, &["score"])?;
            Some(SentimentAnnotation {
                label: item_str(item, &["label"]),
                score,
                time_range: item_str(item, &["time_range", "timestamp"]),
                excerpt: item_str(item, &["excerpt", "fragment"]),
            })
        })
        .collect()
}

fn parse_topics(value: Option<&Value>) -> Vec<TopicAnnotation> {
    objects_of(value)
        .map(|item| TopicAnnotation {
            label: item_str(item, &["label"]),
            confidence: item_f64(item, &["confidence"]).unwrap_or(0.0).clamp(0.0, 1.0),
            time_range: item_str(item, &["time_range", "timestamp"]),
            excerpt: item_str(item, &["excerpt", "fragment"]),
        })
        .collect()
}

fn parse_resolution(value: Option<&Value>) -> Resolution {
    match value {
        Some(Value::Bool(b)) => Resolution::Flag(*b),
        Some(Value::String(s)) => Resolution::Text(s.clone()),
        _ => Resolution::Flag(false),
    }
}

fn objects_of(value: Option<&Value>) -> impl Iterator<Item = &Map<String, Value>> {
    value
        .and_then(Value::as_array)
        .map(|a| a.as_slice())
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_object)
}
