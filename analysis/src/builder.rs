//! Call analysis builder: composes normalization, role inference, scoring,
//! and extraction into one immutable `CallAnalysisRecord`.
//!
//! The builder is total: it returns exactly one well-formed record per raw
//! input. Malformed input degrades to an error record instead of
//! propagating, so batch ingestion and downstream aggregation never need
//! null-handling.

use chrono::Utc;
use serde_json::Value;

use crate::normalizer;
use crate::roles::{self, RoleLexicon, UNKNOWN_AGENT_NAME};
use crate::scoring;
use crate::topics;
use crate::types::record::{AgentKind, CallAnalysisRecord, SentimentLabel};
use crate::types::webhook::{Resolution, WebhookPayload};

/// Textual resolution values counting as an affirmed resolution.
const RESOLUTION_KEYWORDS: &[&str] = &["resolvido", "resolvida", "solucionado", "resolved", "sim", "yes", "true"];

/// Display-name tokens marking an automated agent.
const AI_AGENT_MARKERS: &[&str] = &["ai", "bot", "ia", "virtual"];

/// Resolution rate credited to a single record for composite ranking:
/// full credit for a confirmed resolution, partial credit for an
/// attempted-but-unconfirmed one.
pub const RESOLVED_RECORD_PCT: f64 = 95.0;
pub const UNRESOLVED_RECORD_PCT: f64 = 65.0;

/// Build one analysis record from a raw webhook value. Never fails.
pub fn build_record(raw: &Value, lexicon: &RoleLexicon) -> CallAnalysisRecord {
    match normalizer::normalize(raw) {
        Ok(payload) => assemble(&payload, lexicon),
        Err(e) => error_record(&e.to_string()),
    }
}

fn assemble(payload: &WebhookPayload, lexicon: &RoleLexicon) -> CallAnalysisRecord {
    let speaker_roles = roles::infer_roles(
        &payload.segments,
        payload.agent_name.as_deref(),
        payload.customer_name.as_deref(),
        lexicon,
    );
    // No agent among the speakers: fall back to a synthetic unknown agent
    // so the record still groups under a stable agent id.
    let agent_name = roles::primary_agent(&speaker_roles)
        .map(|r| r.name.clone())
        .unwrap_or_else(|| UNKNOWN_AGENT_NAME.to_string());

    let satisfaction_score = scoring::satisfaction_score(&payload.sentiment_annotations);

    CallAnalysisRecord {
        id: payload.id.clone(),
        timestamp: payload.timestamp,
        duration_seconds: scoring::duration_seconds(&payload.segments),
        agent_id: agent_id(&agent_name),
        agent_kind: agent_kind(&agent_name),
        agent_name,
        satisfaction_score,
        sentiment_label: scoring::sentiment_label(satisfaction_score),
        resolved: resolved(&payload.resolution),
        response_time_seconds: scoring::response_time_seconds(&payload.segments),
        quality_score: scoring::quality_score(satisfaction_score, payload.segments.len()),
        topics: topics::extract_topics(&payload.topic_annotations),
        tags: topics::extract_tags(&payload.topic_annotations, &payload.sentiment_annotations),
        summary: payload.summary.clone(),
        key_insights: topics::key_insights(
            &payload.sentiment_annotations,
            &payload.topic_annotations,
        ),
        cost: payload.cost,
        currency: payload.currency.clone(),
    }
}

/// The degraded-but-well-formed record emitted when composition fails.
fn error_record(message: &str) -> CallAnalysisRecord {
    let timestamp = Utc::now();
    CallAnalysisRecord {
        id: format!("call_{}", timestamp.timestamp_millis()),
        timestamp,
        duration_seconds: 0,
        agent_id: agent_id(UNKNOWN_AGENT_NAME),
        agent_name: UNKNOWN_AGENT_NAME.to_string(),
        agent_kind: AgentKind::Human,
        satisfaction_score: 0.0,
        sentiment_label: SentimentLabel::Neutral,
        resolved: false,
        response_time_seconds: 0.0,
        quality_score: 0.0,
        topics: Vec::new(),
        tags: vec!["error".to_string()],
        summary: format!("Analysis failed: {}", message),
        key_insights: Vec::new(),
        cost: 0.0,
        currency: normalizer::DEFAULT_CURRENCY.to_string(),
    }
}

fn resolved(resolution: &Resolution) -> bool {
    match resolution {
        Resolution::Flag(flag) => *flag,
        Resolution::Text(text) => text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .any(|token| RESOLUTION_KEYWORDS.contains(&token)),
    }
}

fn agent_kind(name: &str) -> AgentKind {
    let lowered = name.to_lowercase();
    let is_ai = lowered
        .split(|c: char| !c.is_alphanumeric())
        .any(|token| AI_AGENT_MARKERS.contains(&token));
    if is_ai {
        AgentKind::Ai
    } else {
        AgentKind::Human
    }
}

/// Deterministic grouping key derived from the agent display name.
fn agent_id(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_sep = true;
    for ch in name.trim().to_lowercase().chars() {
        if ch.is_alphanumeric() {
            slug.push(ch);
            last_was_sep = false;
        } else if !last_was_sep {
            slug.push('_');
            last_was_sep = true;
        }
    }
    format!("agent_{}", slug.trim_end_matches('_'))
}

/// Per-record resolution credit used by the composite
/// first-contact-resolution sub-KPI.
pub fn record_resolution_pct(record: &CallAnalysisRecord) -> f64 {
    if record.resolved {
        RESOLVED_RECORD_PCT
    } else {
        UNRESOLVED_RECORD_PCT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_payload() -> Value {
        json!({
            "id": "call_7",
            "timestamp": "2026-05-02T09:30:00Z",
            "segments": [
                {"speaker": "spk_0", "start_time": 0.0, "end_time": 4.0, "text": "Bom dia, meu nome é Maria, do atendimento"},
                {"speaker": "spk_1", "start_time": 6.0, "end_time": 10.0, "text": "Oi, minha fatura veio errada"},
                {"speaker": "spk_0", "start_time": 12.0, "end_time": 18.0, "text": "Vou corrigir agora"}
            ],
            "summarization": "Billing issue corrected on the call.",
            "sentiment_analysis": [
                {"label": "satisfação", "score": 0.9, "fragment": "vou corrigir"},
                {"label": "frustração", "score": 0.3, "fragment": "fatura errada"}
            ],
            "topic_detection": [
                {"label": "billing", "confidence": 0.85},
                {"label": "refund", "confidence": 0.5}
            ],
            "resolution": true,
            "agent": "Maria",
            "client": "João",
            "usage": {"cost": 0.2, "currency": "BRL"}
        })
    }

    #[test]
    fn builds_full_record() {
        let record = build_record(&full_payload(), &RoleLexicon::default());

        assert_eq!(record.id, "call_7");
        assert_eq!(record.agent_name, "Maria");
        assert_eq!(record.agent_id, "agent_maria");
        assert_eq!(record.agent_kind, AgentKind::Human);
        assert_eq!(record.satisfaction_score, 0.6);
        assert_eq!(record.sentiment_label, SentimentLabel::Positive);
        assert!(record.resolved);
        assert_eq!(record.duration_seconds, 18);
        assert_eq!(record.topics, vec!["billing"]);
        assert_eq!(record.summary, "Billing issue corrected on the call.");
        assert_eq!(record.cost, 0.2);
    }

    #[test]
    fn malformed_input_degrades_to_error_record() {
        let record = build_record(&json!("nonsense"), &RoleLexicon::default());

        assert_eq!(record.satisfaction_score, 0.0);
        assert_eq!(record.sentiment_label, SentimentLabel::Neutral);
        assert!(!record.resolved);
        assert_eq!(record.tags, vec!["error"]);
        assert!(record.summary.starts_with("Analysis failed:"));
        assert_eq!(record.currency, normalizer::DEFAULT_CURRENCY);
    }

    #[test]
    fn empty_object_builds_without_error() {
        let record = build_record(&json!({}), &RoleLexicon::default());

        assert_eq!(record.agent_name, UNKNOWN_AGENT_NAME);
        assert_eq!(record.satisfaction_score, 0.5);
        assert_eq!(record.sentiment_label, SentimentLabel::Neutral);
        assert_eq!(record.duration_seconds, 0);
        assert!(record.tags.is_empty());
    }

    #[test]
    fn textual_resolution_requires_affirming_keyword() {
        assert!(resolved(&Resolution::Text("problema resolvido".to_string())));
        assert!(resolved(&Resolution::Text("Sim".to_string())));
        assert!(!resolved(&Resolution::Text("cliente vai retornar".to_string())));
        assert!(!resolved(&Resolution::Flag(false)));
        assert!(resolved(&Resolution::Flag(true)));
    }

    #[test]
    fn agent_kind_detects_virtual_agents() {
        assert_eq!(agent_kind("Maria"), AgentKind::Human);
        assert_eq!(agent_kind("Billing Bot"), AgentKind::Ai);
        assert_eq!(agent_kind("Assistente Virtual"), AgentKind::Ai);
        // "ai" must be a standalone token, not a substring.
        assert_eq!(agent_kind("Maia"), AgentKind::Human);
    }

    #[test]
    fn agent_id_is_a_stable_slug() {
        assert_eq!(agent_id("Maria Silva"), "agent_maria_silva");
        assert_eq!(agent_id("  Maria  Silva "), "agent_maria_silva");
        assert_eq!(agent_id(UNKNOWN_AGENT_NAME), "agent_unknown_agent");
    }

    #[test]
    fn record_resolution_credit() {
        let mut record = build_record(&full_payload(), &RoleLexicon::default());
        assert_eq!(record_resolution_pct(&record), RESOLVED_RECORD_PCT);
        record.resolved = false;
        assert_eq!(record_resolution_pct(&record), UNRESOLVED_RECORD_PCT);
    }
}
