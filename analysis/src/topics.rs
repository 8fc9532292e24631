//! Confidence-based topic and tag extraction.

use crate::scoring::normalize_score;
use crate::types::webhook::{SentimentAnnotation, TopicAnnotation};

const TOPIC_CONFIDENCE_FLOOR: f64 = 0.6;
const TAG_CONFIDENCE_FLOOR: f64 = 0.8;
const TAG_SENTIMENT_FLOOR: f64 = 0.6;
const MAX_TOPICS: usize = 10;
const MAX_TAGS: usize = 5;
const MAX_INSIGHTS: usize = 3;

/// Topics discussed on the call: annotations above the confidence floor,
/// deduplicated, ordered by descending confidence, capped at 10.
///
/// Idempotent: re-extracting from an already-filtered list yields the same
/// list.
pub fn extract_topics(annotations: &[TopicAnnotation]) -> Vec<String> {
    let mut candidates: Vec<(&str, f64)> = annotations
        .iter()
        .filter(|a| a.confidence > TOPIC_CONFIDENCE_FLOOR)
        .map(|a| (a.label.trim(), a.confidence))
        .filter(|(label, _)| !label.is_empty())
        .collect();
    // Stable sort keeps original order among equal confidences, so the
    // result is deterministic for identical input.
    candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut topics = Vec::new();
    for (label, _) in candidates {
        if !topics.iter().any(|t: &String| t.eq_ignore_ascii_case(label)) {
            topics.push(label.to_string());
        }
        if topics.len() == MAX_TOPICS {
            break;
        }
    }
    topics
}

/// Short slug-form tags: high-confidence topic labels plus strong sentiment
/// labels, deduplicated, capped at 5.
pub fn extract_tags(
    topics: &[TopicAnnotation],
    sentiments: &[SentimentAnnotation],
) -> Vec<String> {
    let mut tags = Vec::new();

    let topic_tags = topics
        .iter()
        .filter(|a| a.confidence > TAG_CONFIDENCE_FLOOR)
        .map(|a| slugify(&a.label));
    let sentiment_tags = sentiments
        .iter()
        .filter(|a| normalize_score(a.score) > TAG_SENTIMENT_FLOOR)
        .map(|a| slugify(&a.label));

    for tag in topic_tags.chain(sentiment_tags) {
        if tag.is_empty() || tags.contains(&tag) {
            continue;
        }
        tags.push(tag);
        if tags.len() == MAX_TAGS {
            break;
        }
    }
    tags
}

/// Up to three human-readable highlights: strongest sentiment entries first,
/// then highest-confidence topics.
pub fn key_insights(
    sentiments: &[SentimentAnnotation],
    topics: &[TopicAnnotation],
) -> Vec<String> {
    let mut strongest: Vec<&SentimentAnnotation> = sentiments.iter().collect();
    strongest.sort_by(|a, b| {
        normalize_score(b.score)
            .partial_cmp(&normalize_score(a.score))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut ranked_topics: Vec<&TopicAnnotation> = topics.iter().collect();
    ranked_topics.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal));

    let mut insights = Vec::new();
    for annotation in strongest {
        if insights.len() == MAX_INSIGHTS {
            return insights;
        }
        if annotation.label.trim().is_empty() {
            continue;
        }
        insights.push(format!(
            "{} detected with {:.0}% intensity",
            annotation.label.trim(),
            normalize_score(annotation.score) * 100.0
        ));
    }
    for annotation in ranked_topics {
        if insights.len() == MAX_INSIGHTS {
            break;
        }
        if annotation.label.trim().is_empty() {
            continue;
        }
        insights.push(format!(
            "Topic {} identified with {:.0}% confidence",
            annotation.label.trim(),
            annotation.confidence * 100.0
        ));
    }
    insights
}

/// Lowercase hyphenated slug used for tags.
fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    let mut last_was_hyphen = true;
    for ch in label.trim().to_lowercase().chars() {
        if ch.is_alphanumeric() {
            slug.push(ch);
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    slug.trim_end_matches('-').to_string()
}
