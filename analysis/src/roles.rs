//! Heuristic speaker-role inference.
//!
//! Assigns each distinct speaker in a call to agent or customer. The
//! heuristics are expressed as an ordered rule table evaluated in sequence
//! per speaker, so each rule is unit-testable on its own instead of living
//! inside nested conditionals.

use serde::{Deserialize, Serialize};

use crate::types::webhook::Segment;

pub const GENERIC_AGENT_NAME: &str = "Agent";
pub const GENERIC_CUSTOMER_NAME: &str = "Customer";
pub const UNKNOWN_AGENT_NAME: &str = "Unknown Agent";

/// Conversation role of one speaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Agent,
    Customer,
    /// Additional speakers beyond the first two, when no declared-name
    /// signal applies to them.
    Participant,
}

/// Role assignment for one distinct speaker id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakerRole {
    pub speaker_id: String,
    pub role: Role,
    pub name: String,
}

/// Locale-specific keyword lists driving role inference.
///
/// The observed transcripts are Brazilian Portuguese with occasional
/// English, so the defaults carry both. All lists are matched
/// case-insensitively against lowercased text. Deployments can override
/// any of them; nothing in the engine hard-codes these literals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleLexicon {
    /// Declared names that mean "no name was actually detected".
    pub placeholder_names: Vec<String>,
    /// Self-introduction phrases that mark the company representative.
    pub self_intro_markers: Vec<String>,
    /// Company/organization self-reference terms.
    pub company_terms: Vec<String>,
    /// Speaker ids representing non-speech or unidentified audio; these are
    /// excluded from role assignment entirely.
    pub non_speech_speakers: Vec<String>,
}

impl Default for RoleLexicon {
    fn default() -> Self {
        let list = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            placeholder_names: list(&["undefined", "null", "indefinido"]),
            self_intro_markers: list(&[
                "my name is",
                "on behalf of",
                "meu nome é",
                "me chamo",
                "em nome de",
                "aqui é o",
                "aqui é a",
            ]),
            company_terms: list(&[
                "company",
                "support",
                "customer service",
                "empresa",
                "atendimento",
                "suporte",
                "central de",
            ]),
            non_speech_speakers: list(&["unknown", "silence", "noise", "non_speech", "ruído"]),
        }
    }
}

impl RoleLexicon {
    /// A declared-name hint is usable when it is non-empty and not one of
    /// the placeholder literals producers emit for "nothing detected".
    fn usable_hint<'a>(&self, hint: Option<&'a str>) -> Option<&'a str> {
        let trimmed = hint?.trim();
        if trimmed.is_empty() {
            return None;
        }
        let lowered = trimmed.to_lowercase();
        if self.placeholder_names.iter().any(|p| *p == lowered) {
            return None;
        }
        Some(trimmed)
    }

    fn is_non_speech(&self, speaker_id: &str) -> bool {
        let lowered = speaker_id.trim().to_lowercase();
        lowered.is_empty() || self.non_speech_speakers.iter().any(|s| *s == lowered)
    }
}

/// Everything a rule may look at for one speaker.
struct SpeakerContext<'a> {
    /// Enumeration position among included speakers (0 = first heard).
    position: usize,
    /// This speaker's text carries a self-introduction or company
    /// self-reference.
    content_match: bool,
    /// No speaker in the call content-matched, so the second-speaker
    /// company-representative convention is in effect.
    convention_applies: bool,
    agent_hint: Option<&'a str>,
    customer_hint: Option<&'a str>,
}

type Rule = fn(&SpeakerContext, &RoleLexicon) -> Option<(Role, String)>;

/// Ordered strategy list; the first rule returning an assignment wins.
const RULES: &[(&str, Rule)] = &[
    ("declared_agent", declared_agent),
    ("declared_customer", declared_customer),
    ("positional", positional),
];

/// Declared-name disambiguation, agent side: a usable declared agent name
/// plus content evidence (self-introduction, company self-reference) or the
/// second-speaker company-representative convention.
fn declared_agent(ctx: &SpeakerContext, lexicon: &RoleLexicon) -> Option<(Role, String)> {
    let agent_name = lexicon.usable_hint(ctx.agent_hint)?;
    if ctx.content_match || (ctx.convention_applies && ctx.position == 1) {
        Some((Role::Agent, agent_name.to_string()))
    } else {
        None
    }
}

/// Declared-name disambiguation, customer side: once any usable declared
/// name exists, unmatched speakers are the customer.
fn declared_customer(ctx: &SpeakerContext, lexicon: &RoleLexicon) -> Option<(Role, String)> {
    if lexicon.usable_hint(ctx.agent_hint).is_none()
        && lexicon.usable_hint(ctx.customer_hint).is_none()
    {
        return None;
    }
    let name = lexicon
        .usable_hint(ctx.customer_hint)
        .unwrap_or(GENERIC_CUSTOMER_NAME);
    Some((Role::Customer, name.to_string()))
}

/// Positional convention fallback: first speaker is the agent, second the
/// customer, any further speakers are unlabeled participants.
fn positional(ctx: &SpeakerContext, _lexicon: &RoleLexicon) -> Option<(Role, String)> {
    match ctx.position {
        0 => Some((Role::Agent, GENERIC_AGENT_NAME.to_string())),
        1 => Some((Role::Customer, GENERIC_CUSTOMER_NAME.to_string())),
        n => Some((Role::Participant, format!("Participant {}", n + 1))),
    }
}

/// Infer a role and display name for every distinct speaker in the call.
///
/// Speakers are enumerated in order of first appearance, after excluding
/// non-speech ids, making the result a deterministic function of the input.
pub fn infer_roles(
    segments: &[Segment],
    agent_hint: Option<&str>,
    customer_hint: Option<&str>,
    lexicon: &RoleLexicon,
) -> Vec<SpeakerRole> {
    let mut speakers: Vec<&str> = Vec::new();
    for segment in segments {
        let id = segment.speaker_id.as_str();
        if lexicon.is_non_speech(id) || speakers.contains(&id) {
            continue;
        }
        speakers.push(id);
    }

    let content_matches: Vec<bool> = speakers
        .iter()
        .map(|speaker_id| {
            let text = combined_text(segments, speaker_id);
            lexicon.self_intro_markers.iter().any(|m| text.contains(m.as_str()))
                || lexicon.company_terms.iter().any(|t| text.contains(t.as_str()))
        })
        .collect();
    let convention_applies = !content_matches.iter().any(|m| *m);

    speakers
        .iter()
        .enumerate()
        .map(|(position, speaker_id)| {
            let ctx = SpeakerContext {
                position,
                content_match: content_matches[position],
                convention_applies,
                agent_hint,
                customer_hint,
            };
            let (role, name) = RULES
                .iter()
                .find_map(|(_, rule)| rule(&ctx, lexicon))
                .unwrap_or((Role::Participant, format!("Participant {}", position + 1)));
            SpeakerRole {
                speaker_id: speaker_id.to_string(),
                role,
                name,
            }
        })
        .collect()
}

/// The primary agent for the call: the first entry assigned the agent role.
pub fn primary_agent(roles: &[SpeakerRole]) -> Option<&SpeakerRole> {
    roles.iter().find(|r| r.role == Role::Agent)
}

fn combined_text(segments: &[Segment], speaker_id: &str) -> String {
    segments
        .iter()
        .filter(|s| s.speaker_id == speaker_id)
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
