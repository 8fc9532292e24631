//! KPI weight tables for composite agent ranking.
//!
//! The weights are declared exactly once, here, and referenced by profile
//! everywhere a composite is computed. Call sites never carry their own
//! weight literals, so the weights cannot drift apart or stop summing to
//! 100.

use serde::{Deserialize, Serialize};

/// Weight, in percent, of each normalized sub-KPI in the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightProfile {
    pub name: &'static str,
    pub customer_sentiment: f64,
    pub agent_empathy: f64,
    pub first_contact_resolution: f64,
    pub conversation_flow: f64,
    pub script_adherence: f64,
    pub personalization: f64,
    pub agent_knowledge: f64,
    pub call_wrap_up: f64,
}

/// The default scoring profile.
pub const STANDARD_PROFILE: WeightProfile = WeightProfile {
    name: "standard",
    customer_sentiment: 20.0,
    agent_empathy: 15.0,
    first_contact_resolution: 20.0,
    conversation_flow: 10.0,
    script_adherence: 15.0,
    personalization: 8.0,
    agent_knowledge: 10.0,
    call_wrap_up: 2.0,
};

impl WeightProfile {
    pub fn total(&self) -> f64 {
        self.customer_sentiment
            + self.agent_empathy
            + self.first_contact_resolution
            + self.conversation_flow
            + self.script_adherence
            + self.personalization
            + self.agent_knowledge
            + self.call_wrap_up
    }
}

impl Default for WeightProfile {
    fn default() -> Self {
        STANDARD_PROFILE
    }
}

/// The eight normalized (0–1) sub-KPIs feeding the composite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SubKpis {
    pub customer_sentiment: f64,
    pub agent_empathy: f64,
    pub first_contact_resolution: f64,
    pub conversation_flow: f64,
    pub script_adherence: f64,
    pub personalization: f64,
    pub agent_knowledge: f64,
    pub call_wrap_up: f64,
}

/// Weighted composite: Σ(normalized sub-KPI × weight), as a 0–100 integer.
pub fn composite_score(kpis: &SubKpis, profile: &WeightProfile) -> u32 {
    let raw = kpis.customer_sentiment * profile.customer_sentiment
        + kpis.agent_empathy * profile.agent_empathy
        + kpis.first_contact_resolution * profile.first_contact_resolution
        + kpis.conversation_flow * profile.conversation_flow
        + kpis.script_adherence * profile.script_adherence
        + kpis.personalization * profile.personalization
        + kpis.agent_knowledge * profile.agent_knowledge
        + kpis.call_wrap_up * profile.call_wrap_up;
    raw.round().clamp(0.0, 100.0) as u32
}
