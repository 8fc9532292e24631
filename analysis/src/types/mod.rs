//! Canonical data model for the analysis pipeline.

pub mod metrics;
pub mod record;
pub mod webhook;
