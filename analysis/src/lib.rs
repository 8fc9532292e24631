//! Call-transcription analysis pipeline.
//!
//! This crate turns raw webhook payloads from the upstream speech/NLP
//! pipeline into normalized per-call analysis records and rolls sets of
//! records up into per-agent and company performance metrics:
//! - Format normalization of heterogeneous payload shapes
//! - Heuristic speaker-role inference (agent vs. customer)
//! - Sentiment and quality scoring across inconsistent input scales
//! - Confidence-based topic/tag extraction
//! - Multi-metric weighted aggregation with trend comparison
//!
//! Everything here is synchronous, stateless, and a deterministic function
//! of its input. Persistence and transport live in the `domain` crate.

pub mod aggregation;
pub mod builder;
pub mod error;
pub mod normalizer;
pub mod roles;
pub mod scoring;
pub mod topics;
pub mod types;
pub mod weights;

// Re-export commonly used items
pub use builder::build_record;
pub use error::Error;
pub use roles::RoleLexicon;
pub use types::record::CallAnalysisRecord;
