//! Orchestration layer between the HTTP surface and the analysis pipeline.
//!
//! This crate owns the external-service gateway and the two operations the
//! web layer exposes: ingesting a webhook payload into a stored record and
//! answering dashboard metrics queries. The `web` crate consumes these
//! without depending on `analysis` internals; analysis types it must
//! surface (records, metrics) are re-exported here.

pub use analysis::types::metrics::DashboardMetrics;
pub use analysis::types::{metrics, record};
pub use analysis::{CallAnalysisRecord, RoleLexicon};

pub mod error;
pub mod gateway;
pub mod ingestion;
pub mod insights;
