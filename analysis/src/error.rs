//! Error types for the analysis pipeline.

use std::fmt;

/// Error produced by the analysis pipeline.
///
/// The pipeline is deliberately hard to fail: missing optional fields are
/// always defaulted and internal scoring failures are contained inside the
/// call analysis builder, which degrades to an error record instead of
/// propagating. The only remaining failure is a payload that is not a
/// parseable record at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The raw input is not a JSON object, so no record can be derived
    /// from it. Carries a short description of what was received.
    MalformedPayload(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MalformedPayload(msg) => write!(f, "malformed payload: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
