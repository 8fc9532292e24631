//! Error types for the `domain` layer.
use analysis::Error as AnalysisError;
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the domain layer are modeled as a tree structure with
/// `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain
/// layer or in lower layers. The `source` field holds the original error
/// that caused the domain error. The intent is to translate errors between
/// layers while maintaining layer boundaries: `domain` depends on
/// `analysis`, and `web` depends on `domain`, but `web` should not depend
/// directly on `analysis` error types. Ultimately the various `error_kind`s
/// are used by `web` to return appropriate HTTP status codes and messages
/// to the client.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Analysis(AnalysisErrorKind),
    Config,
    Other(String),
}

/// Enum representing the kinds of errors that can bubble up from the analysis
/// pipeline. These are translated from the `analysis` layer and reduced to the
/// subset of kinds relevant to the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum AnalysisErrorKind {
    MalformedPayload,
    Other(String),
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Network,
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `analysis` layer to the `domain` layer.
impl From<AnalysisError> for Error {
    fn from(err: AnalysisError) -> Self {
        let analysis_error_kind = match err {
            AnalysisError::MalformedPayload(_) => AnalysisErrorKind::MalformedPayload,
        };

        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Analysis(
                analysis_error_kind,
            )),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Errors that result from issues building the reqwest::Client instance. This
        // type of error will occur prior to any network calls being made.
        if err.is_builder() {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                    "Failed to build reqwest client".to_string(),
                )),
            }
        // Errors that result from issues with the network call itself.
        } else {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        }
    }
}
