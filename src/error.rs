//! Error types for the market brief orchestrator

use crate::models::FailureKind;
use thiserror::Error;

/// Result type alias for orchestrator operations
pub type Result<T> = std::result::Result<T, BriefError>;

#[derive(Error, Debug)]
pub enum BriefError {

    // =============================
    // Provider Errors
    // =============================

    /// Transport failure: the provider could not be reached
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Provider was reachable but answered with an error payload or status
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// Provider was reachable but the body lacked expected fields
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Rendering failure: {0}")]
    RenderingFailure(String),

    // =============================
    // Process Errors
    // =============================

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl BriefError {
    /// Classify this error for a provider outcome.
    ///
    /// Raw library errors are bucketed by where they can arise: io errors
    /// happen on the wire, serde errors mean the body was wrong.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            BriefError::ProviderUnavailable(_) | BriefError::IoError(_) => {
                FailureKind::ProviderUnavailable
            }
            BriefError::MalformedResponse(_) | BriefError::SerializationError(_) => {
                FailureKind::MalformedResponse
            }
            _ => FailureKind::ProviderError,
        }
    }

    /// Message without the variant prefix, as carried in a failure outcome
    pub fn detail(&self) -> String {
        match self {
            BriefError::ProviderUnavailable(m)
            | BriefError::ProviderError(m)
            | BriefError::MalformedResponse(m)
            | BriefError::RenderingFailure(m)
            | BriefError::Config(m)
            | BriefError::InvalidRequest(m) => m.clone(),
            other => other.to_string(),
        }
    }
}
