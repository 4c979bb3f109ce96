//! Failures that cross the analysis boundary.
//!
//! Tier-level provider failures never appear here; the resolver absorbs them
//! and only reports the terminal [`AnalyzeError::NotFound`].
use crate::normalize::Malformed;
use crate::source::ProviderId;
use serde::Serialize;

#[derive(Debug, Clone, thiserror::Error)]
pub enum AnalyzeError {
    #[error("invalid reference '{input}'. Use: {expected}")]
    InvalidFormat { input: String, expected: &'static str },

    #[error("verse '{reference}' not available. Try: {}", .available.join(", "))]
    NotFound {
        reference: String,
        tried: Vec<ProviderId>,
        available: Vec<String>,
    },

    #[error("model call failed: {detail}")]
    UpstreamCallFailed { detail: String },

    #[error("malformed model output: {0}")]
    Malformed(Malformed),
}

/// The coarse outcome a boundary layer maps to a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryOutcome {
    Success,
    NotResolvable,
    ServerError,
}

impl BoundaryOutcome {
    pub fn status_code(self) -> u16 {
        match self {
            BoundaryOutcome::Success => 200,
            BoundaryOutcome::NotResolvable => 404,
            BoundaryOutcome::ServerError => 500,
        }
    }
}

impl AnalyzeError {
    pub fn outcome(&self) -> BoundaryOutcome {
        match self {
            AnalyzeError::InvalidFormat { .. } | AnalyzeError::NotFound { .. } => {
                BoundaryOutcome::NotResolvable
            }
            AnalyzeError::UpstreamCallFailed { .. } | AnalyzeError::Malformed(_) => {
                BoundaryOutcome::ServerError
            }
        }
    }

    pub fn status_code(&self) -> u16 {
        self.outcome().status_code()
    }

    /// Stable machine-readable name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalyzeError::InvalidFormat { .. } => "invalid_format",
            AnalyzeError::NotFound { .. } => "not_found",
            AnalyzeError::UpstreamCallFailed { .. } => "upstream_call_failed",
            AnalyzeError::Malformed(_) => "malformed",
        }
    }
}
