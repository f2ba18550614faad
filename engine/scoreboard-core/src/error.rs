//! Error types for scoreboard processing

use thiserror::Error;

/// Result type alias for scoreboard operations
pub type Result<T> = std::result::Result<T, ScoreboardError>;

/// Which upstream resource a failure relates to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamResource {
    /// Flat leaderboard listing
    Leaderboard,
    /// Wide-format score history export
    History,
}

impl std::fmt::Display for UpstreamResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpstreamResource::Leaderboard => write!(f, "leaderboard"),
            UpstreamResource::History => write!(f, "history"),
        }
    }
}

/// Errors that can occur while fetching or interpreting scoreboard data
#[derive(Error, Debug)]
pub enum ScoreboardError {
    /// A requested competitor identifier does not match the `NN-NNNN` pattern
    #[error("Invalid competitor identifier: {id:?}")]
    InvalidIdentifier { id: String },

    /// Transport failure or non-success status from an upstream resource
    #[error("Upstream {resource} unavailable: {reason}")]
    UpstreamUnavailable { resource: UpstreamResource, reason: String },

    /// Upstream payload did not have the expected shape
    #[error("Malformed upstream {resource} data: {reason}")]
    MalformedUpstreamData { resource: UpstreamResource, reason: String },
}

impl ScoreboardError {
    /// Create a new invalid identifier error
    pub fn invalid_identifier(id: impl Into<String>) -> Self {
        Self::InvalidIdentifier { id: id.into() }
    }

    /// Create a new upstream unavailable error
    pub fn unavailable(resource: UpstreamResource, reason: impl Into<String>) -> Self {
        Self::UpstreamUnavailable { resource, reason: reason.into() }
    }

    /// Create a new malformed data error
    pub fn malformed(resource: UpstreamResource, reason: impl Into<String>) -> Self {
        Self::MalformedUpstreamData { resource, reason: reason.into() }
    }

    /// Stable machine-readable code for the error kind
    pub fn code(&self) -> &'static str {
        match self {
            ScoreboardError::InvalidIdentifier { .. } => "INVALID_IDENTIFIER",
            ScoreboardError::UpstreamUnavailable { .. } => "UPSTREAM_UNAVAILABLE",
            ScoreboardError::MalformedUpstreamData { .. } => "MALFORMED_UPSTREAM_DATA",
        }
    }
}
