//! Error types for the Switchboard service.
//!
//! Fallible operations return `SwitchboardResult<T>`. The dispatcher and
//! the optimizer cycle never let these escape their public boundary: they
//! convert them into structured results or log-and-skip.

use thiserror::Error;

/// The unified error type for Switchboard.
#[derive(Debug, Error)]
pub enum SwitchboardError {
    /// No agent with this id is registered.
    #[error("agent '{id}' not found")]
    AgentNotFound { id: String },

    /// No provider with this id is registered.
    #[error("provider '{id}' not found")]
    ProviderNotFound { id: String },

    /// Neither a capable agent nor the default agent can take the request.
    #[error("no agent available")]
    NoAgentAvailable,

    /// An agent handler reported an error.
    #[error("agent '{agent}' failed: {reason}")]
    HandlerFailed { agent: String, reason: String },

    /// An agent handler did not answer within the dispatch timeout.
    #[error("agent '{agent}' timed out after {after_ms} ms")]
    Timeout { agent: String, after_ms: u64 },

    /// The metrics source had nothing for this target.
    #[error("metrics unavailable for '{target}': {reason}")]
    MetricsUnavailable { target: String, reason: String },

    /// A store could not persist or read records.
    #[error("persistence failed: {reason}")]
    PersistenceFailed { reason: String },

    /// A configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },
}

/// Convenience alias used throughout the Switchboard crates.
pub type SwitchboardResult<T> = Result<T, SwitchboardError>;
