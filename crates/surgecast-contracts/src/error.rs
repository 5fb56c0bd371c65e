//! Error types for the SURGECAST agent pipeline.
//!
//! All fallible operations in the workspace return `SurgeResult<T>`.
//! Data-source failures are NOT errors: perceiving agents recover from them
//! locally by falling back to seasonal defaults.

use thiserror::Error;

/// The unified error type for the SURGECAST runtime.
#[derive(Debug, Error)]
pub enum SurgeError {
    /// An agent failed inside perceive, reason, or act.
    ///
    /// Fatal to the current pipeline run; the orchestrator never retries.
    #[error("agent '{agent_id}' failed while {phase}: {reason}")]
    AgentFailed {
        agent_id: String,
        phase: String,
        reason: String,
    },

    /// An agent with the same id is already registered.
    #[error("agent '{agent_id}' is already registered")]
    DuplicateAgent { agent_id: String },

    /// The id is reserved for the bus broadcast address.
    #[error("agent id '{agent_id}' is reserved for broadcasts")]
    ReservedAgentId { agent_id: String },

    /// No agent with this id is registered.
    #[error("agent '{agent_id}' is not registered")]
    UnknownAgent { agent_id: String },

    /// An agent produced a record that breaks the cycle contract
    /// (no conclusions, confidence outside [0, 1], empty explanation).
    #[error("invalid agent output: {reason}")]
    InvalidOutput { reason: String },

    /// A perception did not carry the fields its own agent expects.
    #[error("malformed perception: {reason}")]
    MalformedPerception { reason: String },

    /// A configuration value is missing or cannot be parsed.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// A record could not be converted to or from JSON.
    #[error("serialization error: {reason}")]
    Serialization { reason: String },
}

impl From<serde_json::Error> for SurgeError {
    fn from(e: serde_json::Error) -> Self {
        SurgeError::Serialization { reason: e.to_string() }
    }
}

/// Convenience alias used throughout the SURGECAST crates.
pub type SurgeResult<T> = Result<T, SurgeError>;
