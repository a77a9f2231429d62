//! Error taxonomy for the assistant core.
//!
//! The split matters: [`ToolError`] values are domain failures reported back
//! to the oracle as failed tool results and never abort a conversation turn.
//! [`AgentError`] values terminate the current turn (never the session).

use crate::ids::SessionId;
use thiserror::Error;

/// Domain errors raised by tool handlers, the catalog, or the evaluator.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ToolError {
    #[error("invalid parameter '{parameter}': {reason}")]
    Validation { parameter: String, reason: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unsafe expression: {0}")]
    UnsafeExpression(String),
    #[error("arithmetic error: {0}")]
    Arithmetic(String),
    #[error("resource limit exceeded: {0}")]
    ResourceLimit(String),
    #[error("tool call timed out after {0} ms")]
    Timeout(u64),
}

impl ToolError {
    /// Shorthand for a validation failure naming the offending parameter.
    pub fn validation(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }
}

/// Errors that end the current conversation turn.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Protocol mismatch between oracle and registry; the sole unknown-name path.
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("oracle step timed out")]
    OracleTimeout,
    #[error("oracle failure: {0}")]
    Oracle(String),
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),
    #[error("turn cancelled")]
    Cancelled,
}

/// Convenience result type for turn-level operations.
pub type AgentResult<T> = Result<T, AgentError>;
