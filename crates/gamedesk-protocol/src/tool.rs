//! Tool call and result types, plus the descriptors shown to the oracle.

use crate::ids::CallId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A tool invocation request as emitted by the oracle.
///
/// Created once per oracle turn, validated, consumed once, never retried
/// automatically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub call_id: CallId,
    pub tool: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolCallRequest {
    pub fn new(tool: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            call_id: CallId::random(),
            tool: tool.into(),
            arguments,
        }
    }

    /// Build a request from a `serde_json::json!` object literal.
    ///
    /// Non-object values yield an empty argument map.
    pub fn from_value(tool: impl Into<String>, arguments: Value) -> Self {
        let arguments = match arguments {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self::new(tool, arguments)
    }
}

/// Tool execution outcome; failures are data, not process errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    Success { output: Value },
    Failure { error: String },
}

/// The observation appended to the conversation after a dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub call_id: CallId,
    pub tool: String,
    pub outcome: ToolOutcome,
}

impl ToolCallResult {
    pub fn success(call_id: CallId, tool: impl Into<String>, output: Value) -> Self {
        Self {
            call_id,
            tool: tool.into(),
            outcome: ToolOutcome::Success { output },
        }
    }

    pub fn failure(call_id: CallId, tool: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            call_id,
            tool: tool.into(),
            outcome: ToolOutcome::Failure {
                error: error.into(),
            },
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, ToolOutcome::Success { .. })
    }
}

/// How a tool is described to the oracle: `{name, description, parameters}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParamDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDescriptor {
    pub name: String,
    /// One of `text`, `number`, `boolean`.
    pub r#type: String,
    pub required: bool,
}
