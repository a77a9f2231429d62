//! Runtime boundary ports.
//!
//! The decision oracle (the LLM reasoning step) is the only non-deterministic
//! input to the core. It is modeled as an interface returning a sum type —
//! either a final answer or a batch of tool-call requests — and is never
//! trusted to terminate on its own; the orchestration loop bounds it.

use crate::conversation::Turn;
use crate::error::AgentResult;
use crate::ids::SessionId;
use crate::tool::{ToolCallRequest, ToolDescriptor};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Everything the oracle sees for one decision: the conversation so far plus
/// the full set of registered tool schemas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleRequest {
    pub session_id: SessionId,
    pub turns: Vec<Turn>,
    pub tools: Vec<ToolDescriptor>,
}

/// The oracle's decision for one round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum OracleDecision {
    FinalAnswer { text: String },
    ToolCalls { calls: Vec<ToolCallRequest> },
}

#[async_trait]
pub trait OraclePort: Send + Sync {
    async fn decide(&self, request: OracleRequest) -> AgentResult<OracleDecision>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decision_serde_tags_variant() {
        let answer = OracleDecision::FinalAnswer {
            text: "597".into(),
        };
        let encoded = serde_json::to_string(&answer).unwrap();
        assert!(encoded.contains("\"decision\":\"final_answer\""));

        let calls = OracleDecision::ToolCalls {
            calls: vec![ToolCallRequest::from_value(
                "calculate",
                json!({"expression": "199 * 3"}),
            )],
        };
        let encoded = serde_json::to_string(&calls).unwrap();
        let back: OracleDecision = serde_json::from_str(&encoded).unwrap();
        assert!(matches!(back, OracleDecision::ToolCalls { calls } if calls.len() == 1));
    }
}
