//! Conversation turns and the per-session context.

use crate::ids::TurnId;
use crate::tool::{ToolCallRequest, ToolCallResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry in a conversation: user text, assistant text, or a tool
/// call/result pair recorded as two adjacent turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub turn_id: TurnId,
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: TurnKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum TurnKind {
    User { text: String },
    Assistant { text: String },
    ToolCall { request: ToolCallRequest },
    ToolResult { result: ToolCallResult },
}

impl Turn {
    fn record(kind: TurnKind) -> Self {
        Self {
            turn_id: TurnId::random(),
            at: Utc::now(),
            kind,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::record(TurnKind::User { text: text.into() })
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::record(TurnKind::Assistant { text: text.into() })
    }

    pub fn tool_call(request: ToolCallRequest) -> Self {
        Self::record(TurnKind::ToolCall { request })
    }

    pub fn tool_result(result: ToolCallResult) -> Self {
        Self::record(TurnKind::ToolResult { result })
    }
}

/// Ordered sequence of turns owned by exactly one session.
///
/// Grows monotonically; truncation or reset is the session owner's decision,
/// never the orchestration loop's.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationContext {
    turns: Vec<Turn>,
}

impl ConversationContext {
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
