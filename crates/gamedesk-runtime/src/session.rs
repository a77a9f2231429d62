//! Per-session conversation contexts.

use gamedesk_protocol::{
    AgentError, AgentResult, ConversationContext, SessionId, SessionManifest, Turn,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

#[derive(Debug)]
struct SessionState {
    manifest: SessionManifest,
    context: ConversationContext,
}

/// Owns one [`ConversationContext`] per session key.
///
/// `append` is the only mutator; `snapshot` hands the loop an ordered copy of
/// the turns. There is no implicit eviction — session lifetime and truncation
/// are the owning collaborator's call.
#[derive(Clone, Default)]
pub struct SessionManager {
    sessions: Arc<Mutex<HashMap<String, SessionState>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, owner: impl Into<String>) -> SessionManifest {
        let manifest = SessionManifest::new(owner);
        self.sessions.lock().insert(
            manifest.session_id.as_str().to_owned(),
            SessionState {
                manifest: manifest.clone(),
                context: ConversationContext::default(),
            },
        );
        info!(session_id = %manifest.session_id, owner = %manifest.owner, "session created");
        manifest
    }

    pub fn append(&self, session_id: &SessionId, turn: Turn) -> AgentResult<()> {
        let mut sessions = self.sessions.lock();
        let session = sessions
            .get_mut(session_id.as_str())
            .ok_or_else(|| AgentError::SessionNotFound(session_id.clone()))?;
        session.context.append(turn);
        Ok(())
    }

    pub fn snapshot(&self, session_id: &SessionId) -> AgentResult<Vec<Turn>> {
        let sessions = self.sessions.lock();
        let session = sessions
            .get(session_id.as_str())
            .ok_or_else(|| AgentError::SessionNotFound(session_id.clone()))?;
        Ok(session.context.turns().to_vec())
    }

    pub fn manifest(&self, session_id: &SessionId) -> AgentResult<SessionManifest> {
        let sessions = self.sessions.lock();
        let session = sessions
            .get(session_id.as_str())
            .ok_or_else(|| AgentError::SessionNotFound(session_id.clone()))?;
        Ok(session.manifest.clone())
    }
}
