//! Session identity.

use crate::ids::SessionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Describes a conversation session's identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionManifest {
    pub session_id: SessionId,
    pub owner: String,
    pub created_at: DateTime<Utc>,
}

impl SessionManifest {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            session_id: SessionId::random(),
            owner: owner.into(),
            created_at: Utc::now(),
        }
    }
}
