//! # gamedesk-protocol — shared assistant-core contract
//!
//! This crate defines the types and trait interfaces shared by every gamedesk
//! crate: the product model, tool call/result shapes, conversation turns, the
//! error taxonomy, and the runtime boundary ports.
//!
//! It is intentionally dependency-light (no tokio, no storage crates) so it
//! can be used as a pure contract crate.
//!
//! ## Module overview
//!
//! - [`ids`] — typed ID wrappers (SessionId, CallId, TurnId, ProductId)
//! - [`product`] — Product record and creation draft
//! - [`tool`] — ToolCallRequest, ToolCallResult, ToolOutcome, descriptors
//! - [`conversation`] — Turn, TurnKind, ConversationContext
//! - [`session`] — SessionManifest
//! - [`ports`] — OraclePort, the decision-oracle boundary
//! - [`error`] — ToolError, AgentError

pub mod conversation;
pub mod error;
pub mod ids;
pub mod ports;
pub mod product;
pub mod session;
pub mod tool;

pub use conversation::{ConversationContext, Turn, TurnKind};
pub use error::{AgentError, AgentResult, ToolError};
pub use ids::{CallId, ProductId, SessionId, TurnId};
pub use ports::{OracleDecision, OraclePort, OracleRequest};
pub use product::{Product, ProductDraft};
pub use session::SessionManifest;
pub use tool::{ParamDescriptor, ToolCallRequest, ToolCallResult, ToolDescriptor, ToolOutcome};
