//! Bounded tool-invocation loop.
//!
//! [`Orchestrator::run_turn`] drives one user message to a final answer:
//! ask the oracle, execute whatever tool calls it emits, feed the results
//! back, repeat. The loop is bounded by [`LoopConfig::max_round_trips`];
//! hitting the ceiling or losing the oracle degrades the turn to
//! [`TurnStatus::Exhausted`] with a non-empty fallback answer instead of
//! erroring out. Tool failures never abort a turn: they are recorded as
//! failure results and handed back to the oracle as data.

mod cancel;
mod session;

pub use cancel::CancelToken;
pub use session::SessionManager;

use gamedesk_protocol::{
    AgentResult, OracleDecision, OraclePort, OracleRequest, SessionId, ToolCallResult, ToolError,
    Turn,
};
use gamedesk_tools::ToolRegistry;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, instrument, warn};

/// Answer appended when a turn cannot be completed normally.
const DEGRADED_ANSWER: &str =
    "Я не успела довести ответ до конца за отведённое число шагов. \
     Попробуйте переформулировать или сузить запрос.";

/// Knobs for one orchestration loop.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Hard ceiling on oracle round trips per user message.
    pub max_round_trips: u32,
    /// Per-request deadline for the oracle.
    pub oracle_timeout: Duration,
    /// Per-call deadline for a single tool dispatch.
    pub tool_timeout: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_round_trips: 4,
            oracle_timeout: Duration::from_secs(30),
            tool_timeout: Duration::from_secs(10),
        }
    }
}

/// How a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    /// The oracle produced a final answer within the ceiling.
    Answered,
    /// Ceiling hit, oracle lost, or unknown tool requested; the answer is
    /// the degraded fallback text.
    Exhausted,
    /// The caller cancelled between steps; the answer is empty.
    Cancelled,
}

/// Result of driving one user message through the loop.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub status: TurnStatus,
    pub answer: String,
    pub round_trips: u32,
    pub tool_calls: u32,
}

/// Drives the decide/execute/observe loop over a session's context.
#[derive(Clone)]
pub struct Orchestrator {
    oracle: Arc<dyn OraclePort>,
    registry: Arc<ToolRegistry>,
    sessions: SessionManager,
    config: LoopConfig,
}

impl Orchestrator {
    pub fn new(
        oracle: Arc<dyn OraclePort>,
        registry: Arc<ToolRegistry>,
        sessions: SessionManager,
        config: LoopConfig,
    ) -> Self {
        Self {
            oracle,
            registry,
            sessions,
            config,
        }
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Run one user message to completion.
    ///
    /// The user turn is appended first and stays in the context whatever
    /// happens next. Errors are reserved for broken wiring (unknown session);
    /// every in-band failure mode comes back as a [`TurnOutcome`].
    #[instrument(skip(self, text, cancel), fields(session_id = %session_id))]
    pub async fn run_turn(
        &self,
        session_id: &SessionId,
        text: &str,
        cancel: &CancelToken,
    ) -> AgentResult<TurnOutcome> {
        self.sessions.append(session_id, Turn::user(text))?;

        let tools = self.registry.descriptors();
        let mut tool_calls = 0u32;

        for round in 1..=self.config.max_round_trips {
            if cancel.is_cancelled() {
                info!(round, "turn cancelled before oracle request");
                return Ok(TurnOutcome {
                    status: TurnStatus::Cancelled,
                    answer: String::new(),
                    round_trips: round - 1,
                    tool_calls,
                });
            }

            let request = OracleRequest {
                session_id: session_id.clone(),
                turns: self.sessions.snapshot(session_id)?,
                tools: tools.clone(),
            };

            let decision = match timeout(self.config.oracle_timeout, self.oracle.decide(request))
                .await
            {
                Err(_) => {
                    warn!(round, "oracle deadline exceeded");
                    return self.exhaust(session_id, round, tool_calls);
                }
                Ok(Err(error)) => {
                    warn!(round, %error, "oracle request failed");
                    return self.exhaust(session_id, round, tool_calls);
                }
                Ok(Ok(decision)) => decision,
            };

            match decision {
                OracleDecision::FinalAnswer { text } => {
                    self.sessions.append(session_id, Turn::assistant(&text))?;
                    info!(round, tool_calls, "turn answered");
                    return Ok(TurnOutcome {
                        status: TurnStatus::Answered,
                        answer: text,
                        round_trips: round,
                        tool_calls,
                    });
                }
                OracleDecision::ToolCalls { calls } => {
                    for call in calls {
                        if cancel.is_cancelled() {
                            info!(round, "turn cancelled between tool calls");
                            return Ok(TurnOutcome {
                                status: TurnStatus::Cancelled,
                                answer: String::new(),
                                round_trips: round,
                                tool_calls,
                            });
                        }

                        self.sessions.append(session_id, Turn::tool_call(call.clone()))?;
                        let result = match timeout(
                            self.config.tool_timeout,
                            self.registry.dispatch(&call),
                        )
                        .await
                        {
                            Err(_) => {
                                let deadline = self.config.tool_timeout.as_millis() as u64;
                                warn!(tool = %call.tool, deadline, "tool deadline exceeded");
                                ToolCallResult::failure(
                                    call.call_id.clone(),
                                    &call.tool,
                                    ToolError::Timeout(deadline).to_string(),
                                )
                            }
                            // Unknown tool: record a failure observation for
                            // the already-appended call, then end the turn.
                            Ok(Err(error)) => {
                                error!(tool = %call.tool, %error, "dispatch rejected the call");
                                self.sessions.append(
                                    session_id,
                                    Turn::tool_result(ToolCallResult::failure(
                                        call.call_id.clone(),
                                        &call.tool,
                                        error.to_string(),
                                    )),
                                )?;
                                return self.exhaust(session_id, round, tool_calls);
                            }
                            Ok(Ok(result)) => result,
                        };

                        tool_calls += 1;
                        self.sessions.append(session_id, Turn::tool_result(result))?;
                    }
                }
            }
        }

        warn!(
            max_round_trips = self.config.max_round_trips,
            tool_calls, "round-trip ceiling hit"
        );
        self.exhaust(session_id, self.config.max_round_trips, tool_calls)
    }

    fn exhaust(
        &self,
        session_id: &SessionId,
        round_trips: u32,
        tool_calls: u32,
    ) -> AgentResult<TurnOutcome> {
        self.sessions
            .append(session_id, Turn::assistant(DEGRADED_ANSWER))?;
        Ok(TurnOutcome {
            status: TurnStatus::Exhausted,
            answer: DEGRADED_ANSWER.to_owned(),
            round_trips,
            tool_calls,
        })
    }
}
