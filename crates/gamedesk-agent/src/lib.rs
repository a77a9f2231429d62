use std::sync::Arc;

use anyhow::Result;
use gamedesk_catalog::{CatalogStore, RowStore, seed_catalog};
use gamedesk_protocol::{OraclePort, SessionId, SessionManifest, ToolDescriptor, Turn};
use gamedesk_runtime::{CancelToken, LoopConfig, Orchestrator, SessionManager, TurnOutcome};
use gamedesk_tools::ToolRegistry;
use tracing::{info, instrument};

#[derive(Clone)]
pub struct AgentBuilder {
    oracle: Arc<dyn OraclePort>,
    config: LoopConfig,
    rows: Option<Arc<dyn RowStore>>,
    seed: bool,
}

impl AgentBuilder {
    pub fn new(oracle: Arc<dyn OraclePort>) -> Self {
        Self {
            oracle,
            config: LoopConfig::default(),
            rows: None,
            seed: false,
        }
    }

    pub fn config(mut self, config: LoopConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a custom row store instead of the in-memory default.
    pub fn row_store(mut self, rows: Arc<dyn RowStore>) -> Self {
        self.rows = Some(rows);
        self
    }

    /// Load the starter titles into the catalog during `build`.
    pub fn seed_starter_titles(mut self) -> Self {
        self.seed = true;
        self
    }

    pub async fn build(self) -> Result<Agent> {
        let catalog = match self.rows {
            Some(rows) => CatalogStore::new(rows),
            None => CatalogStore::in_memory(),
        };
        if self.seed {
            let inserted = seed_catalog(&catalog).await?;
            info!(inserted, "catalog seeded");
        }

        let registry = Arc::new(ToolRegistry::new(catalog.clone()));
        let orchestrator =
            Orchestrator::new(self.oracle, registry.clone(), SessionManager::new(), self.config);

        Ok(Agent {
            orchestrator,
            registry,
            catalog,
        })
    }
}

/// Entry point for hosts: owns the catalog, the tool registry, and the
/// orchestration loop behind one object.
#[derive(Clone)]
pub struct Agent {
    orchestrator: Orchestrator,
    registry: Arc<ToolRegistry>,
    catalog: CatalogStore,
}

impl Agent {
    pub fn create_session(&self, owner: impl Into<String>) -> SessionManifest {
        self.orchestrator.sessions().create(owner)
    }

    /// Drive one user message to completion with a fresh cancel token.
    #[instrument(skip(self, text), fields(session_id = %session_id))]
    pub async fn handle_message(
        &self,
        session_id: &SessionId,
        text: &str,
    ) -> Result<TurnOutcome> {
        self.handle_message_with_cancel(session_id, text, &CancelToken::new())
            .await
    }

    #[instrument(skip(self, text, cancel), fields(session_id = %session_id))]
    pub async fn handle_message_with_cancel(
        &self,
        session_id: &SessionId,
        text: &str,
        cancel: &CancelToken,
    ) -> Result<TurnOutcome> {
        let outcome = self.orchestrator.run_turn(session_id, text, cancel).await?;
        Ok(outcome)
    }

    pub fn history(&self, session_id: &SessionId) -> Result<Vec<Turn>> {
        Ok(self.orchestrator.sessions().snapshot(session_id)?)
    }

    pub fn tool_descriptors(&self) -> Vec<ToolDescriptor> {
        self.registry.descriptors()
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gamedesk_protocol::{
        AgentResult, OracleDecision, OracleRequest, ToolCallRequest, ToolOutcome, TurnKind,
    };
    use gamedesk_runtime::TurnStatus;
    use parking_lot::Mutex;
    use serde_json::{Value, json};
    use std::collections::VecDeque;

    /// Replays a fixed sequence of decisions, then falls back to a canned
    /// final answer. The fallback may interpolate the last tool output.
    struct ScriptedOracle {
        script: Mutex<VecDeque<OracleDecision>>,
        fallback: fn(&OracleRequest) -> String,
    }

    impl ScriptedOracle {
        fn new(
            steps: Vec<OracleDecision>,
            fallback: fn(&OracleRequest) -> String,
        ) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(steps.into()),
                fallback,
            })
        }
    }

    #[async_trait]
    impl OraclePort for ScriptedOracle {
        async fn decide(&self, request: OracleRequest) -> AgentResult<OracleDecision> {
            if let Some(step) = self.script.lock().pop_front() {
                return Ok(step);
            }
            Ok(OracleDecision::FinalAnswer {
                text: (self.fallback)(&request),
            })
        }
    }

    fn last_tool_output(request: &OracleRequest) -> Option<Value> {
        request.turns.iter().rev().find_map(|turn| match &turn.kind {
            TurnKind::ToolResult { result } => match &result.outcome {
                ToolOutcome::Success { output } => Some(output.clone()),
                ToolOutcome::Failure { .. } => None,
            },
            _ => None,
        })
    }

    async fn agent_with(oracle: Arc<dyn OraclePort>) -> Agent {
        AgentBuilder::new(oracle).build().await.unwrap()
    }

    #[tokio::test]
    async fn add_product_flow_lands_in_the_catalog() {
        let oracle = ScriptedOracle::new(
            vec![OracleDecision::ToolCalls {
                calls: vec![ToolCallRequest::from_value(
                    "add_product",
                    json!({
                        "name": "Hollow Knight",
                        "genre": "Indie",
                        "platform": "PC",
                        "price": 15,
                    }),
                )],
            }],
            |request| {
                let name = last_tool_output(request)
                    .and_then(|v| v.get("name").and_then(Value::as_str).map(str::to_owned))
                    .unwrap_or_default();
                format!("Добавила {name} в каталог за 15")
            },
        );

        let agent = agent_with(oracle).await;
        let session = agent.create_session("tester");
        let outcome = agent
            .handle_message(
                &session.session_id,
                "добавь игру Hollow Knight цена 15 жанр Indie платформа PC",
            )
            .await
            .unwrap();

        assert_eq!(outcome.status, TurnStatus::Answered);
        assert!(outcome.answer.contains("Hollow Knight"));
        assert_eq!(outcome.tool_calls, 1);

        let found = agent.catalog().find_by_name("hollow").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].genre, "Indie");
        assert_eq!(found[0].platform, "PC");
        assert_eq!(found[0].price, 15.0);

        let history = agent.history(&session.session_id).unwrap();
        assert!(history
            .iter()
            .any(|t| matches!(t.kind, TurnKind::ToolCall { .. })));
        assert!(history
            .iter()
            .any(|t| matches!(t.kind, TurnKind::ToolResult { .. })));
    }

    #[tokio::test]
    async fn calculate_flow_surfaces_the_result() {
        let oracle = ScriptedOracle::new(
            vec![OracleDecision::ToolCalls {
                calls: vec![ToolCallRequest::from_value(
                    "calculate",
                    json!({"expression": "199 * 3"}),
                )],
            }],
            |request| {
                let value = last_tool_output(request)
                    .and_then(|v| v.as_f64())
                    .unwrap_or_default();
                format!("199 * 3 = {value}")
            },
        );

        let agent = agent_with(oracle).await;
        let session = agent.create_session("tester");
        let outcome = agent
            .handle_message(&session.session_id, "сколько будет 199 * 3")
            .await
            .unwrap();

        assert_eq!(outcome.status, TurnStatus::Answered);
        assert!(outcome.answer.contains("597"));
    }

    #[tokio::test]
    async fn tool_failure_is_observed_not_fatal() {
        let oracle = ScriptedOracle::new(
            vec![OracleDecision::ToolCalls {
                calls: vec![ToolCallRequest::from_value(
                    "calculate",
                    json!({"expression": "10 / 0"}),
                )],
            }],
            |request| {
                if last_tool_output(request).is_none() {
                    "на ноль делить нельзя".to_owned()
                } else {
                    "unexpected".to_owned()
                }
            },
        );

        let agent = agent_with(oracle).await;
        let session = agent.create_session("tester");
        let outcome = agent
            .handle_message(&session.session_id, "сколько будет 10 / 0")
            .await
            .unwrap();

        assert_eq!(outcome.status, TurnStatus::Answered);
        assert_eq!(outcome.answer, "на ноль делить нельзя");

        let history = agent.history(&session.session_id).unwrap();
        let failed = history
            .iter()
            .find_map(|t| match &t.kind {
                TurnKind::ToolResult { result } => Some(result.clone()),
                _ => None,
            })
            .expect("failure recorded as a tool result");
        assert!(!failed.succeeded());
    }

    #[tokio::test]
    async fn greedy_oracle_exhausts_at_the_ceiling() {
        fn never(_: &OracleRequest) -> String {
            unreachable!("the ceiling fires before the script runs out")
        }
        let steps = (0..10)
            .map(|_| OracleDecision::ToolCalls {
                calls: vec![ToolCallRequest::from_value("list_products", json!({}))],
            })
            .collect();
        let oracle = ScriptedOracle::new(steps, never);

        let config = LoopConfig {
            max_round_trips: 2,
            ..LoopConfig::default()
        };
        let agent = AgentBuilder::new(oracle).config(config).build().await.unwrap();
        let session = agent.create_session("tester");
        let outcome = agent
            .handle_message(&session.session_id, "покажи всё снова и снова")
            .await
            .unwrap();

        assert_eq!(outcome.status, TurnStatus::Exhausted);
        assert_eq!(outcome.round_trips, 2);
        assert!(!outcome.answer.is_empty());
    }

    #[tokio::test]
    async fn unknown_tool_degrades_the_turn() {
        fn never(_: &OracleRequest) -> String {
            "unused".to_owned()
        }
        let oracle = ScriptedOracle::new(
            vec![OracleDecision::ToolCalls {
                calls: vec![ToolCallRequest::from_value("format_disk", json!({}))],
            }],
            never,
        );

        let agent = agent_with(oracle).await;
        let session = agent.create_session("tester");
        let outcome = agent
            .handle_message(&session.session_id, "отформатируй диск")
            .await
            .unwrap();

        assert_eq!(outcome.status, TurnStatus::Exhausted);
        assert!(!outcome.answer.is_empty());
    }

    #[tokio::test]
    async fn cancelled_turn_reports_cancelled() {
        fn never(_: &OracleRequest) -> String {
            "unused".to_owned()
        }
        let oracle = ScriptedOracle::new(vec![], never);
        let agent = agent_with(oracle).await;
        let session = agent.create_session("tester");

        let cancel = CancelToken::new();
        cancel.cancel();
        let outcome = agent
            .handle_message_with_cancel(&session.session_id, "стоп", &cancel)
            .await
            .unwrap();

        assert_eq!(outcome.status, TurnStatus::Cancelled);
        assert!(outcome.answer.is_empty());
    }

    #[tokio::test]
    async fn seeded_agent_answers_catalog_queries() {
        fn never(_: &OracleRequest) -> String {
            "unused".to_owned()
        }
        let agent = AgentBuilder::new(ScriptedOracle::new(vec![], never))
            .seed_starter_titles()
            .build()
            .await
            .unwrap();

        let all = agent.catalog().get_all().await.unwrap();
        assert!(!all.is_empty());
        let witcher = agent.catalog().find_by_name("witcher").await.unwrap();
        assert!(!witcher.is_empty());

        let descriptors = agent.tool_descriptors();
        assert_eq!(descriptors.len(), 9);
    }
}
