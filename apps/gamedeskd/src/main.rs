use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use gamedesk_agent::AgentBuilder;
use gamedesk_protocol::{
    AgentResult, OracleDecision, OraclePort, OracleRequest, ToolCallRequest, ToolOutcome,
    TurnKind,
};
use gamedesk_runtime::LoopConfig;
use serde_json::{Value, json};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "gamedeskd")]
#[command(about = "gamedesk agent demo daemon")]
struct Cli {
    #[arg(long, default_value = "developer")]
    owner: String,
    #[arg(long, default_value_t = 4)]
    max_round_trips: u32,
}

/// Deterministic stand-in for a model-backed oracle.
///
/// Picks a tool from keywords in the latest user turn, then turns the tool
/// output into a final answer on the next round. Good enough to exercise the
/// full loop without network access.
struct KeywordOracle;

impl KeywordOracle {
    fn latest_user_text(request: &OracleRequest) -> &str {
        request
            .turns
            .iter()
            .rev()
            .find_map(|turn| match &turn.kind {
                TurnKind::User { text } => Some(text.as_str()),
                _ => None,
            })
            .unwrap_or_default()
    }

    fn latest_tool_output(request: &OracleRequest) -> Option<&Value> {
        request
            .turns
            .iter()
            .rev()
            .find_map(|turn| match &turn.kind {
                TurnKind::ToolResult { result } => Some(&result.outcome),
                _ => None,
            })
            .and_then(|outcome| match outcome {
                ToolOutcome::Success { output } => Some(output),
                ToolOutcome::Failure { .. } => None,
            })
    }

    fn pick_tool(text: &str) -> ToolCallRequest {
        let lowered = text.to_lowercase();
        if lowered.contains("сколько будет") {
            let expression = text
                .split_once("будет")
                .map(|(_, rest)| rest.trim())
                .unwrap_or(text);
            ToolCallRequest::from_value("calculate", json!({ "expression": expression }))
        } else if lowered.contains("похож") {
            let name = text.split_whitespace().last().unwrap_or_default();
            ToolCallRequest::from_value("find_similar_products", json!({ "name": name }))
        } else if lowered.contains("бесплат") {
            ToolCallRequest::from_value(
                "find_products_by_price_range",
                json!({ "min": 0, "max": 0 }),
            )
        } else {
            ToolCallRequest::from_value("list_products", json!({}))
        }
    }

    fn summarize(output: &Value) -> String {
        match output {
            Value::Array(items) => {
                let names: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("name").and_then(Value::as_str))
                    .take(5)
                    .collect();
                format!("Нашла {} позиций: {}", items.len(), names.join(", "))
            }
            Value::Number(n) => format!("Получилось {n}"),
            other => format!("Результат: {other}"),
        }
    }
}

#[async_trait]
impl OraclePort for KeywordOracle {
    async fn decide(&self, request: OracleRequest) -> AgentResult<OracleDecision> {
        if let Some(output) = Self::latest_tool_output(&request) {
            return Ok(OracleDecision::FinalAnswer {
                text: Self::summarize(output),
            });
        }
        let text = Self::latest_user_text(&request);
        Ok(OracleDecision::ToolCalls {
            calls: vec![Self::pick_tool(text)],
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .compact()
        .init();

    let cli = Cli::parse();

    let config = LoopConfig {
        max_round_trips: cli.max_round_trips,
        ..LoopConfig::default()
    };
    let agent = AgentBuilder::new(Arc::new(KeywordOracle))
        .config(config)
        .seed_starter_titles()
        .build()
        .await?;

    let session = agent.create_session(cli.owner);
    info!(session_id = %session.session_id, owner = %session.owner, "session ready");

    for message in [
        "покажи все игры",
        "сколько будет 199 * 3",
        "найди похожие на witcher",
    ] {
        let outcome = agent.handle_message(&session.session_id, message).await?;
        info!(
            status = ?outcome.status,
            round_trips = outcome.round_trips,
            tool_calls = outcome.tool_calls,
            answer = %outcome.answer,
            "turn complete"
        );
    }

    let history = agent.history(&session.session_id)?;
    info!(turns = history.len(), "conversation recorded");

    Ok(())
}
