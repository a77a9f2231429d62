//! # gamedesk-tools — tool registry and dispatch
//!
//! The set of valid tools is a closed enum ([`ToolKind`]), one variant per
//! operation, so tool resolution is type-checked rather than discovered at
//! runtime; an unrecognized name from the oracle is the sole
//! [`AgentError::UnknownTool`] path. The registry is populated once at
//! startup and read-only afterwards.
//!
//! Dispatch reports tool failures as data
//! ([`ToolOutcome::Failure`](gamedesk_protocol::ToolOutcome::Failure)), never
//! as process-level errors: a single failed tool call must not abort the
//! conversation.

pub mod schema;

use gamedesk_catalog::CatalogStore;
use gamedesk_protocol::{
    AgentError, AgentResult, ProductDraft, ToolCallRequest, ToolCallResult, ToolDescriptor,
    ToolError,
};
use indexmap::IndexMap;
use schema::{Args, ParamSpec};
use serde_json::{Value, json};
use tracing::{instrument, warn};

/// The closed set of operations the oracle may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    ListProducts,
    FindProduct,
    FindByCategory,
    FindByPlatform,
    FindByPriceRange,
    AddProduct,
    ListFeatured,
    FindSimilar,
    Calculate,
}

impl ToolKind {
    pub const ALL: [ToolKind; 9] = [
        ToolKind::ListProducts,
        ToolKind::FindProduct,
        ToolKind::FindByCategory,
        ToolKind::FindByPlatform,
        ToolKind::FindByPriceRange,
        ToolKind::AddProduct,
        ToolKind::ListFeatured,
        ToolKind::FindSimilar,
        ToolKind::Calculate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::ListProducts => "list_products",
            ToolKind::FindProduct => "find_product",
            ToolKind::FindByCategory => "find_products_by_category",
            ToolKind::FindByPlatform => "find_products_by_platform",
            ToolKind::FindByPriceRange => "find_products_by_price_range",
            ToolKind::AddProduct => "add_product",
            ToolKind::ListFeatured => "list_featured_products",
            ToolKind::FindSimilar => "find_similar_products",
            ToolKind::Calculate => "calculate",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    fn description(self) -> &'static str {
        match self {
            ToolKind::ListProducts => "List every game in the catalog",
            ToolKind::FindProduct => "Find games by partial name match",
            ToolKind::FindByCategory => "Find games of a genre (RPG, Indie, Strategy, ...)",
            ToolKind::FindByPlatform => "Find games for a platform (PC, PlayStation, Switch, ...)",
            ToolKind::FindByPriceRange => "Find games priced within an inclusive range",
            ToolKind::AddProduct => "Add a new game to the catalog",
            ToolKind::ListFeatured => "List the featured (recommended) games",
            ToolKind::FindSimilar => "Find games sharing genre and platform with a named game",
            ToolKind::Calculate => "Safely evaluate an arithmetic expression",
        }
    }

    fn params(self) -> Vec<ParamSpec> {
        match self {
            ToolKind::ListProducts | ToolKind::ListFeatured => Vec::new(),
            ToolKind::FindProduct | ToolKind::FindSimilar => vec![ParamSpec::text("name")],
            ToolKind::FindByCategory => vec![ParamSpec::text("category")],
            ToolKind::FindByPlatform => vec![ParamSpec::text("platform")],
            ToolKind::FindByPriceRange => {
                vec![ParamSpec::number("min"), ParamSpec::number("max")]
            }
            ToolKind::AddProduct => vec![
                ParamSpec::text("name"),
                ParamSpec::non_negative_number("price"),
                ParamSpec::text("genre"),
                ParamSpec::text("platform"),
                ParamSpec::optional_boolean("featured"),
            ],
            ToolKind::Calculate => vec![ParamSpec::text("expression")],
        }
    }
}

/// Immutable registry binding the tool schemas to the catalog store and the
/// expression evaluator. Built once; `dispatch` never mutates it.
pub struct ToolRegistry {
    catalog: CatalogStore,
    specs: IndexMap<ToolKind, Vec<ParamSpec>>,
}

impl ToolRegistry {
    pub fn new(catalog: CatalogStore) -> Self {
        let specs = ToolKind::ALL
            .into_iter()
            .map(|kind| (kind, kind.params()))
            .collect();
        Self { catalog, specs }
    }

    /// Tool schemas as shown to the oracle, in registration order.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.specs
            .iter()
            .map(|(kind, params)| ToolDescriptor {
                name: kind.name().to_owned(),
                description: kind.description().to_owned(),
                parameters: params.iter().map(ParamSpec::descriptor).collect(),
            })
            .collect()
    }

    /// Resolve and run one tool-call request.
    ///
    /// The only `Err` is [`AgentError::UnknownTool`] — a protocol mismatch
    /// between oracle and registry. Everything else, validation failures
    /// included, comes back as a failed [`ToolCallResult`].
    #[instrument(skip(self, request), fields(tool = %request.tool, call_id = %request.call_id))]
    pub async fn dispatch(&self, request: &ToolCallRequest) -> AgentResult<ToolCallResult> {
        let kind = ToolKind::from_name(&request.tool)
            .ok_or_else(|| AgentError::UnknownTool(request.tool.clone()))?;
        let params = self
            .specs
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let args = match schema::validate(params, &request.arguments) {
            Ok(args) => args,
            Err(error) => {
                warn!(%error, "argument validation failed");
                return Ok(ToolCallResult::failure(
                    request.call_id.clone(),
                    &request.tool,
                    error.to_string(),
                ));
            }
        };

        let result = match self.run(kind, &args).await {
            Ok(output) => ToolCallResult::success(request.call_id.clone(), &request.tool, output),
            Err(error) => {
                warn!(%error, "tool handler failed");
                ToolCallResult::failure(request.call_id.clone(), &request.tool, error.to_string())
            }
        };
        Ok(result)
    }

    async fn run(&self, kind: ToolKind, args: &Args) -> Result<Value, ToolError> {
        match kind {
            ToolKind::ListProducts => encode(&self.catalog.get_all().await?),
            ToolKind::FindProduct => {
                encode(&self.catalog.find_by_name(args.text("name")?).await?)
            }
            ToolKind::FindByCategory => {
                encode(&self.catalog.find_by_category(args.text("category")?).await?)
            }
            ToolKind::FindByPlatform => {
                encode(&self.catalog.find_by_platform(args.text("platform")?).await?)
            }
            ToolKind::FindByPriceRange => encode(
                &self
                    .catalog
                    .find_by_price_range(args.number("min")?, args.number("max")?)
                    .await?,
            ),
            ToolKind::AddProduct => {
                let draft = ProductDraft::new(
                    args.text("name")?,
                    args.text("genre")?,
                    args.text("platform")?,
                    args.number("price")?,
                )
                .featured(args.bool_or("featured", false));
                encode(&self.catalog.create(draft).await?)
            }
            ToolKind::ListFeatured => encode(&self.catalog.find_featured().await?),
            ToolKind::FindSimilar => {
                encode(&self.catalog.find_similar(args.text("name")?).await?)
            }
            ToolKind::Calculate => {
                let value = gamedesk_eval::evaluate(args.text("expression")?)?;
                Ok(json!(value))
            }
        }
    }
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Value, ToolError> {
    // Product and Vec<Product> serialize infallibly.
    Ok(serde_json::to_value(value).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamedesk_protocol::ToolOutcome;
    use serde_json::json;

    async fn registry_with_samples() -> ToolRegistry {
        let catalog = CatalogStore::in_memory();
        for (name, genre, platform, price, featured) in [
            ("The Witcher 3: Wild Hunt", "RPG", "PC", 40.0, true),
            ("Dark Souls III", "RPG", "PC", 60.0, false),
            ("Hollow Knight", "Indie", "PC", 15.0, true),
            ("Hades", "Indie", "Switch", 25.0, false),
        ] {
            catalog
                .create(ProductDraft::new(name, genre, platform, price).featured(featured))
                .await
                .unwrap();
        }
        ToolRegistry::new(catalog)
    }

    fn request(tool: &str, arguments: Value) -> ToolCallRequest {
        ToolCallRequest::from_value(tool, arguments)
    }

    fn output(result: &ToolCallResult) -> Value {
        match &result.outcome {
            ToolOutcome::Success { output } => output.clone(),
            ToolOutcome::Failure { error } => panic!("expected success, got: {error}"),
        }
    }

    fn error(result: &ToolCallResult) -> String {
        match &result.outcome {
            ToolOutcome::Failure { error } => error.clone(),
            ToolOutcome::Success { output } => panic!("expected failure, got: {output}"),
        }
    }

    #[tokio::test]
    async fn unknown_tool_is_a_protocol_error() {
        let registry = registry_with_samples().await;
        let err = registry
            .dispatch(&request("drop_all_products", json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::UnknownTool(name) if name == "drop_all_products"));
    }

    #[tokio::test]
    async fn missing_required_parameter_fails_naming_it() {
        let registry = registry_with_samples().await;
        let result = registry
            .dispatch(&request("find_product", json!({})))
            .await
            .unwrap();
        assert!(!result.succeeded());
        assert!(error(&result).contains("'name'"));
    }

    #[tokio::test]
    async fn unknown_argument_is_rejected_before_the_handler() {
        let registry = registry_with_samples().await;
        let result = registry
            .dispatch(&request("list_products", json!({"sort": "price"})))
            .await
            .unwrap();
        assert!(!result.succeeded());
        assert!(error(&result).contains("'sort'"));
    }

    #[tokio::test]
    async fn list_and_search_tools_return_product_arrays() {
        let registry = registry_with_samples().await;

        let all = registry
            .dispatch(&request("list_products", json!({})))
            .await
            .unwrap();
        assert_eq!(output(&all).as_array().unwrap().len(), 4);

        let rpgs = registry
            .dispatch(&request("find_products_by_category", json!({"category": "rpg"})))
            .await
            .unwrap();
        assert_eq!(output(&rpgs).as_array().unwrap().len(), 2);

        let featured = registry
            .dispatch(&request("list_featured_products", json!({})))
            .await
            .unwrap();
        assert_eq!(output(&featured).as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn price_range_coerces_quoted_numbers_and_validates_bounds() {
        let registry = registry_with_samples().await;

        let hits = registry
            .dispatch(&request(
                "find_products_by_price_range",
                json!({"min": "10", "max": "30"}),
            ))
            .await
            .unwrap();
        assert_eq!(output(&hits).as_array().unwrap().len(), 2);

        let inverted = registry
            .dispatch(&request(
                "find_products_by_price_range",
                json!({"min": 50, "max": 10}),
            ))
            .await
            .unwrap();
        assert!(!inverted.succeeded());
    }

    #[tokio::test]
    async fn add_product_creates_and_returns_the_record() {
        let registry = registry_with_samples().await;
        let result = registry
            .dispatch(&request(
                "add_product",
                json!({"name": "Celeste", "price": 20, "genre": "Indie", "platform": "PC"}),
            ))
            .await
            .unwrap();
        let created = output(&result);
        assert_eq!(created["name"], "Celeste");
        assert_eq!(created["featured"], false);
        assert!(created["id"].as_u64().unwrap() > 4);

        let negative = registry
            .dispatch(&request(
                "add_product",
                json!({"name": "Bad", "price": -3, "genre": "Indie", "platform": "PC"}),
            ))
            .await
            .unwrap();
        assert!(error(&negative).contains("'price'"));
    }

    #[tokio::test]
    async fn find_similar_matches_genre_and_platform() {
        let registry = registry_with_samples().await;
        let similar = registry
            .dispatch(&request("find_similar_products", json!({"name": "witcher"})))
            .await
            .unwrap();
        let rows = output(&similar);
        let names: Vec<_> = rows
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["Dark Souls III"]);

        let missing = registry
            .dispatch(&request("find_similar_products", json!({"name": "Bloodborne"})))
            .await
            .unwrap();
        assert!(error(&missing).contains("not found"));
    }

    #[tokio::test]
    async fn calculate_evaluates_and_reports_failures_as_data() {
        let registry = registry_with_samples().await;

        let ok = registry
            .dispatch(&request("calculate", json!({"expression": "199 * 3"})))
            .await
            .unwrap();
        assert_eq!(output(&ok), json!(597.0));

        let div_zero = registry
            .dispatch(&request("calculate", json!({"expression": "10 / 0"})))
            .await
            .unwrap();
        assert!(error(&div_zero).contains("arithmetic"));

        let unsafe_expr = registry
            .dispatch(&request(
                "calculate",
                json!({"expression": "__import__('os').system('ls')"}),
            ))
            .await
            .unwrap();
        assert!(error(&unsafe_expr).contains("unsafe"));
    }

    #[tokio::test]
    async fn descriptors_list_all_nine_tools_in_stable_order() {
        let registry = registry_with_samples().await;
        let descriptors = registry.descriptors();
        let names: Vec<_> = descriptors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "list_products",
                "find_product",
                "find_products_by_category",
                "find_products_by_platform",
                "find_products_by_price_range",
                "add_product",
                "list_featured_products",
                "find_similar_products",
                "calculate",
            ]
        );
        let add = &descriptors[5];
        assert_eq!(add.parameters.len(), 5);
        assert!(add.parameters.iter().any(|p| p.name == "featured" && !p.required));
    }
}
