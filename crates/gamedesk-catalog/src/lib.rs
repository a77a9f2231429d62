//! # gamedesk-catalog — product store and query engine
//!
//! [`CatalogStore`] owns the product records behind a narrow [`RowStore`]
//! port and exposes the validated mutator plus the filtered queries the tool
//! layer binds to. Matching policy for name/genre/platform is deliberately
//! plain — case-insensitive substring — so behavior stays testable and
//! reproducible (a query for "RPG games" matches genre "RPG").
//!
//! Every query is a pure read against a snapshot; `create` is the only
//! mutator and the row store serializes it.

pub mod seed;
pub mod store;

pub use seed::seed_catalog;
pub use store::{MemoryRowStore, RowPredicate, RowStore};

use gamedesk_protocol::{Product, ProductDraft, ToolError};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct CatalogStore {
    rows: Arc<dyn RowStore>,
}

impl CatalogStore {
    pub fn new(rows: Arc<dyn RowStore>) -> Self {
        Self { rows }
    }

    /// Catalog backed by a fresh in-memory row store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryRowStore::new()))
    }

    /// Validate and persist a new product; returns the stored record with its
    /// assigned id.
    pub async fn create(&self, draft: ProductDraft) -> Result<Product, ToolError> {
        if draft.name.trim().is_empty() {
            return Err(ToolError::validation("name", "must not be empty"));
        }
        if !draft.price.is_finite() || draft.price < 0.0 {
            return Err(ToolError::validation("price", "must be non-negative"));
        }

        let product = self.rows.insert(draft).await?;
        debug!(id = %product.id, name = %product.name, "product created");
        Ok(product)
    }

    /// All records in insertion order; empty store yields an empty sequence.
    pub async fn get_all(&self) -> Result<Vec<Product>, ToolError> {
        self.rows.all().await
    }

    /// Case-insensitive substring match on name.
    pub async fn find_by_name(&self, fragment: &str) -> Result<Vec<Product>, ToolError> {
        let needle = fragment.to_lowercase();
        self.rows
            .matching(Box::new(move |p| p.name.to_lowercase().contains(&needle)))
            .await
    }

    /// Case-insensitive substring match on genre.
    pub async fn find_by_category(&self, genre: &str) -> Result<Vec<Product>, ToolError> {
        let needle = genre.to_lowercase();
        self.rows
            .matching(Box::new(move |p| {
                p.genre.to_lowercase().contains(&needle)
            }))
            .await
    }

    /// Case-insensitive substring match on platform.
    pub async fn find_by_platform(&self, platform: &str) -> Result<Vec<Product>, ToolError> {
        let needle = platform.to_lowercase();
        self.rows
            .matching(Box::new(move |p| {
                p.platform.to_lowercase().contains(&needle)
            }))
            .await
    }

    /// Records with `min <= price <= max`, inclusive on both bounds.
    pub async fn find_by_price_range(
        &self,
        min: f64,
        max: f64,
    ) -> Result<Vec<Product>, ToolError> {
        if min > max {
            return Err(ToolError::validation(
                "min",
                format!("minimum {min} exceeds maximum {max}"),
            ));
        }
        self.rows
            .matching(Box::new(move |p| p.price >= min && p.price <= max))
            .await
    }

    /// Records flagged for curated recommendations.
    pub async fn find_featured(&self) -> Result<Vec<Product>, ToolError> {
        self.rows.matching(Box::new(|p| p.featured)).await
    }

    /// Records sharing both genre and platform with the reference product,
    /// excluding the reference itself, in insertion order.
    ///
    /// The reference is the first case-insensitive substring match on name;
    /// no match is a `NotFound` error so the oracle can name the failure.
    pub async fn find_similar(&self, reference_name: &str) -> Result<Vec<Product>, ToolError> {
        let needle = reference_name.to_lowercase();
        let rows = self.rows.all().await?;
        let reference = rows
            .iter()
            .find(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .ok_or_else(|| {
                ToolError::NotFound(format!("no product matching '{reference_name}'"))
            })?;

        let genre = reference.genre.to_lowercase();
        let platform = reference.platform.to_lowercase();
        Ok(rows
            .into_iter()
            .filter(|p| {
                p.id != reference.id
                    && p.genre.to_lowercase() == genre
                    && p.platform.to_lowercase() == platform
            })
            .collect())
    }
}
