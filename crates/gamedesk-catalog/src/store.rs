//! The row-store persistence boundary and its in-memory implementation.

use async_trait::async_trait;
use gamedesk_protocol::{Product, ProductDraft, ProductId, ToolError};
use parking_lot::RwLock;

/// Predicate used for filtered reads.
pub type RowPredicate = Box<dyn Fn(&Product) -> bool + Send + Sync>;

/// Narrow persistence port consumed by the catalog store: create one row,
/// read every row, read rows matching a predicate. Rows come back in
/// insertion order.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Insert a row and assign the next unique id. Serialized internally so
    /// concurrent inserts never collide on id assignment.
    async fn insert(&self, draft: ProductDraft) -> Result<Product, ToolError>;

    async fn all(&self) -> Result<Vec<Product>, ToolError>;

    async fn matching(&self, predicate: RowPredicate) -> Result<Vec<Product>, ToolError>;
}

#[derive(Debug, Default)]
struct Rows {
    next_id: u64,
    rows: Vec<Product>,
}

/// In-memory row store. The write lock is the single-writer discipline:
/// id assignment and the append happen under one exclusive section, while
/// reads take a shared snapshot.
#[derive(Debug, Default)]
pub struct MemoryRowStore {
    inner: RwLock<Rows>,
}

impl MemoryRowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RowStore for MemoryRowStore {
    async fn insert(&self, draft: ProductDraft) -> Result<Product, ToolError> {
        let mut inner = self.inner.write();
        inner.next_id += 1;
        let product = Product {
            id: ProductId(inner.next_id),
            name: draft.name,
            genre: draft.genre,
            platform: draft.platform,
            price: draft.price,
            featured: draft.featured,
        };
        inner.rows.push(product.clone());
        Ok(product)
    }

    async fn all(&self) -> Result<Vec<Product>, ToolError> {
        Ok(self.inner.read().rows.clone())
    }

    async fn matching(&self, predicate: RowPredicate) -> Result<Vec<Product>, ToolError> {
        Ok(self
            .inner
            .read()
            .rows
            .iter()
            .filter(|row| predicate(row))
            .cloned()
            .collect())
    }
}
