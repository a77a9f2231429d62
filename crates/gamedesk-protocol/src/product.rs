//! Product record and creation draft.

use crate::ids::ProductId;
use serde::{Deserialize, Serialize};

/// A catalog product.
///
/// Invariants (enforced by the catalog store on creation): `id` is unique
/// across the store's lifetime, `name` is non-empty after trimming, and
/// `price` is non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub genre: String,
    pub platform: String,
    pub price: f64,
    #[serde(default)]
    pub featured: bool,
}

/// Fields for a product before the store assigns an id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub genre: String,
    pub platform: String,
    pub price: f64,
    #[serde(default)]
    pub featured: bool,
}

impl ProductDraft {
    pub fn new(
        name: impl Into<String>,
        genre: impl Into<String>,
        platform: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            name: name.into(),
            genre: genre.into(),
            platform: platform.into(),
            price,
            featured: false,
        }
    }

    pub fn featured(mut self, featured: bool) -> Self {
        self.featured = featured;
        self
    }
}
