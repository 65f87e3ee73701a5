// Product Catalog
//
// Ordered table of product identifier -> product status, plus the
// fresh-identifier policy used when products are created.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Identifier of a catalog entry.
///
/// Scale assumption: identifiers are allocated densely from zero, so a
/// machine would need 2^64 live products before this type overflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductId(pub u64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable product definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub price: Money,
}

impl Product {
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

/// A product together with its stock level and purchase counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductStatus {
    pub product: Product,
    pub stock: u64,
    pub purchases: u64,
}

impl ProductStatus {
    pub fn new(product: Product) -> Self {
        Self {
            product,
            stock: 0,
            purchases: 0,
        }
    }

    /// Replace the stock level. Negative counts clamp to zero.
    pub fn with_stock(&self, stock: i64) -> Self {
        Self {
            stock: stock.max(0) as u64,
            ..self.clone()
        }
    }

    pub fn with_purchases(&self, purchases: u64) -> Self {
        Self {
            purchases,
            ..self.clone()
        }
    }

    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Serialized shape of one catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogRow {
    pub id: ProductId,
    pub product: Product,
    pub stock: u64,
    pub purchases: u64,
}

/// A stored catalog listed the same identifier twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("duplicate product id {0} in catalog record")]
pub struct DuplicateProductId(pub ProductId);

/// Catalog table, ordered by identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CatalogRow>", into = "Vec<CatalogRow>")]
pub struct Catalog {
    entries: BTreeMap<ProductId, ProductStatus>,
}

impl TryFrom<Vec<CatalogRow>> for Catalog {
    type Error = DuplicateProductId;

    fn try_from(rows: Vec<CatalogRow>) -> Result<Self, Self::Error> {
        let mut entries = BTreeMap::new();
        for row in rows {
            let status = ProductStatus {
                product: row.product,
                stock: row.stock,
                purchases: row.purchases,
            };
            if entries.insert(row.id, status).is_some() {
                return Err(DuplicateProductId(row.id));
            }
        }
        Ok(Self { entries })
    }
}

impl From<Catalog> for Vec<CatalogRow> {
    fn from(catalog: Catalog) -> Self {
        catalog
            .entries
            .into_iter()
            .map(|(id, status)| CatalogRow {
                id,
                product: status.product,
                stock: status.stock,
                purchases: status.purchases,
            })
            .collect()
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ProductId) -> Option<&ProductStatus> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Insert or replace the status stored under `id`.
    pub fn insert(&mut self, id: ProductId, status: ProductStatus) -> Option<ProductStatus> {
        self.entries.insert(id, status)
    }

    pub fn remove(&mut self, id: ProductId) -> Option<ProductStatus> {
        self.entries.remove(&id)
    }

    /// Entries in ascending identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (ProductId, &ProductStatus)> {
        self.entries.iter().map(|(id, status)| (*id, status))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Smallest identifier not currently in use, scanning up from zero.
    ///
    /// Deleted identifiers become eligible again as soon as they are the
    /// lowest gap. Returns `None` only if the whole `u64` range is taken.
    pub fn fresh_id(&self) -> Option<ProductId> {
        let mut candidate: u64 = 0;
        // Keys iterate in ascending order, so the first gap is the answer.
        for id in self.entries.keys() {
            if id.0 != candidate {
                break;
            }
            candidate = candidate.checked_add(1)?;
        }
        Some(ProductId(candidate))
    }
}
