use crate::domain::account::Amount;
use crate::domain::order::CartItem;
use crate::error::{OrderError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl<S: Into<String>> From<S> for ProductId {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A catalog entry: the authoritative price and the stock counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    /// Unit price in minor currency units.
    pub price: Amount,
    /// Units in stock.
    pub quantity: u32,
}

impl Product {
    pub fn new(id: impl Into<ProductId>, price: Amount, quantity: u32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            price,
            quantity,
        }
    }

    /// Removes `requested` units from stock, refusing to go below zero.
    pub fn consume(&mut self, requested: u32) -> Result<()> {
        self.quantity = self.remaining_after(requested)?;
        Ok(())
    }

    /// Stock left after taking `requested` units, without mutating.
    pub fn remaining_after(&self, requested: u32) -> Result<u32> {
        self.quantity
            .checked_sub(requested)
            .ok_or_else(|| OrderError::InsufficientStock {
                product: self.id.clone(),
                available: self.quantity,
                requested,
            })
    }
}

/// A point-in-time snapshot of the catalog keyed by product id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: HashMap<ProductId, Product>,
}

impl Catalog {
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.get(id)
    }
}

impl FromIterator<Product> for Catalog {
    fn from_iter<I: IntoIterator<Item = Product>>(iter: I) -> Self {
        Self {
            products: iter.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }
}

/// Works out the post-order state of every product an order touches.
///
/// Quantities for the same product are summed first, so a cart listing a product twice
/// is checked against its stock once. Nothing is written; the caller persists the
/// returned products only if the whole plan succeeds.
pub fn plan_consumption<F>(items: &[CartItem], mut lookup: F) -> Result<Vec<Product>>
where
    F: FnMut(&ProductId) -> Result<Option<Product>>,
{
    let mut requested: BTreeMap<&ProductId, u32> = BTreeMap::new();
    for item in items {
        let total = requested.entry(&item.product).or_default();
        *total = total.checked_add(item.quantity).ok_or_else(|| {
            OrderError::ValidationError(format!("Quantity overflow for {}", item.product))
        })?;
    }

    requested
        .into_iter()
        .map(|(id, quantity)| -> Result<Product> {
            let mut product = lookup(id)?.ok_or_else(|| OrderError::InvalidReference(id.clone()))?;
            product.consume(quantity)?;
            Ok(product)
        })
        .collect()
}
