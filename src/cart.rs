use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::Product;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("please select a size for {0}")]
    SizeRequired(String),
    #[error("size {size} is not offered for {product}")]
    UnknownSize { product: String, size: String },
    #[error("no cart line for {0}")]
    MissingLine(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub name: String,
    pub price_cents: u32,
    #[serde(default)]
    pub size: Option<String>,
    pub quantity: u32,
}

impl CartItem {
    pub fn line_total_cents(&self) -> u64 {
        u64::from(self.price_cents) * u64::from(self.quantity)
    }

    fn is_line(&self, id: &str, size: Option<&str>) -> bool {
        self.id == id && self.size.as_deref() == size
    }
}

/// Cart lines keyed by (product id, size). Quantities never drop below 1;
/// a line that would reach 0 is removed instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a cart from stored lines, dropping zero-quantity rows and
    /// merging repeats of the same (id, size).
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut cart = Cart::new();
        for item in items {
            if item.quantity == 0 {
                continue;
            }
            match cart
                .items
                .iter_mut()
                .find(|line| line.is_line(&item.id, item.size.as_deref()))
            {
                Some(line) => line.quantity = line.quantity.saturating_add(item.quantity),
                None => cart.items.push(item),
            }
        }
        cart
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn add(&mut self, product: &Product, size: Option<&str>) -> Result<&CartItem, CartError> {
        let size = size.map(str::trim).filter(|s| !s.is_empty());
        let size = match (product.sizes.is_empty(), size) {
            (true, _) => None,
            (false, None) => return Err(CartError::SizeRequired(product.name.clone())),
            (false, Some(size)) => {
                if !product.sizes.iter().any(|s| s == size) {
                    return Err(CartError::UnknownSize {
                        product: product.name.clone(),
                        size: size.to_string(),
                    });
                }
                Some(size)
            }
        };

        let idx = match self
            .items
            .iter()
            .position(|line| line.is_line(&product.id, size))
        {
            Some(idx) => {
                self.items[idx].quantity = self.items[idx].quantity.saturating_add(1);
                idx
            }
            None => {
                self.items.push(CartItem {
                    id: product.id.clone(),
                    name: product.name.clone(),
                    price_cents: product.price_cents,
                    size: size.map(str::to_string),
                    quantity: 1,
                });
                self.items.len() - 1
            }
        };
        Ok(&self.items[idx])
    }

    /// Adjusts a line by `delta`. Returns the new quantity, or `None` when
    /// the line was removed.
    pub fn change_quantity(
        &mut self,
        id: &str,
        size: Option<&str>,
        delta: i64,
    ) -> Result<Option<u32>, CartError> {
        let idx = self
            .items
            .iter()
            .position(|line| line.is_line(id, size))
            .ok_or_else(|| CartError::MissingLine(id.to_string()))?;
        let next = i64::from(self.items[idx].quantity).saturating_add(delta);
        if next <= 0 {
            self.items.remove(idx);
            return Ok(None);
        }
        let next = u32::try_from(next).unwrap_or(u32::MAX);
        self.items[idx].quantity = next;
        Ok(Some(next))
    }

    pub fn remove(&mut self, id: &str, size: Option<&str>) -> Result<CartItem, CartError> {
        let idx = self
            .items
            .iter()
            .position(|line| line.is_line(id, size))
            .ok_or_else(|| CartError::MissingLine(id.to_string()))?;
        Ok(self.items.remove(idx))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Total number of units, the figure shown on the cart badge.
    pub fn count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, line| acc.saturating_add(line.quantity))
    }

    pub fn total_cents(&self) -> u64 {
        self.items.iter().map(CartItem::line_total_cents).sum()
    }
}

pub fn format_price(cents: u64) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}
