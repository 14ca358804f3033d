//! Shopping cart.
//!
//! A cart is an ordered list of lines keyed by [`TShirtId`]. Adding a line
//! whose id is already present merges quantities instead of duplicating the
//! line. The total is derived on every call and never stored.
//!
//! Lines hold at most [`MAX_QUANTITY`] shirts, and a line is only accepted
//! when the cart total it produces is representable.

use serde::{Deserialize, Serialize};

use crate::types::{Money, TShirtId};

/// Most shirts a single line may hold.
pub const MAX_QUANTITY: u32 = 1000;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    #[error("Quantity must be at least 1")]
    ZeroQuantity,
    #[error("Quantity cannot be more than {MAX_QUANTITY}")]
    TooMany,
    #[error("Cart total is too large")]
    TotalTooLarge,
}

/// One line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: TShirtId,
    pub name: String,
    pub unit_price: Money,
    quantity: u32,
}

impl CartItem {
    /// # Errors
    ///
    /// Returns [`CartError::ZeroQuantity`] when `quantity` is 0,
    /// [`CartError::TooMany`] above [`MAX_QUANTITY`] and
    /// [`CartError::TotalTooLarge`] when the line total does not fit.
    pub fn new(
        id: TShirtId,
        name: impl Into<String>,
        unit_price: Money,
        quantity: u32,
    ) -> Result<Self, CartError> {
        if quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }
        if quantity > MAX_QUANTITY {
            return Err(CartError::TooMany);
        }
        unit_price
            .checked_times(quantity)
            .map_err(|_| CartError::TotalTooLarge)?;
        Ok(Self {
            id,
            name: name.into(),
            unit_price,
            quantity,
        })
    }

    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add a line, summing quantities if the id is already in the cart. The
    /// existing line keeps its name, price and position.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::TooMany`] when the merged quantity exceeds
    /// [`MAX_QUANTITY`] and [`CartError::TotalTooLarge`] when the new total
    /// does not fit. The cart is unchanged on error.
    pub fn add(&mut self, item: CartItem) -> Result<(), CartError> {
        let mut next = self.clone();
        if let Some(existing) = next.items.iter_mut().find(|i| i.id == item.id) {
            existing.quantity = existing
                .quantity
                .checked_add(item.quantity)
                .filter(|q| *q <= MAX_QUANTITY)
                .ok_or(CartError::TooMany)?;
        } else {
            next.items.push(item);
        }
        next.checked_total()?;
        *self = next;
        Ok(())
    }

    /// Remove the line with `id`. Returns whether a line was removed.
    pub fn remove(&mut self, id: TShirtId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn get(&self, id: TShirtId) -> Option<&CartItem> {
        self.items.iter().find(|i| i.id == id)
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Sum of price times quantity over every line.
    #[must_use]
    pub fn total(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    fn checked_total(&self) -> Result<Money, CartError> {
        self.items.iter().try_fold(Money::ZERO, |sum, item| {
            item.unit_price
                .checked_times(item.quantity)
                .and_then(|line| sum.checked_add(line))
                .map_err(|_| CartError::TotalTooLarge)
        })
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
