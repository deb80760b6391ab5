//! Order ledger — append-only cumulative volume record
//!
//! Orders are stored once and never moved. Each order keeps only the running
//! total of all volume queued up to and including itself, so an order's size
//! and start fall out of two neighbouring entries and placement costs O(1)
//! regardless of how many orders exist.

use auction_types::errors::NumericError;
use auction_types::ids::AccountId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::{AuctionError, StateConflict, ValidationError};

/// A placed order. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// 1-based position in placement order
    pub index: u64,
    pub owner: AccountId,
    /// Sum of the sizes of orders `1..=index`
    pub cumulative_end: u128,
    pub placed_at: i64,
}

/// The slice `[start, end)` of cumulative volume an order occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSpan {
    pub index: u64,
    pub start: u128,
    pub end: u128,
}

impl OrderSpan {
    pub fn size(&self) -> u128 {
        self.end - self.start
    }
}

/// Append-only order record plus the owner → open order pointer.
#[derive(Debug, Default)]
pub struct OrderLedger {
    /// Arena: order `i` lives at position `i - 1`
    orders: Vec<Order>,
    /// Owners with an unresolved order on this ledger
    open: HashMap<AccountId, u64>,
}

impl OrderLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an order of `size` for `owner` and return its index.
    ///
    /// Rejects a second unresolved order for the same owner.
    pub fn place(&mut self, owner: AccountId, size: u128, placed_at: i64) -> Result<u64, AuctionError> {
        if let Some(&index) = self.open.get(&owner) {
            return Err(StateConflict::DuplicateOrder {
                owner: owner.to_string(),
                index,
            }
            .into());
        }
        if size == 0 {
            return Err(ValidationError::ZeroSize.into());
        }

        let cumulative_end = self.end().checked_add(size).ok_or_else(|| {
            ValidationError::Numeric(NumericError::Overflow {
                value: format!("{} + {}", self.end(), size),
            })
        })?;

        let index = self.len() + 1;
        self.orders.push(Order {
            index,
            owner,
            cumulative_end,
            placed_at,
        });
        self.open.insert(owner, index);
        Ok(index)
    }

    /// Total volume ever queued on this ledger.
    pub fn end(&self) -> u128 {
        self.orders.last().map_or(0, |order| order.cumulative_end)
    }

    /// Number of orders ever placed.
    pub fn len(&self) -> u64 {
        self.orders.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn get(&self, index: u64) -> Option<&Order> {
        let slot = usize::try_from(index.checked_sub(1)?).ok()?;
        self.orders.get(slot)
    }

    /// Running total before `index`; `cumulative_end(0)` is zero.
    pub fn cumulative_end(&self, index: u64) -> u128 {
        if index == 0 {
            return 0;
        }
        self.get(index).map_or(0, |order| order.cumulative_end)
    }

    /// Size of order `index`, zero for unknown indices.
    pub fn order_size(&self, index: u64) -> u128 {
        self.span(index).map_or(0, |span| span.size())
    }

    pub fn span(&self, index: u64) -> Option<OrderSpan> {
        let order = self.get(index)?;
        Some(OrderSpan {
            index,
            start: self.cumulative_end(index - 1),
            end: order.cumulative_end,
        })
    }

    /// Index of the owner's unresolved order, if any.
    pub fn open_order(&self, owner: &AccountId) -> Option<u64> {
        self.open.get(owner).copied()
    }

    /// Clear the owner's open pointer once their order is fully resolved.
    pub fn release(&mut self, owner: &AccountId) -> Option<u64> {
        self.open.remove(owner)
    }
}
