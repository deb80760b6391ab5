//! Cancellation ledger — per-order cancelled volume
//!
//! Cancelling never touches the order ledger: cumulative ends stay where they
//! are and the cancelled amount is kept here as "phantom volume" at the tail
//! of the order's slice. Records are chained in ascending order index and the
//! indices are recorded in a [`PredecessorIndex`], so "the record at or before
//! order i" is a digit walk rather than a scan.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::{AuctionError, StateConflict, ValidationError};
use crate::orders::OrderSpan;
use crate::predecessor::PredecessorIndex;

/// Arena handle of a cancellation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(usize);

/// Cumulative cancellation of one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationRecord {
    pub order_index: u64,
    /// Cumulative end of the cancelled order
    pub order_end: u128,
    pub amount_cancelled: u128,
    /// Time of the most recent amendment
    pub timestamp: i64,
    pub prev: Option<RecordId>,
    pub next: Option<RecordId>,
}

impl CancellationRecord {
    /// Where the order's phantom volume begins.
    pub fn live_end(&self) -> u128 {
        self.order_end - self.amount_cancelled
    }
}

#[derive(Debug, Default)]
pub struct CancellationLedger {
    records: Vec<CancellationRecord>,
    by_order: HashMap<u64, RecordId>,
    index: PredecessorIndex,
    head: Option<RecordId>,
    total_cancelled: u128,
}

impl CancellationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel `amount` more of the order at `span`.
    ///
    /// Amends the order's record if it has one, otherwise links a new record
    /// after its predecessor. Returns the order's cumulative cancelled amount.
    pub fn cancel(&mut self, span: &OrderSpan, amount: u128, timestamp: i64) -> Result<u128, AuctionError> {
        if amount == 0 {
            return Err(ValidationError::ZeroSize.into());
        }

        let key = u128::from(span.index);
        let predecessor = self.index.predecessor(key);
        let existing = if predecessor == key {
            self.by_order.get(&span.index).copied()
        } else {
            None
        };

        let already = existing.map_or(0, |id| self.records[id.0].amount_cancelled);
        let remaining = span.size() - already;
        if amount > remaining {
            return Err(StateConflict::OverCancel {
                index: span.index,
                requested: amount,
                remaining,
            }
            .into());
        }

        let total = already + amount;
        match existing {
            Some(id) => {
                let record = &mut self.records[id.0];
                record.amount_cancelled = total;
                record.timestamp = timestamp;
            }
            None => self.link_new(span, total, timestamp, predecessor),
        }
        self.total_cancelled += amount;
        Ok(total)
    }

    fn link_new(&mut self, span: &OrderSpan, amount: u128, timestamp: i64, predecessor: u128) {
        let id = RecordId(self.records.len());
        let prev = match predecessor {
            0 => None,
            key => u64::try_from(key).ok().and_then(|index| self.by_order.get(&index).copied()),
        };
        let next = match prev {
            Some(prev) => self.records[prev.0].next,
            None => self.head,
        };

        self.records.push(CancellationRecord {
            order_index: span.index,
            order_end: span.end,
            amount_cancelled: amount,
            timestamp,
            prev,
            next,
        });
        match prev {
            Some(prev) => self.records[prev.0].next = Some(id),
            None => self.head = Some(id),
        }
        if let Some(next) = next {
            self.records[next.0].prev = Some(id);
        }
        self.by_order.insert(span.index, id);
        self.index.insert(u128::from(span.index));
    }

    /// Cancelled volume of orders `..=order_index` whose slice still extends
    /// past `cursor`.
    ///
    /// Walks backward from the nearest record at or before `order_index` and
    /// stops at the first order the cursor has fully passed.
    pub fn total_cancelled_since(&self, cursor: u128, order_index: u64) -> u128 {
        let mut total = 0;
        let mut current = self.record_at_or_before(order_index);
        while let Some(id) = current {
            let record = &self.records[id.0];
            if record.order_end <= cursor {
                break;
            }
            total += record.amount_cancelled;
            current = record.prev;
        }
        total
    }

    /// Earliest record at or before `order_index` whose order still extends
    /// past `cursor`. Walking `next` from it visits every such record.
    pub fn first_pending_since(&self, cursor: u128, order_index: u64) -> Option<RecordId> {
        let mut found = None;
        let mut current = self.record_at_or_before(order_index);
        while let Some(id) = current {
            let record = &self.records[id.0];
            if record.order_end <= cursor {
                break;
            }
            found = Some(id);
            current = record.prev;
        }
        found
    }

    /// Cumulative cancelled amount of one order.
    pub fn cancelled(&self, order_index: u64) -> u128 {
        self.by_order
            .get(&order_index)
            .map_or(0, |id| self.records[id.0].amount_cancelled)
    }

    pub fn record(&self, id: RecordId) -> Option<&CancellationRecord> {
        self.records.get(id.0)
    }

    /// Records in ascending order index.
    pub fn records(&self) -> impl Iterator<Item = &CancellationRecord> + '_ {
        std::iter::successors(self.head.map(|id| &self.records[id.0]), move |record| {
            record.next.map(|id| &self.records[id.0])
        })
    }

    /// Cancelled volume across every order.
    pub fn total_cancelled(&self) -> u128 {
        self.total_cancelled
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn record_at_or_before(&self, order_index: u64) -> Option<RecordId> {
        match self.index.predecessor(u128::from(order_index)) {
            0 => None,
            key => u64::try_from(key)
                .ok()
                .and_then(|index| self.by_order.get(&index).copied()),
        }
    }
}
