//! Fill ledger — price-tagged ticks over the fill cursor
//!
//! Every match advances the fill cursor and leaves one tick at the new cursor
//! value. A tick at position `p` with size `s` priced the volume `[p - s, p)`.
//! Ticks form an ascending doubly linked chain held in an arena; the tick
//! positions are also recorded in a [`PredecessorIndex`] so a price query can
//! jump straight to the tick covering its start instead of walking the chain
//! from the head.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

use auction_types::errors::NumericError;
use auction_types::numeric::to_decimal;

use crate::errors::{AuctionError, ValidationError};
use crate::predecessor::PredecessorIndex;

/// Arena handle of a fill tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickId(usize);

/// Volume filled at one reference price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillTick {
    /// Fill cursor value right after this fill
    pub position: u128,
    pub size: u128,
    pub price: Decimal,
    pub timestamp: i64,
    pub prev: Option<TickId>,
    pub next: Option<TickId>,
}

impl FillTick {
    /// First position this tick priced.
    pub fn start(&self) -> u128 {
        self.position - self.size
    }
}

#[derive(Debug, Default)]
pub struct FillLedger {
    ticks: Vec<FillTick>,
    by_position: HashMap<u128, TickId>,
    index: PredecessorIndex,
    cursor: u128,
    head: Option<TickId>,
    tail: Option<TickId>,
}

impl FillLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the cursor by `size` and record the fill at `price`.
    ///
    /// Returns the new cursor value, which is also the tick's position.
    pub fn record_fill(&mut self, size: u128, price: Decimal, timestamp: i64) -> Result<u128, AuctionError> {
        if size == 0 {
            return Err(ValidationError::ZeroSize.into());
        }
        if price <= Decimal::ZERO {
            return Err(ValidationError::InvalidPrice {
                price: price.to_string(),
            }
            .into());
        }
        let position = self.cursor.checked_add(size).ok_or_else(|| {
            ValidationError::Numeric(NumericError::Overflow {
                value: format!("{} + {}", self.cursor, size),
            })
        })?;

        let id = TickId(self.ticks.len());
        self.ticks.push(FillTick {
            position,
            size,
            price,
            timestamp,
            prev: self.tail,
            next: None,
        });
        match self.tail {
            Some(tail) => self.ticks[tail.0].next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.by_position.insert(position, id);
        self.index.insert(position);
        self.cursor = position;
        Ok(position)
    }

    /// Volume-weighted price of `[start, end)`.
    ///
    /// Returns `Decimal::ZERO` when no tick overlaps the range or when the
    /// recorded ticks stop short of `end`; a zero result never means a
    /// zero price.
    pub fn average_price(&self, start: u128, end: u128) -> Decimal {
        self.fold_span(start, end, |overlap, price| overlap.checked_mul(price))
            .and_then(|(volume, weighted)| weighted.checked_div(to_decimal(volume).ok()?))
            .unwrap_or(Decimal::ZERO)
    }

    /// Value of `[start, end)` with each tick's overlap converted at that
    /// tick's own price by `convert(overlap, price)`.
    ///
    /// `None` under the same conditions that make [`average_price`] zero,
    /// or when a conversion overflows.
    ///
    /// [`average_price`]: FillLedger::average_price
    pub fn span_value<F>(&self, start: u128, end: u128, convert: F) -> Option<Decimal>
    where
        F: Fn(Decimal, Decimal) -> Option<Decimal>,
    {
        self.fold_span(start, end, convert).map(|(_, value)| value)
    }

    /// Covered volume and summed converted value of `[start, end)`.
    fn fold_span<F>(&self, start: u128, end: u128, convert: F) -> Option<(u128, Decimal)>
    where
        F: Fn(Decimal, Decimal) -> Option<Decimal>,
    {
        if start >= end {
            return None;
        }

        let mut current = match self.index.predecessor(start) {
            0 => self.head,
            position => self.by_position.get(&position).copied(),
        };

        let mut volume = 0u128;
        let mut total = Decimal::ZERO;
        let mut covered = false;
        while let Some(id) = current {
            let tick = &self.ticks[id.0];
            let lo = tick.start().max(start);
            let hi = tick.position.min(end);
            if hi > lo {
                volume += hi - lo;
                match to_decimal(hi - lo)
                    .ok()
                    .and_then(|overlap| convert(overlap, tick.price))
                    .and_then(|value| total.checked_add(value))
                {
                    Some(sum) => total = sum,
                    None => {
                        warn!(start, end, position = tick.position, "Span value overflowed");
                        return None;
                    }
                }
            }
            if tick.position >= end {
                covered = true;
                break;
            }
            current = tick.next;
        }

        (covered && volume > 0).then_some((volume, total))
    }

    /// Current fill cursor.
    pub fn cursor(&self) -> u128 {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    pub fn tick(&self, id: TickId) -> Option<&FillTick> {
        self.ticks.get(id.0)
    }

    /// Tick recorded exactly at `position`.
    pub fn tick_at(&self, position: u128) -> Option<&FillTick> {
        self.by_position.get(&position).map(|id| &self.ticks[id.0])
    }

    /// Ticks in ascending position order.
    pub fn ticks(&self) -> impl Iterator<Item = &FillTick> + '_ {
        std::iter::successors(self.head.map(|id| &self.ticks[id.0]), move |tick| {
            tick.next.map(|id| &self.ticks[id.0])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(units: i64, scale: u32) -> Decimal {
        Decimal::new(units, scale)
    }

    #[test]
    fn test_single_tick_covers_range() {
        let mut fills = FillLedger::new();
        fills.record_fill(250, price(2, 0), 1).unwrap();

        assert_eq!(fills.cursor(), 250);
        assert_eq!(fills.average_price(0, 250), price(2, 0));
        assert_eq!(fills.average_price(100, 200), price(2, 0));
    }

    #[test]
    fn test_range_past_last_tick_is_sentinel() {
        let mut fills = FillLedger::new();
        fills.record_fill(250, price(2, 0), 1).unwrap();
        assert_eq!(fills.average_price(0, 300), Decimal::ZERO);
        assert_eq!(fills.average_price(260, 300), Decimal::ZERO);
    }

    #[test]
    fn test_weighted_across_ticks() {
        let mut fills = FillLedger::new();
        fills.record_fill(100, price(1, 0), 1).unwrap();
        fills.record_fill(100, price(3, 0), 2).unwrap();

        // 50 @ 1 + 100 @ 3 over 150
        let avg = fills.average_price(50, 200);
        assert_eq!(avg.round_dp(10), (Decimal::from(350) / Decimal::from(150)).round_dp(10));
        assert_eq!(fills.average_price(0, 200), price(2, 0));
    }

    #[test]
    fn test_query_starting_inside_tick() {
        let mut fills = FillLedger::new();
        fills.record_fill(100, price(1, 0), 1).unwrap();
        fills.record_fill(100, price(5, 0), 2).unwrap();
        fills.record_fill(100, price(9, 0), 3).unwrap();

        assert_eq!(fills.average_price(150, 200), price(5, 0));
        assert_eq!(fills.average_price(100, 200), price(5, 0));
        assert_eq!(fills.average_price(150, 250), price(7, 0));
    }

    #[test]
    fn test_empty_ledger_and_empty_range() {
        let mut fills = FillLedger::new();
        assert_eq!(fills.average_price(0, 10), Decimal::ZERO);
        fills.record_fill(10, price(4, 0), 1).unwrap();
        assert_eq!(fills.average_price(5, 5), Decimal::ZERO);
    }

    #[test]
    fn test_chain_links_and_lookup() {
        let mut fills = FillLedger::new();
        fills.record_fill(10, price(1, 0), 1).unwrap();
        fills.record_fill(20, price(2, 0), 2).unwrap();

        let positions: Vec<u128> = fills.ticks().map(|t| t.position).collect();
        assert_eq!(positions, vec![10, 30]);
        let second = fills.tick_at(30).unwrap();
        assert_eq!(second.start(), 10);
        assert!(second.prev.is_some());
        assert!(second.next.is_none());
    }

    #[test]
    fn test_rejects_zero_size_and_price() {
        let mut fills = FillLedger::new();
        assert!(fills.record_fill(0, price(1, 0), 1).is_err());
        assert!(fills.record_fill(5, Decimal::ZERO, 1).is_err());
        assert!(fills.is_empty());
        assert_eq!(fills.cursor(), 0);
    }

    #[test]
    fn test_span_value_converts_each_tick_at_its_own_price() {
        let mut fills = FillLedger::new();
        fills.record_fill(100, price(1, 0), 1).unwrap();
        fills.record_fill(100, price(4, 0), 2).unwrap();

        let per_unit = |overlap: Decimal, p: Decimal| overlap.checked_div(p);
        // 100 / 1 + 100 / 4, not 200 / 2.5
        assert_eq!(fills.span_value(0, 200, per_unit), Some(Decimal::from(125)));
        assert_eq!(fills.span_value(150, 200, per_unit), Some(Decimal::new(125, 1)));
        assert_eq!(fills.span_value(0, 250, per_unit), None);
        assert_eq!(fills.span_value(50, 50, per_unit), None);
    }
}
