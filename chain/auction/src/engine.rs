//! Batch auction engine — one side's ledger
//!
//! A `BatchAuction` queues passive orders of its own side and matches takers
//! of the opposite side against them at the oracle's reference price:
//! - Placement appends to the order ledger (own side) or advances the fill
//!   cursor and records a tick (opposite side)
//! - Cancellation records phantom volume and refunds the deposit
//! - Claims convert filled volume to proceeds at the price of each fill it
//!   spans
//!
//! Every check that does not need the reference price runs before the first
//! collaborator call. Reading the price pays the oracle fee, so a match that
//! turns out too small fails after it and the host reverts the whole call.
//! Inbound transfers happen before state changes and outbound transfers
//! after them.

use auction_types::errors::NumericError;
use auction_types::ids::{AccountId, AssetId};
use auction_types::numeric::{base_for_quote, price_from_wad, quote_for_base, to_decimal, to_volume, Rounding};
use auction_types::order::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::cancellations::CancellationLedger;
use crate::config::AuctionConfig;
use crate::errors::{AuctionError, StateConflict, ValidationError};
use crate::events::{
    AuctionEvent, OrderCancelled, OrderMatched, OrderQueued, ProceedsClaimed, TradingToggled,
};
use crate::fills::FillLedger;
use crate::host::Host;
use crate::orders::OrderLedger;
use crate::security::{Role, TradingState};

/// Snapshot of one order's progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderInfo {
    pub index: u64,
    pub owner: AccountId,
    /// Cumulative position where the order begins
    pub start: u128,
    pub size: u128,
    pub cancelled: u128,
    pub filled: u128,
    pub claimed: u128,
    /// Whether the owner's open-order slot still points here
    pub open: bool,
}

impl OrderInfo {
    /// Volume neither filled nor cancelled.
    pub fn unfilled(&self) -> u128 {
        self.size
            .saturating_sub(self.cancelled)
            .saturating_sub(self.filled)
    }

    /// Filled volume not yet converted to proceeds.
    pub fn unclaimed(&self) -> u128 {
        self.filled.saturating_sub(self.claimed)
    }
}

/// Result of a taker match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchReceipt {
    /// Ledger volume filled and delivered to the taker
    pub matched: u128,
    /// Amount pulled from the taker, in the asset it pays
    pub paid: u128,
    /// Part of the submitted size not used, in the asset the taker pays
    pub excess: u128,
    pub price: Decimal,
}

/// Result of `place_order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaceOutcome {
    Queued { index: u64 },
    Matched(MatchReceipt),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelReceipt {
    pub index: u64,
    /// Deposit refunded by this call
    pub refunded: u128,
    pub total_cancelled: u128,
    /// Unclaimed proceeds settled because the order was released
    pub proceeds: u128,
    pub released: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimReceipt {
    pub index: u64,
    /// Filled volume settled by this claim
    pub volume: u128,
    pub proceeds: u128,
    pub average_price: Decimal,
    pub released: bool,
}

/// Batch-auction ledger for one side of a market.
#[derive(Debug)]
pub struct BatchAuction {
    config: AuctionConfig,
    state: TradingState,
    orders: OrderLedger,
    fills: FillLedger,
    cancellations: CancellationLedger,
    /// Filled volume already converted to proceeds, per order
    claimed: HashMap<u64, u128>,
    events: Vec<AuctionEvent>,
}

impl BatchAuction {
    pub fn new(config: AuctionConfig) -> Result<Self, AuctionError> {
        config.validate()?;
        info!(
            side = %config.side,
            base = %config.base_asset,
            quote = %config.quote_asset,
            min_order_size = config.min_order_size,
            "Batch auction ledger created"
        );
        Ok(Self {
            state: TradingState::from_paused(config.start_paused),
            config,
            orders: OrderLedger::new(),
            fills: FillLedger::new(),
            cancellations: CancellationLedger::new(),
            claimed: HashMap::new(),
            events: Vec::new(),
        })
    }

    // ───────────────────────── Placement ─────────────────────────

    /// Place an order of `size` on `side`.
    ///
    /// Orders of the ledger's own side are queued; orders of the opposite
    /// side match immediately against queued volume. `size` is denominated
    /// in the asset the caller pays in.
    pub fn place_order(
        &mut self,
        host: &mut Host<'_>,
        caller: AccountId,
        side: Side,
        size: u128,
    ) -> Result<PlaceOutcome, AuctionError> {
        if self.state.is_paused() {
            return Err(StateConflict::TradingPaused.into());
        }
        if size == 0 {
            return Err(ValidationError::ZeroSize.into());
        }

        if side == self.config.side {
            self.queue_order(host, caller, size)
                .map(|index| PlaceOutcome::Queued { index })
        } else {
            self.match_order(host, caller, size).map(PlaceOutcome::Matched)
        }
    }

    fn queue_order(&mut self, host: &mut Host<'_>, caller: AccountId, size: u128) -> Result<u64, AuctionError> {
        if size < self.config.min_order_size {
            return Err(ValidationError::BelowMinimum {
                size,
                minimum: self.config.min_order_size,
            }
            .into());
        }
        if let Some(index) = self.orders.open_order(&caller) {
            return Err(StateConflict::DuplicateOrder {
                owner: caller.to_string(),
                index,
            }
            .into());
        }
        if self.orders.end().checked_add(size).is_none() {
            return Err(NumericError::Overflow {
                value: format!("{} + {}", self.orders.end(), size),
            }
            .into());
        }

        // Pull the deposit
        let deposit = self.config.deposit_asset().clone();
        host.ledger.transfer_in(&deposit, &caller, size)?;

        let index = self.orders.place(caller, size, host.now)?;
        let cumulative_end = self.orders.end();
        debug!(index, owner = %caller, size, cumulative_end, "Order queued");

        self.events.push(AuctionEvent::OrderQueued(OrderQueued {
            index,
            owner: caller,
            side: self.config.side,
            size,
            cumulative_end,
        }));
        Ok(index)
    }

    fn match_order(&mut self, host: &mut Host<'_>, caller: AccountId, size: u128) -> Result<MatchReceipt, AuctionError> {
        let capacity = self.available_unfilled_volume();
        if capacity == 0 {
            return Err(StateConflict::NoLiquidity.into());
        }

        let price = self.reference_price(host, &caller)?;
        let wanted = self.from_proceeds(size, price, Rounding::Down)?;
        let matched = wanted.min(capacity);
        if matched == 0 {
            return Err(StateConflict::NothingToMatch { size }.into());
        }
        let paid = self.to_proceeds(matched, price, Rounding::Up)?.min(size);
        let excess = size - paid;

        // Pull the payment
        let proceeds_asset = self.config.proceeds_asset().clone();
        host.ledger.transfer_in(&proceeds_asset, &caller, paid)?;

        // Advance the cursor over matched and crossed phantom volume
        let from = self.fills.cursor();
        let to = self.advance_target(matched);
        let cursor = self.fills.record_fill(to - from, price, host.now)?;

        // Deliver the matched volume
        let deposit = self.config.deposit_asset().clone();
        host.ledger.transfer_out(&deposit, &caller, matched)?;

        if wanted > capacity {
            debug!(taker = %caller, wanted, capacity, excess, "Taker order capped");
        }
        debug!(taker = %caller, matched, paid, %price, cursor, "Order matched");

        self.events.push(AuctionEvent::OrderMatched(OrderMatched {
            taker: caller,
            side: self.config.side.opposite(),
            matched,
            paid,
            excess,
            price,
            cursor,
        }));
        Ok(MatchReceipt {
            matched,
            paid,
            excess,
            price,
        })
    }

    /// Pay the oracle fee on the taker's behalf and read the reference price.
    fn reference_price(&self, host: &mut Host<'_>, caller: &AccountId) -> Result<Decimal, AuctionError> {
        let asset = &self.config.base_asset;
        let fee = host.oracle.get_fee_info(asset)?;
        if fee.fee_amount > 0 {
            host.ledger.transfer_in(&fee.fee_token, caller, fee.fee_amount)?;
            let collector = host.oracle.fee_collector();
            host.ledger.approve(&fee.fee_token, &collector, fee.fee_amount)?;
            debug!(token = %fee.fee_token, amount = fee.fee_amount, "Oracle fee approved");
        }
        let raw = host.oracle.get_price(asset)?;
        Ok(price_from_wad(raw)?)
    }

    /// Cursor position after filling `volume` more live volume.
    ///
    /// Phantom volume lying in the way is crossed, so the result never lands
    /// strictly inside a cancelled region.
    fn advance_target(&self, volume: u128) -> u128 {
        let mut position = self.fills.cursor();
        let mut remaining = volume;
        let mut current = self
            .cancellations
            .first_pending_since(position, self.orders.len());
        while let Some(id) = current {
            let Some(record) = self.cancellations.record(id) else {
                break;
            };
            let gap = record.live_end().saturating_sub(position);
            if remaining < gap {
                break;
            }
            remaining -= gap;
            position = position.max(record.order_end);
            current = record.next;
        }
        position + remaining
    }

    // ───────────────────────── Cancellation ─────────────────────────

    /// Cancel `amount` of the caller's open order, or all of its unfilled
    /// remainder when `full` is set.
    pub fn cancel_order(
        &mut self,
        host: &mut Host<'_>,
        caller: AccountId,
        amount: u128,
        full: bool,
    ) -> Result<CancelReceipt, AuctionError> {
        let info = self.pending_order_info(&caller).ok_or_else(|| StateConflict::NoOpenOrder {
            owner: caller.to_string(),
        })?;
        let index = info.index;
        let open = info.unfilled();
        if open == 0 {
            return Err(StateConflict::AlreadyFilled { index }.into());
        }

        let amount = if full { open } else { amount };
        if amount == 0 {
            return Err(ValidationError::ZeroSize.into());
        }
        if amount > open {
            warn!(index, requested = amount, remaining = open, "Over-cancel rejected");
            return Err(StateConflict::OverCancel {
                index,
                requested: amount,
                remaining: open,
            }
            .into());
        }

        // Settle filled volume before the slot is released
        let released = full || amount == open;
        let proceeds = if released { self.claimable_proceeds(&info)? } else { 0 };

        let span = self
            .orders
            .span(index)
            .ok_or_else(|| StateConflict::NoOpenOrder {
                owner: caller.to_string(),
            })?;
        let total_cancelled = self.cancellations.cancel(&span, amount, host.now)?;
        if released {
            self.claimed.insert(index, info.filled);
            self.orders.release(&caller);
        }

        let deposit = self.config.deposit_asset().clone();
        host.ledger.transfer_out(&deposit, &caller, amount)?;
        if proceeds > 0 {
            let proceeds_asset = self.config.proceeds_asset().clone();
            host.ledger.transfer_out(&proceeds_asset, &caller, proceeds)?;
        }
        debug!(index, amount, total_cancelled, released, proceeds, "Order cancelled");

        self.events.push(AuctionEvent::OrderCancelled(OrderCancelled {
            index,
            owner: caller,
            amount,
            total_cancelled,
            released,
        }));
        Ok(CancelReceipt {
            index,
            refunded: amount,
            total_cancelled,
            proceeds,
            released,
        })
    }

    // ───────────────────────── Claims ─────────────────────────

    /// Convert the caller's newly filled volume to proceeds and pay them out.
    pub fn claim(&mut self, host: &mut Host<'_>, caller: AccountId) -> Result<ClaimReceipt, AuctionError> {
        let info = self.pending_order_info(&caller).ok_or_else(|| StateConflict::NoOpenOrder {
            owner: caller.to_string(),
        })?;
        let index = info.index;
        let volume = info.unclaimed();
        if volume == 0 {
            return Err(StateConflict::NothingToClaim { index }.into());
        }

        let Some((proceeds, average_price)) = self.settle_unclaimed(&info)? else {
            warn!(index, "No execution price over the claimable span");
            return Err(StateConflict::PriceUnavailable { index }.into());
        };

        self.claimed.insert(index, info.filled);
        let released = info.filled == info.size - info.cancelled;
        if released {
            self.orders.release(&caller);
        }

        if proceeds > 0 {
            let proceeds_asset = self.config.proceeds_asset().clone();
            host.ledger.transfer_out(&proceeds_asset, &caller, proceeds)?;
        }
        debug!(index, volume, proceeds, %average_price, released, "Proceeds claimed");

        self.events.push(AuctionEvent::ProceedsClaimed(ProceedsClaimed {
            index,
            owner: caller,
            volume,
            proceeds,
            average_price,
        }));
        Ok(ClaimReceipt {
            index,
            volume,
            proceeds,
            average_price,
            released,
        })
    }

    // ───────────────────────── Administration ─────────────────────────

    /// Pause or resume placements and matches. Operator-only.
    pub fn pause_trading(&mut self, host: &mut Host<'_>, caller: AccountId, paused: bool) -> Result<(), AuctionError> {
        if !host.permissions.is_authorized(&caller, Role::Operator) {
            warn!(%caller, "Unauthorized pause attempt");
            return Err(ValidationError::Unauthorized {
                caller: caller.to_string(),
                role: Role::Operator.to_string(),
            }
            .into());
        }

        self.state = TradingState::from_paused(paused);
        info!(side = %self.config.side, by = %caller, paused, "Trading state changed");
        self.events.push(AuctionEvent::TradingToggled(TradingToggled {
            by: caller,
            paused,
        }));
        Ok(())
    }

    // ───────────────────────── Queries ─────────────────────────

    pub fn order_info(&self, index: u64) -> Option<OrderInfo> {
        let order = self.orders.get(index)?;
        let span = self.orders.span(index)?;
        let cancelled = self.cancellations.cancelled(index);
        let live = span.size() - cancelled;
        let filled = self.fills.cursor().saturating_sub(span.start).min(live);
        Some(OrderInfo {
            index,
            owner: order.owner,
            start: span.start,
            size: span.size(),
            cancelled,
            filled,
            claimed: self.claimed.get(&index).copied().unwrap_or(0),
            open: self.orders.open_order(&order.owner) == Some(index),
        })
    }

    /// The owner's unresolved order on this ledger.
    pub fn pending_order_info(&self, owner: &AccountId) -> Option<OrderInfo> {
        self.orders
            .open_order(owner)
            .and_then(|index| self.order_info(index))
    }

    /// Base tokens the owner could get back: the unfilled remainder on a
    /// sell ledger, claimable proceeds on a buy ledger.
    pub fn available_tokens(&self, owner: &AccountId) -> Result<u128, AuctionError> {
        match self.config.side {
            Side::Sell => Ok(self.pending_order_info(owner).map_or(0, |info| info.unfilled())),
            Side::Buy => self.owner_proceeds(owner),
        }
    }

    /// Quote value the owner could get back: claimable proceeds on a sell
    /// ledger, the unfilled remainder on a buy ledger.
    pub fn available_dollar_value(&self, owner: &AccountId) -> Result<u128, AuctionError> {
        match self.config.side {
            Side::Sell => self.owner_proceeds(owner),
            Side::Buy => Ok(self.pending_order_info(owner).map_or(0, |info| info.unfilled())),
        }
    }

    /// Queued volume neither filled nor cancelled.
    pub fn available_unfilled_volume(&self) -> u128 {
        let cursor = self.fills.cursor();
        let phantom = self
            .cancellations
            .total_cancelled_since(cursor, self.orders.len());
        self.orders
            .end()
            .saturating_sub(cursor)
            .saturating_sub(phantom)
    }

    /// Volume-weighted price of fills over `[start, end)`; zero when the
    /// range is not fully priced.
    pub fn average_price(&self, start: u128, end: u128) -> Decimal {
        self.fills.average_price(start, end)
    }

    pub fn fill_cursor(&self) -> u128 {
        self.fills.cursor()
    }

    pub fn total_volume(&self) -> u128 {
        self.orders.end()
    }

    pub fn order_count(&self) -> u64 {
        self.orders.len()
    }

    pub fn state(&self) -> TradingState {
        self.state
    }

    pub fn side(&self) -> Side {
        self.config.side
    }

    pub fn config(&self) -> &AuctionConfig {
        &self.config
    }

    pub fn deposit_asset(&self) -> &AssetId {
        self.config.deposit_asset()
    }

    pub fn events(&self) -> &[AuctionEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<AuctionEvent> {
        std::mem::take(&mut self.events)
    }

    // ───────────────────────── Conversions ─────────────────────────

    fn owner_proceeds(&self, owner: &AccountId) -> Result<u128, AuctionError> {
        match self.pending_order_info(owner) {
            Some(info) => self.claimable_proceeds(&info),
            None => Ok(0),
        }
    }

    fn claimable_proceeds(&self, info: &OrderInfo) -> Result<u128, AuctionError> {
        if info.unclaimed() == 0 {
            return Ok(0);
        }
        Ok(self.settle_unclaimed(info)?.map_or(0, |(proceeds, _)| proceeds))
    }

    /// Proceeds owed for the unclaimed span of `info`, rounded down, and the
    /// execution price it settled at in quote per base.
    ///
    /// Each fill tick's share converts at that tick's own price, so a buy
    /// ledger pays out exactly the base its takers delivered rather than
    /// converting the whole span at the mean price. `None` when the span is
    /// not fully priced.
    fn settle_unclaimed(&self, info: &OrderInfo) -> Result<Option<(u128, Decimal)>, AuctionError> {
        let side = self.config.side;
        let value = self.fills.span_value(
            info.start + info.claimed,
            info.start + info.filled,
            |overlap, price| match side {
                Side::Sell => overlap.checked_mul(price),
                Side::Buy => overlap.checked_div(price),
            },
        );
        let Some(value) = value.filter(|value| *value > Decimal::ZERO) else {
            return Ok(None);
        };

        let volume = to_decimal(info.unclaimed())?;
        let price = match side {
            Side::Sell => value.checked_div(volume),
            Side::Buy => volume.checked_div(value),
        }
        .ok_or_else(|| NumericError::Overflow {
            value: format!("{volume} / {value}"),
        })?;
        Ok(Some((to_volume(value, Rounding::Down)?, price)))
    }

    /// Ledger volume → amount of the proceeds asset.
    fn to_proceeds(&self, volume: u128, price: Decimal, rounding: Rounding) -> Result<u128, NumericError> {
        match self.config.side {
            Side::Sell => quote_for_base(volume, price, rounding),
            Side::Buy => base_for_quote(volume, price, rounding),
        }
    }

    /// Amount of the proceeds asset → ledger volume.
    fn from_proceeds(&self, amount: u128, price: Decimal, rounding: Rounding) -> Result<u128, NumericError> {
        match self.config.side {
            Side::Sell => base_for_quote(amount, price, rounding),
            Side::Buy => quote_for_base(amount, price, rounding),
        }
    }
}
