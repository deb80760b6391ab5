//! Auction pair — buy and sell ledgers over one market
//!
//! Routes an incoming order to the opposite side's ledger for immediate
//! matching and queues whatever the match leaves over on the caller's own
//! side. The excess is already denominated in the asset the caller pays,
//! which is exactly what their own-side ledger takes as deposit.

use auction_types::ids::AccountId;
use auction_types::order::Side;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PairConfig;
use crate::engine::{BatchAuction, CancelReceipt, ClaimReceipt, MatchReceipt, PlaceOutcome};
use crate::errors::AuctionError;
use crate::host::Host;

/// What happened to a routed order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RouteReceipt {
    /// Match against the opposite ledger, if any volume was available
    pub matched: Option<MatchReceipt>,
    /// Index of the passive order queued on the caller's own ledger
    pub queued: Option<u64>,
    /// Amount neither matched nor queued; it never left the caller
    pub returned: u128,
}

#[derive(Debug)]
pub struct AuctionPair {
    buy: BatchAuction,
    sell: BatchAuction,
}

impl AuctionPair {
    pub fn new(config: PairConfig) -> Result<Self, AuctionError> {
        Ok(Self {
            buy: BatchAuction::new(config.ledger(Side::Buy))?,
            sell: BatchAuction::new(config.ledger(Side::Sell))?,
        })
    }

    /// Ledger queuing orders of `side`.
    pub fn ledger(&self, side: Side) -> &BatchAuction {
        match side {
            Side::Buy => &self.buy,
            Side::Sell => &self.sell,
        }
    }

    pub fn ledger_mut(&mut self, side: Side) -> &mut BatchAuction {
        match side {
            Side::Buy => &mut self.buy,
            Side::Sell => &mut self.sell,
        }
    }

    /// Match against the opposite ledger, then queue the remainder.
    ///
    /// Any failure of the match fails the whole call, including an order too
    /// small to buy anything at the reference price. The oracle fee is paid
    /// by then and only the host's revert returns it.
    pub fn place_order(
        &mut self,
        host: &mut Host<'_>,
        caller: AccountId,
        side: Side,
        size: u128,
    ) -> Result<RouteReceipt, AuctionError> {
        let mut receipt = RouteReceipt::default();
        let mut remainder = size;

        let opposite = self.ledger_mut(side.opposite());
        if opposite.available_unfilled_volume() > 0 {
            match opposite.place_order(host, caller, side, size)? {
                PlaceOutcome::Matched(matched) => {
                    remainder = matched.excess;
                    receipt.matched = Some(matched);
                }
                PlaceOutcome::Queued { index } => {
                    receipt.queued = Some(index);
                    return Ok(receipt);
                }
            }
        }
        if remainder == 0 {
            return Ok(receipt);
        }

        let own = self.ledger_mut(side);
        let queueable = own.pending_order_info(&caller).is_none()
            && remainder >= own.config().min_order_size
            && !own.state().is_paused();
        if !queueable {
            debug!(%caller, %side, remainder, "Remainder returned unplaced");
            receipt.returned = remainder;
            return Ok(receipt);
        }

        if let PlaceOutcome::Queued { index } = own.place_order(host, caller, side, remainder)? {
            receipt.queued = Some(index);
        }
        Ok(receipt)
    }

    pub fn cancel_order(
        &mut self,
        host: &mut Host<'_>,
        caller: AccountId,
        side: Side,
        amount: u128,
        full: bool,
    ) -> Result<CancelReceipt, AuctionError> {
        self.ledger_mut(side).cancel_order(host, caller, amount, full)
    }

    pub fn claim(&mut self, host: &mut Host<'_>, caller: AccountId, side: Side) -> Result<ClaimReceipt, AuctionError> {
        self.ledger_mut(side).claim(host, caller)
    }

    /// Pause or resume both ledgers together.
    pub fn pause_trading(&mut self, host: &mut Host<'_>, caller: AccountId, paused: bool) -> Result<(), AuctionError> {
        self.buy.pause_trading(host, caller, paused)?;
        self.sell.pause_trading(host, caller, paused)
    }
}
