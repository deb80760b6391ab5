//! Auction events
//!
//! Immutable records emitted by successful engine operations, appended to
//! the engine's event log in call order.

use auction_types::ids::AccountId;
use auction_types::order::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Passive order queued on a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderQueued {
    pub index: u64,
    pub owner: AccountId,
    pub side: Side,
    pub size: u128,
    pub cumulative_end: u128,
}

/// Taker order matched at the reference price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderMatched {
    pub taker: AccountId,
    pub side: Side,
    /// Ledger volume filled
    pub matched: u128,
    /// Amount the taker paid in
    pub paid: u128,
    /// Part of the submitted size rejected by the cap
    pub excess: u128,
    pub price: Decimal,
    /// Fill cursor after the match
    pub cursor: u128,
}

/// Part or all of an open order cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelled {
    pub index: u64,
    pub owner: AccountId,
    pub amount: u128,
    pub total_cancelled: u128,
    /// Whether the owner's open-order slot was released
    pub released: bool,
}

/// Filled volume converted to proceeds and paid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProceedsClaimed {
    pub index: u64,
    pub owner: AccountId,
    /// Ledger volume settled by this claim
    pub volume: u128,
    pub proceeds: u128,
    pub average_price: Decimal,
}

/// Trading paused or resumed by an operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingToggled {
    pub by: AccountId,
    pub paused: bool,
}

/// Enum wrapper for all auction events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionEvent {
    OrderQueued(OrderQueued),
    OrderMatched(OrderMatched),
    OrderCancelled(OrderCancelled),
    ProceedsClaimed(ProceedsClaimed),
    TradingToggled(TradingToggled),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_queued_serialization() {
        let event = OrderQueued {
            index: 1,
            owner: AccountId::new(),
            side: Side::Sell,
            size: 500,
            cumulative_end: 500,
        };
        let json = serde_json::to_string(&event).unwrap();
        let deser: OrderQueued = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deser);
    }

    #[test]
    fn test_order_matched_serialization() {
        let event = AuctionEvent::OrderMatched(OrderMatched {
            taker: AccountId::new(),
            side: Side::Buy,
            matched: 250,
            paid: 500,
            excess: 0,
            price: Decimal::new(2, 0),
            cursor: 250,
        });
        let json = serde_json::to_string(&event).unwrap();
        let deser: AuctionEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deser);
    }

    #[test]
    fn test_event_enum_variant() {
        let event = AuctionEvent::TradingToggled(TradingToggled {
            by: AccountId::new(),
            paused: true,
        });
        assert!(matches!(event, AuctionEvent::TradingToggled(TradingToggled { paused: true, .. })));
    }
}
