//! Auction error types
//!
//! Three families, mirroring how a rejected call should be handled:
//! - `ValidationError`: the request itself is malformed or not permitted
//! - `StateConflict`: the request is well-formed but the ledger state refuses it
//! - `CollaboratorFailure`: an oracle or custody call failed mid-operation
//!
//! Validation and state conflicts are raised before any mutation or
//! collaborator call. Collaborator failures propagate unchanged; the host
//! environment reverts the enclosing operation.

use auction_types::errors::NumericError;
use thiserror::Error;

/// Top-level auction error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuctionError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("State conflict: {0}")]
    Conflict(#[from] StateConflict),

    #[error("Collaborator failure: {0}")]
    Collaborator(#[from] CollaboratorFailure),
}

impl From<NumericError> for AuctionError {
    fn from(err: NumericError) -> Self {
        AuctionError::Validation(ValidationError::Numeric(err))
    }
}

impl From<OracleError> for AuctionError {
    fn from(err: OracleError) -> Self {
        AuctionError::Collaborator(CollaboratorFailure::Oracle(err))
    }
}

impl From<LedgerError> for AuctionError {
    fn from(err: LedgerError) -> Self {
        AuctionError::Collaborator(CollaboratorFailure::Ledger(err))
    }
}

/// Malformed or unauthorized requests
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Order size must be positive")]
    ZeroSize,

    #[error("Order size {size} below minimum {minimum}")]
    BelowMinimum { size: u128, minimum: u128 },

    #[error("Unauthorized: {caller} lacks the {role} role")]
    Unauthorized { caller: String, role: String },

    #[error("Reference price must be positive, got {price}")]
    InvalidPrice { price: String },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Numeric error: {0}")]
    Numeric(#[from] NumericError),
}

/// Requests the current ledger state refuses
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateConflict {
    #[error("Trading is paused")]
    TradingPaused,

    #[error("Owner {owner} already has open order {index}")]
    DuplicateOrder { owner: String, index: u64 },

    #[error("Owner {owner} has no open order")]
    NoOpenOrder { owner: String },

    #[error("Order {index} has no unfilled volume left")]
    AlreadyFilled { index: u64 },

    #[error("Over-cancel on order {index}: requested {requested}, remaining {remaining}")]
    OverCancel {
        index: u64,
        requested: u128,
        remaining: u128,
    },

    #[error("Nothing to claim for order {index}")]
    NothingToClaim { index: u64 },

    #[error("No unfilled volume to match against")]
    NoLiquidity,

    #[error("Size {size} is too small to match at the reference price")]
    NothingToMatch { size: u128 },

    #[error("No execution price recorded for order {index}")]
    PriceUnavailable { index: u64 },
}

/// Failures raised by external collaborators
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollaboratorFailure {
    #[error("Oracle: {0}")]
    Oracle(#[from] OracleError),

    #[error("Ledger: {0}")]
    Ledger(#[from] LedgerError),
}

/// Price oracle errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    #[error("No price published for {asset}")]
    PriceNotSet { asset: String },
}

/// Value ledger (custody) errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Token not whitelisted: {token}")]
    TokenNotWhitelisted { token: String },

    #[error("Insufficient balance for {asset}: required {required}, available {available}")]
    InsufficientBalance {
        asset: String,
        required: u128,
        available: u128,
    },

    #[error("Transfer amount must be positive")]
    InvalidAmount,

    #[error("Unauthorized: caller is not admin")]
    Unauthorized,

    #[error("Arithmetic overflow in balance calculation")]
    Overflow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_conflict_display() {
        let err = StateConflict::OverCancel {
            index: 3,
            requested: 120,
            remaining: 100,
        };
        assert_eq!(
            err.to_string(),
            "Over-cancel on order 3: requested 120, remaining 100"
        );
    }

    #[test]
    fn test_auction_error_from_conflict() {
        let err: AuctionError = StateConflict::NothingToClaim { index: 7 }.into();
        assert!(matches!(err, AuctionError::Conflict(_)));
        assert!(err.to_string().contains("Nothing to claim"));
    }

    #[test]
    fn test_auction_error_from_ledger() {
        let err: AuctionError = LedgerError::Overflow.into();
        assert!(matches!(
            err,
            AuctionError::Collaborator(CollaboratorFailure::Ledger(LedgerError::Overflow))
        ));
    }

    #[test]
    fn test_auction_error_from_numeric() {
        let err: AuctionError = NumericError::Overflow {
            value: "1".to_string(),
        }
        .into();
        assert!(matches!(
            err,
            AuctionError::Validation(ValidationError::Numeric(_))
        ));
    }
}
