//! External collaborators and the per-call host context
//!
//! The auction does not fetch prices, move tokens or decide who is an
//! operator. It calls out through these traits. Collaborator calls are
//! synchronous; any failure propagates and the host is expected to revert
//! the whole operation.

use auction_types::ids::{AccountId, AssetId};
use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, OracleError};
use crate::security::Role;

/// Fee the oracle charges per price query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeInfo {
    pub fee_token: AssetId,
    pub fee_amount: u128,
}

/// Reference price feed.
pub trait PriceOracle {
    /// Price of `asset` in quote units with 18 implied decimals.
    fn get_price(&mut self, asset: &AssetId) -> Result<u128, OracleError>;

    /// Fee owed before querying the price of `asset`.
    fn get_fee_info(&self, asset: &AssetId) -> Result<FeeInfo, OracleError>;

    /// Account allowed to collect query fees.
    fn fee_collector(&self) -> AccountId;
}

/// Token custody. Pulls land in, and pushes leave from, the auction's own
/// custody account.
pub trait ValueLedger {
    fn transfer_in(&mut self, token: &AssetId, from: &AccountId, amount: u128) -> Result<(), LedgerError>;

    fn transfer_out(&mut self, token: &AssetId, to: &AccountId, amount: u128) -> Result<(), LedgerError>;

    /// Allow `spender` to pull `amount` of `token` out of custody.
    fn approve(&mut self, token: &AssetId, spender: &AccountId, amount: u128) -> Result<(), LedgerError>;
}

/// Role check for administrative operations.
pub trait Permissions {
    fn is_authorized(&self, caller: &AccountId, role: Role) -> bool;
}

/// Everything an operation needs from its surrounding environment.
pub struct Host<'a> {
    pub oracle: &'a mut dyn PriceOracle,
    pub ledger: &'a mut dyn ValueLedger,
    pub permissions: &'a dyn Permissions,
    /// Unix seconds at which the call executes
    pub now: i64,
}

impl<'a> Host<'a> {
    pub fn new(
        oracle: &'a mut dyn PriceOracle,
        ledger: &'a mut dyn ValueLedger,
        permissions: &'a dyn Permissions,
        now: i64,
    ) -> Self {
        Self {
            oracle,
            ledger,
            permissions,
            now,
        }
    }
}
