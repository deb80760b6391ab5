//! Fixed-price oracle
//!
//! A [`PriceOracle`] whose prices are set by hand. Useful for tests and
//! simulations where the reference price must be deterministic.

use auction_types::ids::{AccountId, AssetId};
use auction_types::numeric::PRICE_DECIMALS;
use std::collections::HashMap;

use crate::errors::OracleError;
use crate::host::{FeeInfo, PriceOracle};

#[derive(Debug, Clone)]
pub struct FixedPriceOracle {
    /// Prices with 18 implied decimals
    prices: HashMap<AssetId, u128>,
    fee: Option<FeeInfo>,
    collector: AccountId,
    queries: u64,
}

impl FixedPriceOracle {
    pub fn new(collector: AccountId) -> Self {
        Self {
            prices: HashMap::new(),
            fee: None,
            collector,
            queries: 0,
        }
    }

    /// Publish a raw price with 18 implied decimals.
    pub fn set_price(&mut self, asset: AssetId, raw: u128) {
        self.prices.insert(asset, raw);
    }

    /// Publish a price as a whole number of quote units per base unit.
    pub fn set_whole_price(&mut self, asset: AssetId, units: u64) {
        self.set_price(asset, u128::from(units) * 10u128.pow(PRICE_DECIMALS));
    }

    /// Charge `fee_amount` of `fee_token` per query.
    pub fn set_fee(&mut self, fee_token: AssetId, fee_amount: u128) {
        self.fee = Some(FeeInfo {
            fee_token,
            fee_amount,
        });
    }

    /// Stop publishing `asset`.
    pub fn clear_price(&mut self, asset: &AssetId) {
        self.prices.remove(asset);
    }

    /// Number of successful price queries served.
    pub fn queries(&self) -> u64 {
        self.queries
    }
}

impl PriceOracle for FixedPriceOracle {
    fn get_price(&mut self, asset: &AssetId) -> Result<u128, OracleError> {
        let price = self
            .prices
            .get(asset)
            .copied()
            .ok_or_else(|| OracleError::PriceNotSet {
                asset: asset.to_string(),
            })?;
        self.queries += 1;
        Ok(price)
    }

    fn get_fee_info(&self, asset: &AssetId) -> Result<FeeInfo, OracleError> {
        Ok(self.fee.clone().unwrap_or_else(|| FeeInfo {
            fee_token: asset.clone(),
            fee_amount: 0,
        }))
    }

    fn fee_collector(&self) -> AccountId {
        self.collector
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_price_scaling() {
        let mut oracle = FixedPriceOracle::new(AccountId::new());
        let asset = AssetId::new("SBTC");
        oracle.set_whole_price(asset.clone(), 2);
        assert_eq!(oracle.get_price(&asset).unwrap(), 2_000_000_000_000_000_000);
        assert_eq!(oracle.queries(), 1);
    }

    #[test]
    fn test_missing_price() {
        let mut oracle = FixedPriceOracle::new(AccountId::new());
        let asset = AssetId::new("SBTC");
        oracle.set_whole_price(asset.clone(), 2);
        oracle.clear_price(&asset);
        assert_eq!(
            oracle.get_price(&asset),
            Err(OracleError::PriceNotSet {
                asset: "SBTC".to_string()
            })
        );
        assert_eq!(oracle.queries(), 0);
    }

    #[test]
    fn test_fee_defaults_to_zero() {
        let oracle = FixedPriceOracle::new(AccountId::new());
        let fee = oracle.get_fee_info(&AssetId::new("SBTC")).unwrap();
        assert_eq!(fee.fee_amount, 0);
    }

    #[test]
    fn test_configured_fee() {
        let mut oracle = FixedPriceOracle::new(AccountId::new());
        oracle.set_fee(AssetId::new("LINK"), 3);
        let fee = oracle.get_fee_info(&AssetId::new("SBTC")).unwrap();
        assert_eq!(fee.fee_token, AssetId::new("LINK"));
        assert_eq!(fee.fee_amount, 3);
    }
}
