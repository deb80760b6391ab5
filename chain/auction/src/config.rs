//! Auction configuration
//!
//! `AuctionConfig` describes one ledger; `PairConfig` describes a buy/sell
//! pair over the same assets and derives both ledger configs. Both load from
//! JSON and fall back to defaults for omitted fields.

use auction_types::ids::AssetId;
use auction_types::order::Side;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Configuration for a single batch-auction ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuctionConfig {
    /// Side whose orders this ledger queues
    pub side: Side,
    /// Synthetic asset being traded; the oracle prices this asset
    pub base_asset: AssetId,
    /// Asset prices are quoted in
    pub quote_asset: AssetId,
    /// Smallest passive order accepted, in the deposit asset
    pub min_order_size: u128,
    /// Whether the ledger starts paused
    pub start_paused: bool,
}

impl Default for AuctionConfig {
    fn default() -> Self {
        Self {
            side: Side::Sell,
            base_asset: AssetId::new("SYNTH"),
            quote_asset: AssetId::new("USD"),
            min_order_size: 1,
            start_paused: false,
        }
    }
}

impl AuctionConfig {
    pub fn new(side: Side, base_asset: AssetId, quote_asset: AssetId) -> Self {
        Self {
            side,
            base_asset,
            quote_asset,
            ..Self::default()
        }
    }

    pub fn with_min_order_size(mut self, min_order_size: u128) -> Self {
        self.min_order_size = min_order_size;
        self
    }

    pub fn paused(mut self, start_paused: bool) -> Self {
        self.start_paused = start_paused;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_asset.is_empty() || self.quote_asset.is_empty() {
            return Err(ValidationError::InvalidConfig {
                reason: "asset symbols must be non-empty".to_string(),
            });
        }
        if self.base_asset == self.quote_asset {
            return Err(ValidationError::InvalidConfig {
                reason: format!("base and quote are both {}", self.base_asset),
            });
        }
        if self.min_order_size == 0 {
            return Err(ValidationError::InvalidConfig {
                reason: "min_order_size must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Asset passive orders on this ledger deposit (and cancellations refund).
    pub fn deposit_asset(&self) -> &AssetId {
        match self.side {
            Side::Sell => &self.base_asset,
            Side::Buy => &self.quote_asset,
        }
    }

    /// Asset passive orders on this ledger are paid in (and takers pay with).
    pub fn proceeds_asset(&self) -> &AssetId {
        match self.side {
            Side::Sell => &self.quote_asset,
            Side::Buy => &self.base_asset,
        }
    }
}

/// Configuration for a buy/sell ledger pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairConfig {
    pub base_asset: AssetId,
    pub quote_asset: AssetId,
    /// Minimum passive size on the sell ledger, in base units
    pub min_sell_size: u128,
    /// Minimum passive size on the buy ledger, in quote units
    pub min_buy_size: u128,
    pub start_paused: bool,
}

impl Default for PairConfig {
    fn default() -> Self {
        let ledger = AuctionConfig::default();
        Self {
            base_asset: ledger.base_asset,
            quote_asset: ledger.quote_asset,
            min_sell_size: 1,
            min_buy_size: 1,
            start_paused: false,
        }
    }
}

impl PairConfig {
    pub fn new(base_asset: AssetId, quote_asset: AssetId) -> Self {
        Self {
            base_asset,
            quote_asset,
            ..Self::default()
        }
    }

    /// Config of the ledger queuing `side`.
    pub fn ledger(&self, side: Side) -> AuctionConfig {
        let min_order_size = match side {
            Side::Sell => self.min_sell_size,
            Side::Buy => self.min_buy_size,
        };
        AuctionConfig::new(side, self.base_asset.clone(), self.quote_asset.clone())
            .with_min_order_size(min_order_size)
            .paused(self.start_paused)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AuctionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_same_assets_rejected() {
        let config = AuctionConfig::new(Side::Buy, AssetId::new("USD"), AssetId::new("usd"));
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_zero_minimum_rejected() {
        let config = AuctionConfig::default().with_min_order_size(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deposit_and_proceeds_assets() {
        let sell = AuctionConfig::new(Side::Sell, AssetId::new("SBTC"), AssetId::new("USDC"));
        assert_eq!(sell.deposit_asset().as_str(), "SBTC");
        assert_eq!(sell.proceeds_asset().as_str(), "USDC");

        let buy = AuctionConfig { side: Side::Buy, ..sell };
        assert_eq!(buy.deposit_asset().as_str(), "USDC");
        assert_eq!(buy.proceeds_asset().as_str(), "SBTC");
    }

    #[test]
    fn test_config_from_json_with_defaults() {
        let json = r#"{ "side": "BUY", "base_asset": "SBTC", "min_order_size": 10 }"#;
        let config: AuctionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.side, Side::Buy);
        assert_eq!(config.base_asset, AssetId::new("SBTC"));
        assert_eq!(config.quote_asset, AssetId::new("USD"));
        assert_eq!(config.min_order_size, 10);
        assert!(!config.start_paused);
    }

    #[test]
    fn test_pair_derives_ledger_configs() {
        let pair = PairConfig {
            min_sell_size: 5,
            min_buy_size: 100,
            ..PairConfig::new(AssetId::new("SBTC"), AssetId::new("USDC"))
        };
        let buy = pair.ledger(Side::Buy);
        assert_eq!(buy.side, Side::Buy);
        assert_eq!(buy.min_order_size, 100);
        assert_eq!(pair.ledger(Side::Sell).min_order_size, 5);
    }
}
