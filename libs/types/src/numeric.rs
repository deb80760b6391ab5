//! Fixed-point helpers for prices and volumes
//!
//! Volumes and token amounts are `u128` counts of the smallest token unit.
//! Prices are `rust_decimal::Decimal` quote units per base unit. Oracles
//! publish prices as integers with [`PRICE_DECIMALS`] implied decimals.
//!
//! Every conversion names its rounding direction explicitly: amounts owed
//! to the auction round up, amounts paid out by it round down.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::NumericError;

/// Implied decimals of oracle-published prices.
pub const PRICE_DECIMALS: u32 = 18;

/// Rounding direction for decimal → integer conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rounding {
    /// Toward zero; used for amounts the auction pays out
    Down,
    /// Away from zero; used for amounts the auction collects
    Up,
}

/// Decode an oracle price carrying [`PRICE_DECIMALS`] implied decimals.
pub fn price_from_wad(raw: u128) -> Result<Decimal, NumericError> {
    let overflow = || NumericError::Overflow {
        value: raw.to_string(),
    };
    let mantissa = i128::try_from(raw).map_err(|_| overflow())?;
    let price = Decimal::try_from_i128_with_scale(mantissa, PRICE_DECIMALS)
        .map_err(|_| overflow())?
        .normalize();
    ensure_positive(price)?;
    Ok(price)
}

/// Lift an integer volume into decimal space.
pub fn to_decimal(volume: u128) -> Result<Decimal, NumericError> {
    Decimal::from_u128(volume).ok_or_else(|| NumericError::Overflow {
        value: volume.to_string(),
    })
}

/// Round a non-negative decimal back to an integer volume.
pub fn to_volume(value: Decimal, rounding: Rounding) -> Result<u128, NumericError> {
    let rounded = match rounding {
        Rounding::Down => value.floor(),
        Rounding::Up => value.ceil(),
    };
    rounded.to_u128().ok_or_else(|| NumericError::Overflow {
        value: value.to_string(),
    })
}

/// Quote amount worth `base` units at `price`.
pub fn quote_for_base(base: u128, price: Decimal, rounding: Rounding) -> Result<u128, NumericError> {
    ensure_positive(price)?;
    let value = to_decimal(base)?
        .checked_mul(price)
        .ok_or_else(|| NumericError::Overflow {
            value: format!("{base} * {price}"),
        })?;
    to_volume(value, rounding)
}

/// Base units purchasable with `quote` at `price`.
pub fn base_for_quote(quote: u128, price: Decimal, rounding: Rounding) -> Result<u128, NumericError> {
    ensure_positive(price)?;
    let value = to_decimal(quote)?
        .checked_div(price)
        .ok_or_else(|| NumericError::Overflow {
            value: format!("{quote} / {price}"),
        })?;
    to_volume(value, rounding)
}

fn ensure_positive(price: Decimal) -> Result<(), NumericError> {
    if price <= Decimal::ZERO {
        return Err(NumericError::NonPositivePrice {
            price: price.to_string(),
        });
    }
    Ok(())
}
