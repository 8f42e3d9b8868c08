//! Human-readable amounts and prices.
//!
//! ## Overview
//!
//! Clients speak in decimal strings ("0.5" WETH at "1850.25" USDC); the
//! engine speaks in base units. These helpers convert between the two with
//! `rust_decimal`, so no floating point is ever involved, and refuse any
//! value that is zero or not an exact multiple of the market's tick.
//!
//! ## Relationship to ticks
//!
//! For a human price `p`, `price_base * 10^price_tick_exp == p * 10^quote_decimals`,
//! which makes [`Ticks::quantize`](crate::types::Ticks::quantize) produce
//! `amount1 == p * amount0` in raw token units.
//!
//! ## Examples
//!
//! ```
//! use tickbook::types::units::{amount_base_from_human, price_base_from_human};
//!
//! // 0.5 of an 18-decimal token with a size tick of 10^15
//! assert_eq!(amount_base_from_human("0.5", 18, 15).unwrap(), 500);
//!
//! // 1850.25 of a 6-decimal quote token with a price tick of 10^4
//! assert_eq!(price_base_from_human("1850.25", 6, 4).unwrap(), 185_025);
//! ```

use std::str::FromStr;

use primitive_types::U256;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors from unit conversion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitsError {
    #[error("cannot parse decimal {0:?}")]
    Parse(String),

    #[error("value {0} must be positive")]
    NotPositive(String),

    #[error("value {value} is not a multiple of tick 10^{tick_exp}")]
    NotMultiple { value: String, tick_exp: u32 },

    #[error("value {0} is out of range")]
    OutOfRange(String),
}

/// `10^exp` as a decimal, or `None` past the 96-bit mantissa.
pub fn pow10(exp: u32) -> Option<Decimal> {
    let mut value = Decimal::ONE;
    for _ in 0..exp {
        value = value.checked_mul(Decimal::TEN)?;
    }
    Some(value)
}

fn parse_positive(s: &str) -> Result<Decimal, UnitsError> {
    let value = Decimal::from_str(s.trim()).map_err(|_| UnitsError::Parse(s.to_string()))?;
    if value <= Decimal::ZERO {
        return Err(UnitsError::NotPositive(s.to_string()));
    }
    Ok(value)
}

/// Scale `value` by `10^up / 10^down` and require an integral, positive result.
fn scale_exact(value: Decimal, up: u32, down: u32, raw: &str) -> Result<Decimal, UnitsError> {
    let out_of_range = || UnitsError::OutOfRange(raw.to_string());
    let scaled = value
        .checked_mul(pow10(up).ok_or_else(out_of_range)?)
        .ok_or_else(out_of_range)?;
    let based = scaled
        .checked_div(pow10(down).ok_or_else(out_of_range)?)
        .ok_or_else(out_of_range)?;
    if based.is_zero() || !based.fract().is_zero() {
        return Err(UnitsError::NotMultiple {
            value: raw.to_string(),
            tick_exp: down,
        });
    }
    Ok(based)
}

/// Raw token amount for a human-readable quantity.
///
/// ```
/// use tickbook::types::units::amount_from_human;
///
/// assert_eq!(amount_from_human("1.5", 6).unwrap(), 1_500_000u64.into());
/// assert!(amount_from_human("0.0000001", 6).is_err());
/// ```
pub fn amount_from_human(human: &str, decimals: u32) -> Result<U256, UnitsError> {
    let value = parse_positive(human)?;
    let raw = scale_exact(value, decimals, 0, human)?;
    raw.to_u128()
        .map(U256::from)
        .ok_or_else(|| UnitsError::OutOfRange(human.to_string()))
}

/// Size in base units: `human * 10^base_decimals / 10^size_tick_exp`.
pub fn amount_base_from_human(
    human: &str,
    base_decimals: u32,
    size_tick_exp: u32,
) -> Result<u64, UnitsError> {
    let value = parse_positive(human)?;
    scale_exact(value, base_decimals, size_tick_exp, human)?
        .to_u64()
        .ok_or_else(|| UnitsError::OutOfRange(human.to_string()))
}

/// Price in base units: `human * 10^quote_decimals / 10^price_tick_exp`.
pub fn price_base_from_human(
    human: &str,
    quote_decimals: u32,
    price_tick_exp: u32,
) -> Result<u64, UnitsError> {
    let value = parse_positive(human)?;
    scale_exact(value, quote_decimals, price_tick_exp, human)?
        .to_u64()
        .ok_or_else(|| UnitsError::OutOfRange(human.to_string()))
}

fn u256_to_decimal(value: U256) -> Option<Decimal> {
    let narrow: u128 = value.try_into().ok()?;
    let signed = i128::try_from(narrow).ok()?;
    Decimal::try_from_i128_with_scale(signed, 0).ok()
}

/// Human-readable quantity for a raw token amount.
///
/// ```
/// use tickbook::types::units::human_amount;
///
/// assert_eq!(human_amount(1_500_000u64.into(), 6).unwrap().to_string(), "1.5");
/// ```
pub fn human_amount(amount: U256, decimals: u32) -> Option<Decimal> {
    let value = u256_to_decimal(amount)?;
    Some(value.checked_div(pow10(decimals)?)?.normalize())
}

/// Human-readable price implied by a pair of raw amounts:
/// `(amount1 / 10^quote_decimals) / (amount0 / 10^base_decimals)`.
pub fn human_price(
    amount0: U256,
    amount1: U256,
    base_decimals: u32,
    quote_decimals: u32,
) -> Option<Decimal> {
    let base = human_amount(amount0, base_decimals)?;
    let quote = human_amount(amount1, quote_decimals)?;
    Some(quote.checked_div(base)?.normalize())
}

// ============================================================================
// Unit Tests
// ============================================================================
