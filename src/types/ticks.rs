//! Tick quantization.
//!
//! Callers submit sizes and prices as integer "base units". A market's ticks
//! turn them into token quantities:
//!
//! ```text
//! amount0 = amount0_base * size_tick
//! amount1 = amount0 * price_base * price_tick / price_multiplier   (truncating)
//! ```
//!
//! Truncation only ever loses quote value; it never rounds up.
//!
//! ## Example
//!
//! ```
//! use tickbook::types::Ticks;
//!
//! // base token with 18 decimals, size tick 10^15, price tick 10^4
//! let ticks = Ticks::from_exponents(15, 4, 18).unwrap();
//! let (amount0, amount1) = ticks.quantize(2, 150).unwrap();
//! assert_eq!(amount0, 2_000_000_000_000_000u64.into());
//! assert_eq!(amount1, 3_000u64.into());
//! ```

use std::cmp::Ordering;

use primitive_types::U256;

use crate::error::{BookError, Result};

/// Largest accepted decimal exponent for ticks and decimals.
///
/// Keeps every intermediate product below 2^256.
pub const MAX_EXPONENT: u32 = 38;

/// Fixed quantization constants of one market.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticks {
    size_tick: U256,
    price_tick: U256,
    price_multiplier: U256,
}

impl Ticks {
    /// Build ticks from raw constants. Returns `None` if any is zero.
    pub fn new(size_tick: U256, price_tick: U256, price_multiplier: U256) -> Option<Self> {
        if size_tick.is_zero() || price_tick.is_zero() || price_multiplier.is_zero() {
            return None;
        }
        Some(Self {
            size_tick,
            price_tick,
            price_multiplier,
        })
    }

    /// Build ticks as powers of ten: `10^size_exp`, `10^price_exp`, and a
    /// multiplier of `10^base_decimals`.
    pub fn from_exponents(size_exp: u32, price_exp: u32, base_decimals: u32) -> Option<Self> {
        if size_exp > MAX_EXPONENT || price_exp > MAX_EXPONENT || base_decimals > MAX_EXPONENT {
            return None;
        }
        Self::new(pow10(size_exp), pow10(price_exp), pow10(base_decimals))
    }

    #[inline]
    pub fn size_tick(&self) -> U256 {
        self.size_tick
    }

    #[inline]
    pub fn price_tick(&self) -> U256 {
        self.price_tick
    }

    #[inline]
    pub fn price_multiplier(&self) -> U256 {
        self.price_multiplier
    }

    /// Convert base units into `(amount0, amount1)`.
    ///
    /// Fails with `InvalidQuantity` on a zero input, on overflow, or when the
    /// truncated quote amount is zero.
    pub fn quantize(&self, amount0_base: u64, price_base: u64) -> Result<(U256, U256)> {
        let invalid = || BookError::InvalidQuantity {
            amount0_base,
            price_base,
        };
        if amount0_base == 0 || price_base == 0 {
            return Err(invalid());
        }
        let amount0 = U256::from(amount0_base)
            .checked_mul(self.size_tick)
            .ok_or_else(invalid)?;
        let amount1 = self.quote_for(amount0, price_base).ok_or_else(invalid)?;
        if amount1.is_zero() {
            return Err(invalid());
        }
        Ok((amount0, amount1))
    }

    /// Quote amount for `amount0` at `price_base`, or `None` on overflow.
    pub fn quote_for(&self, amount0: U256, price_base: u64) -> Option<U256> {
        amount0
            .checked_mul(U256::from(price_base))?
            .checked_mul(self.price_tick)
            .map(|scaled| scaled / self.price_multiplier)
    }

    /// Compare `amount1` with the quote `amount0` quantizes to at
    /// `price_base`.
    ///
    /// An order quantized at `price_base` compares equal to that price even
    /// when truncation lowered its quote. An overflowing price compares as
    /// higher than any amount.
    pub fn cmp_quote_at(&self, amount0: U256, amount1: U256, price_base: u64) -> Ordering {
        match self.quote_for(amount0, price_base) {
            Some(quote) => amount1.cmp(&quote),
            None => Ordering::Less,
        }
    }
}

fn pow10(exp: u32) -> U256 {
    U256::from(10u64).pow(U256::from(exp))
}
