//! # Prices
//!
//! Exact rational prices in raw token units, and the conversions between
//! human decimal prices, ticks and sqrt prices.
//!
//! A raw price is token1 smallest units per token0 smallest unit. A human
//! price is whole token1 per whole token0, so
//! `raw = human * 10^(token1_decimals - token0_decimals)`.

use core::cmp::Ordering;

use ethnum::U256;
use rust_decimal::Decimal;

use crate::constants::{MAX_DECIMAL_SCALE, MAX_TICK, MIN_TICK, Q128, Q192};
use crate::errors::{MathError, MathResult};
use crate::math::big_int::{cmp_fractions, isqrt, mul_div, mul_shr, pow10, Rounding};
use crate::math::tick_math::tick_to_sqrt_price_x96;

/// Largest mantissa a `Decimal` can hold, 2^96 - 1
const DECIMAL_MANTISSA_MAX: U256 = U256::from_words(0, (1u128 << 96) - 1);

/// Raw price as an exact fraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Price {
    pub numerator: U256,
    pub denominator: U256,
}

impl Price {
    pub fn new(numerator: U256, denominator: U256) -> MathResult<Self> {
        if denominator == U256::ZERO {
            return Err(MathError::DivisionByZero);
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Raw price from a human decimal price
    pub fn from_decimal(price: Decimal, token0_decimals: u8, token1_decimals: u8) -> MathResult<Self> {
        if price <= Decimal::ZERO {
            return Err(MathError::InvalidInput("price must be positive"));
        }

        // Positive and below 2^96
        let mantissa = U256::from(price.mantissa() as u128);
        let exponent = decimal_exponent(price, token0_decimals, token1_decimals);

        if exponent >= 0 {
            let scale = pow10(exponent as u32).ok_or(MathError::MathOverflow)?;
            let numerator = mantissa.checked_mul(scale).ok_or(MathError::MathOverflow)?;
            Self::new(numerator, U256::ONE)
        } else {
            let denominator = pow10(exponent.unsigned_abs()).ok_or(MathError::MathOverflow)?;
            Self::new(mantissa, denominator)
        }
    }

    /// Raw price at a tick, `1.0001^tick`, derived from the tick's sqrt price
    pub fn at_tick(tick: i32) -> MathResult<Self> {
        let sqrt = tick_to_sqrt_price_x96(tick)?;
        if sqrt <= U256::from(u128::MAX) {
            Self::new(sqrt * sqrt, Q192)
        } else {
            Self::new(mul_shr(sqrt, sqrt, 64)?, Q128)
        }
    }

    /// Human decimal price, truncated to the precision a `Decimal` can carry
    pub fn to_decimal(&self, token0_decimals: u8, token1_decimals: u8) -> MathResult<Decimal> {
        let shift = i32::from(token0_decimals) - i32::from(token1_decimals);

        for scale in (0..=MAX_DECIMAL_SCALE).rev() {
            let exponent = scale as i32 + shift;
            let quotient = if exponent >= 0 {
                let Some(factor) = pow10(exponent as u32) else {
                    continue;
                };
                match mul_div(self.numerator, factor, self.denominator, Rounding::Down) {
                    Ok(q) => q,
                    Err(MathError::MathOverflow) => continue,
                    Err(e) => return Err(e),
                }
            } else {
                let whole = self.numerator / self.denominator;
                match pow10(exponent.unsigned_abs()) {
                    Some(divisor) => whole / divisor,
                    None => U256::ZERO,
                }
            };

            if quotient <= DECIMAL_MANTISSA_MAX {
                let (_, lo) = quotient.into_words();
                let value = Decimal::try_from_i128_with_scale(lo as i128, scale)
                    .map_err(|_| MathError::MathOverflow)?;
                return Ok(value.normalize());
            }
        }

        Err(MathError::MathOverflow)
    }

    /// Price of token0 in token1 terms turned around
    pub fn invert(&self) -> MathResult<Self> {
        Self::new(self.denominator, self.numerator)
    }
}

impl PartialOrd for Price {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Price {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_fractions(self.numerator, self.denominator, other.numerator, other.denominator)
    }
}

fn decimal_exponent(price: Decimal, token0_decimals: u8, token1_decimals: u8) -> i32 {
    i32::from(token1_decimals) - i32::from(token0_decimals) - price.scale() as i32
}

/// Q64.96 sqrt of the ratio `amount1 / amount0`, used to seed a new pool.
///
/// Exact floor of `sqrt(amount1 / amount0) * 2^96` whenever
/// `amount1 * 2^192 / amount0` fits in 256 bits, since
/// `isqrt(floor(x)) == floor(sqrt(x))`. Larger ratios drop `2k` bits from
/// the quotient and shift the root back by `k`, with `k` as small as fits.
pub fn encode_sqrt_ratio_x96(amount1: U256, amount0: U256) -> MathResult<U256> {
    if amount0 == U256::ZERO {
        return Err(MathError::DivisionByZero);
    }
    if amount1 == U256::ZERO {
        return Ok(U256::ZERO);
    }

    match mul_div(amount1, Q192, amount0, Rounding::Down) {
        Ok(ratio) => return Ok(isqrt(ratio)),
        Err(MathError::MathOverflow) => {}
        Err(e) => return Err(e),
    }

    // amount1 / amount0 < 2^(spread + 1), so 2^(192 - 2k) times it fits
    // once 2k >= spread - 63
    let spread = i64::from(amount0.leading_zeros()) - i64::from(amount1.leading_zeros());
    let mut k = ((spread - 62) / 2).clamp(1, 96) as u32;
    loop {
        match mul_div(amount1, U256::ONE << (192 - 2 * k), amount0, Rounding::Down) {
            Ok(ratio) => return Ok(isqrt(ratio) << k),
            Err(MathError::MathOverflow) if k < 96 => k += 1,
            Err(e) => return Err(e),
        }
    }
}

/// Greatest tick whose price is at or below a raw price, clamped to the
/// tick domain.
///
/// Tick prices are the squares of the Q64.96 sqrt prices pools actually
/// use, compared exactly against the fraction by binary search.
pub fn price_to_tick_raw(price: &Price) -> MathResult<i32> {
    if price.numerator == U256::ZERO {
        return Err(MathError::InvalidInput("price must be positive"));
    }

    // Invariant: at_tick(lo) <= price, or lo == MIN_TICK
    let (mut lo, mut hi) = (MIN_TICK, MAX_TICK);
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if Price::at_tick(mid)? <= *price {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    Ok(lo)
}

/// `floor(log_1.0001(price * 10^(token1_decimals - token0_decimals)))`,
/// clamped to `[MIN_TICK, MAX_TICK]`.
///
/// Measured against the pool's rounded tick prices, so an exact power such
/// as `1.0001` can land one tick below its exponent.
pub fn price_to_tick(price: Decimal, token0_decimals: u8, token1_decimals: u8) -> MathResult<i32> {
    match Price::from_decimal(price, token0_decimals, token1_decimals) {
        Ok(raw) => price_to_tick_raw(&raw),
        // Only scale factors beyond 10^77 overflow, far outside the tick domain
        Err(MathError::MathOverflow) => {
            if decimal_exponent(price, token0_decimals, token1_decimals) >= 0 {
                Ok(MAX_TICK)
            } else {
                Ok(MIN_TICK)
            }
        }
        Err(e) => Err(e),
    }
}

/// Human decimal price at a tick
pub fn tick_to_price(tick: i32, token0_decimals: u8, token1_decimals: u8) -> MathResult<Decimal> {
    Price::at_tick(tick)?.to_decimal(token0_decimals, token1_decimals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Q96;
    use core::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_price_to_tick_unit_price() {
        assert_eq!(price_to_tick(Decimal::ONE, 18, 18).unwrap(), 0);
        assert_eq!(price_to_tick(dec("1.00010001"), 18, 18).unwrap(), 1);
        assert_eq!(price_to_tick(dec("1.00005"), 18, 18).unwrap(), 0);
        assert_eq!(price_to_tick(dec("0.9999"), 18, 18).unwrap(), -2);
    }

    #[test]
    fn test_price_to_tick_decimal_adjustment() {
        // 1 token0 (18 decimals) = 1 token1 (6 decimals) -> raw 1e-12
        let tick = price_to_tick(Decimal::ONE, 18, 6).unwrap();
        let raw = Price::from_decimal(Decimal::ONE, 18, 6).unwrap();
        assert_eq!(raw.denominator, pow10(12).unwrap());
        assert!(Price::at_tick(tick).unwrap() <= raw);
        assert!(Price::at_tick(tick + 1).unwrap() > raw);
        assert_eq!(tick, -276325);
    }

    #[test]
    fn test_price_to_tick_rejects_non_positive() {
        assert!(matches!(
            price_to_tick(Decimal::ZERO, 18, 18),
            Err(MathError::InvalidInput(_))
        ));
        assert!(matches!(
            price_to_tick(dec("-1"), 18, 18),
            Err(MathError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_price_to_tick_clamps() {
        assert_eq!(price_to_tick(Decimal::MAX, 0, 200).unwrap(), MAX_TICK);
        assert_eq!(price_to_tick(dec("0.000000000000000000000000001"), 200, 0).unwrap(), MIN_TICK);
        assert_eq!(price_to_tick(dec("1000000000000000000000000"), 0, 30).unwrap(), MAX_TICK);
    }

    #[test]
    fn test_tick_to_price() {
        assert_eq!(tick_to_price(0, 18, 18).unwrap(), Decimal::ONE);
        let p = tick_to_price(-276325, 18, 6).unwrap();
        assert!(p > dec("0.99") && p <= Decimal::ONE, "{}", p);
    }

    #[test]
    fn test_at_tick_large_ticks() {
        let high = Price::at_tick(MAX_TICK).unwrap();
        assert_eq!(high.denominator, Q128);
        let low = Price::at_tick(MIN_TICK).unwrap();
        assert_eq!(low.denominator, Q192);
        assert!(low < high);
    }

    #[test]
    fn test_invert() {
        let p = Price::new(U256::from(3u8), U256::from(2u8)).unwrap();
        let inv = p.invert().unwrap();
        assert_eq!(inv.to_decimal(0, 0).unwrap().to_string(), "0.6666666666666666666666666666");
        assert!(Price::new(U256::ZERO, U256::ONE).unwrap().invert().is_err());
    }

    #[test]
    fn test_encode_sqrt_ratio() {
        assert_eq!(encode_sqrt_ratio_x96(U256::ONE, U256::ONE).unwrap(), Q96);
        assert_eq!(
            encode_sqrt_ratio_x96(U256::from(100u8), U256::ONE).unwrap(),
            Q96 * U256::from(10u8)
        );
        assert_eq!(
            encode_sqrt_ratio_x96(U256::ONE, U256::from(4u8)).unwrap(),
            Q96 / U256::from(2u8)
        );
        // Large amount1 exercises the pre-shift
        let big = U256::ONE << 200u32;
        assert_eq!(encode_sqrt_ratio_x96(big, U256::ONE).unwrap(), U256::ONE << 196u32);
        assert_eq!(
            encode_sqrt_ratio_x96(U256::ONE, U256::ZERO),
            Err(MathError::DivisionByZero)
        );
    }

    #[test]
    fn test_encode_sqrt_ratio_wide_operands() {
        // Both operands large: the ratio is 2^-100, sqrt 2^-50
        let encoded = encode_sqrt_ratio_x96(U256::ONE << 100u32, U256::ONE << 200u32).unwrap();
        assert_eq!(encoded, U256::ONE << 46u32);

        // A tiny ratio keeps every bit of the floor
        let amount0 = pow10(30).unwrap();
        let encoded = encode_sqrt_ratio_x96(U256::ONE, amount0).unwrap();
        let square = |s: U256| Price::new(s * s, Q192).unwrap();
        let exact = Price::new(U256::ONE, amount0).unwrap();
        assert!(square(encoded) <= exact);
        assert!(square(encoded + U256::ONE) > exact);

        // Both sides big and equal stays at exactly 1
        let huge = U256::MAX >> 1u32;
        assert_eq!(encode_sqrt_ratio_x96(huge, huge).unwrap(), Q96);
    }

    #[test]
    fn test_price_to_tick_exact_powers() {
        // The Q64.96 sqrt at tick 1 is rounded up, so the table price sits
        // just above 1.0001 and the exact power lands one tick lower
        assert!(Price::at_tick(1).unwrap() > Price::new(U256::from(10001u32), U256::from(10000u32)).unwrap());
        assert_eq!(price_to_tick(dec("1.0001"), 18, 18).unwrap(), 0);
    }

    #[test]
    fn test_price_to_tick_inverted_table_prices() {
        for tick in [1, 60, 46_055, 276_324, 700_000, 800_000, 880_000, MAX_TICK] {
            let inverted = Price::at_tick(tick).unwrap().invert().unwrap();
            let back = price_to_tick_raw(&inverted).unwrap();
            assert!(back == -tick || back == -tick - 1, "tick {} came back as {}", -tick, back);

            let inverted = Price::at_tick(-tick).unwrap().invert().unwrap();
            let back = price_to_tick_raw(&inverted).unwrap();
            assert!(back == tick || back == tick - 1, "tick {} came back as {}", tick, back);
        }
    }

    #[test]
    fn test_price_to_tick_raw_brackets_price() {
        for tick in [MIN_TICK, -500_000, -1, 0, 1, 500_000, MAX_TICK] {
            let price = Price::at_tick(tick).unwrap();
            assert_eq!(price_to_tick_raw(&price).unwrap(), tick);
        }
        let below = Price::new(U256::ONE, U256::MAX).unwrap();
        assert_eq!(price_to_tick_raw(&below).unwrap(), MIN_TICK);
        let above = Price::new(U256::MAX, U256::ONE).unwrap();
        assert_eq!(price_to_tick_raw(&above).unwrap(), MAX_TICK);
    }
}
