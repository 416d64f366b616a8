//! # Slippage
//!
//! Minimum token amounts that keep a mint or burn inside a slippage
//! tolerance, and the swap guards derived from the same tolerance.

use ethnum::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{MAX_SQRT_RATIO, MIN_SQRT_RATIO, Q192, Q96};
use crate::errors::{MathError, MathResult};
use crate::math::big_int::{isqrt, mul_div, pow10, Rounding};
use crate::math::liquidity_math::{amount0_delta, amount1_delta, max_liquidity_for_amounts};
use crate::math::tick_math::{tick_to_sqrt_price_x96, validate_sqrt_price};

/// Slippage tolerance as a fraction in `[0, 1)`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct SlippageTolerance(Decimal);

impl SlippageTolerance {
    pub const ZERO: SlippageTolerance = SlippageTolerance(Decimal::ZERO);

    pub fn new(fraction: Decimal) -> MathResult<Self> {
        if fraction < Decimal::ZERO || fraction >= Decimal::ONE {
            return Err(MathError::InvalidRange("slippage tolerance must be within [0, 1)"));
        }
        Ok(Self(fraction))
    }

    /// Tolerance in basis points, `50` meaning 0.5%. Capped at 99.99%.
    pub const fn from_bps(bps: u16) -> Self {
        let bps = if bps > 9999 { 9999 } else { bps };
        SlippageTolerance(Decimal::from_parts(bps as u32, 0, 0, false, 4))
    }

    /// Tolerance from a percentage, `0.5` meaning 0.5%
    pub fn from_percent(percent: Decimal) -> MathResult<Self> {
        let fraction = percent
            .checked_div(Decimal::ONE_HUNDRED)
            .ok_or(MathError::MathOverflow)?;
        Self::new(fraction)
    }

    pub fn fraction(&self) -> Decimal {
        self.0
    }

    pub fn percent(&self) -> Decimal {
        (self.0 * Decimal::ONE_HUNDRED).normalize()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Exact `(numerator, denominator)` of the tolerance
    pub fn as_fraction(&self) -> (U256, U256) {
        // Non-negative, below 2^96, scale at most 28
        let numerator = U256::from(self.0.mantissa() as u128);
        let denominator = pow10(self.0.scale()).unwrap_or(U256::ONE);
        (numerator, denominator)
    }
}

impl TryFrom<Decimal> for SlippageTolerance {
    type Error = MathError;

    fn try_from(fraction: Decimal) -> Result<Self, Self::Error> {
        Self::new(fraction)
    }
}

impl From<SlippageTolerance> for Decimal {
    fn from(slippage: SlippageTolerance) -> Self {
        slippage.0
    }
}

impl core::fmt::Display for SlippageTolerance {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

fn amounts_for_liquidity(
    sqrt_price: U256,
    sqrt_lower: U256,
    sqrt_upper: U256,
    liquidity: u128,
    rounding: Rounding,
) -> MathResult<(U256, U256)> {
    if sqrt_price < sqrt_lower {
        Ok((amount0_delta(sqrt_lower, sqrt_upper, liquidity, rounding)?, U256::ZERO))
    } else if sqrt_price < sqrt_upper {
        Ok((
            amount0_delta(sqrt_price, sqrt_upper, liquidity, rounding)?,
            amount1_delta(sqrt_lower, sqrt_price, liquidity, rounding)?,
        ))
    } else {
        Ok((U256::ZERO, amount1_delta(sqrt_lower, sqrt_upper, liquidity, rounding)?))
    }
}

/// Amounts needed to mint `liquidity` over a range at a price, rounded up
pub fn mint_amounts(
    sqrt_price: U256,
    sqrt_lower: U256,
    sqrt_upper: U256,
    liquidity: u128,
) -> MathResult<(U256, U256)> {
    amounts_for_liquidity(sqrt_price, sqrt_lower, sqrt_upper, liquidity, Rounding::Up)
}

/// Amounts a position of `liquidity` holds at a price, rounded down
pub fn position_amounts(
    sqrt_price: U256,
    sqrt_lower: U256,
    sqrt_upper: U256,
    liquidity: u128,
) -> MathResult<(U256, U256)> {
    amounts_for_liquidity(sqrt_price, sqrt_lower, sqrt_upper, liquidity, Rounding::Down)
}

/// Sqrt prices at `P * (1 - s)` and `P * (1 + s)`, both clamped into
/// `[MIN_SQRT_RATIO, MAX_SQRT_RATIO - 1]`
pub fn slipped_sqrt_bounds(sqrt_price: U256, slippage: SlippageTolerance) -> MathResult<(U256, U256)> {
    let clamp = |sqrt: U256| sqrt.clamp(MIN_SQRT_RATIO, MAX_SQRT_RATIO - U256::ONE);

    let (m, d) = slippage.as_fraction();
    if m == U256::ZERO {
        return Ok((clamp(sqrt_price), clamp(sqrt_price)));
    }

    // sqrt(1 -/+ s) in Q96
    let factor_lower = isqrt(mul_div(d - m, Q192, d, Rounding::Down)?);
    let factor_upper = isqrt(mul_div(d + m, Q192, d, Rounding::Down)?);

    let lower = mul_div(sqrt_price, factor_lower, Q96, Rounding::Down)?;
    let upper = mul_div(sqrt_price, factor_upper, Q96, Rounding::Down)?;

    Ok((clamp(lower), clamp(upper)))
}

struct Range {
    sqrt_lower: U256,
    sqrt_upper: U256,
}

fn check_range(sqrt_price: U256, tick_lower: i32, tick_upper: i32) -> MathResult<Range> {
    if tick_lower >= tick_upper {
        return Err(MathError::InvalidRange("tick_lower must be below tick_upper"));
    }
    validate_sqrt_price(sqrt_price)?;
    Ok(Range {
        sqrt_lower: tick_to_sqrt_price_x96(tick_lower)?,
        sqrt_upper: tick_to_sqrt_price_x96(tick_upper)?,
    })
}

/// Minimum amounts for minting `liquidity` under a slippage tolerance.
///
/// The price may move anywhere within `[P(1-s), P(1+s)]` before the mint
/// lands. Token0 is scarcest at the upper bound and token1 at the lower
/// bound, so each minimum is taken there.
pub fn compute_min_amounts_with_slippage(
    sqrt_price_current: U256,
    tick_lower: i32,
    tick_upper: i32,
    liquidity: u128,
    slippage: SlippageTolerance,
) -> MathResult<(U256, U256)> {
    let range = check_range(sqrt_price_current, tick_lower, tick_upper)?;
    if liquidity == 0 {
        return Ok((U256::ZERO, U256::ZERO));
    }

    let (sqrt_lower_bound, sqrt_upper_bound) = slipped_sqrt_bounds(sqrt_price_current, slippage)?;

    let (amount0_min, _) = mint_amounts(sqrt_upper_bound, range.sqrt_lower, range.sqrt_upper, liquidity)?;
    let (_, amount1_min) = mint_amounts(sqrt_lower_bound, range.sqrt_lower, range.sqrt_upper, liquidity)?;

    Ok((amount0_min, amount1_min))
}

/// Minimum amounts for burning `liquidity` under a slippage tolerance,
/// rounded down like the amounts the pool pays out
pub fn burn_amounts_with_slippage(
    sqrt_price_current: U256,
    tick_lower: i32,
    tick_upper: i32,
    liquidity: u128,
    slippage: SlippageTolerance,
) -> MathResult<(U256, U256)> {
    let range = check_range(sqrt_price_current, tick_lower, tick_upper)?;
    if liquidity == 0 {
        return Ok((U256::ZERO, U256::ZERO));
    }

    let (sqrt_lower_bound, sqrt_upper_bound) = slipped_sqrt_bounds(sqrt_price_current, slippage)?;

    let (amount0_min, _) =
        position_amounts(sqrt_upper_bound, range.sqrt_lower, range.sqrt_upper, liquidity)?;
    let (_, amount1_min) =
        position_amounts(sqrt_lower_bound, range.sqrt_lower, range.sqrt_upper, liquidity)?;

    Ok((amount0_min, amount1_min))
}

/// Minimum amounts for a deposit of desired token amounts, via the
/// liquidity those amounts can back at the current price
pub fn compute_min_amounts_for_deposit(
    sqrt_price_current: U256,
    tick_lower: i32,
    tick_upper: i32,
    amount0_desired: U256,
    amount1_desired: U256,
    slippage: SlippageTolerance,
) -> MathResult<(U256, U256)> {
    let range = check_range(sqrt_price_current, tick_lower, tick_upper)?;
    let liquidity = max_liquidity_for_amounts(
        sqrt_price_current,
        range.sqrt_lower,
        range.sqrt_upper,
        amount0_desired,
        amount1_desired,
    )?;
    compute_min_amounts_with_slippage(sqrt_price_current, tick_lower, tick_upper, liquidity, slippage)
}

/// Least output an exact-input swap accepts, `floor(out / (1 + s))`.
/// A zero tolerance disables the guard.
pub fn amount_out_minimum(amount_out: U256, slippage: SlippageTolerance) -> MathResult<U256> {
    let (m, d) = slippage.as_fraction();
    if m == U256::ZERO {
        return Ok(U256::ZERO);
    }
    mul_div(amount_out, d, d + m, Rounding::Down)
}

/// Most input an exact-output swap spends, `floor((1 + s) * in)`.
/// A zero tolerance disables the guard.
pub fn amount_in_maximum(amount_in: U256, slippage: SlippageTolerance) -> MathResult<U256> {
    let (m, d) = slippage.as_fraction();
    if m == U256::ZERO {
        return Ok(U256::MAX);
    }
    mul_div(amount_in, d + m, d, Rounding::Down)
}
