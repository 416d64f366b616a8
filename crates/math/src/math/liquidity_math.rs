//! # Liquidity Math
//!
//! Token amounts held by a position between two sqrt prices, and the
//! inverse: the liquidity a pair of token amounts can provide.

use ethnum::U256;

use crate::constants::Q96;
use crate::errors::{MathError, MathResult};
use crate::math::big_int::{div_rounding_up, mul_div, to_u128, Rounding};

fn sorted(sqrt_a: U256, sqrt_b: U256) -> (U256, U256) {
    if sqrt_a <= sqrt_b {
        (sqrt_a, sqrt_b)
    } else {
        (sqrt_b, sqrt_a)
    }
}

/// Amount of token0 covering `liquidity` between two sqrt prices:
/// `L * (sqrt_b - sqrt_a) / (sqrt_a * sqrt_b)`, in Q96
pub fn amount0_delta(
    sqrt_a: U256,
    sqrt_b: U256,
    liquidity: u128,
    rounding: Rounding,
) -> MathResult<U256> {
    let (lower, upper) = sorted(sqrt_a, sqrt_b);
    if lower == U256::ZERO {
        return Err(MathError::InvalidInput("sqrt price must be positive"));
    }

    let numerator1 = U256::from(liquidity) << 96u32;
    let numerator2 = upper - lower;

    match rounding {
        Rounding::Up => {
            let scaled = mul_div(numerator1, numerator2, upper, Rounding::Up)?;
            div_rounding_up(scaled, lower)
        }
        Rounding::Down => Ok(mul_div(numerator1, numerator2, upper, Rounding::Down)? / lower),
    }
}

/// Amount of token1 covering `liquidity` between two sqrt prices:
/// `L * (sqrt_b - sqrt_a)`, in Q96
pub fn amount1_delta(
    sqrt_a: U256,
    sqrt_b: U256,
    liquidity: u128,
    rounding: Rounding,
) -> MathResult<U256> {
    let (lower, upper) = sorted(sqrt_a, sqrt_b);
    mul_div(U256::from(liquidity), upper - lower, Q96, rounding)
}

/// Liquidity provided by `amount0` of token0 over a range
pub fn liquidity_for_amount0(sqrt_a: U256, sqrt_b: U256, amount0: U256) -> MathResult<u128> {
    let (lower, upper) = sorted(sqrt_a, sqrt_b);
    let intermediate = mul_div(lower, upper, Q96, Rounding::Down)?;
    to_u128(mul_div(amount0, intermediate, upper - lower, Rounding::Down)?)
}

/// Liquidity provided by `amount1` of token1 over a range
pub fn liquidity_for_amount1(sqrt_a: U256, sqrt_b: U256, amount1: U256) -> MathResult<u128> {
    let (lower, upper) = sorted(sqrt_a, sqrt_b);
    to_u128(mul_div(amount1, Q96, upper - lower, Rounding::Down)?)
}

/// Maximum liquidity that `amount0` and `amount1` can back at the current
/// price. Below the range only token0 counts, above it only token1, and
/// inside the range the scarcer side bounds the result.
pub fn max_liquidity_for_amounts(
    sqrt_price_current: U256,
    sqrt_a: U256,
    sqrt_b: U256,
    amount0: U256,
    amount1: U256,
) -> MathResult<u128> {
    let (lower, upper) = sorted(sqrt_a, sqrt_b);
    if lower == upper {
        return Err(MathError::InvalidRange("empty price range"));
    }

    if sqrt_price_current <= lower {
        liquidity_for_amount0(lower, upper, amount0)
    } else if sqrt_price_current < upper {
        let liquidity0 = liquidity_for_amount0(sqrt_price_current, upper, amount0)?;
        let liquidity1 = liquidity_for_amount1(lower, sqrt_price_current, amount1)?;
        Ok(liquidity0.min(liquidity1))
    } else {
        liquidity_for_amount1(lower, upper, amount1)
    }
}
