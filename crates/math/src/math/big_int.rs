//! Big integer operations for high-precision math
//!
//! `U256` covers every amount and price; products are widened to 512 bits
//! as a `(hi, lo)` word pair before dividing back down.

use ethnum::U256;

use crate::errors::{MathError, MathResult};

/// Rounding mode for division operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Round down (towards zero)
    Down,
    /// Round up (away from zero)
    Up,
}

/// Full 512-bit product of two `U256` values as `(hi, lo)`
pub fn full_mul(a: U256, b: U256) -> (U256, U256) {
    let (a1, a0) = a.into_words();
    let (b1, b0) = b.into_words();

    // Each partial product of two 128-bit words fits in 256 bits
    let p00 = U256::from(a0) * U256::from(b0);
    let p01 = U256::from(a0) * U256::from(b1);
    let p10 = U256::from(a1) * U256::from(b0);
    let p11 = U256::from(a1) * U256::from(b1);

    let (lo, c1) = p00.overflowing_add(p01 << 128u32);
    let (lo, c2) = lo.overflowing_add(p10 << 128u32);

    let carry = U256::from(c1 as u8) + U256::from(c2 as u8);
    let hi = p11 + (p01 >> 128u32) + (p10 >> 128u32) + carry;

    (hi, lo)
}

/// Divide the 512-bit value `(hi, lo)` by `d`, returning quotient and remainder.
///
/// Requires `hi < d` so the quotient fits in 256 bits.
fn div_512(hi: U256, lo: U256, d: U256) -> (U256, U256) {
    let mut rem = hi;
    let mut quot = U256::ZERO;

    for i in (0..256u32).rev() {
        let overflow = rem >> 255u32 != U256::ZERO;
        rem = (rem << 1u32) | ((lo >> i) & U256::ONE);
        quot <<= 1u32;
        if overflow || rem >= d {
            rem = rem.wrapping_sub(d);
            quot |= U256::ONE;
        }
    }

    (quot, rem)
}

/// Compute `a * b / d` with a 512-bit intermediate
pub fn mul_div(a: U256, b: U256, d: U256, rounding: Rounding) -> MathResult<U256> {
    if d == U256::ZERO {
        return Err(MathError::DivisionByZero);
    }

    let (hi, lo) = full_mul(a, b);
    if hi >= d {
        return Err(MathError::MathOverflow);
    }

    let (quot, rem) = if hi == U256::ZERO {
        (lo / d, lo % d)
    } else {
        div_512(hi, lo, d)
    };

    match rounding {
        Rounding::Up if rem != U256::ZERO => {
            quot.checked_add(U256::ONE).ok_or(MathError::MathOverflow)
        }
        _ => Ok(quot),
    }
}

/// Divide rounding towards positive infinity
pub fn div_rounding_up(a: U256, d: U256) -> MathResult<U256> {
    if d == U256::ZERO {
        return Err(MathError::DivisionByZero);
    }
    let quot = a / d;
    if a % d != U256::ZERO {
        Ok(quot + U256::ONE)
    } else {
        Ok(quot)
    }
}

/// Compute `(a * b) >> shift` with a 512-bit intermediate
pub fn mul_shr(a: U256, b: U256, shift: u32) -> MathResult<U256> {
    if shift >= 256 {
        return Err(MathError::InvalidInput("shift must be below 256"));
    }

    let (hi, lo) = full_mul(a, b);
    if shift == 0 {
        return if hi == U256::ZERO {
            Ok(lo)
        } else {
            Err(MathError::MathOverflow)
        };
    }

    if hi >> shift != U256::ZERO {
        return Err(MathError::MathOverflow);
    }
    Ok((lo >> shift) | (hi << (256 - shift)))
}

/// Integer square root (floor) by Newton's method
pub fn isqrt(n: U256) -> U256 {
    if n == U256::ZERO {
        return U256::ZERO;
    }

    let bits = 256 - n.leading_zeros();
    let mut x = U256::ONE << ((bits + 1) / 2);
    loop {
        let y = (x + n / x) >> 1u32;
        if y >= x {
            return x;
        }
        x = y;
    }
}

/// `10^exp`, or `None` when it does not fit in 256 bits
pub fn pow10(exp: u32) -> Option<U256> {
    let ten = U256::from(10u8);
    (0..exp).try_fold(U256::ONE, |acc, _| acc.checked_mul(ten))
}

/// Narrow a `U256` into `u128`
pub fn to_u128(value: U256) -> MathResult<u128> {
    let (hi, lo) = value.into_words();
    if hi != 0 {
        return Err(MathError::MathOverflow);
    }
    Ok(lo)
}

/// Compare two fractions `a/b` and `c/d` exactly
pub fn cmp_fractions(a: U256, b: U256, c: U256, d: U256) -> core::cmp::Ordering {
    full_mul(a, d).cmp(&full_mul(c, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_mul() {
        let (hi, lo) = full_mul(U256::MAX, U256::MAX);
        // (2^256 - 1)^2 = 2^512 - 2^257 + 1
        assert_eq!(hi, U256::MAX - U256::ONE);
        assert_eq!(lo, U256::ONE);

        let (hi, lo) = full_mul(U256::from(6u8), U256::from(7u8));
        assert_eq!(hi, U256::ZERO);
        assert_eq!(lo, U256::from(42u8));
    }

    #[test]
    fn test_mul_div() {
        let a = U256::from(1000u32);
        let b = U256::from(2000u32);
        let c = U256::from(3u32);

        assert_eq!(mul_div(a, b, c, Rounding::Down).unwrap(), U256::from(666_666u32));
        assert_eq!(mul_div(a, b, c, Rounding::Up).unwrap(), U256::from(666_667u32));

        // 512-bit intermediate
        let big = U256::MAX;
        assert_eq!(mul_div(big, big, big, Rounding::Down).unwrap(), big);
        assert_eq!(
            mul_div(big, U256::from(3u8), U256::from(4u8), Rounding::Down).unwrap(),
            big / U256::from(4u8) * U256::from(3u8) + U256::from(2u8)
        );
    }

    #[test]
    fn test_mul_div_errors() {
        assert_eq!(
            mul_div(U256::ONE, U256::ONE, U256::ZERO, Rounding::Down),
            Err(MathError::DivisionByZero)
        );
        assert_eq!(
            mul_div(U256::MAX, U256::from(2u8), U256::ONE, Rounding::Down),
            Err(MathError::MathOverflow)
        );
    }

    #[test]
    fn test_mul_shr() {
        let q96 = U256::ONE << 96u32;
        assert_eq!(mul_shr(q96, q96, 96).unwrap(), q96);
        assert_eq!(mul_shr(U256::MAX, U256::MAX, 255), Err(MathError::MathOverflow));
        assert_eq!(mul_shr(U256::ONE << 200u32, U256::ONE << 100u32, 128).unwrap(), U256::ONE << 172u32);
    }

    #[test]
    fn test_isqrt() {
        assert_eq!(isqrt(U256::ZERO), U256::ZERO);
        assert_eq!(isqrt(U256::ONE), U256::ONE);
        assert_eq!(isqrt(U256::from(15u8)), U256::from(3u8));
        assert_eq!(isqrt(U256::from(16u8)), U256::from(4u8));
        assert_eq!(isqrt(U256::MAX), U256::from(u128::MAX));
        assert_eq!(isqrt(U256::ONE << 192u32), U256::ONE << 96u32);
    }

    #[test]
    fn test_pow10() {
        assert_eq!(pow10(0), Some(U256::ONE));
        assert_eq!(pow10(18), Some(U256::from(1_000_000_000_000_000_000u128)));
        assert!(pow10(77).is_some());
        assert_eq!(pow10(78), None);
    }
}
