//! # Tick Math
//!
//! Conversions between ticks and Q64.96 sqrt prices. Results match the
//! pool contracts bit for bit, so ranges computed off-chain land on the
//! same initialized ticks on-chain.

use ethnum::U256;

use crate::constants::{MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK, Q128};
use crate::errors::{MathError, MathResult};

/// sqrt(1.0001)^-(2^i) in Q128 for i = 0
const RATIO_BIT_0: u128 = 0xfffcb933bd6fad37aa2d162d1a594001;

/// sqrt(1.0001)^-(2^i) in Q128 for i = 1..=19
const RATIO_BITS: [u128; 19] = [
    0xfff97272373d413259a46990580e213a,
    0xfff2e50f5f656932ef12357cf3c7fdcc,
    0xffe5caca7e10e4e61c3624eaa0941cd0,
    0xffcb9843d60f6159c9db58835c926644,
    0xff973b41fa98c081472e6896dfb254c0,
    0xff2ea16466c96a3843ec78b326b52861,
    0xfe5dee046a99a2a811c461f1969c3053,
    0xfcbe86c7900a88aedcffc83b479aa3a4,
    0xf987a7253ac413176f2b074cf7815e54,
    0xf3392b0822b70005940c7a398e4b70f3,
    0xe7159475a2c29b7443b29c7fa6e889d9,
    0xd097f3bdfd2022b8845ad8f792aa5825,
    0xa9f746462d870fdf8a65dc1f90e061e5,
    0x70d869a156d2a1b890bb3df62baf32f7,
    0x31be135f97d08fd981231505542fcfa6,
    0x09aa508b5b7a84e1c677de54f3e99bc9,
    0x005d6af8dedb81196699c329225ee604,
    0x00002216e584f5fa1ea926041bedfe98,
    0x00000000048a170391f7dc42444e8fa2,
];

/// Get the Q64.96 sqrt price at a tick, `sqrt(1.0001^tick) * 2^96`
pub fn tick_to_sqrt_price_x96(tick: i32) -> MathResult<U256> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(MathError::InvalidInput("tick outside [MIN_TICK, MAX_TICK]"));
    }

    let abs_tick = tick.unsigned_abs();

    let mut ratio = if abs_tick & 1 != 0 {
        U256::from(RATIO_BIT_0)
    } else {
        Q128
    };

    // ratio stays at or below 2^128, so each product fits in 256 bits
    for (i, magic) in RATIO_BITS.iter().enumerate() {
        if abs_tick & (2u32 << i) != 0 {
            ratio = (ratio * U256::from(*magic)) >> 128u32;
        }
    }

    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Q128.128 -> Q64.96, rounding up so the result never undershoots
    let rounding = if ratio & U256::from(u32::MAX) == U256::ZERO {
        U256::ZERO
    } else {
        U256::ONE
    };
    Ok((ratio >> 32u32) + rounding)
}

/// Get the greatest tick whose sqrt price is at or below `sqrt_price_x96`
pub fn tick_at_sqrt_price(sqrt_price_x96: U256) -> MathResult<i32> {
    if sqrt_price_x96 < MIN_SQRT_RATIO || sqrt_price_x96 >= MAX_SQRT_RATIO {
        return Err(MathError::InvalidInput(
            "sqrt price outside [MIN_SQRT_RATIO, MAX_SQRT_RATIO)",
        ));
    }

    // Invariant: sqrt(low) <= sqrt_price_x96 < sqrt(high + 1)
    let mut low = MIN_TICK;
    let mut high = MAX_TICK - 1;
    while low < high {
        let mid = low + (high - low + 1) / 2;
        if tick_to_sqrt_price_x96(mid)? <= sqrt_price_x96 {
            low = mid;
        } else {
            high = mid - 1;
        }
    }

    Ok(low)
}

/// Check that a sqrt price lies in `[MIN_SQRT_RATIO, MAX_SQRT_RATIO)`
pub fn validate_sqrt_price(sqrt_price_x96: U256) -> MathResult<()> {
    if sqrt_price_x96 < MIN_SQRT_RATIO || sqrt_price_x96 >= MAX_SQRT_RATIO {
        return Err(MathError::InvalidInput(
            "sqrt price outside [MIN_SQRT_RATIO, MAX_SQRT_RATIO)",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Q96;

    #[test]
    fn test_tick_zero_is_one() {
        assert_eq!(tick_to_sqrt_price_x96(0).unwrap(), Q96);
    }

    #[test]
    fn test_tick_bounds() {
        assert_eq!(tick_to_sqrt_price_x96(MIN_TICK).unwrap(), MIN_SQRT_RATIO);
        assert_eq!(tick_to_sqrt_price_x96(MAX_TICK).unwrap(), MAX_SQRT_RATIO);

        assert!(matches!(
            tick_to_sqrt_price_x96(MIN_TICK - 1),
            Err(MathError::InvalidInput(_))
        ));
        assert!(matches!(
            tick_to_sqrt_price_x96(MAX_TICK + 1),
            Err(MathError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_known_values() {
        // Reference values from the pool contracts
        assert_eq!(
            tick_to_sqrt_price_x96(1).unwrap(),
            U256::from(79232123823359799118286999568u128)
        );
        assert_eq!(
            tick_to_sqrt_price_x96(-1).unwrap(),
            U256::from(79224201403219477170569942574u128)
        );
    }

    #[test]
    fn test_tick_at_sqrt_price_bounds() {
        assert_eq!(tick_at_sqrt_price(MIN_SQRT_RATIO).unwrap(), MIN_TICK);
        assert_eq!(
            tick_at_sqrt_price(MAX_SQRT_RATIO - U256::ONE).unwrap(),
            MAX_TICK - 1
        );
        assert!(tick_at_sqrt_price(MAX_SQRT_RATIO).is_err());
        assert!(tick_at_sqrt_price(MIN_SQRT_RATIO - U256::ONE).is_err());
    }

    #[test]
    fn test_tick_at_sqrt_price_exact() {
        for tick in [-50_000, -60, -1, 0, 1, 60, 50_000] {
            let sqrt = tick_to_sqrt_price_x96(tick).unwrap();
            assert_eq!(tick_at_sqrt_price(sqrt).unwrap(), tick);
            assert_eq!(tick_at_sqrt_price(sqrt - U256::ONE).unwrap(), tick - 1);
        }
    }
}
