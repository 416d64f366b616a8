//! # Protocol Constants
//!
//! Fixed-point scale factors and the tick / sqrt price domain shared with the
//! on-chain pool contracts.

use ethnum::U256;

// ============================================================================
// Fixed-Point Constants
// ============================================================================

/// Q96 fixed-point scale factor: 2^96
pub const Q96: U256 = U256::from_words(0, 1u128 << 96);

/// Q128 fixed-point scale factor: 2^128
pub const Q128: U256 = U256::from_words(1, 0);

/// Q192 fixed-point scale factor: 2^192, the scale of a squared Q96 value
pub const Q192: U256 = U256::from_words(1u128 << 64, 0);

// ============================================================================
// Tick Domain
// ============================================================================

/// Minimum tick, log base 1.0001 of 2^-128
pub const MIN_TICK: i32 = -887_272;

/// Maximum tick, log base 1.0001 of 2^128
pub const MAX_TICK: i32 = 887_272;

/// Sqrt price at `MIN_TICK` in Q64.96
pub const MIN_SQRT_RATIO: U256 = U256::from_words(0, 4_295_128_739);

/// Sqrt price at `MAX_TICK` in Q64.96 (exclusive upper bound of valid prices)
pub const MAX_SQRT_RATIO: U256 =
    U256::from_words(0xfffd_8963, 0xefd1_fc6a_5064_8849_5d95_1d52_6398_8d26);

// ============================================================================
// Decimal Limits
// ============================================================================

/// Largest scale a `rust_decimal::Decimal` can carry
pub const MAX_DECIMAL_SCALE: u32 = 28;
