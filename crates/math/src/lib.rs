//! # vswap math
//!
//! Deterministic integer math used to build liquidity and swap transaction
//! parameters:
//!
//! - Tick and Q64.96 sqrt price conversions
//! - Exact rational prices and decimal adjustment between token units
//! - Liquidity amount deltas and liquidity-from-amounts
//! - Fee tier tick spacing and tick alignment
//! - Slippage-bounded minimum amounts for minting, burning and swapping
//!
//! Every amount is a 256-bit unsigned integer (`ethnum::U256`) and every
//! product is computed with a 512-bit intermediate. Native floating point is
//! never used.

pub mod constants;
pub mod errors;
pub mod math;
pub mod serde_u256;

pub use constants::*;
pub use errors::{MathError, MathResult};
pub use math::*;

pub use ethnum::U256;
pub use rust_decimal::Decimal;
