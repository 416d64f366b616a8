//! # Mathematical Functions
//!
//! Pure price math for concentrated liquidity positions.

pub mod big_int;
pub mod fee_tier;
pub mod liquidity_math;
pub mod price;
pub mod slippage;
pub mod tick_math;

// Re-export commonly used functions
pub use big_int::*;
pub use fee_tier::*;
pub use liquidity_math::*;
pub use price::*;
pub use slippage::*;
pub use tick_math::*;
