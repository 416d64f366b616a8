//! # Fee Tiers
//!
//! Pool fee tiers, their tick spacing, and snapping arbitrary ticks onto
//! the spacing grid a pool accepts.

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_TICK, MIN_TICK};
use crate::errors::{MathError, MathResult};

/// Pool fee tier in hundredths of a basis point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
#[repr(u32)]
pub enum FeeAmount {
    /// 0.01%
    Lowest = 100,
    /// 0.05%
    Low = 500,
    /// 0.3%
    Medium = 3000,
    /// 1%
    High = 10000,
}

impl FeeAmount {
    pub const ALL: [FeeAmount; 4] = [
        FeeAmount::Lowest,
        FeeAmount::Low,
        FeeAmount::Medium,
        FeeAmount::High,
    ];

    /// Fee in hundredths of a basis point
    pub const fn fee(self) -> u32 {
        self as u32
    }

    /// Tick spacing of pools in this tier
    pub const fn tick_spacing(self) -> i32 {
        match self {
            FeeAmount::Lowest => 1,
            FeeAmount::Low => 10,
            FeeAmount::Medium => 60,
            FeeAmount::High => 200,
        }
    }

    pub const fn min_usable_tick(self) -> i32 {
        (MIN_TICK / self.tick_spacing()) * self.tick_spacing()
    }

    pub const fn max_usable_tick(self) -> i32 {
        (MAX_TICK / self.tick_spacing()) * self.tick_spacing()
    }
}

impl TryFrom<u32> for FeeAmount {
    type Error = MathError;

    fn try_from(fee: u32) -> Result<Self, Self::Error> {
        FeeAmount::ALL
            .into_iter()
            .find(|tier| tier.fee() == fee)
            .ok_or(MathError::InvalidInput("unsupported fee tier"))
    }
}

impl From<FeeAmount> for u32 {
    fn from(fee: FeeAmount) -> Self {
        fee.fee()
    }
}

fn check_spacing(tick_spacing: i32) -> MathResult<()> {
    if tick_spacing <= 0 {
        return Err(MathError::InvalidInput("tick spacing must be positive"));
    }
    Ok(())
}

/// Lowest tick that is a multiple of `tick_spacing`
pub fn min_usable_tick(tick_spacing: i32) -> MathResult<i32> {
    check_spacing(tick_spacing)?;
    Ok((MIN_TICK / tick_spacing) * tick_spacing)
}

/// Highest tick that is a multiple of `tick_spacing`
pub fn max_usable_tick(tick_spacing: i32) -> MathResult<i32> {
    check_spacing(tick_spacing)?;
    Ok((MAX_TICK / tick_spacing) * tick_spacing)
}

/// Snap a tick to the nearest multiple of `tick_spacing`.
///
/// Exact half-spacing ties round away from zero, so `align(t) == -align(-t)`
/// whenever the clamp does not apply. The result is clamped into
/// `[min_usable_tick, max_usable_tick]`.
pub fn align_tick_to_spacing(tick: i32, tick_spacing: i32) -> MathResult<i32> {
    check_spacing(tick_spacing)?;

    let t = i64::from(tick);
    let s = i64::from(tick_spacing);
    let rem = t.rem_euclid(s);
    let down = t - rem;

    let aligned = match (rem * 2).cmp(&s) {
        core::cmp::Ordering::Less => down,
        core::cmp::Ordering::Greater => down + s,
        core::cmp::Ordering::Equal if t >= 0 => down + s,
        core::cmp::Ordering::Equal => down,
    };

    let min = i64::from(min_usable_tick(tick_spacing)?);
    let max = i64::from(max_usable_tick(tick_spacing)?);
    // Clamped into i32 bounds above
    Ok(aligned.clamp(min, max) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_spacing_per_tier() {
        assert_eq!(FeeAmount::Lowest.tick_spacing(), 1);
        assert_eq!(FeeAmount::Low.tick_spacing(), 10);
        assert_eq!(FeeAmount::Medium.tick_spacing(), 60);
        assert_eq!(FeeAmount::High.tick_spacing(), 200);
    }

    #[test]
    fn test_usable_ticks() {
        assert_eq!(FeeAmount::Medium.min_usable_tick(), -887220);
        assert_eq!(FeeAmount::Medium.max_usable_tick(), 887220);
        assert_eq!(FeeAmount::High.max_usable_tick(), 887200);
        assert_eq!(FeeAmount::Lowest.min_usable_tick(), MIN_TICK);
        assert_eq!(max_usable_tick(10).unwrap(), FeeAmount::Low.max_usable_tick());
        assert!(min_usable_tick(0).is_err());
    }

    #[test]
    fn test_fee_from_u32() {
        assert_eq!(FeeAmount::try_from(3000).unwrap(), FeeAmount::Medium);
        assert!(FeeAmount::try_from(2500).is_err());
    }

    #[test]
    fn test_fee_serde_as_number() {
        let json = serde_json::to_string(&FeeAmount::Low).unwrap();
        assert_eq!(json, "500");
        let fee: FeeAmount = serde_json::from_str("10000").unwrap();
        assert_eq!(fee, FeeAmount::High);
        assert!(serde_json::from_str::<FeeAmount>("42").is_err());
    }

    #[test]
    fn test_align_nearest() {
        assert_eq!(align_tick_to_spacing(0, 60).unwrap(), 0);
        assert_eq!(align_tick_to_spacing(29, 60).unwrap(), 0);
        assert_eq!(align_tick_to_spacing(31, 60).unwrap(), 60);
        assert_eq!(align_tick_to_spacing(-29, 60).unwrap(), 0);
        assert_eq!(align_tick_to_spacing(-31, 60).unwrap(), -60);
        assert_eq!(align_tick_to_spacing(-91, 60).unwrap(), -120);
    }

    #[test]
    fn test_align_ties_round_away_from_zero() {
        assert_eq!(align_tick_to_spacing(30, 60).unwrap(), 60);
        assert_eq!(align_tick_to_spacing(-30, 60).unwrap(), -60);
        assert_eq!(align_tick_to_spacing(5, 10).unwrap(), 10);
        assert_eq!(align_tick_to_spacing(-5, 10).unwrap(), -10);
    }

    #[test]
    fn test_align_clamps_to_usable_range() {
        assert_eq!(align_tick_to_spacing(MAX_TICK, 60).unwrap(), 887220);
        assert_eq!(align_tick_to_spacing(MIN_TICK, 60).unwrap(), -887220);
        assert_eq!(align_tick_to_spacing(i32::MAX, 200).unwrap(), 887200);
    }

    #[test]
    fn test_align_rejects_bad_spacing() {
        assert!(matches!(align_tick_to_spacing(10, 0), Err(MathError::InvalidInput(_))));
        assert!(matches!(align_tick_to_spacing(10, -60), Err(MathError::InvalidInput(_))));
    }
}
