//! # Math Error Types
//!
//! Typed failures for the price math layer. Every routine fails fast and
//! synchronously; callers building transactions are expected to surface the
//! message before any network call is made.

use thiserror::Error;

/// Errors produced by tick, price, liquidity and slippage math
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    /// Malformed numeric input (non-positive price, tick outside the domain, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(&'static str),

    /// Inconsistent bounds (`tick_lower >= tick_upper`, slippage outside [0, 1))
    #[error("Invalid range: {0}")]
    InvalidRange(&'static str),

    #[error("Math overflow")]
    MathOverflow,

    #[error("Division by zero")]
    DivisionByZero,
}

/// Result type for price math
pub type MathResult<T> = Result<T, MathError>;

impl MathError {
    /// Create an invalid input error
    pub fn invalid_input(reason: &'static str) -> Self {
        Self::InvalidInput(reason)
    }

    /// Create an invalid range error
    pub fn invalid_range(reason: &'static str) -> Self {
        Self::InvalidRange(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = MathError::invalid_range("tick_lower must be below tick_upper");
        assert_eq!(
            format!("{}", err),
            "Invalid range: tick_lower must be below tick_upper"
        );

        let err = MathError::invalid_input("price must be positive");
        assert_eq!(format!("{}", err), "Invalid input: price must be positive");
    }
}
