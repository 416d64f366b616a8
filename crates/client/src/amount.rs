//! Conversions between human token amounts and raw smallest-unit amounts

use ethnum::U256;
use rust_decimal::Decimal;
use vswap_math::{mul_div, pow10, Price, Rounding};

use crate::error::{ClientError, ClientResult};

/// `amount * 10^decimals`, truncated to whole smallest units
pub fn to_raw_amount(amount: Decimal, decimals: u8) -> ClientResult<U256> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ClientError::invalid_parameters(format!(
            "amount must not be negative, got {}",
            amount
        )));
    }

    let mantissa = U256::from(amount.mantissa().unsigned_abs());
    let scale = pow10(u32::from(decimals)).ok_or(vswap_math::MathError::MathOverflow)?;
    let divisor = pow10(amount.scale()).ok_or(vswap_math::MathError::MathOverflow)?;
    Ok(mul_div(mantissa, scale, divisor, Rounding::Down)?)
}

/// Raw smallest-unit amount as a human decimal
pub fn to_decimal_amount(raw: U256, decimals: u8) -> ClientResult<Decimal> {
    // raw / 10^decimals, expressed as a price between 0-decimal units
    let price = Price::new(raw, U256::ONE)?;
    Ok(price.to_decimal(0, decimals)?)
}
