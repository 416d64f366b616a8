//! # Liquidity transactions
//!
//! Turns what the user typed on the add and remove liquidity pages into
//! position manager call parameters. Everything is validated here, so a
//! bad range or amount fails before anything is signed or sent.
//!
//! Prices on the add page are quoted as token B per token A in whole
//! tokens. Pools order their tokens by address, so when token B sorts
//! first the amounts swap and the price range is inverted.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use ethnum::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use vswap_math::{
    align_tick_to_spacing, burn_amounts_with_slippage, compute_min_amounts_for_deposit,
    encode_sqrt_ratio_x96, mul_div, position_amounts, price_to_tick, tick_at_sqrt_price,
    tick_to_sqrt_price_x96, to_u128, validate_sqrt_price, FeeAmount, MathError, Rounding,
};

use crate::amount::{to_decimal_amount, to_raw_amount};
use crate::error::{ClientError, ClientResult};
use crate::settings::{TradePage, TradeSettings};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub address: String,
    pub symbol: String,
    pub decimals: u8,
}

impl Token {
    pub fn new(address: impl Into<String>, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            address: address.into(),
            symbol: symbol.into(),
            decimals,
        }
    }

    /// Pool token order, by case-insensitive address
    pub fn sorts_before(&self, other: &Token) -> bool {
        self.address.to_lowercase() < other.address.to_lowercase()
    }

    fn same_address(&self, other: &Token) -> bool {
        self.address.eq_ignore_ascii_case(&other.address)
    }
}

/// One end of a price range. `Zero` and `Infinite` select the widest
/// range the fee tier allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceBound {
    Zero,
    Finite(Decimal),
    Infinite,
}

impl PriceBound {
    pub fn parse(input: &str) -> ClientResult<Self> {
        let input = input.trim();
        if matches!(input, "Infinity" | "infinity" | "inf" | "∞") {
            return Ok(PriceBound::Infinite);
        }

        let price = Decimal::from_str(input)
            .map_err(|e| ClientError::invalid_parameters(format!("invalid price {input:?}: {e}")))?;
        Self::from_decimal(price)
    }

    pub fn from_decimal(price: Decimal) -> ClientResult<Self> {
        if price.is_zero() {
            Ok(PriceBound::Zero)
        } else if price.is_sign_negative() {
            Err(ClientError::invalid_parameters(format!(
                "price must not be negative, got {price}"
            )))
        } else {
            Ok(PriceBound::Finite(price))
        }
    }

    /// The same bound quoted the other way round
    pub fn invert(self) -> ClientResult<Self> {
        match self {
            PriceBound::Zero => Ok(PriceBound::Infinite),
            PriceBound::Infinite => Ok(PriceBound::Zero),
            PriceBound::Finite(price) => {
                let inverted = Decimal::ONE
                    .checked_div(price)
                    .ok_or(MathError::DivisionByZero)?;
                Self::from_decimal(inverted)
            }
        }
    }

    /// Usable tick for this bound, as token1 per token0
    pub fn to_tick(self, fee: FeeAmount, token0_decimals: u8, token1_decimals: u8) -> ClientResult<i32> {
        match self {
            PriceBound::Zero => Ok(fee.min_usable_tick()),
            PriceBound::Infinite => Ok(fee.max_usable_tick()),
            PriceBound::Finite(price) => {
                let tick = price_to_tick(price, token0_decimals, token1_decimals)?;
                Ok(align_tick_to_spacing(tick, fee.tick_spacing())?)
            }
        }
    }
}

impl fmt::Display for PriceBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceBound::Zero => write!(f, "0"),
            PriceBound::Finite(price) => write!(f, "{price}"),
            PriceBound::Infinite => write!(f, "∞"),
        }
    }
}

/// An add liquidity form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintRequest {
    pub token_a: Token,
    pub token_b: Token,
    pub fee: FeeAmount,
    pub amount_a: Decimal,
    pub amount_b: Decimal,
    /// Range ends, as token B per token A
    pub price_lower: PriceBound,
    pub price_upper: PriceBound,
    /// Current pool price, `None` when the pool does not exist yet
    pub pool_sqrt_price_x96: Option<U256>,
    pub recipient: String,
}

/// Position manager `mint` arguments, with the pool seed price when the
/// pool has to be created first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintParams {
    pub token0: String,
    pub token1: String,
    pub fee: FeeAmount,
    pub tick_lower: i32,
    pub tick_upper: i32,
    #[serde(with = "vswap_math::serde_u256")]
    pub amount0_desired: U256,
    #[serde(with = "vswap_math::serde_u256")]
    pub amount1_desired: U256,
    #[serde(with = "vswap_math::serde_u256")]
    pub amount0_min: U256,
    #[serde(with = "vswap_math::serde_u256")]
    pub amount1_min: U256,
    pub recipient: String,
    pub deadline: i64,
    #[serde(default, with = "vswap_math::serde_u256::option")]
    pub initial_sqrt_price_x96: Option<U256>,
}

impl MintRequest {
    pub fn build(&self, settings: &TradeSettings, now: DateTime<Utc>) -> ClientResult<MintParams> {
        if self.token_a.same_address(&self.token_b) {
            return Err(ClientError::invalid_parameters("tokens must differ"));
        }

        let (token0, token1, amount0, amount1, lower, upper) =
            if self.token_a.sorts_before(&self.token_b) {
                (
                    &self.token_a,
                    &self.token_b,
                    self.amount_a,
                    self.amount_b,
                    self.price_lower,
                    self.price_upper,
                )
            } else {
                // token1 per token0 is now A per B, so the ends swap too
                (
                    &self.token_b,
                    &self.token_a,
                    self.amount_b,
                    self.amount_a,
                    self.price_upper.invert()?,
                    self.price_lower.invert()?,
                )
            };

        let amount0_desired = to_raw_amount(amount0, token0.decimals)?;
        let amount1_desired = to_raw_amount(amount1, token1.decimals)?;
        if amount0_desired == U256::ZERO && amount1_desired == U256::ZERO {
            return Err(ClientError::invalid_parameters("nothing to deposit"));
        }

        let tick_lower = lower.to_tick(self.fee, token0.decimals, token1.decimals)?;
        let tick_upper = upper.to_tick(self.fee, token0.decimals, token1.decimals)?;
        if tick_lower >= tick_upper {
            return Err(MathError::InvalidRange("price range is empty after tick alignment").into());
        }

        let (sqrt_price, initial_sqrt_price_x96) = match self.pool_sqrt_price_x96 {
            Some(sqrt_price) => {
                validate_sqrt_price(sqrt_price)?;
                (sqrt_price, None)
            }
            None => {
                if amount0_desired == U256::ZERO || amount1_desired == U256::ZERO {
                    return Err(ClientError::invalid_parameters(
                        "a new pool needs both token amounts to set its price",
                    ));
                }
                let sqrt_price = encode_sqrt_ratio_x96(amount1_desired, amount0_desired)?;
                validate_sqrt_price(sqrt_price)?;
                (sqrt_price, Some(sqrt_price))
            }
        };

        let slippage = settings.slippage_for(TradePage::Liquidity);
        let (amount0_min, amount1_min) = compute_min_amounts_for_deposit(
            sqrt_price,
            tick_lower,
            tick_upper,
            amount0_desired,
            amount1_desired,
            slippage,
        )?;

        debug!(
            token0 = %token0.symbol,
            token1 = %token1.symbol,
            fee = self.fee.fee(),
            tick_lower,
            tick_upper,
            %slippage,
            new_pool = initial_sqrt_price_x96.is_some(),
            "Built mint params"
        );

        Ok(MintParams {
            token0: token0.address.clone(),
            token1: token1.address.clone(),
            fee: self.fee,
            tick_lower,
            tick_upper,
            amount0_desired,
            amount1_desired,
            amount0_min,
            amount1_min,
            recipient: self.recipient.clone(),
            deadline: settings.deadline_from(now),
            initial_sqrt_price_x96,
        })
    }
}

/// An existing liquidity position NFT
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    #[serde(with = "vswap_math::serde_u256")]
    pub token_id: U256,
    pub token0: Token,
    pub token1: Token,
    pub fee: FeeAmount,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
}

impl Position {
    /// Raw token amounts the position holds at a pool price
    pub fn amounts(&self, sqrt_price_x96: U256) -> ClientResult<(U256, U256)> {
        validate_sqrt_price(sqrt_price_x96)?;
        Ok(position_amounts(
            sqrt_price_x96,
            tick_to_sqrt_price_x96(self.tick_lower)?,
            tick_to_sqrt_price_x96(self.tick_upper)?,
            self.liquidity,
        )?)
    }

    /// Token amounts the position holds at a pool price, in whole tokens
    pub fn decimal_amounts(&self, sqrt_price_x96: U256) -> ClientResult<(Decimal, Decimal)> {
        let (amount0, amount1) = self.amounts(sqrt_price_x96)?;
        Ok((
            to_decimal_amount(amount0, self.token0.decimals)?,
            to_decimal_amount(amount1, self.token1.decimals)?,
        ))
    }

    /// Whether the pool price sits inside `[tick_lower, tick_upper)`
    pub fn in_range(&self, sqrt_price_x96: U256) -> ClientResult<bool> {
        let tick = tick_at_sqrt_price(sqrt_price_x96)?;
        Ok(self.tick_lower <= tick && tick < self.tick_upper)
    }
}

/// Adding to an existing position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncreaseRequest {
    pub position: Position,
    pub amount0: Decimal,
    pub amount1: Decimal,
    pub pool_sqrt_price_x96: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncreaseParams {
    #[serde(with = "vswap_math::serde_u256")]
    pub token_id: U256,
    #[serde(with = "vswap_math::serde_u256")]
    pub amount0_desired: U256,
    #[serde(with = "vswap_math::serde_u256")]
    pub amount1_desired: U256,
    #[serde(with = "vswap_math::serde_u256")]
    pub amount0_min: U256,
    #[serde(with = "vswap_math::serde_u256")]
    pub amount1_min: U256,
    pub deadline: i64,
}

impl IncreaseRequest {
    pub fn build(&self, settings: &TradeSettings, now: DateTime<Utc>) -> ClientResult<IncreaseParams> {
        let position = &self.position;
        let amount0_desired = to_raw_amount(self.amount0, position.token0.decimals)?;
        let amount1_desired = to_raw_amount(self.amount1, position.token1.decimals)?;
        if amount0_desired == U256::ZERO && amount1_desired == U256::ZERO {
            return Err(ClientError::invalid_parameters("nothing to deposit"));
        }

        let (amount0_min, amount1_min) = compute_min_amounts_for_deposit(
            self.pool_sqrt_price_x96,
            position.tick_lower,
            position.tick_upper,
            amount0_desired,
            amount1_desired,
            settings.slippage_for(TradePage::Liquidity),
        )?;

        Ok(IncreaseParams {
            token_id: position.token_id,
            amount0_desired,
            amount1_desired,
            amount0_min,
            amount1_min,
            deadline: settings.deadline_from(now),
        })
    }
}

/// Removing a percentage of a position's liquidity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecreaseRequest {
    pub position: Position,
    /// 1 to 100
    pub percent: u8,
    pub pool_sqrt_price_x96: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecreaseParams {
    #[serde(with = "vswap_math::serde_u256")]
    pub token_id: U256,
    pub liquidity: u128,
    #[serde(with = "vswap_math::serde_u256")]
    pub amount0_min: U256,
    #[serde(with = "vswap_math::serde_u256")]
    pub amount1_min: U256,
    pub deadline: i64,
}

impl DecreaseRequest {
    pub fn build(&self, settings: &TradeSettings, now: DateTime<Utc>) -> ClientResult<DecreaseParams> {
        if !(1..=100).contains(&self.percent) {
            return Err(ClientError::invalid_parameters(format!(
                "percent must be between 1 and 100, got {}",
                self.percent
            )));
        }

        let position = &self.position;
        let liquidity = to_u128(mul_div(
            U256::from(position.liquidity),
            U256::from(self.percent),
            U256::from(100u8),
            Rounding::Down,
        )?)?;
        if liquidity == 0 {
            return Err(ClientError::invalid_parameters("no liquidity to remove"));
        }

        let (amount0_min, amount1_min) = burn_amounts_with_slippage(
            self.pool_sqrt_price_x96,
            position.tick_lower,
            position.tick_upper,
            liquidity,
            settings.slippage_for(TradePage::Liquidity),
        )?;

        Ok(DecreaseParams {
            token_id: position.token_id,
            liquidity,
            amount0_min,
            amount1_min,
            deadline: settings.deadline_from(now),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use vswap_math::Q96;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn usdc() -> Token {
        Token::new("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", "USDC", 6)
    }

    fn weth() -> Token {
        Token::new("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2", "WETH", 18)
    }

    #[test]
    fn test_parse_price_bound() {
        assert_eq!(PriceBound::parse("Infinity").unwrap(), PriceBound::Infinite);
        assert_eq!(PriceBound::parse("∞").unwrap(), PriceBound::Infinite);
        assert_eq!(PriceBound::parse("0").unwrap(), PriceBound::Zero);
        assert_eq!(PriceBound::parse(" 1.5 ").unwrap(), PriceBound::Finite(dec("1.5")));
        assert!(PriceBound::parse("-1").is_err());
        assert!(PriceBound::parse("abc").is_err());
    }

    #[test]
    fn test_invert_price_bound() {
        assert_eq!(PriceBound::Zero.invert().unwrap(), PriceBound::Infinite);
        assert_eq!(PriceBound::Infinite.invert().unwrap(), PriceBound::Zero);
        assert_eq!(PriceBound::Finite(dec("4")).invert().unwrap(), PriceBound::Finite(dec("0.25")));
    }

    #[test]
    fn test_full_range_bounds() {
        let fee = FeeAmount::Medium;
        assert_eq!(PriceBound::Zero.to_tick(fee, 18, 18).unwrap(), -887220);
        assert_eq!(PriceBound::Infinite.to_tick(fee, 18, 18).unwrap(), 887220);
    }

    #[test]
    fn test_token_order() {
        assert!(usdc().sorts_before(&weth()));
        assert!(!weth().sorts_before(&usdc()));
        let lower = Token::new("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", "USDC", 6);
        assert!(lower.same_address(&usdc()));
    }

    #[test]
    fn test_decrease_rejects_bad_percent() {
        let position = Position {
            token_id: U256::ONE,
            token0: usdc(),
            token1: weth(),
            fee: FeeAmount::Medium,
            tick_lower: -60,
            tick_upper: 60,
            liquidity: 1_000_000,
        };
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let settings = TradeSettings::default();

        for percent in [0u8, 101] {
            let request = DecreaseRequest {
                position: position.clone(),
                percent,
                pool_sqrt_price_x96: Q96,
            };
            assert!(matches!(
                request.build(&settings, now),
                Err(ClientError::InvalidParameters(_))
            ));
        }

        let empty = DecreaseRequest {
            position: Position {
                liquidity: 0,
                ..position
            },
            percent: 100,
            pool_sqrt_price_x96: Q96,
        };
        assert!(matches!(
            empty.build(&settings, now),
            Err(ClientError::InvalidParameters(_))
        ));
    }
}
