//! Swap guards: the worst amounts a swap accepts before reverting

use chrono::{DateTime, Utc};
use ethnum::U256;
use serde::{Deserialize, Serialize};
use tracing::debug;
use vswap_math::{amount_in_maximum, amount_out_minimum};

use crate::error::{ClientError, ClientResult};
use crate::settings::{TradePage, TradeSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeType {
    /// Input amount fixed, output quoted
    ExactInput,
    /// Output amount fixed, input quoted
    ExactOutput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapGuard {
    pub trade_type: TradeType,
    #[serde(with = "vswap_math::serde_u256")]
    pub amount_in: U256,
    #[serde(with = "vswap_math::serde_u256")]
    pub amount_out: U256,
    /// Equal to `amount_out` for exact output swaps
    #[serde(with = "vswap_math::serde_u256")]
    pub amount_out_minimum: U256,
    /// Equal to `amount_in` for exact input swaps
    #[serde(with = "vswap_math::serde_u256")]
    pub amount_in_maximum: U256,
    pub deadline: i64,
}

impl SwapGuard {
    /// Guard for selling exactly `amount_in` against a quoted output
    pub fn exact_input(
        amount_in: U256,
        quoted_amount_out: U256,
        settings: &TradeSettings,
        now: DateTime<Utc>,
    ) -> ClientResult<Self> {
        check_amounts(amount_in, quoted_amount_out)?;
        let slippage = settings.slippage_for(TradePage::Swap);
        let minimum = amount_out_minimum(quoted_amount_out, slippage)?;
        debug!(%amount_in, %quoted_amount_out, %minimum, %slippage, "Exact input guard");

        Ok(Self {
            trade_type: TradeType::ExactInput,
            amount_in,
            amount_out: quoted_amount_out,
            amount_out_minimum: minimum,
            amount_in_maximum: amount_in,
            deadline: settings.deadline_from(now),
        })
    }

    /// Guard for buying exactly `amount_out` against a quoted input
    pub fn exact_output(
        amount_out: U256,
        quoted_amount_in: U256,
        settings: &TradeSettings,
        now: DateTime<Utc>,
    ) -> ClientResult<Self> {
        check_amounts(quoted_amount_in, amount_out)?;
        let slippage = settings.slippage_for(TradePage::Swap);
        let maximum = amount_in_maximum(quoted_amount_in, slippage)?;
        debug!(%amount_out, %quoted_amount_in, %maximum, %slippage, "Exact output guard");

        Ok(Self {
            trade_type: TradeType::ExactOutput,
            amount_in: quoted_amount_in,
            amount_out,
            amount_out_minimum: amount_out,
            amount_in_maximum: maximum,
            deadline: settings.deadline_from(now),
        })
    }

    /// The bound the router enforces for this trade type
    pub fn limit(&self) -> U256 {
        match self.trade_type {
            TradeType::ExactInput => self.amount_out_minimum,
            TradeType::ExactOutput => self.amount_in_maximum,
        }
    }
}

fn check_amounts(amount_in: U256, amount_out: U256) -> ClientResult<()> {
    if amount_in == U256::ZERO || amount_out == U256::ZERO {
        return Err(ClientError::invalid_parameters("swap amounts must be non-zero"));
    }
    Ok(())
}
