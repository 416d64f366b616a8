//! User trade settings
//!
//! Swap and liquidity pages have different automatic slippage tolerances.
//! Once the user sets a tolerance manually, both pages use it.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use vswap_math::SlippageTolerance;

use crate::error::{ClientError, ClientResult};

/// Automatic tolerance on the swap page, 0.1%
pub const SWAP_AUTO_SLIPPAGE: SlippageTolerance = SlippageTolerance::from_bps(10);

/// Automatic tolerance on the liquidity pages, 0.5%
pub const LIQUIDITY_AUTO_SLIPPAGE: SlippageTolerance = SlippageTolerance::from_bps(50);

/// Highest manual tolerance accepted outside expert mode, 50%
pub const MAX_SLIPPAGE_WITHOUT_EXPERT: SlippageTolerance = SlippageTolerance::from_bps(5000);

pub const DEFAULT_DEADLINE_MINUTES: u32 = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlippageMode {
    #[default]
    Auto,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradePage {
    Swap,
    Liquidity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeSettings {
    pub slippage_mode: SlippageMode,

    /// Tolerance used on every page in manual mode
    pub manual_slippage: SlippageTolerance,

    /// Minutes a submitted transaction stays valid
    pub transaction_deadline_minutes: u32,

    /// Skips confirmation prompts and allows high slippage
    pub expert_mode: bool,
}

impl Default for TradeSettings {
    fn default() -> Self {
        Self {
            slippage_mode: SlippageMode::Auto,
            manual_slippage: LIQUIDITY_AUTO_SLIPPAGE,
            transaction_deadline_minutes: DEFAULT_DEADLINE_MINUTES,
            expert_mode: false,
        }
    }
}

impl TradeSettings {
    /// Tolerance in effect on a page
    pub fn slippage_for(&self, page: TradePage) -> SlippageTolerance {
        match (self.slippage_mode, page) {
            (SlippageMode::Manual, _) => self.manual_slippage,
            (SlippageMode::Auto, TradePage::Swap) => SWAP_AUTO_SLIPPAGE,
            (SlippageMode::Auto, TradePage::Liquidity) => LIQUIDITY_AUTO_SLIPPAGE,
        }
    }

    /// Tolerance in effect on a page, in percent
    pub fn slippage_percent_for(&self, page: TradePage) -> Decimal {
        self.slippage_for(page).percent()
    }

    /// Set a manual tolerance and switch to manual mode
    pub fn set_slippage(&mut self, slippage: SlippageTolerance) -> ClientResult<()> {
        self.check_slippage(slippage)?;
        self.manual_slippage = slippage;
        self.slippage_mode = SlippageMode::Manual;
        debug!(%slippage, "Manual slippage tolerance set");
        Ok(())
    }

    /// Set a manual tolerance given in percent, `0.5` meaning 0.5%
    pub fn set_slippage_percent(&mut self, percent: Decimal) -> ClientResult<()> {
        self.set_slippage(SlippageTolerance::from_percent(percent)?)
    }

    pub fn toggle_slippage_mode(&mut self) {
        self.slippage_mode = match self.slippage_mode {
            SlippageMode::Auto => SlippageMode::Manual,
            SlippageMode::Manual => SlippageMode::Auto,
        };
    }

    /// Unix timestamp after which a transaction submitted at `now` reverts
    pub fn deadline_from(&self, now: DateTime<Utc>) -> i64 {
        (now + Duration::minutes(i64::from(self.transaction_deadline_minutes))).timestamp()
    }

    pub fn deadline(&self) -> i64 {
        self.deadline_from(Utc::now())
    }

    /// Whether a transaction needs an explicit confirmation prompt
    pub fn requires_confirmation(&self) -> bool {
        !self.expert_mode
    }

    pub fn validate(&self) -> ClientResult<()> {
        if self.transaction_deadline_minutes == 0 {
            return Err(ClientError::invalid_config(
                "transaction_deadline_minutes must be greater than 0",
            ));
        }
        self.check_slippage(self.manual_slippage)
    }

    fn check_slippage(&self, slippage: SlippageTolerance) -> ClientResult<()> {
        if !self.expert_mode && slippage > MAX_SLIPPAGE_WITHOUT_EXPERT {
            return Err(ClientError::invalid_parameters(format!(
                "slippage tolerance {} above {} requires expert mode",
                slippage, MAX_SLIPPAGE_WITHOUT_EXPERT
            )));
        }
        Ok(())
    }
}
