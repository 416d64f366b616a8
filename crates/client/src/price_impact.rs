//! # Price impact
//!
//! Impact is a fraction of the spot value lost to the trade, positive for a
//! loss. Tiers decide how loudly the swap page warns, whether the user must
//! confirm, and when a swap is refused outside expert mode.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ClientError, ClientResult};
use crate::settings::TradeSettings;

/// 1%
pub const ALLOWED_PRICE_IMPACT_LOW: Decimal = Decimal::from_parts(1, 0, 0, false, 2);
/// 3%
pub const ALLOWED_PRICE_IMPACT_MEDIUM: Decimal = Decimal::from_parts(3, 0, 0, false, 2);
/// 5%
pub const ALLOWED_PRICE_IMPACT_HIGH: Decimal = Decimal::from_parts(5, 0, 0, false, 2);
/// At or above 10% the user types "confirm" before swapping
pub const PRICE_IMPACT_WITHOUT_FEE_CONFIRM_MIN: Decimal = Decimal::from_parts(10, 0, 0, false, 2);
/// Above 15% swaps are refused outside expert mode
pub const BLOCKED_PRICE_IMPACT_NON_EXPERT: Decimal = Decimal::from_parts(15, 0, 0, false, 2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningSeverity {
    None,
    Low,
    Medium,
    High,
    Blocked,
}

impl WarningSeverity {
    /// Severity of a price impact or fiat value change. Unknown and
    /// favourable (negative) changes carry no warning.
    pub fn from_impact(impact: Option<Decimal>) -> Self {
        let Some(impact) = impact else {
            return WarningSeverity::None;
        };
        if impact > BLOCKED_PRICE_IMPACT_NON_EXPERT {
            WarningSeverity::Blocked
        } else if impact > ALLOWED_PRICE_IMPACT_HIGH {
            WarningSeverity::High
        } else if impact > ALLOWED_PRICE_IMPACT_MEDIUM {
            WarningSeverity::Medium
        } else if impact > ALLOWED_PRICE_IMPACT_LOW {
            WarningSeverity::Low
        } else {
            WarningSeverity::None
        }
    }

    /// 0 to 4, as shown next to the impact figure
    pub fn level(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceImpactWarning {
    Warning,
    Error,
}

/// Colour of the impact figure: error above 5%, warning above 3%
pub fn price_impact_warning(impact: Decimal) -> Option<PriceImpactWarning> {
    if impact > ALLOWED_PRICE_IMPACT_HIGH {
        Some(PriceImpactWarning::Error)
    } else if impact > ALLOWED_PRICE_IMPACT_MEDIUM {
        Some(PriceImpactWarning::Warning)
    } else {
        None
    }
}

/// What the user must do before a swap with a given impact is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactConfirmation {
    NotRequired,
    /// A plain yes/no prompt
    Confirm,
    /// The user types the word "confirm"
    TypeConfirm,
}

impl ImpactConfirmation {
    pub fn for_impact(impact_without_fee: Decimal) -> Self {
        if impact_without_fee >= PRICE_IMPACT_WITHOUT_FEE_CONFIRM_MIN {
            ImpactConfirmation::TypeConfirm
        } else if impact_without_fee >= ALLOWED_PRICE_IMPACT_HIGH {
            ImpactConfirmation::Confirm
        } else {
            ImpactConfirmation::NotRequired
        }
    }

    /// Prompt shown to the user, `None` when no confirmation is needed
    pub fn prompt(self) -> Option<String> {
        let percent = |threshold: Decimal| (threshold * Decimal::ONE_HUNDRED).normalize();
        match self {
            ImpactConfirmation::NotRequired => None,
            ImpactConfirmation::Confirm => Some(format!(
                "This swap has a price impact of at least {}%. Please confirm that you would like to continue with this swap.",
                percent(ALLOWED_PRICE_IMPACT_HIGH)
            )),
            ImpactConfirmation::TypeConfirm => Some(format!(
                "This swap has a price impact of at least {}%. Please type the word \"confirm\" to continue with this swap.",
                percent(PRICE_IMPACT_WITHOUT_FEE_CONFIRM_MIN)
            )),
        }
    }

    /// Whether the user's answer lets the swap through. `answer` is the
    /// typed text for [`TypeConfirm`](Self::TypeConfirm) and anything
    /// non-empty counts as yes for [`Confirm`](Self::Confirm).
    pub fn accepts(self, answer: Option<&str>) -> bool {
        match self {
            ImpactConfirmation::NotRequired => true,
            ImpactConfirmation::Confirm => answer.is_some(),
            ImpactConfirmation::TypeConfirm => answer == Some("confirm"),
        }
    }
}

/// Impact of a routed trade: the shortfall against the spot output, less
/// the share taken by LP fees.
///
/// `None` when the spot output is zero.
pub fn trade_price_impact(
    spot_output: Decimal,
    amount_out: Decimal,
    realized_lp_fee: Decimal,
) -> Option<Decimal> {
    if spot_output.is_zero() {
        return None;
    }
    let shortfall = spot_output.checked_sub(amount_out)?.checked_div(spot_output)?;
    shortfall.checked_sub(realized_lp_fee)
}

/// Change in fiat value from input to output, rounded to 0.01%.
///
/// Positive is a loss. `None` when either value is unknown or the input is
/// worth nothing.
pub fn fiat_value_price_impact(
    input_fiat_value: Option<Decimal>,
    output_fiat_value: Option<Decimal>,
) -> Option<Decimal> {
    let (input, output) = (input_fiat_value?, output_fiat_value?);
    if input.is_zero() {
        return None;
    }
    let ratio = Decimal::ONE.checked_sub(output.checked_div(input)?)?;
    Some(ratio.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero))
}

/// Refuse a swap whose impact is blocked outside expert mode, otherwise
/// report the confirmation it needs. Expert mode skips confirmations.
pub fn check_price_impact(
    impact_without_fee: Decimal,
    settings: &TradeSettings,
) -> ClientResult<ImpactConfirmation> {
    let severity = WarningSeverity::from_impact(Some(impact_without_fee));
    if severity == WarningSeverity::Blocked && !settings.expert_mode {
        return Err(ClientError::InvalidParameters(format!(
            "price impact {}% is too high outside expert mode",
            (impact_without_fee * Decimal::ONE_HUNDRED).round_dp(2)
        )));
    }

    let confirmation = if settings.requires_confirmation() {
        ImpactConfirmation::for_impact(impact_without_fee)
    } else {
        ImpactConfirmation::NotRequired
    };
    debug!(%impact_without_fee, ?severity, ?confirmation, "Price impact checked");
    Ok(confirmation)
}
