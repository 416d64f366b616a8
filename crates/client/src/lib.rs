//! # vswap client
//!
//! The transaction-facing layer on top of the price math and the overlay
//! orchestrator:
//!
//! - [`TradeSettings`]: slippage tolerance, deadline and expert mode
//! - [`liquidity`]: mint, increase and decrease parameters with slippage
//!   minimums, validated before anything reaches the network
//! - [`swap`]: exact-input and exact-output swap guards
//! - [`price_impact`]: warning tiers, confirmations and blocking
//! - [`receipt`]: polling for transaction receipts with timeout and stop
//! - [`notify`]: toasts for transaction outcomes

pub mod amount;
pub mod config;
pub mod error;
pub mod liquidity;
pub mod notify;
pub mod price_impact;
pub mod receipt;
pub mod settings;
pub mod swap;
pub mod telemetry;

pub use config::{ClientConfig, ReceiptWaitConfig};
pub use error::{ClientError, ClientResult};
pub use liquidity::{
    DecreaseParams, DecreaseRequest, IncreaseParams, IncreaseRequest, MintParams, MintRequest,
    Position, PriceBound, Token,
};
pub use notify::{announce_transaction, TransactionOutcome};
pub use price_impact::{
    check_price_impact, fiat_value_price_impact, price_impact_warning, trade_price_impact,
    ImpactConfirmation, PriceImpactWarning, WarningSeverity,
};
pub use receipt::{
    wait_async_result, ReceiptFuture, ReceiptSource, ReceiptWatcher, StopHandle,
    TransactionReceipt, WaitError, WaitOptions, WaitStatus,
};
pub use settings::{SlippageMode, TradePage, TradeSettings};
pub use swap::{SwapGuard, TradeType};

pub use vswap_math as math;
pub use vswap_overlay as overlay;
