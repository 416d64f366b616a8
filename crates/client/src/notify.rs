//! Toast notifications for submitted transactions

use tracing::{info, warn};
use vswap_overlay::{OverlayId, Overlays, ToastLevel, ToastOptions};

use crate::error::ClientResult;
use crate::receipt::{ReceiptWatcher, TransactionReceipt, WaitError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionOutcome {
    Confirmed(TransactionReceipt),
    Reverted(TransactionReceipt),
    /// No receipt: timed out or stopped
    Failed(WaitError),
}

impl TransactionOutcome {
    pub fn from_wait(result: Result<TransactionReceipt, WaitError>) -> Self {
        match result {
            Ok(receipt) if receipt.succeeded() => TransactionOutcome::Confirmed(receipt),
            Ok(receipt) => TransactionOutcome::Reverted(receipt),
            Err(e) => TransactionOutcome::Failed(e),
        }
    }

    pub fn toast_level(&self) -> ToastLevel {
        match self {
            TransactionOutcome::Confirmed(_) => ToastLevel::Success,
            TransactionOutcome::Reverted(_) => ToastLevel::Error,
            TransactionOutcome::Failed(_) => ToastLevel::Warning,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, TransactionOutcome::Confirmed(_))
    }
}

/// Wait for a transaction's receipt and toast the outcome.
///
/// One toast per transaction: announcing the same hash again replaces the
/// earlier toast in place.
pub async fn announce_transaction<C, R>(
    watcher: &ReceiptWatcher,
    overlays: &Overlays<C>,
    tx_hash: &str,
    render: R,
) -> ClientResult<(TransactionOutcome, OverlayId)>
where
    C: Send + 'static,
    R: FnOnce(&TransactionOutcome) -> C,
{
    let outcome = TransactionOutcome::from_wait(watcher.wait(tx_hash).await);
    match &outcome {
        TransactionOutcome::Confirmed(_) => info!(tx_hash, "Transaction confirmed"),
        TransactionOutcome::Reverted(_) => warn!(tx_hash, "Transaction reverted"),
        TransactionOutcome::Failed(e) => warn!(tx_hash, error = %e, "No receipt for transaction"),
    }

    let options = ToastOptions::new(outcome.toast_level()).unique(format!("tx:{tx_hash}"));
    let id = overlays.show_toast(render(&outcome), options)?;
    Ok((outcome, id))
}
