//! # Transaction receipts
//!
//! [`wait_async_result`] polls a fetcher until it yields a value, the wait
//! budget runs out, or a [`StopHandle`] fires. [`ReceiptWatcher`] builds on
//! it with one shared wait per transaction hash, so every caller asking
//! about the same transaction observes the same outcome.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitError {
    #[error("Wait async timeout")]
    Timeout,

    #[error("Wait async stop")]
    Stopped,
}

/// Receipt as returned by `eth_getTransactionReceipt`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    pub block_hash: Option<String>,
    /// Hex block number, absent while the transaction is pending
    pub block_number: Option<String>,
    pub from: String,
    pub to: Option<String>,
    /// `0x1` on success, `0x0` on revert
    pub status: String,
}

impl TransactionReceipt {
    pub fn is_mined(&self) -> bool {
        self.block_number.as_deref().is_some_and(|n| !n.is_empty())
    }

    pub fn succeeded(&self) -> bool {
        self.status == "0x1"
    }

    /// Decode the `result` of an `eth_getTransactionReceipt` response,
    /// where `null` means the transaction is not known yet
    pub fn from_rpc_result(result: serde_json::Value) -> anyhow::Result<Option<Self>> {
        if result.is_null() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(result)?))
    }
}

/// Where receipts come from, typically a JSON-RPC client
#[async_trait]
pub trait ReceiptSource: Send + Sync {
    /// `Ok(None)` while the transaction is unknown or pending
    async fn fetch_receipt(&self, tx_hash: &str) -> anyhow::Result<Option<TransactionReceipt>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Total budget; zero waits forever
    pub max_wait: Duration,
    /// Delay after each fetch
    pub interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            max_wait: Duration::from_secs(60),
            interval: Duration::from_secs(3),
        }
    }
}

impl WaitOptions {
    /// Number of fetches before giving up, `None` when unlimited
    pub fn attempts(&self) -> Option<u64> {
        if self.max_wait.is_zero() {
            return None;
        }
        let attempts = self.max_wait.as_millis() / self.interval.as_millis().max(1);
        Some(u64::try_from(attempts).unwrap_or(u64::MAX))
    }
}

/// Aborts a wait. Cloning shares the same signal.
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for StopHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl StopHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once [`stop`](Self::stop) has been called
    pub async fn stopped(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as self, so this only returns on stop
        let _ = rx.wait_for(|stopped| *stopped).await.map(|_| ());
    }
}

/// Poll `fetch` until it yields a value.
///
/// Fetch errors count as an empty attempt. Every attempt, empty or not, is
/// followed by `interval` of sleep, and after `max_wait / interval` empty
/// attempts the wait fails with [`WaitError::Timeout`]. Stopping wins over
/// an in-flight fetch or sleep.
pub async fn wait_async_result<T, F, Fut>(
    mut fetch: F,
    options: WaitOptions,
    stop: StopHandle,
) -> Result<T, WaitError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<Option<T>>>,
{
    let attempts = options.attempts();
    let mut attempt: u64 = 0;

    loop {
        if attempts.is_some_and(|max| attempt >= max) {
            return Err(WaitError::Timeout);
        }
        attempt += 1;

        let result = tokio::select! {
            biased;
            _ = stop.stopped() => return Err(WaitError::Stopped),
            result = fetch() => result,
        };

        match result {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(e) => debug!(attempt, error = %e, "Fetch failed, retrying"),
        }

        tokio::select! {
            biased;
            _ = stop.stopped() => return Err(WaitError::Stopped),
            _ = tokio::time::sleep(options.interval) => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStatus {
    Pending,
    Fulfilled,
    Rejected,
}

pub type ReceiptFuture = Shared<BoxFuture<'static, Result<TransactionReceipt, WaitError>>>;

struct CachedWait {
    future: ReceiptFuture,
    stop: StopHandle,
}

impl CachedWait {
    fn status(&self) -> WaitStatus {
        match self.future.peek() {
            None => WaitStatus::Pending,
            Some(Ok(_)) => WaitStatus::Fulfilled,
            Some(Err(_)) => WaitStatus::Rejected,
        }
    }
}

/// Receipt waits cached per transaction hash.
///
/// A pending or fulfilled wait is shared with every later caller. A
/// rejected one, timed out or stopped, is replaced by a fresh wait on the
/// next request. Settled waits stay cached until [`forget`](Self::forget)
/// or [`prune_settled`](Self::prune_settled) drops them.
pub struct ReceiptWatcher {
    source: Arc<dyn ReceiptSource>,
    options: WaitOptions,
    waits: Mutex<HashMap<String, CachedWait>>,
}

impl ReceiptWatcher {
    pub fn new(source: Arc<dyn ReceiptSource>, options: WaitOptions) -> Self {
        Self {
            source,
            options,
            waits: Mutex::new(HashMap::new()),
        }
    }

    pub fn options(&self) -> WaitOptions {
        self.options
    }

    /// Wait for a mined receipt. Reverted transactions resolve too; check
    /// [`TransactionReceipt::succeeded`].
    pub fn wait(&self, tx_hash: &str) -> ReceiptFuture {
        let mut waits = self.lock();
        if let Some(cached) = waits.get(tx_hash) {
            if cached.status() != WaitStatus::Rejected {
                return cached.future.clone();
            }
            debug!(tx_hash, "Previous receipt wait rejected, starting over");
        }

        let stop = StopHandle::new();
        let future = self.start(tx_hash.to_owned(), stop.clone());

        // Drive the wait even when no caller polls it, so status() advances
        if let Ok(handle) = Handle::try_current() {
            handle.spawn(future.clone());
        }

        waits.insert(
            tx_hash.to_owned(),
            CachedWait {
                future: future.clone(),
                stop,
            },
        );
        future
    }

    /// Stop a pending wait. Its callers see [`WaitError::Stopped`].
    pub fn stop(&self, tx_hash: &str) {
        if let Some(cached) = self.lock().get(tx_hash) {
            cached.stop.stop();
        }
    }

    pub fn status(&self, tx_hash: &str) -> Option<WaitStatus> {
        self.lock().get(tx_hash).map(CachedWait::status)
    }

    /// Drop a transaction's wait, stopping it first if still pending.
    /// Returns whether a wait was cached.
    pub fn forget(&self, tx_hash: &str) -> bool {
        let Some(cached) = self.lock().remove(tx_hash) else {
            return false;
        };
        cached.stop.stop();
        debug!(tx_hash, "Receipt wait forgotten");
        true
    }

    /// Drop every fulfilled or rejected wait and return how many went.
    /// Pending waits stay shared.
    pub fn prune_settled(&self) -> usize {
        let mut waits = self.lock();
        let before = waits.len();
        waits.retain(|_, cached| cached.status() == WaitStatus::Pending);
        let pruned = before - waits.len();
        if pruned > 0 {
            debug!(pruned, remaining = waits.len(), "Settled receipt waits pruned");
        }
        pruned
    }

    /// Cached waits, settled ones included
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn start(&self, tx_hash: String, stop: StopHandle) -> ReceiptFuture {
        let source = Arc::clone(&self.source);
        let options = self.options;

        async move {
            let hash = tx_hash.clone();
            let fetch = move || {
                let source = Arc::clone(&source);
                let hash = hash.clone();
                async move {
                    let receipt = source.fetch_receipt(&hash).await?;
                    Ok::<_, anyhow::Error>(receipt.filter(TransactionReceipt::is_mined))
                }
            };

            let result = wait_async_result(fetch, options, stop).await;
            match &result {
                Ok(receipt) => info!(
                    tx_hash = %tx_hash,
                    block = receipt.block_number.as_deref().unwrap_or_default(),
                    status = %receipt.status,
                    "Transaction receipt received"
                ),
                Err(e) => info!(tx_hash = %tx_hash, error = %e, "Receipt wait ended"),
            }
            result
        }
        .boxed()
        .shared()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CachedWait>> {
        self.waits.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
