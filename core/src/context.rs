//! Per-request cancellation context.
//!
//! Every orchestrator and provider operation receives a `RequestContext`. Long waits
//! (retry backoff, in-flight HTTP calls) `select!` on [`RequestContext::cancelled`] so a
//! caller that goes away stops the work instead of letting remaining retries run.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

use crate::errors::{DomainError, DomainResult};

/// Cancellation signal carried through a single request
#[derive(Debug, Clone)]
pub struct RequestContext {
    rx: watch::Receiver<bool>,
    // Keeps the channel open for contexts nobody can cancel
    _root: Option<Arc<watch::Sender<bool>>>,
}

/// Handle that cancels the paired [`RequestContext`] and all of its clones
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl RequestContext {
    /// A context that is never cancelled
    pub fn background() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            rx,
            _root: Some(Arc::new(tx)),
        }
    }

    /// A cancellable context and the handle that cancels it
    pub fn with_cancel() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        (Self { rx, _root: None }, CancelHandle { tx })
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the context is cancelled.
    ///
    /// If the handle is dropped without cancelling, this never resolves.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    /// Fail fast with `DomainError::Cancelled` when already cancelled
    pub fn check(&self) -> DomainResult<()> {
        if self.is_cancelled() {
            Err(DomainError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Drive `fut` to completion unless the context is cancelled first
    pub async fn run<F, T>(&self, fut: F) -> DomainResult<T>
    where
        F: Future<Output = DomainResult<T>>,
    {
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(DomainError::Cancelled),
            result = fut => result,
        }
    }

    /// Sleep for `duration`, returning early with `Cancelled` if the context is cancelled
    pub async fn sleep(&self, duration: std::time::Duration) -> DomainResult<()> {
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(DomainError::Cancelled),
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::background()
    }
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}
