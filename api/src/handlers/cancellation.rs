//! Ties a request's [`RequestContext`] to the lifetime of its handler.
//!
//! actix drops the handler future when the client disconnects. The operation runs on its
//! own local task so it can observe the cancellation and unwind through the service
//! (audit entries, no attempt increment) instead of being torn down mid-await.

use std::future::Future;

use ekyc_core::context::{CancelHandle, RequestContext};
use ekyc_core::errors::{DomainError, DomainResult};

/// Cancels the paired context when dropped
struct CancelOnDrop(CancelHandle);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

/// Run `operation` with a context that is cancelled if the caller stops waiting
pub async fn run_cancellable<F, Fut, T>(operation: F) -> DomainResult<T>
where
    F: FnOnce(RequestContext) -> Fut,
    Fut: Future<Output = DomainResult<T>> + 'static,
    T: 'static,
{
    let (ctx, handle) = RequestContext::with_cancel();
    let _guard = CancelOnDrop(handle);

    actix_web::rt::spawn(operation(ctx))
        .await
        .map_err(|e| DomainError::internal(format!("request task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[actix_web::test]
    async fn test_completed_operation_returns_its_result() {
        let result = run_cancellable(|ctx| async move {
            ctx.check()?;
            Ok(41 + 1)
        })
        .await;
        assert_eq!(result, Ok(42));
    }

    #[actix_web::test]
    async fn test_dropping_the_caller_cancels_the_operation() {
        let (tx, rx) = tokio::sync::oneshot::channel();

        let waiting = run_cancellable(move |ctx| async move {
            let outcome = ctx.sleep(Duration::from_secs(30)).await;
            let _ = tx.send(outcome);
            Ok(())
        });
        // Caller gives up long before the operation would finish
        let _ = tokio::time::timeout(Duration::from_millis(20), waiting).await;

        let observed = tokio::time::timeout(Duration::from_secs(1), rx)
            .await
            .expect("operation should observe cancellation")
            .unwrap();
        assert_eq!(observed, Err(DomainError::Cancelled));
    }
}
