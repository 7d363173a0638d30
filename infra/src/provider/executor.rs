//! Retrying request execution for provider calls.
//!
//! Transport failures and 5xx responses are retried with exponential backoff; any other
//! response is handed back to the caller as-is. Every attempt builds a fresh request, and
//! retried attempts send `connection: close` so a half-consumed pooled connection is not reused.

use reqwest::header::CONNECTION;
use reqwest::{RequestBuilder, StatusCode};
use std::time::Duration;

use ekyc_core::context::RequestContext;
use ekyc_core::errors::{DomainError, DomainResult};

use crate::InfrastructureError;

/// Status and raw body of a provider response
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Runs a request up to `max_attempts` times
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    max_attempts: u32,
    initial_backoff: Duration,
}

enum AttemptFailure {
    Transport(String),
    ServerError(StatusCode),
}

impl RequestExecutor {
    pub fn new(max_attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
        }
    }

    /// Execute the request produced by `build`, retrying transient failures.
    ///
    /// Returns `Cancelled` as soon as `ctx` is cancelled, whether mid-request or mid-backoff.
    pub async fn execute<F>(
        &self,
        ctx: &RequestContext,
        operation: &str,
        build: F,
    ) -> DomainResult<ProviderResponse>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0;
        let mut delay = self.initial_backoff;

        loop {
            attempt += 1;
            ctx.check()?;

            tracing::debug!(operation, attempt, max_attempts = self.max_attempts, "Sending provider request");

            let mut request = build();
            if attempt > 1 {
                request = request.header(CONNECTION, "close");
            }

            let outcome = ctx.run(Self::send(request)).await;
            let failure = match outcome {
                Ok(response) if !response.status.is_server_error() => return Ok(response),
                Ok(response) => AttemptFailure::ServerError(response.status),
                Err(DomainError::Cancelled) => return Err(DomainError::Cancelled),
                Err(e) => AttemptFailure::Transport(e.to_string()),
            };

            match &failure {
                AttemptFailure::Transport(error) => tracing::warn!(
                    operation,
                    attempt,
                    max_attempts = self.max_attempts,
                    error = %error,
                    "Provider request failed"
                ),
                AttemptFailure::ServerError(status) => tracing::warn!(
                    operation,
                    attempt,
                    max_attempts = self.max_attempts,
                    status_code = status.as_u16(),
                    "Provider request failed with server error"
                ),
            }

            if attempt >= self.max_attempts {
                let message = match failure {
                    AttemptFailure::Transport(error) => format!(
                        "{} failed after {} attempts: {}",
                        operation, self.max_attempts, error
                    ),
                    AttemptFailure::ServerError(status) => format!(
                        "{} failed after {} attempts with status {}",
                        operation,
                        self.max_attempts,
                        status.as_u16()
                    ),
                };
                tracing::error!(operation, attempts = attempt, "{}", message);
                return Err(DomainError::Internal { message });
            }

            ctx.sleep(delay).await?;
            delay *= 2;
        }
    }

    async fn send(request: RequestBuilder) -> DomainResult<ProviderResponse> {
        let response = request.send().await.map_err(InfrastructureError::from)?;
        let status = response.status();
        let body = response.text().await.map_err(InfrastructureError::from)?;
        Ok(ProviderResponse { status, body })
    }
}
