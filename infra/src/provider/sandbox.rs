//! e-KYC provider client.
//!
//! Holds a single access token shared by all requests. The token is refreshed lazily
//! once it enters the refresh buffer before its expiry, and dropped whenever the provider
//! answers 401 so the next call authenticates again.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use ekyc_core::context::RequestContext;
use ekyc_core::domain::value_objects::{Consent, KycData, OtpIssued};
use ekyc_core::errors::{DomainError, DomainResult, KycError};
use ekyc_core::services::kyc::KycProvider;
use ekyc_shared::config::ProviderConfig;
use ekyc_shared::utils::{mask_secret, mask_subject_number};

use super::executor::{ProviderResponse, RequestExecutor};
use super::wire::{
    AuthResponse, Envelope, ErrorBody, KycDataWire, OtpData, OtpRequest, VerifyRequest,
    AUTHENTICATE_PATH, OTP_PATH, OTP_REASON, OTP_REQUEST_ENTITY, VERIFY_PATH,
    VERIFY_REQUEST_ENTITY,
};
use crate::InfrastructureError;

const API_KEY_HEADER: &str = "x-api-key";
const API_SECRET_HEADER: &str = "x-api-secret";
const API_VERSION_HEADER: &str = "x-api-version";

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    refresh_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Instant::now() < self.refresh_at
    }
}

pub struct SandboxClient {
    http: Client,
    config: ProviderConfig,
    executor: RequestExecutor,
    token: RwLock<Option<CachedToken>>,
}

impl SandboxClient {
    /// Build a client from configuration. No network traffic happens here.
    pub fn new(config: ProviderConfig) -> Result<Self, InfrastructureError> {
        if config.is_configured() {
            tracing::info!(
                base_url = %config.normalized_base_url(),
                api_key = %mask_secret(&config.api_key),
                api_secret = %mask_secret(&config.api_secret),
                "Initializing KYC provider client"
            );
        } else {
            tracing::warn!(
                base_url_set = !config.base_url.is_empty(),
                api_key_set = !config.api_key.is_empty(),
                api_secret_set = !config.api_secret.is_empty(),
                "KYC provider credentials are incomplete; provider calls will fail"
            );
        }

        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(InfrastructureError::from)?;
        let executor = RequestExecutor::new(config.max_retries, config.initial_backoff());

        Ok(Self {
            http,
            config,
            executor,
            token: RwLock::new(None),
        })
    }

    /// Authenticate eagerly. Failures are logged and retried on the first real call.
    pub async fn warm_up(&self) {
        if let Err(e) = self.get_valid_token(&RequestContext::background()).await {
            tracing::warn!(error = %e, "Initial provider authentication failed, will retry on first call");
        }
    }

    /// Current token, authenticating first when none is cached or it is due for refresh
    pub async fn get_valid_token(&self, ctx: &RequestContext) -> DomainResult<String> {
        if let Some(token) = self.token.read().await.as_ref() {
            if token.is_fresh() {
                return Ok(token.value.clone());
            }
        }

        let mut guard = self.token.write().await;
        // Another caller may have refreshed while we waited for the lock
        if let Some(token) = guard.as_ref() {
            if token.is_fresh() {
                return Ok(token.value.clone());
            }
        }

        let (value, validity) = self.authenticate(ctx).await?;
        let buffer = Duration::from_secs(self.config.token_buffer_secs);
        *guard = Some(CachedToken {
            value: value.clone(),
            refresh_at: Instant::now() + validity.saturating_sub(buffer),
        });
        Ok(value)
    }

    /// Forget the cached token so the next call authenticates again
    pub async fn invalidate_token(&self) {
        *self.token.write().await = None;
    }

    async fn authenticate(&self, ctx: &RequestContext) -> DomainResult<(String, Duration)> {
        tracing::info!("Authenticating with KYC provider");
        let url = self.url(AUTHENTICATE_PATH);

        let response = self
            .executor
            .execute(ctx, "authenticate", || {
                self.http
                    .post(&url)
                    .header(ACCEPT, "application/json")
                    .header(API_KEY_HEADER, &self.config.api_key)
                    .header(API_SECRET_HEADER, &self.config.api_secret)
                    .header(API_VERSION_HEADER, &self.config.api_version)
            })
            .await
            .map_err(|e| match e {
                DomainError::Cancelled => DomainError::Cancelled,
                other => DomainError::Unauthorized {
                    message: format!("provider authentication failed: {}", other),
                },
            })?;

        if response.status != StatusCode::OK {
            tracing::error!(
                status_code = response.status.as_u16(),
                "Provider authentication rejected; check KYC_PROVIDER_API_KEY and KYC_PROVIDER_API_SECRET"
            );
            return Err(DomainError::Unauthorized {
                message: format!(
                    "provider authentication failed with status {}",
                    response.status.as_u16()
                ),
            });
        }

        let auth: AuthResponse = serde_json::from_str(&response.body).map_err(|e| {
            tracing::error!(error = %e, "Failed to parse provider auth response");
            DomainError::Unauthorized {
                message: format!("unreadable provider auth response: {}", e),
            }
        })?;
        if auth.access_token.is_empty() {
            return Err(DomainError::Unauthorized {
                message: "provider returned an empty access token".to_string(),
            });
        }

        let validity = Duration::from_secs(auth.expires_in.unwrap_or(self.config.token_validity_secs));
        tracing::info!(validity_secs = validity.as_secs(), "Provider authentication successful");
        Ok((auth.access_token, validity))
    }

    /// Authenticated JSON POST, decoding `data` from the success envelope
    async fn post_kyc<B, T>(
        &self,
        ctx: &RequestContext,
        operation: &str,
        path: &str,
        body: &B,
    ) -> DomainResult<Envelope<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let token = self.get_valid_token(ctx).await?;
        let url = self.url(path);
        let started = Instant::now();

        let response = self
            .executor
            .execute(ctx, operation, || self.kyc_request(&url, &token).json(body))
            .await?;

        tracing::info!(
            operation,
            status_code = response.status.as_u16(),
            response_time_ms = started.elapsed().as_millis() as u64,
            "Received provider response"
        );

        if !response.status.is_success() {
            return Err(self.map_error_response(operation, &response).await);
        }

        serde_json::from_str(&response.body).map_err(|e| {
            tracing::error!(operation, error = %e, "Failed to parse provider response");
            DomainError::internal(format!("unreadable {} response: {}", operation, e))
        })
    }

    fn kyc_request(&self, url: &str, token: &str) -> RequestBuilder {
        self.http
            .post(url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, token)
            .header(API_KEY_HEADER, &self.config.api_key)
            .header(API_VERSION_HEADER, &self.config.api_version)
    }

    /// Translate a non-2xx provider response into a domain error
    async fn map_error_response(&self, operation: &str, response: &ProviderResponse) -> DomainError {
        let status = response.status;
        let body: ErrorBody = match serde_json::from_str(&response.body) {
            Ok(body) => body,
            Err(_) => {
                tracing::error!(operation, status_code = status.as_u16(), "Unparseable provider error response");
                return DomainError::internal(format!(
                    "provider error (status {}): {}",
                    status.as_u16(),
                    response.body
                ));
            }
        };

        tracing::error!(
            operation,
            status_code = status.as_u16(),
            error = %body.error,
            message = %body.message,
            transaction_id = %body.transaction_id,
            "Provider returned an error"
        );

        match status {
            StatusCode::BAD_REQUEST => DomainError::Validation {
                message: body.message,
            },
            StatusCode::UNAUTHORIZED => {
                self.invalidate_token().await;
                DomainError::Unauthorized {
                    message: format!("provider rejected credentials: {}", body.message),
                }
            }
            StatusCode::FORBIDDEN => DomainError::Forbidden {
                message: format!("provider access denied: {}", body.message),
            },
            StatusCode::NOT_FOUND => DomainError::NotFound {
                resource: body.message,
            },
            StatusCode::TOO_MANY_REQUESTS => KycError::RateLimited {
                message: body.message,
                retry_after_seconds: None,
            }
            .into(),
            other => DomainError::internal(format!(
                "provider error (status {}): {}",
                other.as_u16(),
                body.message
            )),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.normalized_base_url(), path)
    }
}

#[async_trait]
impl KycProvider for SandboxClient {
    async fn issue_otp(
        &self,
        ctx: &RequestContext,
        subject_number: &str,
        consent: &Consent,
    ) -> DomainResult<OtpIssued> {
        tracing::info!(subject_masked = %mask_subject_number(subject_number), "Requesting OTP from provider");

        let request = OtpRequest {
            entity: OTP_REQUEST_ENTITY,
            aadhaar_number: subject_number,
            consent: consent.provider_value(),
            reason: OTP_REASON,
        };
        let envelope: Envelope<OtpData> = self.post_kyc(ctx, "generate_otp", OTP_PATH, &request).await?;
        let issued = envelope.into_issued();

        tracing::info!(
            reference_id = %issued.reference_id,
            transaction_id = %issued.transaction_id,
            "Provider issued OTP"
        );
        Ok(issued)
    }

    async fn verify_otp(
        &self,
        ctx: &RequestContext,
        reference_id: &str,
        otp: &str,
    ) -> DomainResult<KycData> {
        tracing::info!(reference_id, "Submitting OTP to provider");

        let request = VerifyRequest {
            entity: VERIFY_REQUEST_ENTITY,
            reference_id,
            otp,
        };
        let envelope: Envelope<KycDataWire> =
            self.post_kyc(ctx, "verify_otp", VERIFY_PATH, &request).await?;

        tracing::info!(
            reference_id,
            transaction_id = %envelope.transaction_id,
            "Provider accepted OTP"
        );
        Ok(envelope.data.into())
    }
}
