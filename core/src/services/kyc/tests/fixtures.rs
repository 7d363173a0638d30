//! Shared wiring for orchestrator unit tests

use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::context::RequestContext;
use crate::domain::value_objects::ConsentInput;
use crate::repositories::{MockAuditLogRepository, MockVerificationRepository};
use crate::services::audit::{AuditService, AuditServiceConfig};
use crate::services::kyc::mocks::{MockAddressResolver, MockKycProvider, MockProfileUpdater};
use crate::services::kyc::{GenerateOtpRequest, KycService, KycServiceConfig};

pub type TestService =
    KycService<MockVerificationRepository, MockKycProvider, MockProfileUpdater, MockAddressResolver>;

pub struct Harness {
    pub service: TestService,
    pub repository: Arc<MockVerificationRepository>,
    pub provider: Arc<MockKycProvider>,
    pub profiles: Arc<MockProfileUpdater>,
    pub addresses: Arc<MockAddressResolver>,
    pub audit_logs: Arc<MockAuditLogRepository>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(KycServiceConfig::default())
    }

    pub fn with_config(config: KycServiceConfig) -> Self {
        let repository = Arc::new(MockVerificationRepository::new());
        let provider = Arc::new(MockKycProvider::new());
        let profiles = Arc::new(MockProfileUpdater::new());
        let addresses = Arc::new(MockAddressResolver::new());
        let audit_logs = Arc::new(MockAuditLogRepository::new());
        let audit = Arc::new(AuditService::new(
            Arc::clone(&audit_logs),
            AuditServiceConfig {
                async_writes: false,
            },
        ));

        let service = KycService::new(
            Arc::clone(&repository),
            Arc::clone(&provider),
            Arc::clone(&profiles),
            Arc::clone(&addresses),
            audit,
            config,
        );

        Self {
            service,
            repository,
            provider,
            profiles,
            addresses,
            audit_logs,
        }
    }

    /// Issue an OTP for `user_id` and return the reference id
    pub async fn issue(&self, user_id: Uuid) -> String {
        self.service
            .generate_otp(&RequestContext::background(), user_id, generate_request())
            .await
            .expect("issue should succeed")
            .reference_id
    }
}

pub fn generate_request() -> GenerateOtpRequest {
    GenerateOtpRequest {
        subject_number: "123456789012".to_string(),
        consent: serde_json::from_value::<ConsentInput>(json!("Y")).unwrap(),
    }
}
