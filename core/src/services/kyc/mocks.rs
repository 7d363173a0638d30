//! In-memory collaborators for exercising the orchestrator without a provider or database

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

use super::traits::{AddressResolver, KycProvider, ProfileUpdater};
use crate::context::RequestContext;
use crate::domain::entities::{Address, ProfileUpdate, UserProfile};
use crate::domain::value_objects::{Consent, KycData, OtpIssued, ProviderAddress};
use crate::errors::{DomainError, DomainResult};

/// OTP the mock provider accepts
pub const MOCK_VALID_OTP: &str = "123456";

/// Provider double issuing sequential reference ids and accepting [`MOCK_VALID_OTP`]
#[derive(Clone)]
pub struct MockKycProvider {
    next_reference: Arc<AtomicU64>,
    issue_error: Arc<Mutex<Option<DomainError>>>,
    verify_error: Arc<Mutex<Option<DomainError>>>,
    kyc_data: Arc<Mutex<KycData>>,
    verify_delay: Arc<Mutex<Option<Duration>>>,
    issue_calls: Arc<AtomicUsize>,
    verify_calls: Arc<AtomicUsize>,
}

impl MockKycProvider {
    pub fn new() -> Self {
        Self {
            next_reference: Arc::new(AtomicU64::new(778899)),
            issue_error: Arc::new(Mutex::new(None)),
            verify_error: Arc::new(Mutex::new(None)),
            kyc_data: Arc::new(Mutex::new(sample_kyc_data())),
            verify_delay: Arc::new(Mutex::new(None)),
            issue_calls: Arc::new(AtomicUsize::new(0)),
            verify_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make every issue call fail with `error`
    pub fn set_issue_error(&self, error: Option<DomainError>) {
        *self.issue_error.lock().unwrap() = error;
    }

    /// Make every verify call fail with `error`, regardless of the OTP
    pub fn set_verify_error(&self, error: Option<DomainError>) {
        *self.verify_error.lock().unwrap() = error;
    }

    pub fn set_kyc_data(&self, data: KycData) {
        *self.kyc_data.lock().unwrap() = data;
    }

    /// Hold verify calls for `delay`, honouring cancellation
    pub fn set_verify_delay(&self, delay: Option<Duration>) {
        *self.verify_delay.lock().unwrap() = delay;
    }

    pub fn issue_calls(&self) -> usize {
        self.issue_calls.load(Ordering::SeqCst)
    }

    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockKycProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KycProvider for MockKycProvider {
    async fn issue_otp(
        &self,
        ctx: &RequestContext,
        _subject_number: &str,
        _consent: &Consent,
    ) -> DomainResult<OtpIssued> {
        self.issue_calls.fetch_add(1, Ordering::SeqCst);
        ctx.check()?;

        if let Some(err) = self.issue_error.lock().unwrap().clone() {
            return Err(err);
        }
        let reference = self.next_reference.fetch_add(1, Ordering::SeqCst);
        Ok(OtpIssued {
            reference_id: reference.to_string(),
            transaction_id: format!("txn-{}", reference),
            message: "OTP sent successfully".to_string(),
            timestamp: 1_700_000_000,
        })
    }

    async fn verify_otp(
        &self,
        ctx: &RequestContext,
        _reference_id: &str,
        otp: &str,
    ) -> DomainResult<KycData> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.verify_delay.lock().unwrap();
        if let Some(delay) = delay {
            ctx.sleep(delay).await?;
        }
        ctx.check()?;

        if let Some(err) = self.verify_error.lock().unwrap().clone() {
            return Err(err);
        }
        if otp != MOCK_VALID_OTP {
            return Err(DomainError::validation("Invalid OTP"));
        }
        Ok(self.kyc_data.lock().unwrap().clone())
    }
}

/// Identity data returned by [`MockKycProvider`] unless overridden
pub fn sample_kyc_data() -> KycData {
    KycData {
        name: "Asha Rao".to_string(),
        gender: "F".to_string(),
        date_of_birth: "15-08-1990".to_string(),
        year_of_birth: Some("1990".to_string()),
        care_of: Some("S/O Ravi Rao".to_string()),
        full_address: "12, MG Road, Bengaluru, Karnataka, India, 560001".to_string(),
        address: ProviderAddress {
            house: "12".to_string(),
            street: "MG Road".to_string(),
            district: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            pincode: 560001,
            country: "India".to_string(),
            ..Default::default()
        },
        // "jpegdata"
        photo: Some("anBlZ2RhdGE=".to_string()),
        share_code: Some("1234".to_string()),
        status: "VALID".to_string(),
        message: Some("Aadhaar Card Exists".to_string()),
    }
}

/// Profile store double recording every update it receives
#[derive(Clone, Default)]
pub struct MockProfileUpdater {
    profiles: Arc<Mutex<HashMap<Uuid, UserProfile>>>,
    updates: Arc<Mutex<Vec<(Uuid, ProfileUpdate)>>>,
    fail_update: Arc<Mutex<bool>>,
    fail_get: Arc<Mutex<bool>>,
}

impl MockProfileUpdater {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_update(&self, fail: bool) {
        *self.fail_update.lock().unwrap() = fail;
    }

    pub fn set_fail_get(&self, fail: bool) {
        *self.fail_get.lock().unwrap() = fail;
    }

    pub fn updates(&self) -> Vec<(Uuid, ProfileUpdate)> {
        self.updates.lock().unwrap().clone()
    }

    pub fn profile(&self, user_id: Uuid) -> Option<UserProfile> {
        self.profiles.lock().unwrap().get(&user_id).cloned()
    }
}

#[async_trait]
impl ProfileUpdater for MockProfileUpdater {
    async fn apply_update(&self, user_id: Uuid, update: &ProfileUpdate) -> DomainResult<()> {
        if *self.fail_update.lock().unwrap() {
            return Err(DomainError::internal("Mock profile store error"));
        }
        self.updates.lock().unwrap().push((user_id, update.clone()));
        self.profiles
            .lock()
            .unwrap()
            .entry(user_id)
            .or_insert_with(|| UserProfile::new(user_id))
            .apply(update);
        Ok(())
    }

    async fn get_profile(&self, user_id: Uuid) -> DomainResult<UserProfile> {
        if *self.fail_get.lock().unwrap() {
            return Err(DomainError::internal("Mock profile store error"));
        }
        self.profile(user_id)
            .ok_or_else(|| DomainError::not_found(format!("profile {}", user_id)))
    }
}

/// Address book double deduplicating on the normalized key
#[derive(Clone, Default)]
pub struct MockAddressResolver {
    by_key: Arc<Mutex<HashMap<String, Address>>>,
    should_fail: Arc<Mutex<bool>>,
    fail_get: Arc<Mutex<bool>>,
}

impl MockAddressResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.lock().unwrap() = fail;
    }

    pub fn set_fail_get(&self, fail: bool) {
        *self.fail_get.lock().unwrap() = fail;
    }

    pub fn count(&self) -> usize {
        self.by_key.lock().unwrap().len()
    }
}

#[async_trait]
impl AddressResolver for MockAddressResolver {
    async fn find_or_create(&self, candidate: &Address) -> DomainResult<(Uuid, bool)> {
        if *self.should_fail.lock().unwrap() {
            return Err(DomainError::internal("Mock address store error"));
        }
        let mut by_key = self.by_key.lock().unwrap();
        let key = candidate.normalized_key();
        if let Some(existing) = by_key.get(&key) {
            return Ok((existing.id, false));
        }
        by_key.insert(key, candidate.clone());
        Ok((candidate.id, true))
    }

    async fn get_address(&self, address_id: Uuid) -> DomainResult<Address> {
        if *self.fail_get.lock().unwrap() {
            return Err(DomainError::internal("Mock address store error"));
        }
        self.by_key
            .lock()
            .unwrap()
            .values()
            .find(|a| a.id == address_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("address {}", address_id)))
    }
}
