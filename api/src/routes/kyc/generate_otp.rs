use actix_web::{web, HttpResponse};
use std::sync::Arc;
use tracing_actix_web::RequestId;
use validator::Validate;

use ekyc_core::repositories::VerificationRepository;
use ekyc_core::services::kyc::{AddressResolver, KycProvider, ProfileUpdater};
use ekyc_shared::types::ApiResponse;

use super::AppState;
use crate::dto::GenerateOtpBody;
use crate::handlers::{handle_domain_error, run_cancellable, validation_error_response};
use crate::middleware::CallerIdentity;

/// Handler for POST /api/v1/kyc/aadhaar/otp
///
/// ```json
/// { "aadhaar_number": "123456789012", "consent": "Y" }
/// ```
///
/// Responds with the provider's `reference_id`, to be sent back with the OTP, and the
/// instant after which the OTP is no longer accepted.
pub async fn generate_otp<R, P, U, A>(
    state: web::Data<AppState<R, P, U, A>>,
    caller: CallerIdentity,
    request_id: RequestId,
    body: web::Json<GenerateOtpBody>,
) -> HttpResponse
where
    R: VerificationRepository + 'static,
    P: KycProvider + 'static,
    U: ProfileUpdater + 'static,
    A: AddressResolver + 'static,
{
    let body = body.into_inner();
    if let Err(errors) = body.validate() {
        return validation_error_response(&errors);
    }

    let service = Arc::clone(&state.kyc_service);
    let user_id = caller.user_id;
    let result = run_cancellable(move |ctx| async move {
        service.generate_otp(&ctx, user_id, body.into()).await
    })
    .await;

    match result {
        Ok(issued) => HttpResponse::Ok()
            .json(ApiResponse::success(issued).with_request_id(request_id.to_string())),
        Err(error) => handle_domain_error(&error),
    }
}
