use actix_web::{web, HttpResponse};
use tracing_actix_web::RequestId;

use ekyc_core::repositories::VerificationRepository;
use ekyc_core::services::kyc::{AddressResolver, KycProvider, ProfileUpdater};
use ekyc_shared::types::ApiResponse;

use super::AppState;
use crate::handlers::handle_domain_error;
use crate::middleware::CallerIdentity;

/// Handler for GET /api/v1/kyc/status
pub async fn kyc_status<R, P, U, A>(
    state: web::Data<AppState<R, P, U, A>>,
    caller: CallerIdentity,
    request_id: RequestId,
) -> HttpResponse
where
    R: VerificationRepository + 'static,
    P: KycProvider + 'static,
    U: ProfileUpdater + 'static,
    A: AddressResolver + 'static,
{
    match state.kyc_service.get_kyc_status(caller.user_id).await {
        Ok(view) => HttpResponse::Ok()
            .json(ApiResponse::success(view).with_request_id(request_id.to_string())),
        Err(error) => handle_domain_error(&error),
    }
}
