//! Application factory

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::error::InternalError;
use actix_web::{web, App, Error, HttpResponse};
use tracing_actix_web::TracingLogger;

use ekyc_core::errors::DomainError;
use ekyc_core::repositories::VerificationRepository;
use ekyc_core::services::kyc::{AddressResolver, KycProvider, ProfileUpdater};
use ekyc_shared::config::{Environment, ServerConfig};
use ekyc_shared::errors::{error_codes, ErrorResponse};

use crate::handlers::handle_domain_error;
use crate::middleware::create_cors;
use crate::routes::health::{health_check, HealthState};
use crate::routes::kyc::{generate_otp, kyc_status, verify_otp, AppState};

/// Process-wide settings the app factory needs besides the service state
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub environment: Environment,
    pub max_payload_size: usize,
    pub provider_configured: bool,
}

impl AppSettings {
    pub fn new(environment: Environment, server: &ServerConfig, provider_configured: bool) -> Self {
        Self {
            environment,
            max_payload_size: server.max_payload_size,
            provider_configured,
        }
    }
}

/// Create and configure the application with all dependencies
pub fn create_app<R, P, U, A>(
    state: web::Data<AppState<R, P, U, A>>,
    settings: AppSettings,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
>
where
    R: VerificationRepository + 'static,
    P: KycProvider + 'static,
    U: ProfileUpdater + 'static,
    A: AddressResolver + 'static,
{
    let json_config = web::JsonConfig::default()
        .limit(settings.max_payload_size)
        .error_handler(|err, _req| {
            let response = handle_domain_error(&DomainError::validation(format!(
                "invalid request body: {}",
                err
            )));
            InternalError::from_response(err, response).into()
        });

    App::new()
        .app_data(state)
        .app_data(json_config)
        .app_data(web::Data::new(HealthState {
            provider_configured: settings.provider_configured,
        }))
        .wrap(create_cors(settings.environment))
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/api/v1/kyc")
                .route("/aadhaar/otp", web::post().to(generate_otp::<R, P, U, A>))
                .route("/aadhaar/otp/verify", web::post().to(verify_otp::<R, P, U, A>))
                .route("/status", web::get().to(kyc_status::<R, P, U, A>)),
        )
        .default_service(web::route().to(not_found))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
        "none",
    ))
}
