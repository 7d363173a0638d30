use actix_web::{web, HttpResponse};

use ekyc_shared::types::HealthResponse;

/// Settings the health endpoint reports on
#[derive(Debug, Clone, Copy)]
pub struct HealthState {
    pub provider_configured: bool,
}

/// Handler for GET /health
pub async fn health_check(state: web::Data<HealthState>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse::new(state.provider_configured))
}
