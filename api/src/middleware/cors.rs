//! CORS configuration.
//!
//! Development allows any origin. Production only allows the origins listed in
//! `ALLOWED_ORIGINS` (comma separated).

use actix_cors::Cors;
use actix_web::http::{header, Method};

use ekyc_shared::config::Environment;

const DEFAULT_MAX_AGE: usize = 3600;

pub fn create_cors(environment: Environment) -> Cors {
    let max_age = std::env::var("CORS_MAX_AGE")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(DEFAULT_MAX_AGE);

    if environment.is_production() {
        let origins = std::env::var("ALLOWED_ORIGINS").unwrap_or_default();
        create_production_cors(&origins, max_age)
    } else {
        create_development_cors(max_age)
    }
}

fn base_cors(max_age: usize) -> Cors {
    Cors::default()
        .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(vec![
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-user-id"),
            header::HeaderName::from_static("x-request-id"),
        ])
        .expose_headers(vec![
            header::HeaderName::from_static("x-request-id"),
            header::RETRY_AFTER,
        ])
        .max_age(max_age)
}

fn create_development_cors(max_age: usize) -> Cors {
    tracing::info!("Configuring CORS for development environment");
    base_cors(max_age).allow_any_origin()
}

fn create_production_cors(origins: &str, max_age: usize) -> Cors {
    tracing::info!("Configuring CORS for production environment");

    let mut cors = base_cors(max_age);
    for origin in origins.split(',').map(str::trim).filter(|o| !o.is_empty()) {
        tracing::info!(origin, "Adding allowed origin");
        cors = cors.allowed_origin(origin);
    }
    cors
}
