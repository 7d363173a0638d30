use actix_web::{web, HttpServer};
use std::sync::Arc;

use ekyc_api::app::{create_app, AppSettings};
use ekyc_api::routes::kyc::AppState;
use ekyc_api::telemetry::init_tracing;
use ekyc_core::repositories::PhotoStore;
use ekyc_core::services::audit::{AuditService, AuditServiceConfig};
use ekyc_core::services::kyc::{KycService, KycServiceConfig, RepositoryIssueRateLimiter};
use ekyc_infra::database::{
    DatabasePool, MySqlAddressRepository, MySqlAuditLogRepository, MySqlProfileRepository,
    MySqlVerificationRepository,
};
use ekyc_infra::{FilesystemPhotoStore, SandboxClient};
use ekyc_shared::config::AppConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env();
    init_tracing(&config.logging)?;

    tracing::info!(
        environment = ?config.environment,
        bind_address = %config.server.bind_address(),
        "Starting eKYC API server"
    );

    let database = DatabasePool::new(config.database.clone()).await?;
    database.run_migrations().await?;
    let pool = database.get_pool().clone();

    let provider = Arc::new(SandboxClient::new(config.provider.clone())?);
    provider.warm_up().await;

    let photos: Arc<dyn PhotoStore> = Arc::new(FilesystemPhotoStore::new(&config.storage));
    let repository = Arc::new(MySqlVerificationRepository::new(pool.clone(), photos));
    let profiles = Arc::new(MySqlProfileRepository::new(pool.clone()));
    let addresses = Arc::new(MySqlAddressRepository::new(pool.clone()));
    let audit = Arc::new(AuditService::new(
        Arc::new(MySqlAuditLogRepository::new(pool)),
        AuditServiceConfig::default(),
    ));
    let rate_limiter = Arc::new(RepositoryIssueRateLimiter::new(
        Arc::clone(&repository),
        config.kyc.otp_cooldown_seconds,
        config.kyc.otp_max_issues_per_window,
    ));

    let kyc_service = KycService::new(
        repository,
        provider,
        profiles,
        addresses,
        audit,
        KycServiceConfig::from(&config.kyc),
    )
    .with_rate_limiter(rate_limiter);

    let state = web::Data::new(AppState {
        kyc_service: Arc::new(kyc_service),
    });
    let settings = AppSettings::new(
        config.environment,
        &config.server,
        config.provider.is_configured(),
    );

    let mut server = HttpServer::new(move || create_app(state.clone(), settings.clone()));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }
    server.bind(config.server.bind_address())?.run().await?;

    tracing::info!("Server stopped, closing database pool");
    database.close().await;
    Ok(())
}
