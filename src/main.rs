use account_ledger::application::{AccountService, AccountServiceTrait};
use account_ledger::infrastructure::config::{AppConfig, StorageBackend};
use account_ledger::infrastructure::logging::init_logging;
use account_ledger::infrastructure::repository::{AccountRepositoryTrait, InMemoryAccountRepository};
use account_ledger::infrastructure::shutdown::shutdown_signal;
use account_ledger::infrastructure::PgAccountRepository;
use account_ledger::web::create_router;
use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

async fn build_repository(config: &AppConfig) -> anyhow::Result<Arc<dyn AccountRepositoryTrait>> {
    match config.storage {
        StorageBackend::InMemory => {
            info!("Using in-memory account store");
            Ok(Arc::new(InMemoryAccountRepository::new()))
        }
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is not set")?;
            let repository =
                PgAccountRepository::connect(database_url, config.database_pool_size).await?;
            repository.migrate().await?;
            info!("Database migrations applied");
            Ok(Arc::new(repository))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let config = AppConfig::from_env()?;
    let _log_guards = init_logging(config.logging.clone())?;

    info!("Starting account ledger service");

    let repository = build_repository(&config).await?;
    let service: Arc<dyn AccountServiceTrait> = Arc::new(AccountService::new(repository));
    let app = create_router(service, &config.allowed_origins);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!(
        "Server listening on {} (allowed origins: {:?})",
        addr, config.allowed_origins
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
