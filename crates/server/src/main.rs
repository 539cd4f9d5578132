use anyhow::Context;
use db::DBService;
use server::{
    AppState, build_router,
    config::{Config, StoreConfig},
    cors_layer,
};
use services::services::{
    database_validator::DatabaseValidator,
    sample_users::ensure_demo_users,
    store::{MemoryStore, PgStore, Store},
};
use tokio::net::TcpListener;
use tracing::{info, warn};
use utils::logging::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env().context("invalid configuration")?;

    let store = match &config.store {
        StoreConfig::Postgres {
            database_url,
            max_connections,
        } => {
            let db = DBService::new(database_url, *max_connections)
                .await
                .context("failed to connect to the database")?;
            let validation = DatabaseValidator::new(db.pool.clone())
                .ensure_ready()
                .await?;
            info!(summary = %validation.summary(), "Database ready");
            Store::Postgres(PgStore::new(db))
        }
        StoreConfig::Memory => {
            warn!("Using the in-memory store; data is lost when the process exits");
            let memory = MemoryStore::new();
            ensure_demo_users(&memory).await?;
            Store::Memory(memory)
        }
    };

    if config.rbac.bypass {
        warn!("DEBUG_BYPASS_AUTH is set; permission checks are disabled");
    }
    if config.rbac.force_saler {
        warn!("FORCE_SALER_MODE is set; every caller is treated as a saler");
    }
    info!(
        store = store.kind(),
        rbac_enforced = config.rbac.enforce,
        "Starting server"
    );

    let app = build_router(AppState::new(store, config.rbac))
        .layer(cors_layer(config.cors_origins.clone()));

    let listener = TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr()))?;
    info!(addr = %listener.local_addr()?, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
