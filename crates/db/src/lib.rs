use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::info;

pub mod models;

/// Shared Postgres connection pool with migrations applied.
#[derive(Clone)]
pub struct DBService {
    pub pool: PgPool,
}

impl DBService {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!(max_connections, "Database pool ready, migrations applied");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// True when the error is a rejected reference to a row that does not exist.
pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}
