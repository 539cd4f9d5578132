//! Startup check that the Postgres schema is migrated and complete.

use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, warn};

/// Tables the API reads and writes.
pub const REQUIRED_TABLES: [&str; 6] = ["leads", "companies", "interactions", "deals", "tasks", "users"];

#[derive(Debug, Error)]
pub enum DatabaseValidationError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("missing tables: {}", .0.join(", "))]
    MissingTables(Vec<String>),
}

pub struct DatabaseValidator {
    pool: PgPool,
}

impl DatabaseValidator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn validate(&self) -> Result<ValidationResult, DatabaseValidationError> {
        let migrations_table_exists = self.table_exists("_sqlx_migrations").await?;
        if !migrations_table_exists {
            warn!("Database not initialized - _sqlx_migrations table does not exist");
            return Ok(ValidationResult {
                is_initialized: false,
                migrations_applied: 0,
                missing_tables: REQUIRED_TABLES.iter().map(|t| t.to_string()).collect(),
            });
        }

        let migrations_applied = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM _sqlx_migrations WHERE success",
        )
        .fetch_one(&self.pool)
        .await?;
        let missing_tables = self.validate_tables(&REQUIRED_TABLES).await?;

        info!(
            migrations_applied,
            missing = missing_tables.len(),
            "Database validation complete"
        );

        Ok(ValidationResult {
            is_initialized: true,
            migrations_applied: usize::try_from(migrations_applied).unwrap_or_default(),
            missing_tables,
        })
    }

    /// Names from `required_tables` that do not exist in the public schema.
    pub async fn validate_tables(
        &self,
        required_tables: &[&str],
    ) -> Result<Vec<String>, DatabaseValidationError> {
        let mut missing_tables = Vec::new();
        for table in required_tables {
            if !self.table_exists(table).await? {
                missing_tables.push(table.to_string());
            }
        }
        Ok(missing_tables)
    }

    /// Fails unless every required table is present.
    pub async fn ensure_ready(&self) -> Result<ValidationResult, DatabaseValidationError> {
        let result = self.validate().await?;
        if !result.missing_tables.is_empty() {
            return Err(DatabaseValidationError::MissingTables(result.missing_tables));
        }
        Ok(result)
    }

    async fn table_exists(&self, table: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS (
                   SELECT 1 FROM information_schema.tables
                   WHERE table_schema = current_schema() AND table_name = $1
               )"#,
        )
        .bind(table)
        .fetch_one(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_initialized: bool,
    pub migrations_applied: usize,
    pub missing_tables: Vec<String>,
}

impl ValidationResult {
    pub fn is_ok(&self) -> bool {
        self.is_initialized && self.missing_tables.is_empty()
    }

    pub fn summary(&self) -> String {
        if !self.is_initialized {
            "Database not initialized - migrations need to be run".to_string()
        } else if !self.missing_tables.is_empty() {
            format!("Database is missing tables: {}", self.missing_tables.join(", "))
        } else {
            format!("Database OK - {} migrations applied", self.migrations_applied)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_names_missing_tables() {
        let result = ValidationResult {
            is_initialized: true,
            migrations_applied: 1,
            missing_tables: vec!["deals".to_string(), "tasks".to_string()],
        };
        assert!(!result.is_ok());
        assert_eq!(result.summary(), "Database is missing tables: deals, tasks");
    }

    #[test]
    fn complete_schema_is_ok() {
        let result = ValidationResult {
            is_initialized: true,
            migrations_applied: 1,
            missing_tables: Vec::new(),
        };
        assert!(result.is_ok());
        assert_eq!(result.summary(), "Database OK - 1 migrations applied");
    }
}
