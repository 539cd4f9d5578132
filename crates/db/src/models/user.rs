use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

/// Two-tier role consulted by the permission check. Ordered: viewer < saler.
#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, TS,
    EnumString, Display,
)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Viewer,
    Saler,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, TS)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: Option<Role>,
    pub created_at: DateTime<Utc>,
}

/// Keyed by email: an existing row keeps its id and takes the new name and role.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpsertUser {
    pub email: String,
    pub full_name: Option<String>,
    pub role: Option<Role>,
}

impl User {
    /// Users without an assigned role are treated as viewers.
    pub fn effective_role(&self) -> Role {
        self.role.unwrap_or(Role::Viewer)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, full_name, role, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// `id` is only used when no user has this email yet.
    pub async fn upsert(pool: &PgPool, id: Uuid, data: &UpsertUser) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"INSERT INTO users (id, email, full_name, role)
               VALUES ($1, $2, $3, $4)
               ON CONFLICT (email) DO UPDATE
               SET full_name = EXCLUDED.full_name,
                   role = EXCLUDED.role
               RETURNING id, email, full_name, role, created_at"#,
        )
        .bind(id)
        .bind(&data.email)
        .bind(&data.full_name)
        .bind(data.role)
        .fetch_one(pool)
        .await
    }
}
