use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use ts_rs::TS;
use uuid::Uuid;

const INTERACTION_COLUMNS: &str =
    "id, lead_id, user_id, interaction_type, notes, date, created_at";

/// A logged touchpoint with a lead (call, email, meeting...).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, TS)]
pub struct Interaction {
    pub id: Uuid,
    pub lead_id: Uuid,         // Foreign key to Lead
    pub user_id: Option<Uuid>, // Foreign key to User
    pub interaction_type: String,
    pub notes: Option<String>,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateInteraction {
    pub lead_id: Uuid,
    pub user_id: Option<Uuid>,
    pub interaction_type: String,
    pub notes: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateInteraction {
    pub interaction_type: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub notes: Option<Option<String>>,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct InteractionFilter {
    pub lead_id: Option<Uuid>,
}

impl Interaction {
    pub async fn find_all(
        pool: &PgPool,
        filter: &InteractionFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Interaction>(&format!(
            r#"SELECT {INTERACTION_COLUMNS}
               FROM interactions
               WHERE ($1::UUID IS NULL OR lead_id = $1)
               ORDER BY date DESC, id DESC"#
        ))
        .bind(filter.lead_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_recent(pool: &PgPool, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Interaction>(&format!(
            r#"SELECT {INTERACTION_COLUMNS}
               FROM interactions
               ORDER BY date DESC, id DESC
               LIMIT $1"#
        ))
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Interaction>(&format!(
            "SELECT {INTERACTION_COLUMNS} FROM interactions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &PgPool,
        id: Uuid,
        data: &CreateInteraction,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Interaction>(&format!(
            r#"INSERT INTO interactions (id, lead_id, user_id, interaction_type, notes, date)
               VALUES ($1, $2, $3, $4, $5, COALESCE($6, now()))
               RETURNING {INTERACTION_COLUMNS}"#
        ))
        .bind(id)
        .bind(data.lead_id)
        .bind(data.user_id)
        .bind(&data.interaction_type)
        .bind(&data.notes)
        .bind(data.date)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: &UpdateInteraction,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Interaction>(&format!(
            r#"UPDATE interactions
               SET interaction_type = COALESCE($2, interaction_type),
                   notes = CASE WHEN $3 THEN $4 ELSE notes END,
                   date = COALESCE($5, date)
               WHERE id = $1
               RETURNING {INTERACTION_COLUMNS}"#
        ))
        .bind(id)
        .bind(&data.interaction_type)
        .bind(data.notes.is_some())
        .bind(data.notes.clone().flatten())
        .bind(data.date)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM interactions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
