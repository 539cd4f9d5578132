use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use ts_rs::TS;
use uuid::Uuid;

const DEAL_COLUMNS: &str =
    "id, lead_id, user_id, title, value, stage, expected_close_date, created_at, updated_at";

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, TS)]
pub struct Deal {
    pub id: Uuid,
    pub lead_id: Uuid,         // Foreign key to Lead
    pub user_id: Option<Uuid>, // Owning salesperson
    pub title: String,
    pub value: Option<f64>,
    pub stage: String,
    pub expected_close_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateDeal {
    pub lead_id: Uuid,
    pub user_id: Option<Uuid>,
    pub title: String,
    pub value: Option<f64>,
    pub stage: String,
    pub expected_close_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateDeal {
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub user_id: Option<Option<Uuid>>,
    pub title: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub value: Option<Option<f64>>,
    pub stage: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub expected_close_date: Option<Option<DateTime<Utc>>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct DealFilter {
    pub lead_id: Option<Uuid>,
    pub stage: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, TS)]
pub struct StageCount {
    pub stage: String,
    pub count: i64,
}

impl Deal {
    pub async fn find_all(pool: &PgPool, filter: &DealFilter) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Deal>(&format!(
            r#"SELECT {DEAL_COLUMNS}
               FROM deals
               WHERE ($1::UUID IS NULL OR lead_id = $1)
                 AND ($2::TEXT IS NULL OR stage = $2)
               ORDER BY created_at DESC, id DESC"#
        ))
        .bind(filter.lead_id)
        .bind(&filter.stage)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Deal>(&format!("SELECT {DEAL_COLUMNS} FROM deals WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &PgPool, id: Uuid, data: &CreateDeal) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Deal>(&format!(
            r#"INSERT INTO deals (id, lead_id, user_id, title, value, stage, expected_close_date)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING {DEAL_COLUMNS}"#
        ))
        .bind(id)
        .bind(data.lead_id)
        .bind(data.user_id)
        .bind(&data.title)
        .bind(data.value)
        .bind(&data.stage)
        .bind(data.expected_close_date)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: &UpdateDeal,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Deal>(&format!(
            r#"UPDATE deals
               SET user_id = CASE WHEN $2 THEN $3 ELSE user_id END,
                   title = COALESCE($4, title),
                   value = CASE WHEN $5 THEN $6 ELSE value END,
                   stage = COALESCE($7, stage),
                   expected_close_date = CASE WHEN $8 THEN $9 ELSE expected_close_date END,
                   updated_at = now()
               WHERE id = $1
               RETURNING {DEAL_COLUMNS}"#
        ))
        .bind(id)
        .bind(data.user_id.is_some())
        .bind(data.user_id.flatten())
        .bind(&data.title)
        .bind(data.value.is_some())
        .bind(data.value.flatten())
        .bind(&data.stage)
        .bind(data.expected_close_date.is_some())
        .bind(data.expected_close_date.flatten())
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM deals WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count_by_stage(pool: &PgPool) -> Result<Vec<StageCount>, sqlx::Error> {
        sqlx::query_as::<_, StageCount>(
            r#"SELECT stage, COUNT(*) AS count
               FROM deals
               GROUP BY stage
               ORDER BY count DESC, stage ASC"#,
        )
        .fetch_all(pool)
        .await
    }
}
