use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use ts_rs::TS;
use uuid::Uuid;

const COMPANY_COLUMNS: &str = "id, name, industry, website, created_at, updated_at";

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, TS)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateCompany {
    pub name: String,
    pub industry: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateCompany {
    pub name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub industry: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub website: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct CompanyFilter {
    pub industry: Option<String>,
}

impl Company {
    pub async fn find_all(pool: &PgPool, filter: &CompanyFilter) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Company>(&format!(
            r#"SELECT {COMPANY_COLUMNS}
               FROM companies
               WHERE ($1::TEXT IS NULL OR industry = $1)
               ORDER BY name COLLATE "C" ASC, id ASC"#
        ))
        .bind(&filter.industry)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Company>(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(pool: &PgPool, id: Uuid, data: &CreateCompany) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Company>(&format!(
            r#"INSERT INTO companies (id, name, industry, website)
               VALUES ($1, $2, $3, $4)
               RETURNING {COMPANY_COLUMNS}"#
        ))
        .bind(id)
        .bind(&data.name)
        .bind(&data.industry)
        .bind(&data.website)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: &UpdateCompany,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Company>(&format!(
            r#"UPDATE companies
               SET name = COALESCE($2, name),
                   industry = CASE WHEN $3 THEN $4 ELSE industry END,
                   website = CASE WHEN $5 THEN $6 ELSE website END,
                   updated_at = now()
               WHERE id = $1
               RETURNING {COMPANY_COLUMNS}"#
        ))
        .bind(id)
        .bind(&data.name)
        .bind(data.industry.is_some())
        .bind(data.industry.clone().flatten())
        .bind(data.website.is_some())
        .bind(data.website.clone().flatten())
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
