use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

const TASK_COLUMNS: &str = "id, lead_id, user_id, title, description, due_date, status, priority, created_at, updated_at";

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, TS)]
pub struct Task {
    pub id: Uuid,
    pub lead_id: Uuid,         // Foreign key to Lead
    pub user_id: Option<Uuid>, // Assignee
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: TaskStatus,
    pub priority: Option<TaskPriority>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateTask {
    pub lead_id: Uuid,
    pub user_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateTask {
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub user_id: Option<Option<Uuid>>,
    pub title: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub description: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub status: Option<TaskStatus>,
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub priority: Option<Option<TaskPriority>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct TaskFilter {
    pub lead_id: Option<Uuid>,
    pub status: Option<TaskStatus>,
}

impl Task {
    /// Tasks ordered by due date, undated ones last.
    pub async fn find_all(pool: &PgPool, filter: &TaskFilter) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            r#"SELECT {TASK_COLUMNS}
               FROM tasks
               WHERE ($1::UUID IS NULL OR lead_id = $1)
                 AND ($2::task_status IS NULL OR status = $2)
               ORDER BY due_date ASC NULLS LAST, created_at ASC, id ASC"#
        ))
        .bind(filter.lead_id)
        .bind(filter.status)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &PgPool, id: Uuid, data: &CreateTask) -> Result<Self, sqlx::Error> {
        let status = data.status.unwrap_or_default();
        sqlx::query_as::<_, Task>(&format!(
            r#"INSERT INTO tasks (id, lead_id, user_id, title, description, due_date, status, priority)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING {TASK_COLUMNS}"#
        ))
        .bind(id)
        .bind(data.lead_id)
        .bind(data.user_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.due_date)
        .bind(status)
        .bind(data.priority)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: &UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            r#"UPDATE tasks
               SET user_id = CASE WHEN $2 THEN $3 ELSE user_id END,
                   title = COALESCE($4, title),
                   description = CASE WHEN $5 THEN $6 ELSE description END,
                   due_date = CASE WHEN $7 THEN $8 ELSE due_date END,
                   status = COALESCE($9, status),
                   priority = CASE WHEN $10 THEN $11 ELSE priority END,
                   updated_at = now()
               WHERE id = $1
               RETURNING {TASK_COLUMNS}"#
        ))
        .bind(id)
        .bind(data.user_id.is_some())
        .bind(data.user_id.flatten())
        .bind(&data.title)
        .bind(data.description.is_some())
        .bind(data.description.clone().flatten())
        .bind(data.due_date.is_some())
        .bind(data.due_date.flatten())
        .bind(data.status)
        .bind(data.priority.is_some())
        .bind(data.priority.flatten())
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn status_uses_snake_case_on_every_surface() {
        assert_eq!(TaskStatus::InProgress.to_string(), "in_progress");
        assert_eq!(TaskStatus::from_str("cancelled").unwrap(), TaskStatus::Cancelled);
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(TaskStatus::default(), TaskStatus::Pending);
    }
}
