use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use ts_rs::TS;
use uuid::Uuid;

/// Pipeline stages offered by the lead form. `status` stays free text: any
/// value may follow any other.
pub const LEAD_STATUSES: [&str; 8] = [
    "New",
    "Reached Out",
    "Meeting Scheduled",
    "First Meeting Complete",
    "Second Meeting Completed",
    "In Dilligence",
    "Close Deal",
    "Prospect Decline",
];

pub const CLIENT_DOMAINS: [&str; 4] = ["Container Shipping", "Ecommerce", "Healthcare", "Others"];

pub const CONTACT_PLATFORMS: [&str; 7] = [
    "LinkedIn",
    "Email",
    "Conference",
    "Referral",
    "Website",
    "Industry Event",
    "Partner Referral",
];

const LEAD_COLUMNS: &str = "id, name, email, phone, status, client_domain, contact_platform, location, note, company_id, created_at, last_contact_date";

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, TS)]
pub struct Lead {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub status: String,
    pub client_domain: String,
    pub contact_platform: String,
    pub location: String,
    pub note: Option<String>,
    pub company_id: Option<Uuid>, // Foreign key to Company
    pub created_at: DateTime<Utc>,
    pub last_contact_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateLead {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub status: String,
    pub client_domain: String,
    pub contact_platform: String,
    pub location: String,
    pub note: Option<String>,
    pub company_id: Option<Uuid>,
    pub last_contact_date: Option<DateTime<Utc>>, // Defaults to creation time
}

/// Partial update. Absent fields are kept; an explicit `null` clears a nullable one.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateLead {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<String>,
    pub client_domain: Option<String>,
    pub contact_platform: Option<String>,
    pub location: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub note: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub company_id: Option<Option<Uuid>>,
    pub last_contact_date: Option<DateTime<Utc>>,
}

/// Resolved lead search, ready to be pushed into SQL.
#[derive(Debug, Clone, Default)]
pub struct LeadSearch {
    pub search: Option<String>,
    pub statuses: Vec<String>,
    pub client_domains: Vec<String>,
    pub contacted_from: Option<DateTime<Utc>>,
    pub contacted_until: Option<DateTime<Utc>>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, TS)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

/// Escape `%`, `_` and the escape character itself for a LIKE pattern.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_search_filters(builder: &mut QueryBuilder<'_, Postgres>, params: &LeadSearch) {
    let mut separator = " WHERE ";

    // Folded with lower() like the in-memory filter. Locale-specific mappings
    // such as `İ` may still differ.
    if let Some(term) = params.search.as_deref() {
        let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
        builder
            .push(separator)
            .push("(lower(name) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR lower(email) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR lower(phone) LIKE ")
            .push_bind(pattern)
            .push(")");
        separator = " AND ";
    }
    if !params.statuses.is_empty() {
        builder
            .push(separator)
            .push("status = ANY(")
            .push_bind(params.statuses.clone())
            .push(")");
        separator = " AND ";
    }
    if !params.client_domains.is_empty() {
        builder
            .push(separator)
            .push("client_domain = ANY(")
            .push_bind(params.client_domains.clone())
            .push(")");
        separator = " AND ";
    }
    if let Some(from) = params.contacted_from {
        builder
            .push(separator)
            .push("last_contact_date >= ")
            .push_bind(from);
        separator = " AND ";
    }
    if let Some(until) = params.contacted_until {
        builder
            .push(separator)
            .push("last_contact_date <= ")
            .push_bind(until);
    }
}

impl Lead {
    /// One page of matching leads, newest first, plus the total match count.
    pub async fn search(
        pool: &PgPool,
        params: &LeadSearch,
    ) -> Result<(Vec<Self>, i64), sqlx::Error> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM leads");
        push_search_filters(&mut count, params);
        let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

        let mut page = QueryBuilder::<Postgres>::new(format!("SELECT {LEAD_COLUMNS} FROM leads"));
        push_search_filters(&mut page, params);
        page.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(params.limit)
            .push(" OFFSET ")
            .push_bind(params.offset);
        let leads = page.build_query_as::<Lead>().fetch_all(pool).await?;

        Ok((leads, total))
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Lead>(&format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &PgPool, id: Uuid, data: &CreateLead) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Lead>(&format!(
            r#"INSERT INTO leads (id, name, email, phone, status, client_domain, contact_platform, location, note, company_id, last_contact_date)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, COALESCE($11, now()))
               RETURNING {LEAD_COLUMNS}"#
        ))
        .bind(id)
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.status)
        .bind(&data.client_domain)
        .bind(&data.contact_platform)
        .bind(&data.location)
        .bind(&data.note)
        .bind(data.company_id)
        .bind(data.last_contact_date)
        .fetch_one(pool)
        .await
    }

    /// Applies the fields present in `data`; `None` when no such lead exists.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: &UpdateLead,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Lead>(&format!(
            r#"UPDATE leads
               SET name = COALESCE($2, name),
                   email = COALESCE($3, email),
                   phone = COALESCE($4, phone),
                   status = COALESCE($5, status),
                   client_domain = COALESCE($6, client_domain),
                   contact_platform = COALESCE($7, contact_platform),
                   location = COALESCE($8, location),
                   note = CASE WHEN $9 THEN $10 ELSE note END,
                   company_id = CASE WHEN $11 THEN $12 ELSE company_id END,
                   last_contact_date = COALESCE($13, last_contact_date)
               WHERE id = $1
               RETURNING {LEAD_COLUMNS}"#
        ))
        .bind(id)
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.status)
        .bind(&data.client_domain)
        .bind(&data.contact_platform)
        .bind(&data.location)
        .bind(data.note.is_some())
        .bind(data.note.clone().flatten())
        .bind(data.company_id.is_some())
        .bind(data.company_id.flatten())
        .bind(data.last_contact_date)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM leads WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count_by_status(pool: &PgPool) -> Result<Vec<StatusCount>, sqlx::Error> {
        sqlx::query_as::<_, StatusCount>(
            r#"SELECT status, COUNT(*) AS count
               FROM leads
               GROUP BY status
               ORDER BY count DESC, status ASC"#,
        )
        .fetch_all(pool)
        .await
    }

    /// Cheapest possible round-trip against the leads table.
    pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM leads LIMIT 1")
            .fetch_optional(pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_escapes_wildcards() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn search_filters_render_in_order() {
        let params = LeadSearch {
            search: Some("ann".to_string()),
            statuses: vec!["New".to_string()],
            client_domains: vec![],
            contacted_from: Some(Utc::now()),
            contacted_until: None,
            limit: 10,
            offset: 0,
        };
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM leads");
        push_search_filters(&mut builder, &params);
        assert_eq!(
            builder.sql(),
            "SELECT COUNT(*) FROM leads WHERE (lower(name) LIKE $1 OR lower(email) LIKE $2 OR lower(phone) LIKE $3) AND status = ANY($4) AND last_contact_date >= $5"
        );
    }

    #[test]
    fn update_tells_null_apart_from_absent() {
        let cleared: UpdateLead = serde_json::from_str(r#"{"note": null}"#).unwrap();
        assert_eq!(cleared.note, Some(None));
        assert_eq!(cleared.company_id, None);

        let set: UpdateLead = serde_json::from_str(r#"{"note": "Call back"}"#).unwrap();
        assert_eq!(set.note, Some(Some("Call back".to_string())));

        let untouched: UpdateLead = serde_json::from_str("{}").unwrap();
        assert_eq!(untouched.note, None);
    }

    #[test]
    fn empty_search_has_no_where_clause() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM leads");
        push_search_filters(&mut builder, &LeadSearch::default());
        assert_eq!(builder.sql(), "SELECT COUNT(*) FROM leads");
    }
}
