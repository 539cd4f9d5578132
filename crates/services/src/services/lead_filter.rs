//! Lead search: query-string parsing, the in-memory predicate and page math.
//!
//! The same [`LeadFilter`] drives both the SQL query (through
//! [`LeadFilter::to_search`]) and the in-process store (through
//! [`LeadFilter::matches`]), so both stores agree on what a filter selects.

use chrono::{DateTime, NaiveDate, Utc};
use db::models::lead::{Lead, LeadSearch};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LeadQueryError {
    #[error("page must be a positive integer")]
    InvalidPage,
    #[error("pageSize must be a positive integer")]
    InvalidPageSize,
    #[error("invalid date '{0}': expected YYYY-MM-DD or an RFC 3339 timestamp")]
    InvalidDate(String),
}

/// Raw `GET /api/leads` query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadQuery {
    pub search: Option<String>,
    /// Comma-separated set of statuses.
    pub status: Option<String>,
    /// Comma-separated set of client domains.
    pub client_domain: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
    pub page: Option<i64>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<i64>,
}

impl LeadQuery {
    pub fn resolve(&self) -> Result<(LeadFilter, Pagination), LeadQueryError> {
        let filter = LeadFilter {
            search: self
                .search
                .as_deref()
                .filter(|term| !term.trim().is_empty())
                .map(str::to_string),
            statuses: split_set(self.status.as_deref()),
            client_domains: split_set(self.client_domain.as_deref()),
            contacted_from: self.start_date.as_deref().map(parse_start).transpose()?,
            contacted_until: self.end_date.as_deref().map(parse_end).transpose()?,
        };
        let pagination = Pagination::new(self.page, self.page_size)?;
        Ok((filter, pagination))
    }
}

fn split_set(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn parse_date_only(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, LeadQueryError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| LeadQueryError::InvalidDate(raw.to_string()))
}

/// A bare date opens the range at the start of that day.
fn parse_start(raw: &str) -> Result<DateTime<Utc>, LeadQueryError> {
    match parse_date_only(raw).and_then(|date| date.and_hms_opt(0, 0, 0)) {
        Some(start) => Ok(start.and_utc()),
        None => parse_timestamp(raw),
    }
}

/// A bare date closes the range at the last microsecond of that day.
fn parse_end(raw: &str) -> Result<DateTime<Utc>, LeadQueryError> {
    match parse_date_only(raw).and_then(|date| date.and_hms_micro_opt(23, 59, 59, 999_999)) {
        Some(end) => Ok(end.and_utc()),
        None => parse_timestamp(raw),
    }
}

/// Resolved lead predicate. Empty sets and `None` bounds match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadFilter {
    pub search: Option<String>,
    pub statuses: Vec<String>,
    pub client_domains: Vec<String>,
    pub contacted_from: Option<DateTime<Utc>>,
    pub contacted_until: Option<DateTime<Utc>>,
}

impl LeadFilter {
    /// In-process equivalent of the SQL filter. Search lowercases both sides,
    /// as Postgres `lower()` does under a UTF-8 locale.
    pub fn matches(&self, lead: &Lead) -> bool {
        if let Some(term) = &self.search {
            let needle = term.to_lowercase();
            let hit = [&lead.name, &lead.email, &lead.phone]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&lead.status) {
            return false;
        }
        if !self.client_domains.is_empty() && !self.client_domains.contains(&lead.client_domain) {
            return false;
        }
        if self.contacted_from.is_some_and(|from| lead.last_contact_date < from) {
            return false;
        }
        if self.contacted_until.is_some_and(|until| lead.last_contact_date > until) {
            return false;
        }
        true
    }

    pub fn to_search(&self, pagination: &Pagination) -> LeadSearch {
        LeadSearch {
            search: self.search.clone(),
            statuses: self.statuses.clone(),
            client_domains: self.client_domains.clone(),
            contacted_from: self.contacted_from,
            contacted_until: self.contacted_until,
            limit: pagination.limit(),
            offset: pagination.offset(),
        }
    }
}

/// 1-based page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Result<Self, LeadQueryError> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        if page < 1 {
            return Err(LeadQueryError::InvalidPage);
        }
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size < 1 {
            return Err(LeadQueryError::InvalidPageSize);
        }
        Ok(Self {
            page,
            page_size: page_size.min(MAX_PAGE_SIZE),
        })
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    /// The `[offset, offset + limit)` window of an already ordered slice.
    pub fn window<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = usize::try_from(self.offset()).unwrap_or(usize::MAX).min(items.len());
        let end = start
            .saturating_add(usize::try_from(self.limit()).unwrap_or(usize::MAX))
            .min(items.len());
        &items[start..end]
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    use super::*;

    fn lead(name: &str, email: &str, phone: &str, status: &str, domain: &str) -> Lead {
        let now = Utc::now();
        Lead {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            status: status.to_string(),
            client_domain: domain.to_string(),
            contact_platform: "Email".to_string(),
            location: "Berlin, Germany".to_string(),
            note: None,
            company_id: None,
            created_at: now,
            last_contact_date: now,
        }
    }

    fn query(pairs: &[(&str, &str)]) -> LeadQuery {
        let mut query = LeadQuery::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "search" => query.search = value,
                "status" => query.status = value,
                "client_domain" => query.client_domain = value,
                "startDate" => query.start_date = value,
                "endDate" => query.end_date = value,
                other => panic!("unexpected key {other}"),
            }
        }
        query
    }

    #[test]
    fn search_is_case_insensitive_over_name_email_and_phone() {
        let leads = vec![
            lead("Ava Smith", "ava@example.com", "+1 555 0100", "New", "Ecommerce"),
            lead("Brian Lee", "brian@SMITHCO.com", "+44 20 0000", "New", "Ecommerce"),
            lead("Chloe Hill", "chloe@example.com", "+61 smith", "New", "Ecommerce"),
            lead("Dan Ng", "dan@example.com", "+81 3 0000", "New", "Ecommerce"),
        ];
        let (filter, _) = query(&[("search", "sMiTh")]).resolve().unwrap();

        let names: Vec<_> = leads
            .iter()
            .filter(|l| filter.matches(l))
            .map(|l| l.name.as_str())
            .collect();
        assert_eq!(names, vec!["Ava Smith", "Brian Lee", "Chloe Hill"]);
    }

    #[test]
    fn search_folds_non_ascii_letters() {
        let (filter, _) = query(&[("search", "MÜLLER")]).resolve().unwrap();
        assert!(filter.matches(&lead("Jonas Müller", "j@example.de", "1", "New", "Others")));
        assert!(!filter.matches(&lead("Jonas Muller", "m@example.de", "1", "New", "Others")));
    }

    #[test]
    fn blank_search_matches_everything() {
        let (filter, _) = query(&[("search", "   ")]).resolve().unwrap();
        assert_eq!(filter.search, None);
        assert!(filter.matches(&lead("x", "y", "z", "New", "Ecommerce")));
    }

    #[test]
    fn status_and_domain_are_comma_separated_sets() {
        let (filter, _) = query(&[
            ("status", "New, Close Deal,,"),
            ("client_domain", "Healthcare"),
        ])
        .resolve()
        .unwrap();
        assert_eq!(filter.statuses, vec!["New", "Close Deal"]);

        assert!(filter.matches(&lead("a", "a", "a", "Close Deal", "Healthcare")));
        assert!(!filter.matches(&lead("a", "a", "a", "Reached Out", "Healthcare")));
        assert!(!filter.matches(&lead("a", "a", "a", "New", "Ecommerce")));
    }

    #[test]
    fn date_only_bounds_cover_whole_days() {
        let (filter, _) = query(&[("startDate", "2025-03-01"), ("endDate", "2025-03-31")])
            .resolve()
            .unwrap();

        let mut inside = lead("a", "a", "a", "New", "Ecommerce");
        inside.last_contact_date = Utc.with_ymd_and_hms(2025, 3, 31, 23, 30, 0).unwrap();
        let mut first = inside.clone();
        first.last_contact_date = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let mut after = inside.clone();
        after.last_contact_date = Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap();
        let mut before = inside.clone();
        before.last_contact_date = first.last_contact_date - Duration::seconds(1);

        assert!(filter.matches(&inside));
        assert!(filter.matches(&first));
        assert!(!filter.matches(&after));
        assert!(!filter.matches(&before));
    }

    #[test]
    fn each_date_bound_applies_alone() {
        let (filter, _) = query(&[("startDate", "2025-03-01T12:00:00Z")])
            .resolve()
            .unwrap();
        assert_eq!(
            filter.contacted_from,
            Some(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap())
        );
        assert_eq!(filter.contacted_until, None);
    }

    #[test]
    fn rejects_unparseable_dates() {
        let err = query(&[("endDate", "March 3rd")]).resolve().unwrap_err();
        assert_eq!(err, LeadQueryError::InvalidDate("March 3rd".to_string()));
    }

    #[test]
    fn pagination_defaults_and_bounds() {
        assert_eq!(Pagination::new(None, None).unwrap(), Pagination::default());
        assert_eq!(Pagination::new(Some(0), None), Err(LeadQueryError::InvalidPage));
        assert_eq!(Pagination::new(None, Some(0)), Err(LeadQueryError::InvalidPageSize));
        assert_eq!(Pagination::new(None, Some(500)).unwrap().page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn page_two_of_ten_is_items_ten_to_twenty() {
        let items: Vec<i32> = (0..35).collect();
        let page = Pagination::new(Some(2), Some(10)).unwrap();
        assert_eq!(page.offset(), 10);
        assert_eq!(page.window(&items), &items[10..20]);

        let last = Pagination::new(Some(4), Some(10)).unwrap();
        assert_eq!(last.window(&items), &items[30..35]);

        let past_end = Pagination::new(Some(9), Some(10)).unwrap();
        assert!(past_end.window(&items).is_empty());
    }

    #[test]
    fn to_search_carries_limit_and_offset() {
        let (filter, pagination) = LeadQuery {
            page: Some(3),
            page_size: Some(20),
            ..Default::default()
        }
        .resolve()
        .unwrap();
        let search = filter.to_search(&pagination);
        assert_eq!((search.limit, search.offset), (20, 40));
    }
}
