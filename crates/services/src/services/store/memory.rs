//! Non-persistent store holding every table in process memory.
//!
//! Mirrors the Postgres behaviour that callers can observe: ordering of
//! listings, rejected references to missing rows, and the cascades applied
//! when a lead or company is deleted.

use std::{cmp::Ordering, collections::HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use db::models::{
    company::Company,
    deal::{Deal, StageCount},
    interaction::Interaction,
    lead::{Lead, StatusCount},
    task::Task,
    user::{UpsertUser, User},
};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CrmBackend, Listing, Repository, Resource, StoreError};
use crate::services::lead_filter::{LeadFilter, Pagination};

#[derive(Default)]
pub struct MemoryStore {
    leads: RwLock<Vec<Lead>>,
    companies: RwLock<Vec<Company>>,
    interactions: RwLock<Vec<Interaction>>,
    deals: RwLock<Vec<Deal>>,
    tasks: RwLock<Vec<Task>>,
    users: RwLock<Vec<User>>,
}

/// A row pointing at another table.
#[derive(Debug, Clone, Copy)]
pub enum Reference {
    Lead(Uuid),
    Company(Uuid),
    User(Uuid),
}

impl Reference {
    fn label(self) -> &'static str {
        match self {
            Reference::Lead(_) => "lead",
            Reference::Company(_) => "company",
            Reference::User(_) => "user",
        }
    }
}

/// What happens to other tables when a row is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cascade {
    None,
    /// Interactions, deals and tasks of the lead go with it.
    LeadChildren,
    /// Leads of the company keep existing with `company_id` cleared.
    DetachLeads,
}

/// Per-table behaviour the generic memory repository needs.
pub trait MemoryRecord: Resource {
    fn table(store: &MemoryStore) -> &RwLock<Vec<Self>>;
    fn build(id: Uuid, data: Self::Create, now: DateTime<Utc>) -> Self;
    fn apply(&mut self, data: Self::Update, now: DateTime<Utc>);
    fn matches(&self, filter: &Self::Filter) -> bool;
    /// Listing order, identical to the SQL `ORDER BY` of the table. Text compares
    /// bytewise, matching `COLLATE "C"`.
    fn order(a: &Self, b: &Self) -> Ordering;

    fn references(&self) -> Vec<Reference> {
        Vec::new()
    }

    fn cascade() -> Cascade {
        Cascade::None
    }
}

fn assign<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn nulls_last<T: Ord>(a: &Option<T>, b: &Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn owner_references(lead_id: Uuid, user_id: Option<Uuid>) -> Vec<Reference> {
    let mut refs = vec![Reference::Lead(lead_id)];
    refs.extend(user_id.map(Reference::User));
    refs
}

impl MemoryRecord for Lead {
    fn table(store: &MemoryStore) -> &RwLock<Vec<Self>> {
        &store.leads
    }

    fn build(id: Uuid, data: Self::Create, now: DateTime<Utc>) -> Self {
        Lead {
            id,
            name: data.name,
            email: data.email,
            phone: data.phone,
            status: data.status,
            client_domain: data.client_domain,
            contact_platform: data.contact_platform,
            location: data.location,
            note: data.note,
            company_id: data.company_id,
            created_at: now,
            last_contact_date: data.last_contact_date.unwrap_or(now),
        }
    }

    fn apply(&mut self, data: Self::Update, _now: DateTime<Utc>) {
        assign(&mut self.name, data.name);
        assign(&mut self.email, data.email);
        assign(&mut self.phone, data.phone);
        assign(&mut self.status, data.status);
        assign(&mut self.client_domain, data.client_domain);
        assign(&mut self.contact_platform, data.contact_platform);
        assign(&mut self.location, data.location);
        assign(&mut self.note, data.note);
        assign(&mut self.company_id, data.company_id);
        assign(&mut self.last_contact_date, data.last_contact_date);
    }

    fn matches(&self, filter: &LeadFilter) -> bool {
        filter.matches(self)
    }

    fn order(a: &Self, b: &Self) -> Ordering {
        b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id))
    }

    fn references(&self) -> Vec<Reference> {
        self.company_id.map(Reference::Company).into_iter().collect()
    }

    fn cascade() -> Cascade {
        Cascade::LeadChildren
    }
}

impl MemoryRecord for Company {
    fn table(store: &MemoryStore) -> &RwLock<Vec<Self>> {
        &store.companies
    }

    fn build(id: Uuid, data: Self::Create, now: DateTime<Utc>) -> Self {
        Company {
            id,
            name: data.name,
            industry: data.industry,
            website: data.website,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, data: Self::Update, now: DateTime<Utc>) {
        assign(&mut self.name, data.name);
        assign(&mut self.industry, data.industry);
        assign(&mut self.website, data.website);
        self.updated_at = now;
    }

    fn matches(&self, filter: &Self::Filter) -> bool {
        filter.industry.is_none() || self.industry == filter.industry
    }

    fn order(a: &Self, b: &Self) -> Ordering {
        a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id))
    }

    fn cascade() -> Cascade {
        Cascade::DetachLeads
    }
}

impl MemoryRecord for Interaction {
    fn table(store: &MemoryStore) -> &RwLock<Vec<Self>> {
        &store.interactions
    }

    fn build(id: Uuid, data: Self::Create, now: DateTime<Utc>) -> Self {
        Interaction {
            id,
            lead_id: data.lead_id,
            user_id: data.user_id,
            interaction_type: data.interaction_type,
            notes: data.notes,
            date: data.date.unwrap_or(now),
            created_at: now,
        }
    }

    fn apply(&mut self, data: Self::Update, _now: DateTime<Utc>) {
        assign(&mut self.interaction_type, data.interaction_type);
        assign(&mut self.notes, data.notes);
        assign(&mut self.date, data.date);
    }

    fn matches(&self, filter: &Self::Filter) -> bool {
        filter.lead_id.is_none_or(|lead_id| self.lead_id == lead_id)
    }

    fn order(a: &Self, b: &Self) -> Ordering {
        b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id))
    }

    fn references(&self) -> Vec<Reference> {
        owner_references(self.lead_id, self.user_id)
    }
}

impl MemoryRecord for Deal {
    fn table(store: &MemoryStore) -> &RwLock<Vec<Self>> {
        &store.deals
    }

    fn build(id: Uuid, data: Self::Create, now: DateTime<Utc>) -> Self {
        Deal {
            id,
            lead_id: data.lead_id,
            user_id: data.user_id,
            title: data.title,
            value: data.value,
            stage: data.stage,
            expected_close_date: data.expected_close_date,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, data: Self::Update, now: DateTime<Utc>) {
        assign(&mut self.user_id, data.user_id);
        assign(&mut self.title, data.title);
        assign(&mut self.value, data.value);
        assign(&mut self.stage, data.stage);
        assign(&mut self.expected_close_date, data.expected_close_date);
        self.updated_at = now;
    }

    fn matches(&self, filter: &Self::Filter) -> bool {
        filter.lead_id.is_none_or(|lead_id| self.lead_id == lead_id)
            && filter.stage.as_ref().is_none_or(|stage| &self.stage == stage)
    }

    fn order(a: &Self, b: &Self) -> Ordering {
        b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id))
    }

    fn references(&self) -> Vec<Reference> {
        owner_references(self.lead_id, self.user_id)
    }
}

impl MemoryRecord for Task {
    fn table(store: &MemoryStore) -> &RwLock<Vec<Self>> {
        &store.tasks
    }

    fn build(id: Uuid, data: Self::Create, now: DateTime<Utc>) -> Self {
        Task {
            id,
            lead_id: data.lead_id,
            user_id: data.user_id,
            title: data.title,
            description: data.description,
            due_date: data.due_date,
            status: data.status.unwrap_or_default(),
            priority: data.priority,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, data: Self::Update, now: DateTime<Utc>) {
        assign(&mut self.user_id, data.user_id);
        assign(&mut self.title, data.title);
        assign(&mut self.description, data.description);
        assign(&mut self.due_date, data.due_date);
        assign(&mut self.status, data.status);
        assign(&mut self.priority, data.priority);
        self.updated_at = now;
    }

    fn matches(&self, filter: &Self::Filter) -> bool {
        filter.lead_id.is_none_or(|lead_id| self.lead_id == lead_id)
            && filter.status.is_none_or(|status| self.status == status)
    }

    fn order(a: &Self, b: &Self) -> Ordering {
        nulls_last(&a.due_date, &b.due_date)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    }

    fn references(&self) -> Vec<Reference> {
        owner_references(self.lead_id, self.user_id)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `user` as is, replacing any row with the same id or email.
    pub async fn insert_user(&self, user: User) {
        let mut users = self.users.write().await;
        users.retain(|existing| existing.id != user.id && existing.email != user.email);
        users.push(user);
    }

    async fn check_references(&self, refs: &[Reference]) -> Result<(), StoreError> {
        for reference in refs {
            let exists = match *reference {
                Reference::Lead(id) => self.leads.read().await.iter().any(|row| row.id == id),
                Reference::Company(id) => {
                    self.companies.read().await.iter().any(|row| row.id == id)
                }
                Reference::User(id) => self.users.read().await.iter().any(|row| row.id == id),
            };
            if !exists {
                return Err(StoreError::MissingReference(reference.label()));
            }
        }
        Ok(())
    }

    async fn cascade(&self, cascade: Cascade, id: Uuid) {
        match cascade {
            Cascade::None => {}
            Cascade::LeadChildren => {
                self.interactions.write().await.retain(|row| row.lead_id != id);
                self.deals.write().await.retain(|row| row.lead_id != id);
                self.tasks.write().await.retain(|row| row.lead_id != id);
            }
            Cascade::DetachLeads => {
                for lead in self.leads.write().await.iter_mut() {
                    if lead.company_id == Some(id) {
                        lead.company_id = None;
                    }
                }
            }
        }
    }
}

#[async_trait]
impl<T: MemoryRecord> Repository<T> for MemoryStore {
    async fn find(&self, id: Uuid) -> Result<Option<T>, StoreError> {
        Ok(T::table(self)
            .read()
            .await
            .iter()
            .find(|row| row.id() == id)
            .cloned())
    }

    async fn create(&self, data: T::Create) -> Result<T, StoreError> {
        let row = T::build(Uuid::new_v4(), data, Utc::now());
        self.check_references(&row.references()).await?;
        T::table(self).write().await.push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: Uuid, data: T::Update) -> Result<Option<T>, StoreError> {
        let current = T::table(self)
            .read()
            .await
            .iter()
            .find(|row| row.id() == id)
            .cloned();
        let Some(mut row) = current else {
            return Ok(None);
        };
        row.apply(data, Utc::now());
        self.check_references(&row.references()).await?;

        let mut table = T::table(self).write().await;
        match table.iter_mut().find(|existing| existing.id() == id) {
            Some(slot) => {
                *slot = row.clone();
                Ok(Some(row))
            }
            // Deleted while the references were being checked.
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let removed = {
            let mut table = T::table(self).write().await;
            let before = table.len();
            table.retain(|row| row.id() != id);
            table.len() != before
        };
        if removed {
            self.cascade(T::cascade(), id).await;
        }
        Ok(removed)
    }
}

#[async_trait]
impl<T: MemoryRecord> Listing<T> for MemoryStore {
    async fn list(&self, filter: &T::Filter) -> Result<Vec<T>, StoreError> {
        let mut rows: Vec<T> = T::table(self)
            .read()
            .await
            .iter()
            .filter(|row| row.matches(filter))
            .cloned()
            .collect();
        rows.sort_by(T::order);
        Ok(rows)
    }
}

fn ranked<K: Ord + Clone>(counts: HashMap<K, i64>) -> Vec<(K, i64)> {
    let mut ranked: Vec<(K, i64)> = counts.into_iter().collect();
    ranked.sort_by(|(ka, ca), (kb, cb)| cb.cmp(ca).then_with(|| ka.cmp(kb)));
    ranked
}

#[async_trait]
impl CrmBackend for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn search_leads(
        &self,
        filter: &LeadFilter,
        pagination: Pagination,
    ) -> Result<(Vec<Lead>, i64), StoreError> {
        let matching = Listing::<Lead>::list(self, filter).await?;
        let total = i64::try_from(matching.len()).unwrap_or(i64::MAX);
        Ok((pagination.window(&matching).to_vec(), total))
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.iter().find(|user| user.id == id).cloned())
    }

    async fn upsert_user(&self, data: UpsertUser) -> Result<User, StoreError> {
        let existing = self
            .users
            .read()
            .await
            .iter()
            .find(|user| user.email == data.email)
            .cloned();
        let user = match existing {
            Some(user) => User {
                full_name: data.full_name,
                role: data.role,
                ..user
            },
            None => User {
                id: Uuid::new_v4(),
                email: data.email,
                full_name: data.full_name,
                role: data.role,
                created_at: Utc::now(),
            },
        };
        self.insert_user(user.clone()).await;
        Ok(user)
    }

    async fn lead_status_counts(&self) -> Result<Vec<StatusCount>, StoreError> {
        let mut counts: HashMap<String, i64> = HashMap::new();
        for lead in self.leads.read().await.iter() {
            *counts.entry(lead.status.clone()).or_default() += 1;
        }
        Ok(ranked(counts)
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect())
    }

    async fn deal_stage_counts(&self) -> Result<Vec<StageCount>, StoreError> {
        let mut counts: HashMap<String, i64> = HashMap::new();
        for deal in self.deals.read().await.iter() {
            *counts.entry(deal.stage.clone()).or_default() += 1;
        }
        Ok(ranked(counts)
            .into_iter()
            .map(|(stage, count)| StageCount { stage, count })
            .collect())
    }

    async fn recent_interactions(&self, limit: i64) -> Result<Vec<Interaction>, StoreError> {
        let mut rows = Listing::<Interaction>::list(self, &Default::default()).await?;
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use db::models::{
        company::CreateCompany,
        deal::CreateDeal,
        interaction::CreateInteraction,
        lead::{CreateLead, UpdateLead},
        task::{CreateTask, TaskFilter},
        user::Role,
    };

    use super::*;

    fn new_lead(name: &str) -> CreateLead {
        CreateLead {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: "555-0100".to_string(),
            status: "New".to_string(),
            client_domain: "Ecommerce".to_string(),
            contact_platform: "Email".to_string(),
            location: "Berlin".to_string(),
            note: None,
            company_id: None,
            last_contact_date: None,
        }
    }

    #[tokio::test]
    async fn update_leaves_absent_fields_untouched() {
        let store = MemoryStore::new();
        let lead = Repository::<Lead>::create(&store, new_lead("Ada")).await.unwrap();

        let patch = UpdateLead {
            status: Some("Close Deal".to_string()),
            ..Default::default()
        };
        let updated = Repository::<Lead>::update(&store, lead.id, patch)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.status, "Close Deal");
        assert_eq!(updated.name, lead.name);
        assert_eq!(updated.created_at, lead.created_at);
    }

    #[tokio::test]
    async fn explicit_null_clears_optional_columns() {
        let store = MemoryStore::new();
        let mut data = new_lead("Grace");
        data.note = Some("Met at a trade fair".to_string());
        let lead = Repository::<Lead>::create(&store, data).await.unwrap();

        let patch = UpdateLead {
            note: Some(None),
            ..Default::default()
        };
        let updated = Repository::<Lead>::update(&store, lead.id, patch)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.note, None);
        assert_eq!(updated.name, "Grace");
    }

    #[tokio::test]
    async fn unknown_lead_reference_is_rejected() {
        let store = MemoryStore::new();
        let err = Repository::<Deal>::create(
            &store,
            CreateDeal {
                lead_id: Uuid::new_v4(),
                user_id: None,
                title: "Pilot".to_string(),
                value: Some(1200.0),
                stage: "proposal".to_string(),
                expected_close_date: None,
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, StoreError::MissingReference("lead")));
    }

    #[tokio::test]
    async fn deleting_a_lead_removes_its_children() {
        let store = MemoryStore::new();
        let lead = Repository::<Lead>::create(&store, new_lead("Grace")).await.unwrap();
        let call = CreateInteraction {
            lead_id: lead.id,
            user_id: None,
            interaction_type: "call".to_string(),
            notes: None,
            date: None,
        };
        Repository::<Interaction>::create(&store, call).await.unwrap();
        let follow_up = CreateTask {
            lead_id: lead.id,
            user_id: None,
            title: "Send deck".to_string(),
            description: None,
            due_date: None,
            status: None,
            priority: None,
        };
        Repository::<Task>::create(&store, follow_up).await.unwrap();

        assert!(Repository::<Lead>::delete(&store, lead.id).await.unwrap());

        let tasks = Listing::<Task>::list(&store, &TaskFilter::default()).await.unwrap();
        assert!(tasks.is_empty());
        assert!(store.recent_interactions(5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_a_company_detaches_its_leads() {
        let store = MemoryStore::new();
        let acme = CreateCompany {
            name: "Acme".to_string(),
            industry: None,
            website: None,
        };
        let company = Repository::<Company>::create(&store, acme).await.unwrap();
        let mut data = new_lead("Linus");
        data.company_id = Some(company.id);
        let lead = Repository::<Lead>::create(&store, data).await.unwrap();

        assert!(Repository::<Company>::delete(&store, company.id).await.unwrap());

        let lead = Repository::<Lead>::find(&store, lead.id).await.unwrap().unwrap();
        assert_eq!(lead.company_id, None);
    }

    #[tokio::test]
    async fn tasks_without_due_date_sort_last() {
        let store = MemoryStore::new();
        let lead = Repository::<Lead>::create(&store, new_lead("Barbara")).await.unwrap();
        let task = |title: &str, due_date| CreateTask {
            lead_id: lead.id,
            user_id: None,
            title: title.to_string(),
            description: None,
            due_date,
            status: None,
            priority: None,
        };
        let tomorrow = Utc::now() + chrono::Duration::days(1);
        Repository::<Task>::create(&store, task("someday", None)).await.unwrap();
        Repository::<Task>::create(&store, task("soon", Some(tomorrow))).await.unwrap();

        let tasks = Listing::<Task>::list(&store, &TaskFilter::default()).await.unwrap();
        let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["soon", "someday"]);
    }

    #[tokio::test]
    async fn companies_sort_by_byte_order_of_name() {
        let store = MemoryStore::new();
        for name in ["acme", "Beta", "Zeta"] {
            Repository::<Company>::create(
                &store,
                CreateCompany {
                    name: name.to_string(),
                    industry: None,
                    website: None,
                },
            )
            .await
            .unwrap();
        }

        let companies = Listing::<Company>::list(&store, &Default::default()).await.unwrap();
        let names: Vec<&str> = companies.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Beta", "Zeta", "acme"]);
    }

    #[tokio::test]
    async fn status_counts_rank_by_count() {
        let store = MemoryStore::new();
        for (name, status) in [("a", "New"), ("b", "Reached Out"), ("c", "Reached Out")] {
            let mut data = new_lead(name);
            data.status = status.to_string();
            Repository::<Lead>::create(&store, data).await.unwrap();
        }

        let counts = store.lead_status_counts().await.unwrap();
        assert_eq!(counts[0].status, "Reached Out");
        assert_eq!(counts[0].count, 2);
        assert_eq!(counts[1].status, "New");
    }

    #[tokio::test]
    async fn inserted_user_is_found_with_role() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        store
            .insert_user(User {
                id,
                email: "saler@example.com".to_string(),
                full_name: None,
                role: Some(Role::Saler),
                created_at: Utc::now(),
            })
            .await;

        let user = store.find_user(id).await.unwrap().unwrap();
        assert_eq!(user.effective_role(), Role::Saler);
    }

    #[tokio::test]
    async fn upsert_user_is_keyed_by_email() {
        let store = MemoryStore::new();
        let upsert = |role| UpsertUser {
            email: "viewtest1@example.com".to_string(),
            full_name: None,
            role: Some(role),
        };

        let first = store.upsert_user(upsert(Role::Viewer)).await.unwrap();
        let second = store.upsert_user(upsert(Role::Saler)).await.unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);
        let stored = store.find_user(first.id).await.unwrap().unwrap();
        assert_eq!(stored.role, Some(Role::Saler));
        assert_eq!(store.users.read().await.len(), 1);
    }
}
