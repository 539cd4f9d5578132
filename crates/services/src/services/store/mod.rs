//! Storage seam between the HTTP layer and the tables.
//!
//! [`Store`] is either the Postgres database or an in-process, non-persistent
//! copy of the same tables. Handlers are written once against the
//! [`Repository`], [`Listing`] and [`CrmBackend`] traits.

use async_trait::async_trait;
use db::models::{
    company::{Company, CompanyFilter, CreateCompany, UpdateCompany},
    deal::{CreateDeal, Deal, DealFilter, StageCount, UpdateDeal},
    interaction::{CreateInteraction, Interaction, InteractionFilter, UpdateInteraction},
    lead::{CreateLead, Lead, StatusCount, UpdateLead},
    task::{CreateTask, Task, TaskFilter, UpdateTask},
    user::{UpsertUser, User},
};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use uuid::Uuid;

use super::{
    lead_filter::{LeadFilter, Pagination},
    validation::Validate,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
    #[error("referenced {0} does not exist")]
    MissingReference(&'static str),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if db::is_foreign_key_violation(&err) {
            let target = match &err {
                sqlx::Error::Database(db_err) => match db_err.constraint() {
                    Some(name) if name.ends_with("company_id_fkey") => "company",
                    Some(name) if name.ends_with("user_id_fkey") => "user",
                    _ => "lead",
                },
                _ => "lead",
            };
            return StoreError::MissingReference(target);
        }
        StoreError::Database(err)
    }
}

/// A table row exposed through the CRUD routes.
pub trait Resource: Clone + Serialize + Send + Sync + 'static {
    type Create: DeserializeOwned + Validate + Send + Sync + 'static;
    type Update: DeserializeOwned + Validate + Send + Sync + 'static;
    type Filter: Default + Send + Sync + 'static;
    /// Singular display name used in messages, e.g. "Lead".
    const LABEL: &'static str;

    fn id(&self) -> Uuid;
}

impl Resource for Lead {
    type Create = CreateLead;
    type Update = UpdateLead;
    type Filter = LeadFilter;
    const LABEL: &'static str = "Lead";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Resource for Company {
    type Create = CreateCompany;
    type Update = UpdateCompany;
    type Filter = CompanyFilter;
    const LABEL: &'static str = "Company";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Resource for Interaction {
    type Create = CreateInteraction;
    type Update = UpdateInteraction;
    type Filter = InteractionFilter;
    const LABEL: &'static str = "Interaction";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Resource for Deal {
    type Create = CreateDeal;
    type Update = UpdateDeal;
    type Filter = DealFilter;
    const LABEL: &'static str = "Deal";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Resource for Task {
    type Create = CreateTask;
    type Update = UpdateTask;
    type Filter = TaskFilter;
    const LABEL: &'static str = "Task";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[async_trait]
pub trait Repository<T: Resource>: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Option<T>, StoreError>;
    async fn create(&self, data: T::Create) -> Result<T, StoreError>;
    /// `None` when no row has this id.
    async fn update(&self, id: Uuid, data: T::Update) -> Result<Option<T>, StoreError>;
    /// `false` when no row has this id.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait Listing<T: Resource>: Send + Sync {
    async fn list(&self, filter: &T::Filter) -> Result<Vec<T>, StoreError>;
}

/// Operations that do not fit the per-table CRUD shape.
#[async_trait]
pub trait CrmBackend: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;
    /// One ordered page of matching leads and the total number of matches.
    async fn search_leads(
        &self,
        filter: &LeadFilter,
        pagination: Pagination,
    ) -> Result<(Vec<Lead>, i64), StoreError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn upsert_user(&self, data: UpsertUser) -> Result<User, StoreError>;
    async fn lead_status_counts(&self) -> Result<Vec<StatusCount>, StoreError>;
    async fn deal_stage_counts(&self) -> Result<Vec<StageCount>, StoreError>;
    async fn recent_interactions(&self, limit: i64) -> Result<Vec<Interaction>, StoreError>;
}

pub enum Store {
    Postgres(PgStore),
    Memory(MemoryStore),
}

impl Store {
    pub fn kind(&self) -> &'static str {
        match self {
            Store::Postgres(_) => "postgres",
            Store::Memory(_) => "memory",
        }
    }
}

#[async_trait]
impl<T> Repository<T> for Store
where
    T: Resource,
    PgStore: Repository<T>,
    MemoryStore: Repository<T>,
{
    async fn find(&self, id: Uuid) -> Result<Option<T>, StoreError> {
        match self {
            Store::Postgres(store) => Repository::<T>::find(store, id).await,
            Store::Memory(store) => Repository::<T>::find(store, id).await,
        }
    }

    async fn create(&self, data: T::Create) -> Result<T, StoreError> {
        match self {
            Store::Postgres(store) => Repository::<T>::create(store, data).await,
            Store::Memory(store) => Repository::<T>::create(store, data).await,
        }
    }

    async fn update(&self, id: Uuid, data: T::Update) -> Result<Option<T>, StoreError> {
        match self {
            Store::Postgres(store) => Repository::<T>::update(store, id, data).await,
            Store::Memory(store) => Repository::<T>::update(store, id, data).await,
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        match self {
            Store::Postgres(store) => Repository::<T>::delete(store, id).await,
            Store::Memory(store) => Repository::<T>::delete(store, id).await,
        }
    }
}

#[async_trait]
impl<T> Listing<T> for Store
where
    T: Resource,
    PgStore: Listing<T>,
    MemoryStore: Listing<T>,
{
    async fn list(&self, filter: &T::Filter) -> Result<Vec<T>, StoreError> {
        match self {
            Store::Postgres(store) => Listing::<T>::list(store, filter).await,
            Store::Memory(store) => Listing::<T>::list(store, filter).await,
        }
    }
}

#[async_trait]
impl CrmBackend for Store {
    async fn ping(&self) -> Result<(), StoreError> {
        match self {
            Store::Postgres(store) => store.ping().await,
            Store::Memory(store) => store.ping().await,
        }
    }

    async fn search_leads(
        &self,
        filter: &LeadFilter,
        pagination: Pagination,
    ) -> Result<(Vec<Lead>, i64), StoreError> {
        match self {
            Store::Postgres(store) => store.search_leads(filter, pagination).await,
            Store::Memory(store) => store.search_leads(filter, pagination).await,
        }
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        match self {
            Store::Postgres(store) => store.find_user(id).await,
            Store::Memory(store) => store.find_user(id).await,
        }
    }

    async fn upsert_user(&self, data: UpsertUser) -> Result<User, StoreError> {
        match self {
            Store::Postgres(store) => store.upsert_user(data).await,
            Store::Memory(store) => store.upsert_user(data).await,
        }
    }

    async fn lead_status_counts(&self) -> Result<Vec<StatusCount>, StoreError> {
        match self {
            Store::Postgres(store) => store.lead_status_counts().await,
            Store::Memory(store) => store.lead_status_counts().await,
        }
    }

    async fn deal_stage_counts(&self) -> Result<Vec<StageCount>, StoreError> {
        match self {
            Store::Postgres(store) => store.deal_stage_counts().await,
            Store::Memory(store) => store.deal_stage_counts().await,
        }
    }

    async fn recent_interactions(&self, limit: i64) -> Result<Vec<Interaction>, StoreError> {
        match self {
            Store::Postgres(store) => store.recent_interactions(limit).await,
            Store::Memory(store) => store.recent_interactions(limit).await,
        }
    }
}
