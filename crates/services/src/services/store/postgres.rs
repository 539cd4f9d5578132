use async_trait::async_trait;
use db::{
    DBService,
    models::{
        company::Company,
        deal::{Deal, StageCount},
        interaction::Interaction,
        lead::{Lead, StatusCount},
        task::Task,
        user::{UpsertUser, User},
    },
};
use uuid::Uuid;

use super::{CrmBackend, Listing, Repository, Resource, StoreError};
use crate::services::lead_filter::{LeadFilter, Pagination};

/// Store backed by the Postgres tables.
#[derive(Clone)]
pub struct PgStore {
    db: DBService,
}

impl PgStore {
    pub fn new(db: DBService) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }
}

macro_rules! pg_repository {
    ($model:ty) => {
        #[async_trait]
        impl Repository<$model> for PgStore {
            async fn find(&self, id: Uuid) -> Result<Option<$model>, StoreError> {
                Ok(<$model>::find_by_id(&self.db.pool, id).await?)
            }

            async fn create(
                &self,
                data: <$model as Resource>::Create,
            ) -> Result<$model, StoreError> {
                Ok(<$model>::create(&self.db.pool, Uuid::new_v4(), &data).await?)
            }

            async fn update(
                &self,
                id: Uuid,
                data: <$model as Resource>::Update,
            ) -> Result<Option<$model>, StoreError> {
                Ok(<$model>::update(&self.db.pool, id, &data).await?)
            }

            async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
                Ok(<$model>::delete(&self.db.pool, id).await? > 0)
            }
        }
    };
}

macro_rules! pg_listing {
    ($model:ty) => {
        #[async_trait]
        impl Listing<$model> for PgStore {
            async fn list(
                &self,
                filter: &<$model as Resource>::Filter,
            ) -> Result<Vec<$model>, StoreError> {
                Ok(<$model>::find_all(&self.db.pool, filter).await?)
            }
        }
    };
}

pg_repository!(Lead);
pg_repository!(Company);
pg_repository!(Interaction);
pg_repository!(Deal);
pg_repository!(Task);

pg_listing!(Company);
pg_listing!(Interaction);
pg_listing!(Deal);
pg_listing!(Task);

#[async_trait]
impl CrmBackend for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(Lead::ping(&self.db.pool).await?)
    }

    async fn search_leads(
        &self,
        filter: &LeadFilter,
        pagination: Pagination,
    ) -> Result<(Vec<Lead>, i64), StoreError> {
        let params = filter.to_search(&pagination);
        Ok(Lead::search(&self.db.pool, &params).await?)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(User::find_by_id(&self.db.pool, id).await?)
    }

    async fn upsert_user(&self, data: UpsertUser) -> Result<User, StoreError> {
        Ok(User::upsert(&self.db.pool, Uuid::new_v4(), &data).await?)
    }

    async fn lead_status_counts(&self) -> Result<Vec<StatusCount>, StoreError> {
        Ok(Lead::count_by_status(&self.db.pool).await?)
    }

    async fn deal_stage_counts(&self) -> Result<Vec<StageCount>, StoreError> {
        Ok(Deal::count_by_stage(&self.db.pool).await?)
    }

    async fn recent_interactions(&self, limit: i64) -> Result<Vec<Interaction>, StoreError> {
        Ok(Interaction::find_recent(&self.db.pool, limit).await?)
    }
}
