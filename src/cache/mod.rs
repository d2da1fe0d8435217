use moka::future::Cache;
use sea_orm::{ConnectionTrait, DbErr};
use uuid::Uuid;

use crate::config::CacheConfig;
use crate::db::users as user_db;
use crate::models::users;

/// Short-lived in-process cache in front of the per-request user lookup.
///
/// Roles never change after registration, so a stale entry can only carry a
/// stale display name.
#[derive(Clone)]
pub struct UserCache {
    cache: Cache<Uuid, users::Model>,
}

impl UserCache {
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .time_to_live(config.user_ttl)
            .max_capacity(config.user_capacity)
            .build();

        Self { cache }
    }

    /// Return the cached user, falling back to the database on a miss.
    pub async fn get_or_load<C: ConnectionTrait>(
        &self,
        db: &C,
        id: Uuid,
    ) -> Result<Option<users::Model>, DbErr> {
        if let Some(cached) = self.cache.get(&id).await {
            return Ok(Some(cached));
        }

        let user = user_db::get_user_by_id(db, id).await?;
        if let Some(ref found) = user {
            self.cache.insert(id, found.clone()).await;
        }

        Ok(user)
    }

    pub async fn invalidate(&self, id: Uuid) {
        self.cache.invalidate(&id).await;
    }
}
