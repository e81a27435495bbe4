use crate::session::SessionData;
use moka::future::Cache;
use std::time::Duration;
use uuid::Uuid;

/// In-memory session storage backed by Moka.
///
/// Entries are evicted once idle for longer than the configured timeout or
/// when capacity is exceeded.
#[derive(Clone)]
pub struct SessionStore {
    cache: Cache<Uuid, SessionData>,
}

impl SessionStore {
    pub fn new(max_capacity: u64, idle_timeout: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_idle(idle_timeout)
            .build();

        Self { cache }
    }

    pub async fn get(&self, id: &Uuid) -> Option<SessionData> {
        self.cache.get(id).await
    }

    pub async fn insert(&self, id: Uuid, data: SessionData) {
        self.cache.insert(id, data).await;
    }

    pub async fn remove(&self, id: &Uuid) {
        self.cache.invalidate(id).await;
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}
