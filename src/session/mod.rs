//! Per-client session state
//!
//! Each browser holds a signed cookie naming a server-side [`SessionData`]
//! entry. The only thing kept in a session is the latest prediction, which
//! the report page renders.

pub mod cookie;
pub mod middleware;
pub mod store;

pub use cookie::CookieSigner;
pub use middleware::session_middleware;
pub use store::SessionStore;

use crate::config::SessionConfig;
use crate::error::AppError;
use crate::models::PredictionResult;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Data stored for one client
#[derive(Debug, Clone)]
pub struct SessionData {
    /// Session creation time
    pub created_at: DateTime<Utc>,
    /// Most recent prediction, if any
    pub prediction: Option<PredictionResult>,
}

impl SessionData {
    pub fn new() -> Self {
        Self {
            created_at: Utc::now(),
            prediction: None,
        }
    }
}

impl Default for SessionData {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the session middleware needs: storage, signing and cookie settings
#[derive(Clone)]
pub struct SessionManager {
    store: SessionStore,
    signer: CookieSigner,
    cookie_name: Arc<str>,
}

impl SessionManager {
    pub fn new(config: &SessionConfig) -> Result<Self, AppError> {
        let signer = CookieSigner::new(config.secret_key.as_bytes())
            .map_err(|e| AppError::Configuration(format!("invalid session secret: {e}")))?;

        Ok(Self {
            store: SessionStore::new(
                config.max_sessions,
                Duration::from_secs(config.idle_timeout_secs),
            ),
            signer,
            cookie_name: Arc::from(config.cookie_name.as_str()),
        })
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Resolve a session from a signed cookie value, or start a new one
    pub fn resolve(&self, cookie_value: Option<&str>) -> Session {
        match cookie_value.and_then(|value| self.signer.verify(value)) {
            Some(id) => Session::new(id, self.store.clone(), false),
            None => Session::new(Uuid::new_v4(), self.store.clone(), true),
        }
    }

    /// `Set-Cookie` header value for `session`
    pub fn set_cookie_header(&self, session: &Session) -> String {
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            self.cookie_name,
            self.signer.sign(&session.id())
        )
    }
}

/// Handle to the current request's session, inserted by [`session_middleware`]
#[derive(Clone)]
pub struct Session {
    id: Uuid,
    store: SessionStore,
    is_new: bool,
    written: Arc<AtomicBool>,
}

impl Session {
    fn new(id: Uuid, store: SessionStore, is_new: bool) -> Self {
        Self {
            id,
            store,
            is_new,
            written: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// True when the client did not present a valid session cookie
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// True once anything was stored during this request
    pub fn was_written(&self) -> bool {
        self.written.load(Ordering::Acquire)
    }

    pub async fn prediction(&self) -> Option<PredictionResult> {
        self.store.get(&self.id).await.and_then(|data| data.prediction)
    }

    /// Store `prediction`, replacing any earlier one
    pub async fn set_prediction(&self, prediction: PredictionResult) {
        let mut data = self.store.get(&self.id).await.unwrap_or_default();
        data.prediction = Some(prediction);
        self.store.insert(self.id, data).await;
        self.written.store(true, Ordering::Release);
    }

    /// Remove the stored prediction. No-op when there is none.
    ///
    /// The prediction is the only thing a session holds, so the whole entry
    /// is dropped; the cookie stays valid and a later write recreates it.
    pub async fn clear_prediction(&self) {
        if self.store.get(&self.id).await.is_some() {
            self.store.remove(&self.id).await;
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session middleware is not installed".to_string()))
    }
}
