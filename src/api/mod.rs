pub mod handlers;
pub mod pages;
pub mod routes;

pub use routes::*;

use crate::ml::ModelHandle;
use crate::session::SessionManager;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Classifier loaded at startup, `None` if loading failed
    pub model: ModelHandle,
    pub sessions: SessionManager,
    pub static_dir: PathBuf,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(model: ModelHandle, sessions: SessionManager) -> Self {
        Self {
            model,
            sessions,
            static_dir: PathBuf::from("static"),
            started_at: Utc::now(),
        }
    }

    /// Serve `/static` from `dir`
    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = dir.into();
        self
    }
}
