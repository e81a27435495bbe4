//! Travel satisfaction service
//!
//! Accepts traveller survey submissions over HTTP, scores them with a
//! pre-trained tree ensemble and renders a satisfaction report kept in the
//! client's session.

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod ml;
pub mod models;
pub mod session;

pub use error::{AppError, Result};
