//! Booklend Library Lending Service
//!
//! A Rust REST JSON API for a lending library: users browse and borrow
//! books, admins manage the catalog and inspect the borrow log. Borrowing
//! is guarded by row-locked transactions so a single copy can never be
//! borrowed twice concurrently.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
