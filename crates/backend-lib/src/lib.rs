// ============================
// accountd-backend/src/lib.rs
// ============================
//! Core library for the `accountd` user-account service.

pub mod accounts;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod storage;

use std::sync::Arc;

use crate::accounts::AccountService;
use crate::config::Settings;
use crate::storage::AccountStore;

pub use crate::router::create_router;

/// Application state shared across all handlers
pub struct AppState<S> {
    /// Account service, owning the store
    pub accounts: Arc<AccountService<S>>,
    /// Settings the server was started with
    pub settings: Arc<Settings>,
}

impl<S: AccountStore> AppState<S> {
    /// Create a new application state
    pub fn new(storage: S, config: &Settings) -> anyhow::Result<Self> {
        config.validate()?;
        let accounts = Arc::new(AccountService::from_settings(storage, config)?);

        Ok(Self {
            accounts,
            settings: Arc::new(config.clone()),
        })
    }
}
