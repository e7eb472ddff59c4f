//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use chrono::Duration;
use salon_core::ports::{CredentialHasher, RecordStore, StyleAdvisor};
use salon_core::seed::{seed_defaults, AdminSeed};
use salon_core::{Accounts, Catalog, CoreResult, Scheduler};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub config: Arc<Config>,
    pub scheduler: Arc<Scheduler>,
    pub catalog: Arc<Catalog>,
    pub accounts: Arc<Accounts>,
    pub advisor: Arc<dyn StyleAdvisor>,
}

impl AppState {
    /// Wires the core services onto one record store.
    pub fn new(
        store: Arc<dyn RecordStore>,
        hasher: Arc<dyn CredentialHasher>,
        advisor: Arc<dyn StyleAdvisor>,
        config: Arc<Config>,
    ) -> Self {
        let scheduler = Scheduler::new(store.clone())
            .strict_status_updates(config.strict_status_updates);
        let catalog = Catalog::new(store.clone());
        let accounts = Accounts::new(
            store.clone(),
            hasher,
            Duration::days(config.session_ttl_days),
        );
        Self {
            store,
            config,
            scheduler: Arc::new(scheduler),
            catalog: Arc::new(catalog),
            accounts: Arc::new(accounts),
            advisor,
        }
    }

    /// Loads the default catalog on first start and the configured admin account.
    pub async fn seed(&self) -> CoreResult<()> {
        let admin = self.config.admin_password.as_ref().map(|password| AdminSeed {
            name: self.config.admin_name.clone(),
            email: self.config.admin_email.clone(),
            phone: self.config.admin_phone.clone(),
            password: password.clone(),
        });
        seed_defaults(
            self.store.as_ref(),
            &self.catalog,
            &self.accounts,
            admin.as_ref(),
        )
        .await
    }
}
