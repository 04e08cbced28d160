use std::sync::Arc;

use tracing::{debug, info};

use crate::config::AppConfig;
use crate::services::{
    hasher::CredentialHasher, notification::NotificationSender,
    verification::VerificationWorkflow,
};
use crate::store::{AccountStore, Store, VerificationStore};

/// Application state shared across requests. Needs to be thread-safe.
pub struct AppState {
    /// Persistence for every record type.
    pub store: Arc<dyn Store>,
    /// Signup, verification and signin orchestration.
    pub workflow: VerificationWorkflow,
    /// Used directly when a profile update changes the password.
    pub hasher: CredentialHasher,
    /// Configuration resolved once at startup.
    pub config: AppConfig,
}

impl AppState {
    /// Creates a new application state around a concrete store.
    ///
    /// # Arguments
    ///
    /// * `store` - Backing store, shared by the workflow and the CRUD handlers
    /// * `notifier` - Delivers verification links
    /// * `config` - Base URL and hashing cost are taken from here
    pub fn new<S: Store + 'static>(
        store: Arc<S>,
        notifier: Arc<dyn NotificationSender>,
        config: AppConfig,
    ) -> Self {
        info!("Initializing application state");
        debug!(
            hash_cost = config.hash_cost,
            base_url = %config.base_url,
            "Wiring verification workflow"
        );

        let hasher = CredentialHasher::new(config.hash_cost);
        let accounts: Arc<dyn AccountStore> = store.clone();
        let tokens: Arc<dyn VerificationStore> = store.clone();
        let workflow = VerificationWorkflow::new(
            accounts,
            tokens,
            notifier,
            hasher,
            config.base_url.clone(),
        );

        Self {
            store,
            workflow,
            hasher,
            config,
        }
    }
}
