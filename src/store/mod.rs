//! # Persistence
//!
//! One trait per record type, all object safe so handlers and the workflow
//! can hold `Arc<dyn ...>`. Method names are unique across the traits so a
//! single [`Store`] object can serve every caller without ambiguity.
//!
//! ## Implementations
//!
//! - [`PgStore`] - PostgreSQL through sqlx; email uniqueness is a UNIQUE index
//! - [`MemoryStore`] - Concurrent maps for development and tests

mod memory;
mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Account, AccountChanges, Category, CategoryChanges, Favorite, NewAccount, NewCategory,
    NewOrder, NewService, Order, OrderChanges, OrderParty, Service, ServiceChanges, Subcategory,
    VerificationToken,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub const EMAIL_TAKEN: &str = "Email already exists";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("conflict: {0}")]
    Conflict(&'static str),

    #[error("database error")]
    Db(#[from] sqlx::Error),

    #[error("migration error")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Fails with [`StoreError::Conflict`] when the email is already taken.
    async fn create_account(&self, account: NewAccount) -> StoreResult<Account>;
    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>>;
    async fn find_account(&self, id: Uuid) -> StoreResult<Option<Account>>;
    async fn list_accounts(&self) -> StoreResult<Vec<Account>>;
    /// Returns `None` when no account has this id.
    async fn update_account(
        &self,
        id: Uuid,
        changes: AccountChanges,
    ) -> StoreResult<Option<Account>>;
    /// Sets `verified = true`; `false` means the account does not exist.
    async fn mark_verified(&self, id: Uuid) -> StoreResult<bool>;
    async fn delete_account(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait VerificationStore: Send + Sync {
    async fn insert_token(&self, token: VerificationToken) -> StoreResult<()>;
    /// Oldest first.
    async fn tokens_for(&self, account_id: Uuid) -> StoreResult<Vec<VerificationToken>>;
    async fn delete_tokens_for(&self, account_id: Uuid) -> StoreResult<u64>;
    /// Removes the oldest token of the account, if any.
    async fn delete_token(&self, account_id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn create_category(&self, category: NewCategory) -> StoreResult<Category>;
    async fn list_categories(&self) -> StoreResult<Vec<Category>>;
    async fn update_category(
        &self,
        id: Uuid,
        changes: CategoryChanges,
    ) -> StoreResult<Option<Category>>;
    /// Returns the removed category.
    async fn delete_category(&self, id: Uuid) -> StoreResult<Option<Category>>;
    /// Searches the subcategories of every category.
    async fn find_subcategory(&self, id: Uuid) -> StoreResult<Option<Subcategory>>;
}

#[async_trait]
pub trait ServiceStore: Send + Sync {
    async fn create_service(&self, service: NewService) -> StoreResult<Service>;
    async fn list_services(&self) -> StoreResult<Vec<Service>>;
    async fn find_service(&self, id: Uuid) -> StoreResult<Option<Service>>;
    async fn update_service(
        &self,
        id: Uuid,
        changes: ServiceChanges,
    ) -> StoreResult<Option<Service>>;
    async fn delete_service(&self, id: Uuid) -> StoreResult<Option<Service>>;
}

#[async_trait]
pub trait FavoriteStore: Send + Sync {
    async fn create_favorite(&self, user_id: Uuid, service_id: Uuid) -> StoreResult<Favorite>;
    async fn favorites_for(&self, user_id: Uuid) -> StoreResult<Vec<Favorite>>;
    async fn delete_favorite(&self, id: Uuid) -> StoreResult<Option<Favorite>>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn create_order(&self, order: NewOrder) -> StoreResult<Order>;
    async fn find_order(&self, id: Uuid) -> StoreResult<Option<Order>>;
    async fn orders_for(&self, party: OrderParty) -> StoreResult<Vec<Order>>;
    /// Closing an open order stamps `completion_date`; reopening clears it.
    async fn update_order(&self, id: Uuid, changes: OrderChanges) -> StoreResult<Option<Order>>;
    async fn delete_order(&self, id: Uuid) -> StoreResult<bool>;
}

/// Everything the application persists.
pub trait Store:
    AccountStore + VerificationStore + CategoryStore + ServiceStore + FavoriteStore + OrderStore
{
}

impl<T> Store for T where
    T: AccountStore + VerificationStore + CategoryStore + ServiceStore + FavoriteStore + OrderStore
{
}
