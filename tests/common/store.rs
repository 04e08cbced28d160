use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use handyhub::models::{
    Account, AccountChanges, Category, CategoryChanges, Favorite, NewAccount, NewCategory,
    NewOrder, NewService, Order, OrderChanges, OrderParty, Service, ServiceChanges, Subcategory,
    VerificationToken,
};
use handyhub::store::{
    AccountStore, CategoryStore, FavoriteStore, MemoryStore, OrderStore, ServiceStore,
    StoreError, StoreResult, VerificationStore,
};
use uuid::Uuid;

/// Token operations that can be made to fail.
#[derive(Debug, Clone, Copy)]
pub enum Fault {
    /// `tokens_for`
    TokenLookup,
    /// `delete_token`
    TokenDelete,
    /// `delete_tokens_for`
    TokenPurge,
}

/// A [`MemoryStore`] whose token operations can be switched to fail with a
/// database error. Everything else is passed through untouched.
#[derive(Default)]
pub struct FaultyStore {
    inner: MemoryStore,
    token_lookup: AtomicBool,
    token_delete: AtomicBool,
    token_purge: AtomicBool,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn flag(&self, fault: Fault) -> &AtomicBool {
        match fault {
            Fault::TokenLookup => &self.token_lookup,
            Fault::TokenDelete => &self.token_delete,
            Fault::TokenPurge => &self.token_purge,
        }
    }

    /// Makes the operation fail until [`FaultyStore::heal`] is called.
    pub fn inject(&self, fault: Fault) {
        self.flag(fault).store(true, Ordering::SeqCst);
    }

    pub fn heal(&self, fault: Fault) {
        self.flag(fault).store(false, Ordering::SeqCst);
    }

    fn check(&self, fault: Fault) -> StoreResult<()> {
        if self.flag(fault).load(Ordering::SeqCst) {
            return Err(StoreError::Db(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl VerificationStore for FaultyStore {
    async fn insert_token(&self, token: VerificationToken) -> StoreResult<()> {
        self.inner.insert_token(token).await
    }

    async fn tokens_for(&self, account_id: Uuid) -> StoreResult<Vec<VerificationToken>> {
        self.check(Fault::TokenLookup)?;
        self.inner.tokens_for(account_id).await
    }

    async fn delete_tokens_for(&self, account_id: Uuid) -> StoreResult<u64> {
        self.check(Fault::TokenPurge)?;
        self.inner.delete_tokens_for(account_id).await
    }

    async fn delete_token(&self, account_id: Uuid) -> StoreResult<bool> {
        self.check(Fault::TokenDelete)?;
        self.inner.delete_token(account_id).await
    }
}

#[async_trait]
impl AccountStore for FaultyStore {
    async fn create_account(&self, account: NewAccount) -> StoreResult<Account> {
        self.inner.create_account(account).await
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        self.inner.find_account_by_email(email).await
    }

    async fn find_account(&self, id: Uuid) -> StoreResult<Option<Account>> {
        self.inner.find_account(id).await
    }

    async fn list_accounts(&self) -> StoreResult<Vec<Account>> {
        self.inner.list_accounts().await
    }

    async fn update_account(
        &self,
        id: Uuid,
        changes: AccountChanges,
    ) -> StoreResult<Option<Account>> {
        self.inner.update_account(id, changes).await
    }

    async fn mark_verified(&self, id: Uuid) -> StoreResult<bool> {
        self.inner.mark_verified(id).await
    }

    async fn delete_account(&self, id: Uuid) -> StoreResult<bool> {
        self.inner.delete_account(id).await
    }
}

#[async_trait]
impl CategoryStore for FaultyStore {
    async fn create_category(&self, category: NewCategory) -> StoreResult<Category> {
        self.inner.create_category(category).await
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        self.inner.list_categories().await
    }

    async fn update_category(
        &self,
        id: Uuid,
        changes: CategoryChanges,
    ) -> StoreResult<Option<Category>> {
        self.inner.update_category(id, changes).await
    }

    async fn delete_category(&self, id: Uuid) -> StoreResult<Option<Category>> {
        self.inner.delete_category(id).await
    }

    async fn find_subcategory(&self, id: Uuid) -> StoreResult<Option<Subcategory>> {
        self.inner.find_subcategory(id).await
    }
}

#[async_trait]
impl ServiceStore for FaultyStore {
    async fn create_service(&self, service: NewService) -> StoreResult<Service> {
        self.inner.create_service(service).await
    }

    async fn list_services(&self) -> StoreResult<Vec<Service>> {
        self.inner.list_services().await
    }

    async fn find_service(&self, id: Uuid) -> StoreResult<Option<Service>> {
        self.inner.find_service(id).await
    }

    async fn update_service(
        &self,
        id: Uuid,
        changes: ServiceChanges,
    ) -> StoreResult<Option<Service>> {
        self.inner.update_service(id, changes).await
    }

    async fn delete_service(&self, id: Uuid) -> StoreResult<Option<Service>> {
        self.inner.delete_service(id).await
    }
}

#[async_trait]
impl FavoriteStore for FaultyStore {
    async fn create_favorite(&self, user_id: Uuid, service_id: Uuid) -> StoreResult<Favorite> {
        self.inner.create_favorite(user_id, service_id).await
    }

    async fn favorites_for(&self, user_id: Uuid) -> StoreResult<Vec<Favorite>> {
        self.inner.favorites_for(user_id).await
    }

    async fn delete_favorite(&self, id: Uuid) -> StoreResult<Option<Favorite>> {
        self.inner.delete_favorite(id).await
    }
}

#[async_trait]
impl OrderStore for FaultyStore {
    async fn create_order(&self, order: NewOrder) -> StoreResult<Order> {
        self.inner.create_order(order).await
    }

    async fn find_order(&self, id: Uuid) -> StoreResult<Option<Order>> {
        self.inner.find_order(id).await
    }

    async fn orders_for(&self, party: OrderParty) -> StoreResult<Vec<Order>> {
        self.inner.orders_for(party).await
    }

    async fn update_order(&self, id: Uuid, changes: OrderChanges) -> StoreResult<Option<Order>> {
        self.inner.update_order(id, changes).await
    }

    async fn delete_order(&self, id: Uuid) -> StoreResult<bool> {
        self.inner.delete_order(id).await
    }
}
