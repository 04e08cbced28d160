use async_trait::async_trait;
use dashmap::{DashMap, mapref::entry::Entry};
use time::OffsetDateTime;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{
    AccountStore, CategoryStore, EMAIL_TAKEN, FavoriteStore, OrderStore, ServiceStore,
    StoreError, StoreResult, VerificationStore,
};
use crate::models::{
    Account, AccountChanges, Category, CategoryChanges, Favorite, NewAccount, NewCategory,
    NewOrder, NewService, Order, OrderChanges, OrderParty, OrderStatus, Service, ServiceChanges,
    Subcategory, VerificationToken,
};

/// In-process store backed by concurrent maps.
///
/// `emails` indexes accounts by address; claiming an entry in it is the
/// atomic uniqueness check. A shard guard of one map is never held while
/// locking another.
#[derive(Default)]
pub struct MemoryStore {
    accounts: DashMap<Uuid, Account>,
    emails: DashMap<String, Uuid>,
    tokens: DashMap<Uuid, Vec<VerificationToken>>,
    categories: DashMap<Uuid, Category>,
    services: DashMap<Uuid, Service>,
    favorites: DashMap<Uuid, Favorite>,
    orders: DashMap<Uuid, Order>,
}

impl MemoryStore {
    pub fn new() -> Self {
        debug!("Creating in-memory store");
        Self::default()
    }
}

/// Snapshot of a map ordered by creation time.
fn snapshot<T, F>(map: &DashMap<Uuid, T>, created_at: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> OffsetDateTime,
{
    let mut items: Vec<T> = map.iter().map(|entry| entry.value().clone()).collect();
    items.sort_by_key(|item| created_at(item));
    items
}

#[async_trait]
impl AccountStore for MemoryStore {
    #[instrument(skip_all, fields(email = %account.email))]
    async fn create_account(&self, account: NewAccount) -> StoreResult<Account> {
        match self.emails.entry(account.email.clone()) {
            Entry::Occupied(_) => return Err(StoreError::Conflict(EMAIL_TAKEN)),
            Entry::Vacant(slot) => {
                slot.insert(account.id);
            }
        }

        let account = account.into_account(OffsetDateTime::now_utc());
        self.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let Some(id) = self.emails.get(email).map(|entry| *entry.value()) else {
            return Ok(None);
        };
        Ok(self.accounts.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_account(&self, id: Uuid) -> StoreResult<Option<Account>> {
        Ok(self.accounts.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list_accounts(&self) -> StoreResult<Vec<Account>> {
        Ok(snapshot(&self.accounts, |a| a.created_at))
    }

    #[instrument(skip(self, changes))]
    async fn update_account(
        &self,
        id: Uuid,
        changes: AccountChanges,
    ) -> StoreResult<Option<Account>> {
        let Some(current_email) = self.accounts.get(&id).map(|a| a.email.clone()) else {
            return Ok(None);
        };

        let new_email = changes
            .email
            .clone()
            .filter(|email| *email != current_email);

        if let Some(email) = &new_email {
            match self.emails.entry(email.clone()) {
                Entry::Occupied(_) => return Err(StoreError::Conflict(EMAIL_TAKEN)),
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
        }

        let Some(mut account) = self.accounts.get_mut(&id) else {
            // removed between the two lookups; release the claimed address
            if let Some(email) = &new_email {
                self.emails.remove(email);
            }
            return Ok(None);
        };

        if let Some(username) = changes.username {
            account.username = username;
        }
        if let Some(email) = changes.email {
            account.email = email;
        }
        if let Some(phone) = changes.phone {
            account.phone = Some(phone);
        }
        if let Some(image) = changes.image {
            account.image = Some(image);
        }
        if let Some(password_hash) = changes.password_hash {
            account.password_hash = password_hash;
        }
        account.updated_at = OffsetDateTime::now_utc();

        let updated = account.clone();
        drop(account);

        if new_email.is_some() {
            self.emails.remove_if(&current_email, |_, owner| *owner == id);
        }

        Ok(Some(updated))
    }

    async fn mark_verified(&self, id: Uuid) -> StoreResult<bool> {
        let Some(mut account) = self.accounts.get_mut(&id) else {
            return Ok(false);
        };
        account.verified = true;
        account.updated_at = OffsetDateTime::now_utc();
        Ok(true)
    }

    async fn delete_account(&self, id: Uuid) -> StoreResult<bool> {
        match self.accounts.remove(&id) {
            Some((_, account)) => {
                self.emails
                    .remove_if(&account.email, |_, owner| *owner == id);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl VerificationStore for MemoryStore {
    async fn insert_token(&self, token: VerificationToken) -> StoreResult<()> {
        self.tokens.entry(token.account_id).or_default().push(token);
        Ok(())
    }

    async fn tokens_for(&self, account_id: Uuid) -> StoreResult<Vec<VerificationToken>> {
        Ok(self
            .tokens
            .get(&account_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }

    async fn delete_tokens_for(&self, account_id: Uuid) -> StoreResult<u64> {
        Ok(self
            .tokens
            .remove(&account_id)
            .map_or(0, |(_, tokens)| tokens.len() as u64))
    }

    async fn delete_token(&self, account_id: Uuid) -> StoreResult<bool> {
        let Some(mut tokens) = self.tokens.get_mut(&account_id) else {
            return Ok(false);
        };
        if tokens.is_empty() {
            return Ok(false);
        }
        tokens.remove(0);
        let drained = tokens.is_empty();
        drop(tokens);

        if drained {
            self.tokens.remove_if(&account_id, |_, tokens| tokens.is_empty());
        }
        Ok(true)
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn create_category(&self, category: NewCategory) -> StoreResult<Category> {
        let now = OffsetDateTime::now_utc();
        let category = Category {
            id: Uuid::new_v4(),
            name: category.name,
            subcategories: category.subcategories,
            created_at: now,
            updated_at: now,
        };
        self.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        Ok(snapshot(&self.categories, |c| c.created_at))
    }

    async fn update_category(
        &self,
        id: Uuid,
        changes: CategoryChanges,
    ) -> StoreResult<Option<Category>> {
        let Some(mut category) = self.categories.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            category.name = name;
        }
        if let Some(subcategories) = changes.subcategories {
            category.subcategories = subcategories;
        }
        category.updated_at = OffsetDateTime::now_utc();
        Ok(Some(category.clone()))
    }

    async fn delete_category(&self, id: Uuid) -> StoreResult<Option<Category>> {
        Ok(self.categories.remove(&id).map(|(_, category)| category))
    }

    async fn find_subcategory(&self, id: Uuid) -> StoreResult<Option<Subcategory>> {
        Ok(self.categories.iter().find_map(|category| {
            category
                .subcategories
                .iter()
                .find(|sub| sub.id == id)
                .cloned()
        }))
    }
}

#[async_trait]
impl ServiceStore for MemoryStore {
    async fn create_service(&self, service: NewService) -> StoreResult<Service> {
        let now = OffsetDateTime::now_utc();
        let service = Service {
            id: Uuid::new_v4(),
            subcategory_id: service.subcategory_id,
            service_name: service.service_name,
            description: service.description,
            price: service.price,
            image: service.image,
            created_at: now,
            updated_at: now,
        };
        self.services.insert(service.id, service.clone());
        Ok(service)
    }

    async fn list_services(&self) -> StoreResult<Vec<Service>> {
        Ok(snapshot(&self.services, |s| s.created_at))
    }

    async fn find_service(&self, id: Uuid) -> StoreResult<Option<Service>> {
        Ok(self.services.get(&id).map(|entry| entry.value().clone()))
    }

    async fn update_service(
        &self,
        id: Uuid,
        changes: ServiceChanges,
    ) -> StoreResult<Option<Service>> {
        let Some(mut service) = self.services.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(subcategory_id) = changes.subcategory_id {
            service.subcategory_id = subcategory_id;
        }
        if let Some(service_name) = changes.service_name {
            service.service_name = service_name;
        }
        if let Some(description) = changes.description {
            service.description = Some(description);
        }
        if let Some(price) = changes.price {
            service.price = price;
        }
        if let Some(image) = changes.image {
            service.image = Some(image);
        }
        service.updated_at = OffsetDateTime::now_utc();
        Ok(Some(service.clone()))
    }

    async fn delete_service(&self, id: Uuid) -> StoreResult<Option<Service>> {
        Ok(self.services.remove(&id).map(|(_, service)| service))
    }
}

#[async_trait]
impl FavoriteStore for MemoryStore {
    async fn create_favorite(&self, user_id: Uuid, service_id: Uuid) -> StoreResult<Favorite> {
        let now = OffsetDateTime::now_utc();
        let favorite = Favorite {
            id: Uuid::new_v4(),
            user_id,
            service_id,
            created_at: now,
            updated_at: now,
        };
        self.favorites.insert(favorite.id, favorite.clone());
        Ok(favorite)
    }

    async fn favorites_for(&self, user_id: Uuid) -> StoreResult<Vec<Favorite>> {
        let mut favorites = snapshot(&self.favorites, |f| f.created_at);
        favorites.retain(|f| f.user_id == user_id);
        Ok(favorites)
    }

    async fn delete_favorite(&self, id: Uuid) -> StoreResult<Option<Favorite>> {
        Ok(self.favorites.remove(&id).map(|(_, favorite)| favorite))
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn create_order(&self, order: NewOrder) -> StoreResult<Order> {
        let now = OffsetDateTime::now_utc();
        let order = Order {
            id: Uuid::new_v4(),
            customer_id: order.customer_id,
            technician_id: order.technician_id,
            service_id: order.service_id,
            status: OrderStatus::Open,
            order_date: now,
            completion_date: None,
            created_at: now,
            updated_at: now,
        };
        self.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn find_order(&self, id: Uuid) -> StoreResult<Option<Order>> {
        Ok(self.orders.get(&id).map(|entry| entry.value().clone()))
    }

    async fn orders_for(&self, party: OrderParty) -> StoreResult<Vec<Order>> {
        let mut orders = snapshot(&self.orders, |o| o.created_at);
        orders.retain(|o| match party {
            OrderParty::Customer(id) => o.customer_id == id,
            OrderParty::Technician(id) => o.technician_id == id,
        });
        Ok(orders)
    }

    async fn update_order(&self, id: Uuid, changes: OrderChanges) -> StoreResult<Option<Order>> {
        let Some(mut order) = self.orders.get_mut(&id) else {
            return Ok(None);
        };
        let now = OffsetDateTime::now_utc();

        if let Some(service_id) = changes.service_id {
            order.service_id = service_id;
        }
        if let Some(status) = changes.status {
            match (order.status, status) {
                (OrderStatus::Open, OrderStatus::Closed) => order.completion_date = Some(now),
                (_, OrderStatus::Open) => order.completion_date = None,
                _ => {}
            }
            order.status = status;
        }
        order.updated_at = now;
        Ok(Some(order.clone()))
    }

    async fn delete_order(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.orders.remove(&id).is_some())
    }
}
