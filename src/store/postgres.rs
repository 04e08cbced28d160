use async_trait::async_trait;
use sqlx::{PgPool, postgres::PgPoolOptions, types::Json};
use time::OffsetDateTime;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{
    AccountStore, CategoryStore, EMAIL_TAKEN, FavoriteStore, OrderStore, ServiceStore,
    StoreError, StoreResult, VerificationStore,
};
use crate::models::{
    Account, AccountChanges, Category, CategoryChanges, Favorite, NewAccount, NewCategory,
    NewOrder, NewService, Order, OrderChanges, OrderParty, Service, ServiceChanges, Subcategory,
    VerificationToken,
};
use crate::utils::constant::DB_MAX_CONNECTIONS;

const ACCOUNT_COLUMNS: &str = "id, username, email, phone, image, password_hash, role, \
                               is_technician, verified, created_at, updated_at";
const SERVICE_COLUMNS: &str =
    "id, subcategory_id, service_name, description, price, image, created_at, updated_at";
const ORDER_COLUMNS: &str = "id, customer_id, technician_id, service_id, status, order_date, \
                             completion_date, created_at, updated_at";

/// PostgreSQL store. Schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connects to `database_url` and applies pending migrations.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(DB_MAX_CONNECTIONS)
            .connect(database_url)
            .await?;
        info!("Connected to PostgreSQL");

        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database migrations applied");

        Ok(Self { pool })
    }

    /// Wraps an existing pool whose schema is already migrated.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// A UNIQUE violation on `accounts` can only be the email index.
fn email_conflict(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(EMAIL_TAKEN)
        }
        _ => StoreError::Db(e),
    }
}

#[async_trait]
impl AccountStore for PgStore {
    #[instrument(skip_all, fields(email = %account.email))]
    async fn create_account(&self, account: NewAccount) -> StoreResult<Account> {
        let sql = format!(
            "INSERT INTO accounts (id, username, email, phone, image, password_hash, role, is_technician)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {ACCOUNT_COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&sql)
            .bind(account.id)
            .bind(&account.username)
            .bind(&account.email)
            .bind(&account.phone)
            .bind(&account.image)
            .bind(&account.password_hash)
            .bind(account.role)
            .bind(account.is_technician)
            .fetch_one(&self.pool)
            .await
            .map_err(email_conflict)
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1");
        Ok(sqlx::query_as::<_, Account>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_account(&self, id: Uuid) -> StoreResult<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
        Ok(sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_accounts(&self) -> StoreResult<Vec<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY created_at");
        Ok(sqlx::query_as::<_, Account>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    #[instrument(skip(self, changes))]
    async fn update_account(
        &self,
        id: Uuid,
        changes: AccountChanges,
    ) -> StoreResult<Option<Account>> {
        let sql = format!(
            "UPDATE accounts SET
                username = COALESCE($2, username),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                image = COALESCE($5, image),
                password_hash = COALESCE($6, password_hash),
                updated_at = now()
             WHERE id = $1
             RETURNING {ACCOUNT_COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .bind(changes.username)
            .bind(changes.email)
            .bind(changes.phone)
            .bind(changes.image)
            .bind(changes.password_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(email_conflict)
    }

    async fn mark_verified(&self, id: Uuid) -> StoreResult<bool> {
        let result =
            sqlx::query("UPDATE accounts SET verified = TRUE, updated_at = now() WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_account(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl VerificationStore for PgStore {
    async fn insert_token(&self, token: VerificationToken) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO verification_tokens (account_id, unique_string, created_at, expires_at)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(token.account_id)
        .bind(&token.unique_string)
        .bind(token.created_at)
        .bind(token.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn tokens_for(&self, account_id: Uuid) -> StoreResult<Vec<VerificationToken>> {
        Ok(sqlx::query_as::<_, VerificationToken>(
            "SELECT account_id, unique_string, created_at, expires_at
             FROM verification_tokens
             WHERE account_id = $1
             ORDER BY created_at, id",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn delete_tokens_for(&self, account_id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM verification_tokens WHERE account_id = $1")
            .bind(account_id)
            .execute(&self.pool)
            .await?;
        debug!(deleted = result.rows_affected(), "Purged verification tokens");
        Ok(result.rows_affected())
    }

    async fn delete_token(&self, account_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query(
            "DELETE FROM verification_tokens WHERE id = (
                SELECT id FROM verification_tokens
                WHERE account_id = $1
                ORDER BY created_at, id
                LIMIT 1
             )",
        )
        .bind(account_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CategoryStore for PgStore {
    async fn create_category(&self, category: NewCategory) -> StoreResult<Category> {
        Ok(sqlx::query_as::<_, Category>(
            "INSERT INTO categories (id, name, subcategories)
             VALUES ($1, $2, $3)
             RETURNING id, name, subcategories, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(&category.name)
        .bind(Json(&category.subcategories))
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        Ok(sqlx::query_as::<_, Category>(
            "SELECT id, name, subcategories, created_at, updated_at
             FROM categories ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update_category(
        &self,
        id: Uuid,
        changes: CategoryChanges,
    ) -> StoreResult<Option<Category>> {
        Ok(sqlx::query_as::<_, Category>(
            "UPDATE categories SET
                name = COALESCE($2, name),
                subcategories = COALESCE($3, subcategories),
                updated_at = now()
             WHERE id = $1
             RETURNING id, name, subcategories, created_at, updated_at",
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.subcategories.map(Json))
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_category(&self, id: Uuid) -> StoreResult<Option<Category>> {
        Ok(sqlx::query_as::<_, Category>(
            "DELETE FROM categories WHERE id = $1
             RETURNING id, name, subcategories, created_at, updated_at",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn find_subcategory(&self, id: Uuid) -> StoreResult<Option<Subcategory>> {
        let found = sqlx::query_scalar::<_, Json<Subcategory>>(
            "SELECT sub FROM categories, jsonb_array_elements(subcategories) AS sub
             WHERE sub->>'id' = $1
             LIMIT 1",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        Ok(found.map(|Json(sub)| sub))
    }
}

#[async_trait]
impl ServiceStore for PgStore {
    async fn create_service(&self, service: NewService) -> StoreResult<Service> {
        let sql = format!(
            "INSERT INTO services (id, subcategory_id, service_name, description, price, image)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {SERVICE_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Service>(&sql)
            .bind(Uuid::new_v4())
            .bind(service.subcategory_id)
            .bind(&service.service_name)
            .bind(&service.description)
            .bind(service.price)
            .bind(&service.image)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn list_services(&self) -> StoreResult<Vec<Service>> {
        let sql = format!("SELECT {SERVICE_COLUMNS} FROM services ORDER BY created_at");
        Ok(sqlx::query_as::<_, Service>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_service(&self, id: Uuid) -> StoreResult<Option<Service>> {
        let sql = format!("SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1");
        Ok(sqlx::query_as::<_, Service>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_service(
        &self,
        id: Uuid,
        changes: ServiceChanges,
    ) -> StoreResult<Option<Service>> {
        let sql = format!(
            "UPDATE services SET
                subcategory_id = COALESCE($2, subcategory_id),
                service_name = COALESCE($3, service_name),
                description = COALESCE($4, description),
                price = COALESCE($5, price),
                image = COALESCE($6, image),
                updated_at = now()
             WHERE id = $1
             RETURNING {SERVICE_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Service>(&sql)
            .bind(id)
            .bind(changes.subcategory_id)
            .bind(changes.service_name)
            .bind(changes.description)
            .bind(changes.price)
            .bind(changes.image)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_service(&self, id: Uuid) -> StoreResult<Option<Service>> {
        let sql = format!("DELETE FROM services WHERE id = $1 RETURNING {SERVICE_COLUMNS}");
        Ok(sqlx::query_as::<_, Service>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }
}

#[async_trait]
impl FavoriteStore for PgStore {
    async fn create_favorite(&self, user_id: Uuid, service_id: Uuid) -> StoreResult<Favorite> {
        Ok(sqlx::query_as::<_, Favorite>(
            "INSERT INTO favorites (id, user_id, service_id)
             VALUES ($1, $2, $3)
             RETURNING id, user_id, service_id, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(service_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn favorites_for(&self, user_id: Uuid) -> StoreResult<Vec<Favorite>> {
        Ok(sqlx::query_as::<_, Favorite>(
            "SELECT id, user_id, service_id, created_at, updated_at
             FROM favorites WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn delete_favorite(&self, id: Uuid) -> StoreResult<Option<Favorite>> {
        Ok(sqlx::query_as::<_, Favorite>(
            "DELETE FROM favorites WHERE id = $1
             RETURNING id, user_id, service_id, created_at, updated_at",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn create_order(&self, order: NewOrder) -> StoreResult<Order> {
        let sql = format!(
            "INSERT INTO orders (id, customer_id, technician_id, service_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {ORDER_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Order>(&sql)
            .bind(Uuid::new_v4())
            .bind(order.customer_id)
            .bind(order.technician_id)
            .bind(order.service_id)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_order(&self, id: Uuid) -> StoreResult<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        Ok(sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn orders_for(&self, party: OrderParty) -> StoreResult<Vec<Order>> {
        let (column, user_id) = match party {
            OrderParty::Customer(id) => ("customer_id", id),
            OrderParty::Technician(id) => ("technician_id", id),
        };
        let sql =
            format!("SELECT {ORDER_COLUMNS} FROM orders WHERE {column} = $1 ORDER BY created_at");
        Ok(sqlx::query_as::<_, Order>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_order(&self, id: Uuid, changes: OrderChanges) -> StoreResult<Option<Order>> {
        let sql = format!(
            "UPDATE orders SET
                service_id = COALESCE($2, service_id),
                completion_date = CASE
                    WHEN $3::order_status = 'closed' AND status = 'open' THEN $4
                    WHEN $3::order_status = 'open' THEN NULL
                    ELSE completion_date
                END,
                status = COALESCE($3, status),
                updated_at = $4
             WHERE id = $1
             RETURNING {ORDER_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .bind(changes.service_id)
            .bind(changes.status)
            .bind(OffsetDateTime::now_utc())
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_order(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
