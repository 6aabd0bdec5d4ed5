use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::auth::repo_types::{Account, NewAccount};

#[derive(Debug, Error)]
pub enum StoreError {
    /// Insert rejected by the unique index on email.
    #[error("email already exists")]
    UniqueViolation,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    fn from_insert(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::UniqueViolation,
            _ => StoreError::Database(e),
        }
    }
}

/// Persistence seam for accounts.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn insert_account(&self, new: NewAccount) -> Result<Account, StoreError>;
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;
    async fn find_account_by_id(&self, id: i64) -> Result<Option<Account>, StoreError>;
    /// All accounts, newest (highest id) first.
    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError>;
}

#[derive(Clone)]
pub struct PgAccountStore {
    db: PgPool,
}

impl PgAccountStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn insert_account(&self, new: NewAccount) -> Result<Account, StoreError> {
        sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password_hash, role, status, created_at
            "#,
        )
        .bind(new.name)
        .bind(new.email)
        .bind(new.password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(StoreError::from_insert)
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, name, email, password_hash, role, status, created_at
            FROM users
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(account)
    }

    async fn find_account_by_id(&self, id: i64) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, name, email, password_hash, role, status, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(account)
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        let rows = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, name, email, password_hash, role, status, created_at
            FROM users
            ORDER BY id DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
