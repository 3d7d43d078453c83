//! Postgres-backed account directory.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `DirectoryError` as follows: unique violations
//! (PostgreSQL code `23505`) become `DuplicateEmail` or `DuplicateUsername`
//! depending on the violated constraint; everything else becomes `Store`
//! with the raw detail kept for logs.
//!
//! ## Concurrency
//!
//! `update` and `soft_delete` carry `AND active = TRUE` inside the single
//! mutating statement, so the active re-check and the mutation are one
//! atomic unit. An account soft-deleted between lookup and mutation
//! surfaces as not-found rather than being resurrected.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use portal_auth::Account;
use portal_core::AccountId;

use crate::contract::{AccountDirectory, AccountPatch, DirectoryError, NewAccount};

/// Account directory on a PostgreSQL pool.
///
/// The pool is `Send + Sync`; the directory can be shared across request
/// tasks freely.
#[derive(Debug, Clone)]
pub struct PostgresDirectory {
    pool: Arc<PgPool>,
}

const SELECT_COLUMNS: &str =
    "id, username, email, password_hash, active, roles, created_at, updated_at";

impl PostgresDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the accounts table and its uniqueness constraints if absent.
    pub async fn migrate(&self) -> Result<(), DirectoryError> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id UUID PRIMARY KEY,
                username TEXT,
                email TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                active BOOLEAN NOT NULL DEFAULT TRUE,
                roles JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
            "CREATE UNIQUE INDEX IF NOT EXISTS accounts_email_key ON accounts (email)",
            "CREATE UNIQUE INDEX IF NOT EXISTS accounts_username_key ON accounts (username)",
        ];
        for statement in statements {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("migrate", e))?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl AccountDirectory for PostgresDirectory {
    #[instrument(skip(self, account), fields(email = %account.email), err)]
    async fn create(&self, account: NewAccount) -> Result<Account, DirectoryError> {
        let id = AccountId::new();
        let now = Utc::now();
        let roles = serde_json::to_value(&account.roles)
            .map_err(|e| DirectoryError::Store(format!("roles serialization: {e}")))?;

        let row = sqlx::query(
            r#"
            INSERT INTO accounts (id, username, email, password_hash, active, roles, created_at, updated_at)
            VALUES ($1, $2, $3, $4, TRUE, $5, $6, $6)
            RETURNING id, username, email, password_hash, active, roles, created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(roles)
        .bind(now)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create", e))?;

        AccountRow::from_row(&row)
            .map_err(|e| DirectoryError::Store(format!("account row: {e}")))?
            .try_into()
    }

    #[instrument(skip(self), fields(account_id = %id), err)]
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, DirectoryError> {
        let query = format!("SELECT {SELECT_COLUMNS} FROM accounts WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_id", e))?;

        row_to_account(row)
    }

    #[instrument(skip(self, email), err)]
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DirectoryError> {
        let query = format!("SELECT {SELECT_COLUMNS} FROM accounts WHERE email = $1");
        let row = sqlx::query(&query)
            .bind(email)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_email", e))?;

        row_to_account(row)
    }

    #[instrument(skip(self, patch), fields(account_id = %id), err)]
    async fn update(
        &self,
        id: AccountId,
        patch: AccountPatch,
    ) -> Result<Option<AccountId>, DirectoryError> {
        let roles = match &patch.roles {
            Some(roles) => Some(
                serde_json::to_value(roles)
                    .map_err(|e| DirectoryError::Store(format!("roles serialization: {e}")))?,
            ),
            None => None,
        };

        let row = sqlx::query(
            r#"
            UPDATE accounts SET
                username = COALESCE($2, username),
                email = COALESCE($3, email),
                roles = COALESCE($4, roles),
                updated_at = $5
            WHERE id = $1 AND active = TRUE
            RETURNING id
            "#,
        )
        .bind(id.as_uuid())
        .bind(&patch.username)
        .bind(&patch.email)
        .bind(roles)
        .bind(Utc::now())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update", e))?;

        Ok(row.map(|r| AccountId::from_uuid(r.get("id"))))
    }

    #[instrument(skip(self), fields(account_id = %id), err)]
    async fn soft_delete(&self, id: AccountId) -> Result<Option<AccountId>, DirectoryError> {
        let row = sqlx::query(
            r#"
            UPDATE accounts SET active = FALSE, updated_at = $2
            WHERE id = $1 AND active = TRUE
            RETURNING id
            "#,
        )
        .bind(id.as_uuid())
        .bind(Utc::now())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("soft_delete", e))?;

        Ok(row.map(|r| AccountId::from_uuid(r.get("id"))))
    }
}

#[derive(Debug, FromRow)]
struct AccountRow {
    id: Uuid,
    username: Option<String>,
    email: String,
    password_hash: String,
    active: bool,
    roles: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = DirectoryError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let roles = serde_json::from_value(row.roles)
            .map_err(|e| DirectoryError::Store(format!("roles deserialization: {e}")))?;
        Ok(Account {
            id: AccountId::from_uuid(row.id),
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            active: row.active,
            roles,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn row_to_account(
    row: Option<sqlx::postgres::PgRow>,
) -> Result<Option<Account>, DirectoryError> {
    row.map(|r| {
        AccountRow::from_row(&r)
            .map_err(|e| DirectoryError::Store(format!("account row: {e}")))?
            .try_into()
    })
    .transpose()
}

fn map_sqlx_error(operation: &str, e: sqlx::Error) -> DirectoryError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.code().as_deref() == Some("23505") {
            return match db_err.constraint() {
                Some("accounts_username_key") => DirectoryError::DuplicateUsername,
                Some("accounts_email_key") => DirectoryError::DuplicateEmail,
                // schema only carries the two unique indexes above
                _ => DirectoryError::DuplicateEmail,
            };
        }
    }
    tracing::error!(operation, error = %e, "directory query failed");
    DirectoryError::Store(format!("{operation} failed"))
}
