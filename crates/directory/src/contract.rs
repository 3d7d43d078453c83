//! The directory contract consumed by the service layer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use portal_auth::{Account, RoleSet};
use portal_core::{AccountId, AuthError};

/// Fields for a new account record. The directory assigns the id and
/// timestamps and sets `active = true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    pub username: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub roles: RoleSet,
}

/// Partial update applied to an active account record. `None` fields are
/// left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub roles: Option<RoleSet>,
}

impl AccountPatch {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.roles.is_none()
    }
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("username already taken")]
    DuplicateUsername,

    #[error("email already registered")]
    DuplicateEmail,

    /// Underlying store failure. Detail is logged where it occurs; the
    /// message here is safe to surface.
    #[error("store error: {0}")]
    Store(String),
}

impl From<DirectoryError> for AuthError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::DuplicateUsername => AuthError::DuplicateUsername,
            DirectoryError::DuplicateEmail => AuthError::DuplicateEmail,
            DirectoryError::Store(msg) => AuthError::Store(msg),
        }
    }
}

/// Lookup and mutation of account records.
///
/// Semantics shared by all implementations:
/// - `find_by_id` / `find_by_email` return soft-deleted records too.
/// - `update` and `soft_delete` only touch rows where `active = true` and
///   return `None` when the id is missing **or** inactive. Re-checking
///   `active` inside the mutating statement is what makes the lookup →
///   permission check → mutate sequence safe against a concurrent delete:
///   the mutation simply reports not-found instead of resurrecting the row.
/// - A soft-deleted account can never be re-activated through this trait.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn create(&self, account: NewAccount) -> Result<Account, DirectoryError>;

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, DirectoryError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DirectoryError>;

    /// Apply `patch` to an active record; `Some(id)` on success.
    async fn update(
        &self,
        id: AccountId,
        patch: AccountPatch,
    ) -> Result<Option<AccountId>, DirectoryError>;

    /// Set `active = false` on an active record; `Some(id)` on success.
    async fn soft_delete(&self, id: AccountId) -> Result<Option<AccountId>, DirectoryError>;
}
