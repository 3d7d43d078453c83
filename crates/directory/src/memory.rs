//! In-memory directory for tests and local development.
//!
//! Mirrors the Postgres implementation's semantics exactly, including
//! active-only mutation and uniqueness across soft-deleted records.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use portal_auth::Account;
use portal_core::AccountId;

use crate::contract::{AccountDirectory, AccountPatch, DirectoryError, NewAccount};

#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    // lock is held only for the duration of a single call
    inner: Mutex<HashMap<AccountId, Account>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<AccountId, Account>>, DirectoryError> {
        self.inner
            .lock()
            .map_err(|_| DirectoryError::Store("directory lock poisoned".to_string()))
    }
}

fn check_unique(
    accounts: &HashMap<AccountId, Account>,
    exclude: Option<AccountId>,
    username: Option<&str>,
    email: Option<&str>,
) -> Result<(), DirectoryError> {
    for account in accounts.values() {
        if Some(account.id) == exclude {
            continue;
        }
        if let Some(email) = email {
            if account.email == email {
                return Err(DirectoryError::DuplicateEmail);
            }
        }
        if let (Some(username), Some(existing)) = (username, account.username.as_deref()) {
            if existing == username {
                return Err(DirectoryError::DuplicateUsername);
            }
        }
    }
    Ok(())
}

#[async_trait]
impl AccountDirectory for InMemoryDirectory {
    async fn create(&self, account: NewAccount) -> Result<Account, DirectoryError> {
        let mut accounts = self.lock()?;
        check_unique(
            &accounts,
            None,
            account.username.as_deref(),
            Some(&account.email),
        )?;

        let now = Utc::now();
        let record = Account {
            id: AccountId::new(),
            username: account.username,
            email: account.email,
            password_hash: account.password_hash,
            active: true,
            roles: account.roles,
            created_at: now,
            updated_at: now,
        };
        accounts.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, DirectoryError> {
        Ok(self.lock()?.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DirectoryError> {
        Ok(self
            .lock()?
            .values()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn update(
        &self,
        id: AccountId,
        patch: AccountPatch,
    ) -> Result<Option<AccountId>, DirectoryError> {
        let mut accounts = self.lock()?;

        let Some(existing) = accounts.get(&id) else {
            return Ok(None);
        };
        if !existing.active {
            return Ok(None);
        }

        check_unique(
            &accounts,
            Some(id),
            patch.username.as_deref(),
            patch.email.as_deref(),
        )?;

        let Some(record) = accounts.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(username) = patch.username {
            record.username = Some(username);
        }
        if let Some(email) = patch.email {
            record.email = email;
        }
        if let Some(roles) = patch.roles {
            record.roles = roles;
        }
        record.updated_at = Utc::now();
        Ok(Some(id))
    }

    async fn soft_delete(&self, id: AccountId) -> Result<Option<AccountId>, DirectoryError> {
        let mut accounts = self.lock()?;
        match accounts.get_mut(&id) {
            Some(record) if record.active => {
                record.active = false;
                record.updated_at = Utc::now();
                Ok(Some(id))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_auth::RoleSet;

    fn new_account(email: &str, username: Option<&str>) -> NewAccount {
        NewAccount {
            username: username.map(str::to_string),
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            roles: RoleSet::base(),
        }
    }

    #[tokio::test]
    async fn create_assigns_fresh_id_and_active_flag() {
        let dir = InMemoryDirectory::new();
        let a = dir
            .create(new_account("alice@example.com", Some("alice")))
            .await
            .unwrap();
        let b = dir
            .create(new_account("bob@example.com", Some("bob")))
            .await
            .unwrap();

        assert_ne!(a.id, b.id);
        assert!(a.active);
        assert_eq!(dir.find_by_id(a.id).await.unwrap().unwrap().email, "alice@example.com");
        assert_eq!(
            dir.find_by_email("bob@example.com").await.unwrap().unwrap().id,
            b.id
        );
    }

    #[tokio::test]
    async fn duplicate_email_and_username_rejected() {
        let dir = InMemoryDirectory::new();
        dir.create(new_account("alice@example.com", Some("alice")))
            .await
            .unwrap();

        let err = dir
            .create(new_account("alice@example.com", Some("other")))
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::DuplicateEmail));

        let err = dir
            .create(new_account("other@example.com", Some("alice")))
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::DuplicateUsername));
    }

    #[tokio::test]
    async fn update_patches_only_provided_fields() {
        let dir = InMemoryDirectory::new();
        let a = dir
            .create(new_account("alice@example.com", Some("alice")))
            .await
            .unwrap();

        let patch = AccountPatch {
            username: Some("alice2".to_string()),
            ..Default::default()
        };
        assert_eq!(dir.update(a.id, patch).await.unwrap(), Some(a.id));

        let stored = dir.find_by_id(a.id).await.unwrap().unwrap();
        assert_eq!(stored.username.as_deref(), Some("alice2"));
        assert_eq!(stored.email, "alice@example.com");
    }

    #[tokio::test]
    async fn update_to_taken_email_conflicts() {
        let dir = InMemoryDirectory::new();
        let a = dir.create(new_account("alice@example.com", None)).await.unwrap();
        dir.create(new_account("bob@example.com", None)).await.unwrap();

        let patch = AccountPatch {
            email: Some("bob@example.com".to_string()),
            ..Default::default()
        };
        let err = dir.update(a.id, patch).await.unwrap_err();
        assert!(matches!(err, DirectoryError::DuplicateEmail));
    }

    #[tokio::test]
    async fn soft_deleted_record_is_found_but_not_mutable() {
        let dir = InMemoryDirectory::new();
        let a = dir.create(new_account("alice@example.com", None)).await.unwrap();

        assert_eq!(dir.soft_delete(a.id).await.unwrap(), Some(a.id));

        // lookups still see the record, flagged inactive
        let stored = dir.find_by_id(a.id).await.unwrap().unwrap();
        assert!(!stored.active);
        assert!(dir.find_by_email("alice@example.com").await.unwrap().is_some());

        // all mutations now report not-found
        let patch = AccountPatch {
            username: Some("ghost".to_string()),
            ..Default::default()
        };
        assert_eq!(dir.update(a.id, patch).await.unwrap(), None);
        assert_eq!(dir.soft_delete(a.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn unknown_id_reports_not_found() {
        let dir = InMemoryDirectory::new();
        let id = AccountId::new();
        assert!(dir.find_by_id(id).await.unwrap().is_none());
        assert_eq!(dir.update(id, AccountPatch::default()).await.unwrap(), None);
        assert_eq!(dir.soft_delete(id).await.unwrap(), None);
    }
}
