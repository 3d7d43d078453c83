//! Account service: the orchestration layer over the auth core and the
//! directory.
//!
//! Every mutating operation runs the same shape: fetch snapshots, ask the
//! permission evaluator, then issue a single active-only mutation. The
//! permission check always precedes the mutating call, so a denied request
//! leaves no partial state; the mutation's own `active` re-check covers
//! the window against a concurrent soft-delete.

use std::collections::BTreeMap;
use std::sync::Arc;

use portal_auth::{
    can_demote, can_modify, can_promote, ensure_can_administer, Account, CredentialHasher,
    ModifyAction, RoleSet, TokenService,
};
use portal_core::validate::{
    normalize_email, validate_email, validate_password, validate_username,
};
use portal_core::{AccountId, AuthError, AuthResult};
use portal_directory::{AccountDirectory, AccountPatch, NewAccount};

pub struct AccountService {
    directory: Arc<dyn AccountDirectory>,
    hasher: CredentialHasher,
    tokens: TokenService,
}

impl AccountService {
    pub fn new(
        directory: Arc<dyn AccountDirectory>,
        hasher: CredentialHasher,
        tokens: TokenService,
    ) -> Self {
        Self {
            directory,
            hasher,
            tokens,
        }
    }

    /// Create a new account with the base role set.
    pub async fn register(
        &self,
        username: Option<String>,
        email: &str,
        password: &str,
    ) -> AuthResult<Account> {
        if let Some(username) = &username {
            validate_username(username)?;
        }
        validate_email(email)?;
        validate_password(password)?;

        let password_hash = self.hash_password(password.to_string()).await?;
        let account = self
            .directory
            .create(NewAccount {
                username,
                email: normalize_email(email),
                password_hash,
                roles: RoleSet::base(),
            })
            .await?;

        tracing::info!(account_id = %account.id, "account registered");
        Ok(account)
    }

    /// Verify credentials and issue a bearer token for the account's email.
    ///
    /// All failure modes collapse to `InvalidCredentials` so a caller
    /// cannot probe which emails are registered.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<String> {
        let email = normalize_email(email);
        let Some(account) = self.directory.find_by_email(&email).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        let verified = self
            .verify_password(password.to_string(), account.password_hash.clone())
            .await?;
        if !verified {
            return Err(AuthError::InvalidCredentials);
        }

        self.tokens
            .issue(&account.email, BTreeMap::new())
            .map_err(|e| AuthError::store(format!("token issuance: {e}")))
    }

    /// Verify a bearer token and resolve its subject to an account.
    ///
    /// The token stays valid for its whole ttl regardless of account state
    /// changes; only a subject that no longer resolves at all is rejected.
    pub async fn resolve_bearer(&self, token: &str) -> AuthResult<Account> {
        let subject = self.tokens.verify(token)?;
        self.directory
            .find_by_email(&subject)
            .await?
            .ok_or_else(|| AuthError::token_invalid("could not validate credentials"))
    }

    pub async fn get_account(&self, id: AccountId) -> AuthResult<Account> {
        self.directory
            .find_by_id(id)
            .await?
            .ok_or(AuthError::NotFound)
    }

    /// Update username/email of an account the actor may modify.
    pub async fn update_account(
        &self,
        actor: &Account,
        id: AccountId,
        username: Option<String>,
        email: Option<String>,
    ) -> AuthResult<AccountId> {
        if username.is_none() && email.is_none() {
            return Err(AuthError::validation(
                "at least one field must be provided for update",
            ));
        }
        if let Some(username) = &username {
            validate_username(username)?;
        }
        let email = match email {
            Some(email) => {
                validate_email(&email)?;
                Some(normalize_email(&email))
            }
            None => None,
        };

        let target = self.get_account(id).await?;
        can_modify(actor, &target, ModifyAction::Update)?;

        let patch = AccountPatch {
            username,
            email,
            roles: None,
        };
        self.directory
            .update(id, patch)
            .await?
            .ok_or(AuthError::NotFound)
    }

    /// Soft-delete an account the actor may delete.
    pub async fn delete_account(&self, actor: &Account, id: AccountId) -> AuthResult<AccountId> {
        let target = self.get_account(id).await?;
        can_modify(actor, &target, ModifyAction::Delete)?;

        let deleted = self
            .directory
            .soft_delete(id)
            .await?
            .ok_or(AuthError::NotFound)?;
        tracing::info!(account_id = %deleted, "account soft-deleted");
        Ok(deleted)
    }

    /// Grant the admin role to another account (super-admin only).
    ///
    /// The actor/self checks run before the target is even fetched, so a
    /// forbidden caller cannot probe for account existence. The privilege
    /// check then runs on the fetched record before the active-only
    /// update, which keeps the original behavior of reporting
    /// `AlreadyPrivileged` for a soft-deleted admin.
    pub async fn promote(&self, actor: &Account, id: AccountId) -> AuthResult<AccountId> {
        ensure_can_administer(actor, id)?;

        let target = self.get_account(id).await?;
        let roles = can_promote(actor, &target)?;

        self.persist_roles(id, roles).await
    }

    /// Revoke the admin role from another account (super-admin only).
    pub async fn demote(&self, actor: &Account, id: AccountId) -> AuthResult<AccountId> {
        ensure_can_administer(actor, id)?;

        let target = self.get_account(id).await?;
        let roles = can_demote(actor, &target)?;

        self.persist_roles(id, roles).await
    }

    async fn persist_roles(&self, id: AccountId, roles: RoleSet) -> AuthResult<AccountId> {
        let patch = AccountPatch {
            roles: Some(roles),
            ..Default::default()
        };
        self.directory
            .update(id, patch)
            .await?
            .ok_or(AuthError::NotFound)
    }

    // Hashing is CPU-bound and deliberately slow; keep it off the
    // cooperative runtime threads.

    async fn hash_password(&self, password: String) -> AuthResult<String> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::store(format!("hash task: {e}")))?
            .map_err(AuthError::from)
    }

    async fn verify_password(&self, password: String, hash: String) -> AuthResult<bool> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AuthError::store(format!("verify task: {e}")))
    }
}
