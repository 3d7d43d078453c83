//! Permission decisions over account snapshots.
//!
//! Pure functions: no IO, no panics, no mutation. The caller fetches both
//! snapshots from the directory, asks here, and only then mutates.

use thiserror::Error;

use portal_core::{AccountId, AuthError};

use crate::account::Account;
use crate::roles::RoleSet;

/// What the actor is about to do to the target record.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ModifyAction {
    Update,
    Delete,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PermissionError {
    #[error("forbidden")]
    Forbidden,

    #[error("cannot manage own account")]
    SelfTargetNotAllowed,

    #[error("account already holds admin privilege")]
    AlreadyPrivileged,

    #[error("account holds no admin privilege")]
    NotPrivileged,

    #[error("super-admin accounts cannot be deleted")]
    SuperAdminImmutable,
}

impl From<PermissionError> for AuthError {
    fn from(err: PermissionError) -> Self {
        match err {
            PermissionError::Forbidden => AuthError::Forbidden,
            PermissionError::SelfTargetNotAllowed => AuthError::SelfTargetNotAllowed,
            PermissionError::AlreadyPrivileged => AuthError::AlreadyPrivileged,
            PermissionError::NotPrivileged => AuthError::NotPrivileged,
            PermissionError::SuperAdminImmutable => AuthError::SuperAdminImmutable,
        }
    }
}

/// Decide whether `actor` may update or delete `target`.
///
/// Rule order matters:
/// 1. Deleting a super-admin is vetoed outright for every actor. A
///    super-admin actor (including self-deletion) gets the explicit
///    `SuperAdminImmutable`; anyone else gets plain `Forbidden`.
/// 2. Self-service: acting on your own record bypasses role checks.
/// 3. Acting on someone else requires admin or super-admin.
/// 4. Super-admins cannot act on other super-admins. An admin updating a
///    super-admin passes; only deletion is vetoed above.
pub fn can_modify(
    actor: &Account,
    target: &Account,
    action: ModifyAction,
) -> Result<(), PermissionError> {
    if action == ModifyAction::Delete && target.is_super_admin() {
        return Err(if actor.is_super_admin() {
            PermissionError::SuperAdminImmutable
        } else {
            PermissionError::Forbidden
        });
    }

    if target.id == actor.id {
        return Ok(());
    }

    if !actor.is_admin() && !actor.is_super_admin() {
        return Err(PermissionError::Forbidden);
    }

    if target.is_super_admin() && actor.is_super_admin() {
        return Err(PermissionError::Forbidden);
    }

    Ok(())
}

/// Gate common to promote and demote: only a super-admin may administer
/// privileges, and never its own.
///
/// Takes only the target id so callers can run it before fetching the
/// target record (a forbidden actor learns nothing about whether the
/// target exists).
pub fn ensure_can_administer(
    actor: &Account,
    target_id: AccountId,
) -> Result<(), PermissionError> {
    if !actor.is_super_admin() {
        return Err(PermissionError::Forbidden);
    }
    if actor.id == target_id {
        return Err(PermissionError::SelfTargetNotAllowed);
    }
    Ok(())
}

/// Decide whether `actor` may grant admin to `target`; on success, returns
/// the role set to persist.
///
/// The privilege check runs against the fetched record regardless of its
/// `active` flag; the directory's active-only update performs the
/// existence check afterwards. A soft-deleted admin therefore surfaces as
/// `AlreadyPrivileged`, not as not-found.
pub fn can_promote(actor: &Account, target: &Account) -> Result<RoleSet, PermissionError> {
    ensure_can_administer(actor, target.id)?;
    if target.is_super_admin() {
        return Err(PermissionError::AlreadyPrivileged);
    }
    target
        .roles
        .grant_admin()
        .ok_or(PermissionError::AlreadyPrivileged)
}

/// Decide whether `actor` may revoke admin from `target`; on success,
/// returns the role set to persist.
pub fn can_demote(actor: &Account, target: &Account) -> Result<RoleSet, PermissionError> {
    ensure_can_administer(actor, target.id)?;
    target
        .roles
        .revoke_admin()
        .ok_or(PermissionError::NotPrivileged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::Role;
    use chrono::Utc;

    fn account(roles: &[Role]) -> Account {
        let now = Utc::now();
        Account {
            id: AccountId::new(),
            username: None,
            email: format!("{}@example.com", AccountId::new()),
            password_hash: "$argon2id$stub".to_string(),
            active: true,
            roles: roles.iter().copied().collect(),
            created_at: now,
            updated_at: now,
        }
    }

    fn user() -> Account {
        account(&[Role::User])
    }

    fn admin() -> Account {
        account(&[Role::User, Role::Admin])
    }

    fn super_admin() -> Account {
        account(&[Role::User, Role::SuperAdmin])
    }

    #[test]
    fn self_service_always_permitted_for_update() {
        for actor in [user(), admin(), super_admin()] {
            assert_eq!(can_modify(&actor, &actor, ModifyAction::Update), Ok(()));
        }
    }

    #[test]
    fn self_delete_permitted_unless_super_admin() {
        let u = user();
        assert_eq!(can_modify(&u, &u, ModifyAction::Delete), Ok(()));

        let s = super_admin();
        assert_eq!(
            can_modify(&s, &s, ModifyAction::Delete),
            Err(PermissionError::SuperAdminImmutable)
        );
    }

    #[test]
    fn plain_user_denied_on_other_accounts() {
        let actor = user();
        let target = user();
        assert_eq!(
            can_modify(&actor, &target, ModifyAction::Update),
            Err(PermissionError::Forbidden)
        );
        assert_eq!(
            can_modify(&actor, &target, ModifyAction::Delete),
            Err(PermissionError::Forbidden)
        );
    }

    #[test]
    fn admin_may_act_on_plain_users() {
        let actor = admin();
        let target = user();
        assert_eq!(can_modify(&actor, &target, ModifyAction::Update), Ok(()));
        assert_eq!(can_modify(&actor, &target, ModifyAction::Delete), Ok(()));
    }

    #[test]
    fn super_admin_peers_cannot_administer_each_other() {
        let a = super_admin();
        let b = super_admin();
        assert_eq!(
            can_modify(&a, &b, ModifyAction::Update),
            Err(PermissionError::Forbidden)
        );
        // deletion hits the absolute veto instead
        assert_eq!(
            can_modify(&a, &b, ModifyAction::Delete),
            Err(PermissionError::SuperAdminImmutable)
        );
    }

    #[test]
    fn super_admin_may_act_on_admins() {
        let actor = super_admin();
        let target = admin();
        assert_eq!(can_modify(&actor, &target, ModifyAction::Update), Ok(()));
        assert_eq!(can_modify(&actor, &target, ModifyAction::Delete), Ok(()));
    }

    #[test]
    fn admin_deleting_super_admin_is_forbidden() {
        let actor = admin();
        let target = super_admin();
        assert_eq!(
            can_modify(&actor, &target, ModifyAction::Delete),
            Err(PermissionError::Forbidden)
        );
    }

    #[test]
    fn promote_requires_super_admin_actor() {
        let actor = admin();
        let target = user();
        assert_eq!(
            can_promote(&actor, &target),
            Err(PermissionError::Forbidden)
        );
    }

    #[test]
    fn promote_rejects_self_target() {
        let actor = super_admin();
        assert_eq!(
            can_promote(&actor, &actor),
            Err(PermissionError::SelfTargetNotAllowed)
        );
    }

    #[test]
    fn promote_grants_admin_to_plain_user() {
        let actor = super_admin();
        let target = user();
        let roles = can_promote(&actor, &target).unwrap();
        assert!(roles.is_admin());
        assert!(roles.contains(Role::User));
    }

    #[test]
    fn promote_already_privileged_target_rejected() {
        let actor = super_admin();
        assert_eq!(
            can_promote(&actor, &admin()),
            Err(PermissionError::AlreadyPrivileged)
        );
        assert_eq!(
            can_promote(&actor, &super_admin()),
            Err(PermissionError::AlreadyPrivileged)
        );
    }

    #[test]
    fn promote_checks_privilege_before_active_state() {
        // the evaluator never looks at `active`; a soft-deleted admin is
        // still "already privileged" rather than not-found
        let actor = super_admin();
        let mut target = admin();
        target.active = false;
        assert_eq!(
            can_promote(&actor, &target),
            Err(PermissionError::AlreadyPrivileged)
        );
    }

    #[test]
    fn demote_strips_admin_only() {
        let actor = super_admin();
        let target = admin();
        let roles = can_demote(&actor, &target).unwrap();
        assert!(!roles.is_admin());
        assert!(roles.contains(Role::User));
    }

    #[test]
    fn demote_unprivileged_target_rejected() {
        let actor = super_admin();
        assert_eq!(
            can_demote(&actor, &user()),
            Err(PermissionError::NotPrivileged)
        );
    }
}
