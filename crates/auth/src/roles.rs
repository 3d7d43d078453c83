//! Closed role model and pure role-set transformations.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use portal_core::AuthError;

/// Role tag held by an account.
///
/// The set is closed: unknown tags are rejected at the serde/parse boundary
/// rather than carried around as freeform strings.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Base role every account holds from creation.
    User,
    /// May act on other non-privileged accounts.
    Admin,
    /// Highest privilege; immune to deletion and to peer administration.
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "super_admin" => Ok(Role::SuperAdmin),
            other => Err(AuthError::validation(format!("unknown role tag: {other}"))),
        }
    }
}

/// Ordered small set of role tags.
///
/// All transformations are pure and return a new set; callers persist the
/// result through the directory.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The role set every new account starts with.
    pub fn base() -> Self {
        Self::from_iter([Role::User])
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.contains(Role::Admin)
    }

    pub fn is_super_admin(&self) -> bool {
        self.contains(Role::SuperAdmin)
    }

    /// Grant admin: `Some(self ∪ {admin})`, or `None` when the set already
    /// holds admin. `None` is the "already admin" signal; callers are
    /// expected to pre-check before persisting anything.
    pub fn grant_admin(&self) -> Option<RoleSet> {
        if self.is_admin() {
            return None;
        }
        let mut next = self.0.clone();
        next.insert(Role::Admin);
        Some(RoleSet(next))
    }

    /// Revoke admin: `Some(self − {admin})`, or `None` when the set holds
    /// no admin tag.
    pub fn revoke_admin(&self) -> Option<RoleSet> {
        if !self.is_admin() {
            return None;
        }
        let mut next = self.0.clone();
        next.remove(&Role::Admin);
        Some(RoleSet(next))
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl core::fmt::Display for RoleSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut first = true;
        for role in &self.0 {
            if !first {
                f.write_str(",")?;
            }
            first = false;
            f.write_str(role.as_str())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tag_rejected_at_boundary() {
        assert!("owner".parse::<Role>().is_err());
        assert!(serde_json::from_str::<Role>("\"owner\"").is_err());
        assert_eq!("super_admin".parse::<Role>().unwrap(), Role::SuperAdmin);
    }

    #[test]
    fn grant_admin_is_a_pure_union() {
        let base = RoleSet::base();
        let granted = base.grant_admin().unwrap();

        assert!(granted.is_admin());
        assert!(granted.contains(Role::User));
        // original set untouched
        assert!(!base.is_admin());
    }

    #[test]
    fn grant_admin_signals_already_admin() {
        let admin = RoleSet::from_iter([Role::User, Role::Admin]);
        assert!(admin.grant_admin().is_none());
    }

    #[test]
    fn revoke_admin_signals_missing_privilege() {
        let admin = RoleSet::from_iter([Role::User, Role::Admin]);
        let revoked = admin.revoke_admin().unwrap();
        assert!(!revoked.is_admin());
        assert!(revoked.contains(Role::User));

        assert!(RoleSet::base().revoke_admin().is_none());
    }

    #[test]
    fn role_set_serializes_as_plain_array() {
        let roles = RoleSet::from_iter([Role::SuperAdmin, Role::User]);
        let json = serde_json::to_value(&roles).unwrap();
        // BTreeSet keeps declaration order of the enum
        assert_eq!(json, serde_json::json!(["user", "super_admin"]));
    }
}
