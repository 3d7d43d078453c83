//! Account snapshot as seen by the authorization core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use portal_core::AccountId;

use crate::roles::{Role, RoleSet};

/// A point-in-time view of an account record.
///
/// The directory owns the record; everything in this crate only reads
/// snapshots. `active = false` means soft-deleted: the record is still
/// returned by lookups but is excluded as a target of any mutation, and it
/// can never be re-activated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// Optional, unique, alphanumeric-only when present.
    pub username: Option<String>,
    /// Unique, required; the sole token subject identifier.
    pub email: String,
    /// PHC-format hash string. Never the plaintext.
    pub password_hash: String,
    pub active: bool,
    pub roles: RoleSet,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn is_admin(&self) -> bool {
        self.roles.is_admin()
    }

    pub fn is_super_admin(&self) -> bool {
        self.roles.is_super_admin()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(role)
    }
}
