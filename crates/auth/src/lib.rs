//! `portal-auth`: pure authentication/authorization core.
//!
//! This crate is intentionally decoupled from HTTP and storage. It covers
//! password credentials, signed bearer tokens, the closed role model, and
//! the permission-decision functions over account snapshots. Persistence
//! of any outcome is the account directory's job.

pub mod account;
pub mod password;
pub mod permission;
pub mod roles;
pub mod token;

pub use account::Account;
pub use password::{CredentialHasher, HashError};
pub use permission::{
    can_demote, can_modify, can_promote, ensure_can_administer, ModifyAction, PermissionError,
};
pub use roles::{Role, RoleSet};
pub use token::{Claims, TokenConfig, TokenError, TokenService};
