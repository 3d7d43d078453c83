//! Per-request context inserted by the auth middleware.

use portal_auth::Account;

/// The authenticated account for the current request, resolved from the
/// bearer token's subject.
#[derive(Debug, Clone)]
pub struct CurrentAccount(pub Account);

impl CurrentAccount {
    pub fn account(&self) -> &Account {
        &self.0
    }
}
