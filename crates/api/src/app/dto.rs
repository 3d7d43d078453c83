//! Request/response DTOs and JSON mapping.

use serde::{Deserialize, Serialize};

use portal_auth::Account;
use portal_core::AccountId;

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    #[serde(default)]
    pub username: Option<String>,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateAccountRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ShowAccount {
    pub account_id: AccountId,
    pub username: Option<String>,
    pub email: String,
    pub active: bool,
    pub roles: Vec<String>,
}

impl From<Account> for ShowAccount {
    fn from(account: Account) -> Self {
        Self {
            account_id: account.id,
            username: account.username,
            email: account.email,
            active: account.active,
            roles: account.roles.iter().map(|r| r.as_str().to_string()).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UpdatedAccountResponse {
    pub updated_account_id: AccountId,
}

#[derive(Debug, Serialize)]
pub struct DeletedAccountResponse {
    pub deleted_account_id: AccountId,
}
