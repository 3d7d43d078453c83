//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type AuthResult<T> = Result<T, AuthError>;

/// Domain-level error.
///
/// Every failure a caller can observe maps to exactly one variant here, so
/// the boundary layer can translate each case to a stable response without
/// string matching. Raw store detail belongs in logs, not in `Store`
/// messages surfaced to untrusted callers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The requested account does not exist, or is soft-deleted and the
    /// operation only targets active accounts.
    #[error("not found")]
    NotFound,

    /// The acting account lacks the role required for the operation.
    #[error("forbidden")]
    Forbidden,

    /// Promote/demote cannot target the acting account itself.
    #[error("cannot manage own account")]
    SelfTargetNotAllowed,

    /// Promotion target already holds admin or super-admin.
    #[error("account already holds admin privilege")]
    AlreadyPrivileged,

    /// Demotion target holds no admin privilege.
    #[error("account holds no admin privilege")]
    NotPrivileged,

    /// Super-admin accounts can never be deleted through the service.
    #[error("super-admin accounts cannot be deleted")]
    SuperAdminImmutable,

    /// Username uniqueness violation.
    #[error("username already taken")]
    DuplicateUsername,

    /// Email uniqueness violation.
    #[error("email already registered")]
    DuplicateEmail,

    /// Login failed. Deliberately carries no detail about which part failed.
    #[error("incorrect email or password")]
    InvalidCredentials,

    /// Bearer token failed verification (signature, structure, expiry,
    /// or an unresolvable subject).
    #[error("invalid token: {0}")]
    TokenInvalid(String),

    /// A value failed validation (malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Underlying store failure. The message is safe for logs; callers get
    /// a generic description.
    #[error("store error: {0}")]
    Store(String),
}

impl AuthError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn token_invalid(msg: impl Into<String>) -> Self {
        Self::TokenInvalid(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }
}
