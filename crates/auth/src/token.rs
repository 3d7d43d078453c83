//! Signed bearer token issuance and verification.
//!
//! Tokens are compact JWS strings (three base64url segments) signed with a
//! server-held symmetric secret. They are stateless and never persisted:
//! expiry is the only invalidation, so a token stays valid for its whole
//! ttl even if the account is mutated or soft-deleted afterwards. That
//! staleness window is a documented limitation, not a bug to patch here.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use portal_core::AuthError;

/// Token service configuration, injected explicitly at construction.
///
/// Business logic never reads ambient process state; the boundary layer
/// resolves these values (environment, file, ...) and passes them down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenConfig {
    /// Server-held signing secret.
    pub secret: String,
    /// Symmetric signing algorithm name ("HS256", "HS384" or "HS512").
    pub algorithm: String,
    /// Default validity window for issued tokens.
    pub ttl_minutes: i64,
}

/// Claim set carried by a token.
///
/// `sub`, `iat` and `exp` are the registered claims; everything else lands
/// in `custom` and round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default)]
    pub iat: i64,
    pub exp: i64,
    #[serde(flatten)]
    pub custom: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("malformed token")]
    MalformedToken,

    #[error("token is missing the subject claim")]
    MissingSubject,

    /// Construction-time failure: the configured algorithm is unknown or
    /// not a symmetric HMAC variant.
    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("token encoding failed: {0}")]
    Encode(String),
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        AuthError::token_invalid(err.to_string())
    }
}

/// Issues and verifies signed, time-limited bearer tokens.
///
/// No revocation mechanism exists by design (see module docs).
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(config: &TokenConfig) -> Result<Self, TokenError> {
        let algorithm = Algorithm::from_str(&config.algorithm)
            .map_err(|_| TokenError::UnsupportedAlgorithm(config.algorithm.clone()))?;
        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(TokenError::UnsupportedAlgorithm(config.algorithm.clone()));
        }

        let mut validation = Validation::new(algorithm);
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            algorithm,
            validation,
            ttl: Duration::minutes(config.ttl_minutes),
        })
    }

    /// Issue a token for `subject` with the configured ttl.
    pub fn issue(
        &self,
        subject: &str,
        custom: BTreeMap<String, serde_json::Value>,
    ) -> Result<String, TokenError> {
        self.issue_with_ttl(subject, custom, self.ttl)
    }

    /// Issue a token with an explicit validity window.
    ///
    /// The expiry is absolute: issuance time plus `ttl`, embedded in the
    /// `exp` claim as a Unix timestamp.
    pub fn issue_with_ttl(
        &self,
        subject: &str,
        custom: BTreeMap<String, serde_json::Value>,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: Some(subject.to_string()),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            custom,
        };
        jsonwebtoken::encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }

    /// Verify a token and return its subject unchanged.
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        self.decode_claims(token)?
            .sub
            .ok_or(TokenError::MissingSubject)
    }

    /// Verify a token and return the full claim set.
    pub fn decode_claims(&self, token: &str) -> Result<Claims, TokenError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::InvalidAlgorithmName => TokenError::InvalidSignature,
                _ => TokenError::MalformedToken,
            })
    }
}

impl core::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // never the key material
        f.debug_struct("TokenService")
            .field("algorithm", &self.algorithm)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> TokenService {
        TokenService::new(&TokenConfig {
            secret: secret.to_string(),
            algorithm: "HS256".to_string(),
            ttl_minutes: 30,
        })
        .unwrap()
    }

    #[test]
    fn issue_then_verify_returns_subject_unchanged() {
        let svc = service("test-secret");
        let token = svc.issue("alice@example.com", BTreeMap::new()).unwrap();
        assert_eq!(svc.verify(&token).unwrap(), "alice@example.com");
    }

    #[test]
    fn token_has_three_base64url_segments() {
        let svc = service("test-secret");
        let token = svc.issue("alice@example.com", BTreeMap::new()).unwrap();
        assert_eq!(token.split('.').count(), 3);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')));
    }

    #[test]
    fn custom_claims_round_trip() {
        let svc = service("test-secret");
        let mut custom = BTreeMap::new();
        custom.insert("custom".to_string(), serde_json::json!([1, 2, 3, 4]));
        custom.insert("scope".to_string(), serde_json::json!("portal"));

        let token = svc.issue("alice@example.com", custom.clone()).unwrap();
        let claims = svc.decode_claims(&token).unwrap();

        assert_eq!(claims.sub.as_deref(), Some("alice@example.com"));
        assert_eq!(claims.custom, custom);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_token_rejected_even_with_valid_signature() {
        let svc = service("test-secret");
        let token = svc
            .issue_with_ttl("alice@example.com", BTreeMap::new(), Duration::minutes(-10))
            .unwrap();
        assert_eq!(svc.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn wrong_secret_rejected_as_invalid_signature() {
        let issuer = service("secret-a");
        let verifier = service("secret-b");
        let token = issuer.issue("alice@example.com", BTreeMap::new()).unwrap();
        assert_eq!(verifier.verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn structurally_invalid_token_rejected() {
        let svc = service("test-secret");
        assert_eq!(svc.verify("garbage"), Err(TokenError::MalformedToken));
        assert_eq!(svc.verify("a.b.c"), Err(TokenError::MalformedToken));
        assert_eq!(svc.verify(""), Err(TokenError::MalformedToken));
    }

    #[test]
    fn token_without_subject_rejected() {
        let svc = service("test-secret");
        // hand-rolled claim set with exp but no sub
        let exp = Utc::now().timestamp() + 600;
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &serde_json::json!({ "exp": exp }),
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert_eq!(svc.verify(&token), Err(TokenError::MissingSubject));
    }

    #[test]
    fn unknown_algorithm_rejected_at_construction() {
        let err = TokenService::new(&TokenConfig {
            secret: "s".to_string(),
            algorithm: "HS123".to_string(),
            ttl_minutes: 30,
        })
        .unwrap_err();
        assert!(matches!(err, TokenError::UnsupportedAlgorithm(_)));

        // asymmetric algorithms are parseable but not usable with a shared secret
        let err = TokenService::new(&TokenConfig {
            secret: "s".to_string(),
            algorithm: "RS256".to_string(),
            ttl_minutes: 30,
        })
        .unwrap_err();
        assert!(matches!(err, TokenError::UnsupportedAlgorithm(_)));
    }
}
