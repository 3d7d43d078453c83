//! One-way password hashing and verification (argon2id).

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use thiserror::Error;

use portal_core::AuthError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HashError {
    #[error("invalid hashing parameters: {0}")]
    InvalidParams(String),

    #[error("hashing failed: {0}")]
    Hash(String),
}

impl From<HashError> for AuthError {
    fn from(err: HashError) -> Self {
        AuthError::store(err.to_string())
    }
}

/// Adaptive password hasher.
///
/// Each `hash` call draws a fresh random salt, so outputs are not
/// byte-reproducible; the contract is only that `verify` succeeds against
/// any hash this produced. Cost factors are tunable at construction so the
/// work factor can be raised over time.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    /// Hasher with the argon2id defaults (OWASP-aligned for 2024).
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Hasher with explicit cost factors (memory KiB, iterations, lanes).
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, HashError> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| HashError::InvalidParams(e.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a plaintext password into a self-describing PHC string.
    pub fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| HashError::Hash(e.to_string()))
    }

    /// Verify a plaintext against a stored hash.
    ///
    /// Never errors: a malformed stored hash, like a wrong password,
    /// verifies false.
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => self
                .argon2
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // params only; never any key material
        f.debug_struct("CredentialHasher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // Test-only low-cost hasher so the suite stays fast.
    fn fast_hasher() -> CredentialHasher {
        CredentialHasher::with_params(8, 1, 1).unwrap()
    }

    #[test]
    fn verify_succeeds_for_same_plaintext() {
        let hasher = fast_hasher();
        let hash = hasher.hash("hunter2").unwrap();
        assert!(hasher.verify("hunter2", &hash));
    }

    #[test]
    fn verify_fails_for_different_plaintext() {
        let hasher = fast_hasher();
        let hash = hasher.hash("hunter2").unwrap();
        assert!(!hasher.verify("hunter3", &hash));
        assert!(!hasher.verify("", &hash));
    }

    #[test]
    fn hash_is_salted_each_call() {
        let hasher = fast_hasher();
        let a = hasher.hash("hunter2").unwrap();
        let b = hasher.hash("hunter2").unwrap();
        assert_ne!(a, b);
        assert!(hasher.verify("hunter2", &a));
        assert!(hasher.verify("hunter2", &b));
    }

    #[test]
    fn malformed_stored_hash_verifies_false() {
        let hasher = fast_hasher();
        assert!(!hasher.verify("hunter2", "not-a-phc-string"));
        assert!(!hasher.verify("hunter2", ""));
    }

    #[test]
    fn plaintext_never_appears_in_hash() {
        let hasher = fast_hasher();
        let hash = hasher.hash("topsecretpassword").unwrap();
        assert!(!hash.contains("topsecretpassword"));
        assert!(hash.starts_with("$argon2id$"));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 16,
            ..ProptestConfig::default()
        })]

        /// Property: round-trip verifies, and a differing plaintext does not.
        #[test]
        fn hash_verify_round_trip(p in "[ -~]{1,32}", q in "[ -~]{1,32}") {
            let hasher = fast_hasher();
            let hash = hasher.hash(&p).unwrap();
            prop_assert!(hasher.verify(&p, &hash));
            if p != q {
                prop_assert!(!hasher.verify(&q, &hash));
            }
        }
    }
}
