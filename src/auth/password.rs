use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use thiserror::Error;
use tracing::{error, warn};

use crate::config::HashConfig;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("invalid argon2 parameters: {0}")]
    Params(String),

    #[error("argon2 hash_password error: {0}")]
    Hash(String),

    #[error("hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Salted Argon2id hashing with a fixed, configurable cost.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    // Verified against when a login names an unknown email.
    dummy_hash: String,
}

impl CredentialHasher {
    pub fn new(cfg: &HashConfig) -> Result<Self, PasswordError> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| PasswordError::Params(e.to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let filler: String = OsRng
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        let dummy_hash = hash_with(&argon2, &filler)?;

        Ok(Self { argon2, dummy_hash })
    }

    pub fn hash(&self, plain: &str) -> Result<String, PasswordError> {
        hash_with(&self.argon2, plain)
    }

    /// Returns false on mismatch and on a malformed stored hash alike.
    pub fn verify(&self, plain: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "stored password hash is malformed");
                return false;
            }
        };
        self.argon2
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }

    pub fn dummy_hash(&self) -> &str {
        &self.dummy_hash
    }

    /// Hashes on the blocking pool.
    pub async fn hash_blocking(&self, plain: String) -> Result<String, PasswordError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plain)).await?
    }

    pub async fn verify_blocking(&self, plain: String, hash: String) -> Result<bool, PasswordError> {
        let hasher = self.clone();
        Ok(tokio::task::spawn_blocking(move || hasher.verify(&plain, &hash)).await?)
    }
}

fn hash_with(argon2: &Argon2<'_>, plain: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            PasswordError::Hash(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> CredentialHasher {
        CredentialHasher::new(&HashConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .expect("cheap params are valid")
    }

    #[test]
    fn hash_and_verify_roundtrip() {
        let hasher = cheap();
        let password = "Secur3P@ssw0rd!";
        let hash = hasher.hash(password).expect("hashing should succeed");
        assert!(hasher.verify(password, &hash));
        assert_ne!(hash, password);
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn hashing_is_salted() {
        let hasher = cheap();
        let a = hasher.hash("same-password").unwrap();
        let b = hasher.hash("same-password").unwrap();
        assert_ne!(a, b);
        assert!(hasher.verify("same-password", &a));
        assert!(hasher.verify("same-password", &b));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hasher = cheap();
        let hash = hasher.hash("correct-horse-battery-staple").unwrap();
        assert!(!hasher.verify("wrong-password", &hash));
    }

    #[test]
    fn verify_returns_false_on_malformed_hash() {
        let hasher = cheap();
        assert!(!hasher.verify("anything", "not-a-valid-hash"));
        assert!(!hasher.verify("anything", ""));
    }

    #[test]
    fn cost_parameters_are_embedded_in_hash() {
        let hasher = cheap();
        let hash = hasher.hash("pw").unwrap();
        assert!(hash.contains("m=1024,t=1,p=1"));

        // a hasher with different cost still verifies, since cost travels with the hash
        let other = CredentialHasher::new(&HashConfig {
            memory_kib: 2048,
            iterations: 2,
            parallelism: 1,
        })
        .unwrap();
        assert!(other.verify("pw", &hash));
    }

    #[test]
    fn default_cost_is_moderate() {
        let cfg = HashConfig::default();
        assert!(cfg.memory_kib >= 19_456);
        assert!(cfg.iterations >= 2);
    }

    #[test]
    fn invalid_params_are_rejected() {
        let err = CredentialHasher::new(&HashConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        })
        .err()
        .expect("params must be rejected");
        assert!(matches!(err, PasswordError::Params(_)));
    }

    #[test]
    fn dummy_hash_rejects_arbitrary_input() {
        let hasher = cheap();
        assert!(!hasher.verify("", hasher.dummy_hash()));
        assert!(!hasher.verify("password", hasher.dummy_hash()));
    }

    #[tokio::test]
    async fn blocking_variants_match_sync_behavior() {
        let hasher = cheap();
        let hash = hasher.hash_blocking("pw".into()).await.unwrap();
        assert!(hasher.verify_blocking("pw".into(), hash.clone()).await.unwrap());
        assert!(!hasher.verify_blocking("nope".into(), hash).await.unwrap());
    }
}
