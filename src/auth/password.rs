use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("bcrypt failure: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Salted bcrypt hashing. Work runs on the blocking pool so a slow cost
/// factor never stalls the request executor.
#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,
    /// Verified against when the username is unknown, so that path costs the
    /// same as a wrong password.
    dummy_hash: Arc<str>,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self, PasswordError> {
        let dummy_hash = bcrypt::hash("forum-api:no-such-user", cost)?;
        Ok(Self {
            cost,
            dummy_hash: dummy_hash.into(),
        })
    }

    pub async fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let password = password.to_string();
        let cost = self.cost;
        let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
        Ok(hash)
    }

    /// `Ok(false)` for a mismatch; `Err` only when the stored hash is unreadable.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let password = password.to_string();
        let hash = hash.to_string();
        let ok = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
        Ok(ok)
    }

    /// Burn one verification against the dummy hash. Always reports a mismatch.
    pub async fn verify_dummy(&self, password: &str) -> bool {
        let dummy = self.dummy_hash.clone();
        let _ = self.verify(password, &dummy).await;
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hashes_are_salted_and_verifiable() {
        let hasher = PasswordHasher::new(4 /* bcrypt minimum cost */).unwrap();
        let a = hasher.hash("correct horse").await.unwrap();
        let b = hasher.hash("correct horse").await.unwrap();

        assert_ne!(a, b);
        assert_ne!(a, "correct horse");
        assert!(hasher.verify("correct horse", &a).await.unwrap());
        assert!(!hasher.verify("battery staple", &a).await.unwrap());
    }

    #[tokio::test]
    async fn dummy_verification_never_matches() {
        let hasher = PasswordHasher::new(4 /* bcrypt minimum cost */).unwrap();
        assert!(!hasher.verify_dummy("forum-api:no-such-user").await);
    }

    #[tokio::test]
    async fn malformed_hash_is_an_error() {
        let hasher = PasswordHasher::new(4 /* bcrypt minimum cost */).unwrap();
        assert!(hasher.verify("whatever", "not-a-bcrypt-hash").await.is_err());
    }
}
