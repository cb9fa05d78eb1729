//! Password hashing
//! bcrypt with a fixed work factor, run off the async executor

use anyhow::{Context, Result};

/// Work factor used for every stored hash.
pub const HASH_COST: u32 = 10;

/// Lowest work factor bcrypt accepts. Only for test suites.
pub const MIN_HASH_COST: u32 = 4;

/// One-way salted password hasher.
///
/// bcrypt output embeds its own salt and cost, so verification needs nothing
/// beyond the stored hash string.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: HASH_COST }
    }
}

impl PasswordHasher {
    /// Hasher with a non-default cost. Intended for tests, which use
    /// [`MIN_HASH_COST`] to keep the suite fast.
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash(&self, plaintext: String) -> Result<String> {
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(plaintext, cost))
            .await
            .context("password hashing task failed")?
            .context("failed to hash password")
    }

    pub async fn verify(&self, plaintext: String, hash: String) -> Result<bool> {
        tokio::task::spawn_blocking(move || bcrypt::verify(plaintext, &hash))
            .await
            .context("password verification task failed")?
            .context("failed to verify password")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> PasswordHasher {
        PasswordHasher::with_cost(MIN_HASH_COST)
    }

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hasher = fast();
        let hash = hasher.hash("secret1".to_string()).await.unwrap();

        assert_ne!(hash, "secret1");
        assert!(hasher.verify("secret1".to_string(), hash.clone()).await.unwrap());
        assert!(!hasher.verify("secret2".to_string(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_hashes_are_salted() {
        let hasher = fast();
        let a = hasher.hash("secret1".to_string()).await.unwrap();
        let b = hasher.hash("secret1".to_string()).await.unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_default_cost_is_embedded() {
        let hash = bcrypt::hash("secret1", PasswordHasher::default().cost).unwrap();
        assert!(hash.starts_with("$2b$10$"), "{hash}");
    }

    #[test]
    fn test_min_cost_is_accepted_by_bcrypt() {
        let hash = bcrypt::hash("secret1", MIN_HASH_COST).unwrap();
        assert!(hash.starts_with("$2b$04$"), "{hash}");
    }

    #[tokio::test]
    async fn test_garbage_hash_is_an_error() {
        let result = fast()
            .verify("secret1".to_string(), "not-a-bcrypt-hash".to_string())
            .await;
        assert!(result.is_err());
    }
}
