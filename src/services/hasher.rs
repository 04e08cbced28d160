//! # Credential Hasher
//!
//! One-way bcrypt hashing for passwords and verification tokens. bcrypt is
//! CPU bound, so both operations run on the blocking thread pool.

use thiserror::Error;
use tokio::task;
use tracing::{instrument, warn};

use crate::utils::constant::DEFAULT_HASH_COST;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("bcrypt failure: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("hashing task failed: {0}")]
    Join(#[from] task::JoinError),
}

#[derive(Debug, Clone, Copy)]
pub struct CredentialHasher {
    cost: u32,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_COST)
    }
}

impl CredentialHasher {
    /// `cost` is the bcrypt work factor (4..=31).
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hashes `secret` with a fresh salt.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the cost is out of range or the worker task dies.
    #[instrument(skip_all, fields(cost = self.cost))]
    pub async fn hash(&self, secret: &str) -> Result<String, HashError> {
        let secret = secret.to_owned();
        let cost = self.cost;
        let hashed = task::spawn_blocking(move || bcrypt::hash(secret, cost)).await??;
        Ok(hashed)
    }

    /// Checks `secret` against a stored hash.
    ///
    /// Any failure, including a malformed hash, is reported as a mismatch.
    #[instrument(skip_all)]
    pub async fn verify(&self, secret: &str, hashed: &str) -> bool {
        let secret = secret.to_owned();
        let hashed = hashed.to_owned();

        match task::spawn_blocking(move || bcrypt::verify(secret, &hashed)).await {
            Ok(Ok(matches)) => matches,
            Ok(Err(e)) => {
                warn!(error = %e, "Hash comparison failed, treating as mismatch");
                false
            }
            Err(e) => {
                warn!(error = %e, "Hash comparison task failed, treating as mismatch");
                false
            }
        }
    }
}
