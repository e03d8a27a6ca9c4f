//! Credential checks against the user table, and the session tokens issued
//! once a check passes.

pub mod session;

use shared::crypto::{CryptoError, StoredDigest};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::db::{CredentialStore, RepositoryError};

pub use session::{Claims, SessionTokens};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Credential lookup failed: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Digest verification failed: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Check a plaintext password against the stored digest for `user_id`.
///
/// Unknown users and wrong passwords both yield `Ok(false)`.
pub async fn check_credentials(
    store: &dyn CredentialStore,
    user_id: &str,
    password: &str,
) -> Result<bool, AuthError> {
    let Some(raw_digest) = store.find_password_digest(user_id).await? else {
        debug!("No user row for {}", user_id);
        return Ok(false);
    };

    let digest = match StoredDigest::parse(&raw_digest) {
        Ok(digest) => digest,
        Err(e) => {
            error!("Unusable stored digest for {}: {}", user_id, e);
            return Ok(false);
        }
    };

    if digest.is_legacy() {
        warn!("User {} still has an unsalted SHA-1 digest", user_id);
    }

    // Argon2 verification is CPU-bound
    let password = password.to_string();
    let matched = tokio::task::spawn_blocking(move || digest.verify(&password))
        .await
        .map_err(|e| AuthError::Internal(format!("Digest verification task failed: {}", e)))??;

    Ok(matched)
}
