//! Password digest utilities
//!
//! Stored credentials come in two shapes: Argon2id PHC strings, and legacy
//! unsalted SHA-1 hex digests that older rows still carry.

pub mod hashing;

pub use hashing::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Hashing error: {0}")]
    Hashing(String),

    #[error("Verification error: {0}")]
    Verification(String),

    #[error("Invalid digest: {0}")]
    InvalidDigest(String),
}

pub type CryptoResult<T> = Result<T, CryptoError>;
