//! Hashing functions for stored password digests

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use sha1::{Digest, Sha1};

use super::{CryptoError, CryptoResult};

const LEGACY_SHA1_HEX_LEN: usize = 40;

/// Hash data using SHA-1, hex encoded.
///
/// Only used to check legacy rows. SHA-1 without a salt is not a password hash.
pub fn sha1_hex(data: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Hash password using Argon2id with a random salt
pub fn hash_password(password: &str) -> CryptoResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CryptoError::Hashing(format!("Argon2 hashing failed: {}", e)))
}

/// Verify password against an Argon2 PHC string
pub fn verify_password(password: &str, hash: &str) -> CryptoResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| CryptoError::Verification(format!("Invalid hash format: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(CryptoError::Verification(e.to_string())),
    }
}

/// Constant-time string comparison
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.as_bytes()
        .iter()
        .zip(b.as_bytes())
        .fold(0, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// A password digest as read from the user table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredDigest {
    /// `$argon2id$...` PHC string
    Argon2(String),
    /// 40 lowercase hex chars, unsalted SHA-1
    LegacySha1(String),
}

impl StoredDigest {
    pub fn parse(raw: &str) -> CryptoResult<Self> {
        let raw = raw.trim();

        if raw.starts_with("$argon2") {
            return Ok(StoredDigest::Argon2(raw.to_string()));
        }

        if raw.len() == LEGACY_SHA1_HEX_LEN && raw.chars().all(|c| c.is_ascii_hexdigit()) {
            return Ok(StoredDigest::LegacySha1(raw.to_ascii_lowercase()));
        }

        Err(CryptoError::InvalidDigest(
            "stored digest is neither an Argon2 PHC string nor a SHA-1 hex digest".to_string(),
        ))
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, StoredDigest::LegacySha1(_))
    }

    /// Check a plaintext password against this digest
    pub fn verify(&self, password: &str) -> CryptoResult<bool> {
        match self {
            StoredDigest::Argon2(phc) => verify_password(password, phc),
            StoredDigest::LegacySha1(expected) => {
                Ok(constant_time_compare(&sha1_hex(password.as_bytes()), expected))
            }
        }
    }
}
