// ============================
// accountd-backend/src/auth/password.rs
// ============================
//! Password hashing and verification.
use scrypt::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Params, Scrypt,
};
use zeroize::Zeroize;

use crate::error::AppError;

/// Hash a password using scrypt with a fresh random salt
pub fn hash_password(plain: &str, params: Params) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Scrypt
        .hash_password_customized(plain.as_bytes(), None, None, params, &salt)
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))?
        .to_string();
    Ok(hash)
}

/// Verify a password against a PHC hash string. Malformed hashes never verify.
pub fn verify_password(hash: &str, plain: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Scrypt.verify_password(plain.as_bytes(), &parsed_hash).is_ok()
}

/// Runs hashing on the blocking pool so request tasks are not stalled by scrypt.
#[derive(Clone)]
pub struct Hasher {
    params: Params,
}

impl Hasher {
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    /// Hash `plain`, wiping the plaintext afterwards
    pub async fn hash(&self, mut plain: String) -> Result<String, AppError> {
        let params = self.params.clone();
        tokio::task::spawn_blocking(move || {
            let hash = hash_password(&plain, params);
            plain.zeroize();
            hash
        })
        .await?
    }

    pub async fn verify(&self, hash: String, mut plain: String) -> Result<bool, AppError> {
        let ok = tokio::task::spawn_blocking(move || {
            let ok = verify_password(&hash, &plain);
            plain.zeroize();
            ok
        })
        .await?;
        Ok(ok)
    }
}
