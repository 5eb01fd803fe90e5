// ============================
// accountd-backend/src/auth/mod.rs
// ============================
//! Credential handling: password hashes and session tokens.

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password, Hasher};
pub use token::{Claims, TokenIssuer, TOKEN_TTL};
