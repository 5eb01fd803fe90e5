// ================
// common/src/lib.rs
// ================
//! Request and response bodies exchanged between `accountd` and its clients.
//! Every field a client may omit is an `Option` so that presence checks happen
//! in the service, not in the JSON decoder.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier assigned to an account by the store
pub type AccountId = Uuid;

/// Body of `POST /api/users`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RegisterRequest {
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Login email, unique across accounts
    #[serde(default)]
    pub email: Option<String>,
    /// Plaintext password, hashed before it is stored
    #[serde(default)]
    pub password: Option<String>,
}

/// Body of `POST /api/users/login`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Body of `PUT /api/users/:id`
///
/// Only the fields listed here can be changed; anything else in the body is
/// rejected. A new `password` is hashed like at registration.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct UpdateAccountRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UpdateAccountRequest {
    /// True when the patch names no field at all
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none()
    }
}

/// Public view of an account. Never carries the password hash.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AccountResponse {
    pub id: AccountId,
    pub name: String,
    pub email: String,
}

/// Returned by registration and login
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    /// Signed session token, sent back as `Authorization: Bearer <token>`
    pub token: String,
}

/// Returned by `DELETE /api/users/:id`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DeleteResponse {
    pub id: AccountId,
    pub message: String,
}
