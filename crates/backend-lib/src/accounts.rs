// ============================
// accountd-backend/src/accounts.rs
// ============================
//! The account service: registration, login, profile, update and removal.
//!
//! Every operation is independent; the only state shared between requests
//! lives in the store and the read-only signing key.
use accountd_common::{
    AccountId, AccountResponse, AuthResponse, DeleteResponse, LoginRequest, RegisterRequest,
    UpdateAccountRequest,
};
use metrics::counter;
use tracing::{info, warn};

use crate::auth::{Hasher, TokenIssuer};
use crate::config::Settings;
use crate::error::AppError;
use crate::metrics::{
    ACCOUNT_REGISTERED, ACCOUNT_REMOVED, ACCOUNT_UPDATED, LOGIN_FAILED, LOGIN_SUCCEEDED,
};
use crate::storage::{AccountChanges, AccountRecord, AccountStore, NewAccount, StoreError};

/// Acknowledgement returned after a deletion
pub const DELETED_MESSAGE: &str = "Account deleted";

pub struct AccountService<S> {
    store: S,
    hasher: Hasher,
    tokens: TokenIssuer,
}

impl<S: AccountStore> AccountService<S> {
    pub fn new(store: S, hasher: Hasher, tokens: TokenIssuer) -> Self {
        Self {
            store,
            hasher,
            tokens,
        }
    }

    /// Build the service with the hashing cost and signing secret from `settings`
    pub fn from_settings(store: S, settings: &Settings) -> anyhow::Result<Self> {
        let hasher = Hasher::new(settings.password_hash.params()?);
        let tokens = TokenIssuer::new(settings.jwt_secret.as_deref());
        if !tokens.is_configured() {
            warn!("no jwt_secret configured; registration and login will fail");
        }
        Ok(Self::new(store, hasher, tokens))
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Create an account and sign a first token for it
    #[tracing::instrument(skip_all)]
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse, AppError> {
        let fields = (present(req.name), present(req.email), secret(req.password));
        let (name, email, password) = match fields {
            (Some(name), Some(email), Some(password)) => (name, email, password),
            (name, email, password) => {
                let missing: Vec<&str> = [
                    ("name", name.is_none()),
                    ("email", email.is_none()),
                    ("password", password.is_none()),
                ]
                .into_iter()
                .filter_map(|(field, absent)| absent.then_some(field))
                .collect();
                return Err(AppError::Validation(format!(
                    "Please add all fields (missing: {})",
                    missing.join(", ")
                )));
            },
        };

        // Fast path only; the store's unique index is what actually decides
        if self.store.find_by_email(&email).await?.is_some() {
            return Err(StoreError::DuplicateEmail(email).into());
        }

        let password_hash = self.hasher.hash(password).await?;
        let record = self
            .store
            .create(NewAccount {
                name,
                email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                dup @ StoreError::DuplicateEmail(_) => AppError::from(dup),
                other => {
                    tracing::error!(error = %other, "store failed to persist new account");
                    AppError::Creation
                },
            })?;

        counter!(ACCOUNT_REGISTERED).increment(1);
        info!(account_id = %record.id, "account registered");
        self.auth_response(&record)
    }

    /// Check credentials and sign a new token.
    ///
    /// Unknown email, wrong password and missing fields all give [`AppError::Auth`].
    #[tracing::instrument(skip_all)]
    pub async fn authenticate(&self, req: LoginRequest) -> Result<AuthResponse, AppError> {
        let (Some(email), Some(password)) = (present(req.email), secret(req.password)) else {
            counter!(LOGIN_FAILED).increment(1);
            return Err(AppError::Auth);
        };

        let record = match self.store.find_by_email(&email).await? {
            Some(record) => record,
            None => {
                counter!(LOGIN_FAILED).increment(1);
                return Err(AppError::Auth);
            },
        };

        if !self
            .hasher
            .verify(record.password_hash.clone(), password)
            .await?
        {
            counter!(LOGIN_FAILED).increment(1);
            warn!(account_id = %record.id, "password mismatch");
            return Err(AppError::Auth);
        }

        counter!(LOGIN_SUCCEEDED).increment(1);
        self.auth_response(&record)
    }

    /// Public profile of the session's own account
    #[tracing::instrument(skip(self))]
    pub async fn get_self(&self, account_id: AccountId) -> Result<AccountResponse, AppError> {
        Ok(self.require(account_id).await?.to_response())
    }

    /// Apply an allow-listed patch. A new password is hashed before it is stored.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update(
        &self,
        account_id: AccountId,
        patch: UpdateAccountRequest,
    ) -> Result<AccountResponse, AppError> {
        let current = self.require(account_id).await?;

        let mut changes = AccountChanges {
            name: non_empty(patch.name, "name")?,
            email: non_empty(patch.email, "email")?,
            password_hash: None,
        };
        if let Some(password) = patch.password {
            if password.trim().is_empty() {
                return Err(AppError::Validation("password must not be empty".to_string()));
            }
            changes.password_hash = Some(self.hasher.hash(password).await?);
        }

        if changes.is_empty() {
            return Ok(current.to_response());
        }

        let updated = self
            .store
            .update(account_id, changes)
            .await?
            .ok_or_else(|| not_found(account_id))?;

        counter!(ACCOUNT_UPDATED).increment(1);
        info!("account updated");
        Ok(updated.to_response())
    }

    /// Permanently delete an account
    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, account_id: AccountId) -> Result<DeleteResponse, AppError> {
        if !self.store.remove(account_id).await? {
            return Err(not_found(account_id));
        }

        counter!(ACCOUNT_REMOVED).increment(1);
        info!("account removed");
        Ok(DeleteResponse {
            id: account_id,
            message: DELETED_MESSAGE.to_string(),
        })
    }

    /// Sign a 30-day session token for `account_id`
    pub fn issue_token(&self, account_id: AccountId) -> Result<String, AppError> {
        self.tokens.issue(account_id)
    }

    async fn require(&self, account_id: AccountId) -> Result<AccountRecord, AppError> {
        self.store
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| not_found(account_id))
    }

    fn auth_response(&self, record: &AccountRecord) -> Result<AuthResponse, AppError> {
        Ok(AuthResponse {
            id: record.id,
            name: record.name.clone(),
            email: record.email.clone(),
            token: self.issue_token(record.id)?,
        })
    }
}

/// The trimmed value, or `None` when absent or blank
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Passwords are checked for presence but kept verbatim
fn secret(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// A patch field may be omitted, but not blanked
fn non_empty(value: Option<String>, field: &str) -> Result<Option<String>, AppError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if v.is_empty() => Err(AppError::Validation(format!("{field} must not be empty"))),
        other => Ok(other),
    }
}

fn not_found(account_id: AccountId) -> AppError {
    AppError::NotFound(format!("account {account_id}"))
}
