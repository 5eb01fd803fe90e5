// ============================
// accountd-backend/src/handlers/accounts.rs
// ============================
//! `/api/users` handlers. Each one unpacks the request, calls the account
//! service, and shapes the response; errors render through [`AppError`].
use std::sync::Arc;

use accountd_common::{
    AccountId, AccountResponse, AuthResponse, DeleteResponse, LoginRequest, RegisterRequest,
    UpdateAccountRequest,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension,
};

use super::AppJson;
use crate::{error::AppError, middleware::Session, storage::AccountStore, AppState};

/// `POST /api/users`
pub async fn register<S: AccountStore>(
    State(state): State<Arc<AppState<S>>>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<(StatusCode, AppJson<AuthResponse>), AppError> {
    let resp = state.accounts.register(req).await?;
    Ok((StatusCode::CREATED, AppJson(resp)))
}

/// `POST /api/users/login`
pub async fn login<S: AccountStore>(
    State(state): State<Arc<AppState<S>>>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<AppJson<AuthResponse>, AppError> {
    Ok(AppJson(state.accounts.authenticate(req).await?))
}

/// `GET /api/users/me`
pub async fn me<S: AccountStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(session): Extension<Session>,
) -> Result<AppJson<AccountResponse>, AppError> {
    Ok(AppJson(state.accounts.get_self(session.account_id).await?))
}

/// `PUT /api/users/{id}`
pub async fn update<S: AccountStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    AppJson(patch): AppJson<UpdateAccountRequest>,
) -> Result<AppJson<AccountResponse>, AppError> {
    let id = parse_account_id(&id)?;
    tracing::debug!(caller = %session.account_id, account_id = %id, "update requested");
    Ok(AppJson(state.accounts.update(id, patch).await?))
}

/// `DELETE /api/users/{id}`
pub async fn remove<S: AccountStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<AppJson<DeleteResponse>, AppError> {
    let id = parse_account_id(&id)?;
    tracing::debug!(caller = %session.account_id, account_id = %id, "removal requested");
    Ok(AppJson(state.accounts.remove(id).await?))
}

/// An id that cannot name a record is reported like an unknown one
fn parse_account_id(raw: &str) -> Result<AccountId, AppError> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("account {raw}")))
}
