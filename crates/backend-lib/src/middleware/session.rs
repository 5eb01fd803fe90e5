//! Session verification for private routes.
use std::sync::Arc;

use accountd_common::AccountId;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, storage::AccountStore, AppState};

/// Identity established by [`require_session`], available to handlers as an extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub account_id: AccountId,
}

/// Reject the request unless it carries a valid bearer token for an existing account
pub async fn require_session<S: AccountStore>(
    State(state): State<Arc<AppState<S>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = {
        let token = bearer_token(request.headers())?;
        state.accounts.tokens().verify(token)?
    };

    if state.accounts.store().find_by_id(claims.id).await?.is_none() {
        tracing::debug!(account_id = %claims.id, "token for a removed account");
        return Err(AppError::Unauthorized("account no longer exists".to_string()));
    }

    request.extensions_mut().insert(Session {
        account_id: claims.id,
    });
    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("no token".to_string()))?
        .to_str()
        .map_err(|_| AppError::Unauthorized("malformed authorization header".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("expected a bearer token".to_string()))
}
