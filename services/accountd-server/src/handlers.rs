//! Request handlers
//!
//! Thin plumbing: map HTTP shapes onto the gate and the ledger and let the
//! error layer translate failures.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    Json,
};

use accountd_types::UserId;

use crate::dto::{AccountResponse, BalanceUpdateRequest};
use crate::error::ApiResult;
use crate::state::AppState;

/// `GET /api/accounts/:user_id/balance`
///
/// Authorized read of all of a user's balances. The raw `Authorization`
/// header value is handed to the gate untouched; the gate owns extraction
/// and the requester-vs-owner check.
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<AccountResponse>>> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    state
        .gate
        .authorize_balance_read(user_id, authorization)
        .await?;

    let balances = state.ledger.list_balances(user_id).await?;
    Ok(Json(balances.into_iter().map(AccountResponse::from).collect()))
}

/// `POST /api/accounts/internal/update-balance`
///
/// Applies a signed delta to one balance. Deliberately carries no token
/// check: this endpoint is for trusted internal callers only and must not
/// be exposed beyond the service mesh.
pub async fn update_balance(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BalanceUpdateRequest>,
) -> ApiResult<Json<AccountResponse>> {
    let updated = state
        .ledger
        .apply_delta(request.user_id, request.currency, request.amount)
        .await?;

    Ok(Json(updated.into()))
}

/// `GET /health`
pub async fn health() -> &'static str {
    "ok"
}
