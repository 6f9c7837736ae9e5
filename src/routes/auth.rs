use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::error::Result;
use crate::middleware::auth::{CurrentPrincipal, SessionToken};
use crate::AppState;

/// Who the session token belongs to, with the classification the rest of the
/// API will apply to it.
pub async fn me(
    State(_state): State<AppState>,
    CurrentPrincipal { principal, .. }: CurrentPrincipal,
) -> Result<Json<Value>> {
    let classification = principal.classify();
    Ok(Json(json!({
        "user": principal,
        "classification": classification,
    })))
}

pub async fn logout(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
) -> Result<StatusCode> {
    state.identity.logout(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}
