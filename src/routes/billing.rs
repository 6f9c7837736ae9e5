use axum::{extract::State, Json};

use crate::error::Result;
use crate::middleware::auth::CurrentPrincipal;
use crate::platform::billing::RedirectUrl;
use crate::services::access::CoachAccess;
use crate::AppState;

/// Start a checkout. The platform owns the payment flow; this only mints the
/// redirect URL.
pub async fn create_checkout_session(
    State(state): State<AppState>,
    CurrentPrincipal { principal, token }: CurrentPrincipal,
) -> Result<Json<RedirectUrl>> {
    CoachAccess::for_coach(&principal)?;
    let redirect = state.billing.create_checkout_session(&token).await?;
    Ok(Json(redirect))
}

pub async fn create_portal_session(
    State(state): State<AppState>,
    CurrentPrincipal { principal, token }: CurrentPrincipal,
) -> Result<Json<RedirectUrl>> {
    CoachAccess::for_coach(&principal)?;
    let redirect = state.billing.create_portal_session(&token).await?;
    Ok(Json(redirect))
}
