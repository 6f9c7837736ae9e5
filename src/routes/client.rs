use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::error::Result;
use crate::middleware::auth::CurrentPrincipal;
use crate::models::message::{ContactCoachRequest, Message};
use crate::services::access::require_client;
use crate::services::clients::ClientService;
use crate::services::messages::MessageService;
use crate::services::sessions::SessionService;
use crate::AppState;

pub async fn dashboard(
    State(state): State<AppState>,
    CurrentPrincipal { principal, .. }: CurrentPrincipal,
) -> Result<Json<Value>> {
    require_client(&principal)?;
    let profile = ClientService::profile_for(state.store.as_ref(), &principal).await?;
    let sessions =
        SessionService::upcoming_for_client(state.store.as_ref(), &principal.email).await?;

    let stats = json!({
        "sessions_remaining": profile.sessions_remaining(),
        "total_sessions": profile.total_sessions,
        "sessions_used": profile.sessions_used,
        "active_stage": profile.active_stage().map(|s| s.name.clone()),
        "coach_name": profile.coach_name,
    });
    Ok(Json(json!({
        "client": profile,
        "stats": stats,
        "upcoming_sessions": sessions,
    })))
}

pub async fn contact_coach(
    State(state): State<AppState>,
    CurrentPrincipal { principal, .. }: CurrentPrincipal,
    Json(body): Json<ContactCoachRequest>,
) -> Result<(StatusCode, Json<Message>)> {
    require_client(&principal)?;
    let profile = ClientService::profile_for(state.store.as_ref(), &principal).await?;
    let message = MessageService::contact_coach(state.store.as_ref(), &profile, &body).await?;
    Ok((StatusCode::CREATED, Json(message)))
}
