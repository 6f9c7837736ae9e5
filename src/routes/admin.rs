use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::Result;
use crate::middleware::auth::CurrentPrincipal;
use crate::models::principal::{ManageCoachRequest, Principal};
use crate::services::access::require_admin;
use crate::services::admin::{AdminService, CoachPreview, CoachSummary, PlatformOverview};
use crate::services::cascade::{CascadeReport, CascadeService};
use crate::AppState;

pub async fn overview(
    State(state): State<AppState>,
    CurrentPrincipal { principal, .. }: CurrentPrincipal,
) -> Result<Json<PlatformOverview>> {
    require_admin(&principal)?;
    let overview = AdminService::overview(state.store.as_ref(), state.identity.as_ref()).await?;
    Ok(Json(overview))
}

pub async fn list_coaches(
    State(state): State<AppState>,
    CurrentPrincipal { principal, .. }: CurrentPrincipal,
) -> Result<Json<Vec<CoachSummary>>> {
    require_admin(&principal)?;
    let roster = AdminService::list_coaches(state.store.as_ref(), state.identity.as_ref()).await?;
    Ok(Json(roster))
}

pub async fn manage_coach(
    State(state): State<AppState>,
    Path(id): Path<String>,
    CurrentPrincipal { principal, .. }: CurrentPrincipal,
    Json(body): Json<ManageCoachRequest>,
) -> Result<Json<Principal>> {
    require_admin(&principal)?;
    let updated = AdminService::manage_coach(state.identity.as_ref(), &id, &body).await?;
    Ok(Json(updated))
}

pub async fn preview_coach(
    State(state): State<AppState>,
    Path(id): Path<String>,
    CurrentPrincipal { principal, .. }: CurrentPrincipal,
) -> Result<Json<CoachPreview>> {
    require_admin(&principal)?;
    let preview = AdminService::preview_coach(
        state.store.as_ref(),
        state.identity.as_ref(),
        &principal,
        &id,
    )
    .await?;
    Ok(Json(preview))
}

/// Irreversible. Dependent Sessions, Messages and Clients go first; the
/// principal record goes last.
pub async fn delete_coach(
    State(state): State<AppState>,
    Path(id): Path<String>,
    CurrentPrincipal { principal, .. }: CurrentPrincipal,
) -> Result<Json<CascadeReport>> {
    require_admin(&principal)?;
    let report =
        CascadeService::delete_coach_and_all_data(state.store.as_ref(), state.identity.as_ref(), &id)
            .await?;
    Ok(Json(report))
}
