use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::error::Result;
use crate::middleware::auth::CurrentPrincipal;
use crate::models::client::{Client, CreateClientRequest, UpdateClientRequest};
use crate::models::message::Message;
use crate::services::access::CoachAccess;
use crate::services::billing::project_billing;
use crate::services::clients::ClientService;
use crate::services::messages::MessageService;
use crate::AppState;

pub async fn dashboard(
    State(state): State<AppState>,
    CurrentPrincipal { principal, .. }: CurrentPrincipal,
) -> Result<Json<Value>> {
    let access = CoachAccess::for_coach(&principal)?;
    let clients = ClientService::list(state.store.as_ref(), &access).await?;
    let billing = project_billing(access.coach(), clients.len());
    Ok(Json(json!({
        "coach": access.coach(),
        "clients": clients,
        "billing": billing,
    })))
}

pub async fn create_client(
    State(state): State<AppState>,
    CurrentPrincipal { principal, .. }: CurrentPrincipal,
    Json(body): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<Client>)> {
    let access = CoachAccess::for_coach(&principal)?;
    let client = ClientService::create(state.store.as_ref(), &access, &body).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
    CurrentPrincipal { principal, .. }: CurrentPrincipal,
    Json(body): Json<UpdateClientRequest>,
) -> Result<Json<Client>> {
    let access = CoachAccess::for_coach(&principal)?;
    let client = ClientService::update(state.store.as_ref(), &access, &id, &body).await?;
    Ok(Json(client))
}

pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
    CurrentPrincipal { principal, .. }: CurrentPrincipal,
) -> Result<StatusCode> {
    let access = CoachAccess::for_coach(&principal)?;
    ClientService::remove(state.store.as_ref(), &access, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_messages(
    State(state): State<AppState>,
    CurrentPrincipal { principal, .. }: CurrentPrincipal,
) -> Result<Json<Vec<Message>>> {
    let access = CoachAccess::for_coach(&principal)?;
    let messages = MessageService::inbox_for_coach(state.store.as_ref(), &access).await?;
    Ok(Json(messages))
}
