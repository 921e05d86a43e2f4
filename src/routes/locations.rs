use axum::{
    extract::{Json, Path, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::authz::{require, Capability};
use crate::db::schedule_repository::{LocationChanges, NewLocation};
use crate::responses::JsonResponse;
use crate::routes::auth::session::AuthSession;
use crate::state::AppState;

const DEFAULT_TIMEZONE: &str = "America/New_York";

pub async fn list_locations(
    State(state): State<AppState>,
    AuthSession(current_user): AuthSession,
) -> Response {
    match state
        .schedule
        .list_locations(current_user.organization_id)
        .await
    {
        Ok(locations) => Json(locations).into_response(),
        Err(e) => {
            error!(?e, "Failed to list locations");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}

#[derive(Deserialize, Serialize)]
pub struct CreateLocationPayload {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
}

pub async fn create_location(
    State(state): State<AppState>,
    AuthSession(current_user): AuthSession,
    Json(payload): Json<CreateLocationPayload>,
) -> Response {
    if let Err(forbidden) = require(current_user.role, Capability::ManageLocations) {
        return forbidden;
    }

    let name = payload.name.trim();
    if name.is_empty() {
        return JsonResponse::bad_request("A location name is required.").into_response();
    }

    let new_location = NewLocation {
        organization_id: current_user.organization_id,
        name: name.to_string(),
        address: payload.address,
        timezone: payload
            .timezone
            .filter(|tz| !tz.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
    };
    match state.schedule.create_location(&new_location).await {
        Ok(location) => Json(location).into_response(),
        Err(e) => {
            error!(?e, "Failed to create location");
            JsonResponse::server_error("Could not create location").into_response()
        }
    }
}

#[derive(Deserialize, Serialize, Default)]
pub struct UpdateLocationPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

pub async fn update_location(
    State(state): State<AppState>,
    AuthSession(current_user): AuthSession,
    Path(location_id): Path<Uuid>,
    Json(payload): Json<UpdateLocationPayload>,
) -> Response {
    if let Err(forbidden) = require(current_user.role, Capability::ManageLocations) {
        return forbidden;
    }

    let changes = LocationChanges {
        name: payload.name,
        address: payload.address,
        timezone: payload.timezone,
        is_active: payload.is_active,
    };
    match state
        .schedule
        .update_location(location_id, current_user.organization_id, &changes)
        .await
    {
        Ok(Some(location)) => Json(location).into_response(),
        Ok(None) => JsonResponse::not_found("Location not found").into_response(),
        Err(e) => {
            error!(?e, "Failed to update location");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}
