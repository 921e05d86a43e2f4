use axum::{
    extract::{Json, Query, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::authz::{role_allows, Capability};
use crate::db::schedule_repository::NewAvailability;
use crate::responses::JsonResponse;
use crate::routes::auth::session::AuthSession;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AvailabilityQuery {
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

/// Own entries by default; managers may read any org member's entries.
pub async fn list_availability(
    State(state): State<AppState>,
    AuthSession(current_user): AuthSession,
    Query(query): Query<AvailabilityQuery>,
) -> Response {
    let user_id = match query.user_id {
        None => current_user.id,
        Some(target) if target == current_user.id => target,
        Some(target) => {
            if !role_allows(current_user.role, Capability::ManageUsers) {
                return JsonResponse::forbidden(
                    "You do not have permission to perform this action.",
                )
                .into_response();
            }
            match state
                .users
                .find_user_in_org(target, current_user.organization_id)
                .await
            {
                Ok(Some(user)) => user.id,
                Ok(None) => return JsonResponse::not_found("User not found").into_response(),
                Err(e) => {
                    error!(?e, "Failed to resolve availability subject");
                    return JsonResponse::server_error("Database error").into_response();
                }
            }
        }
    };

    match state.schedule.list_availability(user_id).await {
        Ok(entries) => Json(entries).into_response(),
        Err(e) => {
            error!(?e, "Failed to list availability");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}

#[derive(Deserialize, Serialize, Default)]
pub struct CreateAvailabilityPayload {
    #[serde(default)]
    pub day_of_week: Option<i32>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub is_available: Option<bool>,
}

pub async fn create_availability(
    State(state): State<AppState>,
    AuthSession(current_user): AuthSession,
    Json(payload): Json<CreateAvailabilityPayload>,
) -> Response {
    let day_of_week = match payload.day_of_week {
        Some(day) if (0..=6).contains(&day) => day,
        _ => {
            return JsonResponse::bad_request("Day of week must be between 0 and 6.")
                .into_response()
        }
    };
    let (Some(start_time), Some(end_time)) = (payload.start_time, payload.end_time) else {
        return JsonResponse::bad_request("Start and end times are required.").into_response();
    };
    if start_time.trim().is_empty() || end_time.trim().is_empty() {
        return JsonResponse::bad_request("Start and end times are required.").into_response();
    }

    let new_availability = NewAvailability {
        user_id: current_user.id,
        day_of_week,
        start_time,
        end_time,
        is_available: payload.is_available.unwrap_or(true),
    };
    match state.schedule.create_availability(&new_availability).await {
        Ok(entry) => Json(entry).into_response(),
        Err(e) => {
            error!(?e, "Failed to create availability");
            JsonResponse::server_error("Could not save availability").into_response()
        }
    }
}
