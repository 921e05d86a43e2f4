use axum::{
    extract::{Json, Path, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::error;
use uuid::Uuid;

use crate::authz::{require, role_allows, Capability};
use crate::db::request_repository::NewTimeOffRequest;
use crate::models::notification::NotificationType;
use crate::models::time_off::{RequestStatus, TimeOffRequest, TimeOffType};
use crate::responses::JsonResponse;
use crate::routes::auth::session::AuthSession;
use crate::state::AppState;
use crate::utils::timestamps::parse_timestamp;

/// Employees see their own requests; reviewers see the whole
/// organization.
pub async fn list_time_off(
    State(state): State<AppState>,
    AuthSession(current_user): AuthSession,
) -> Response {
    let result = if role_allows(current_user.role, Capability::ReviewTimeOff) {
        state
            .requests
            .list_time_off(current_user.organization_id)
            .await
    } else {
        state
            .requests
            .list_time_off_for_user(current_user.organization_id, current_user.id)
            .await
    };

    match result {
        Ok(requests) => Json(requests).into_response(),
        Err(e) => {
            error!(?e, "Failed to list time-off requests");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}

#[derive(Deserialize, Serialize, Default)]
pub struct CreateTimeOffPayload {
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

pub async fn create_time_off(
    State(state): State<AppState>,
    AuthSession(current_user): AuthSession,
    Json(payload): Json<CreateTimeOffPayload>,
) -> Response {
    // Only reviewers may file on someone else's behalf; everyone else's
    // submissions are coerced to their own account.
    let user_id = match payload.user_id {
        Some(target) if target != current_user.id => {
            if role_allows(current_user.role, Capability::ReviewTimeOff) {
                match state
                    .users
                    .find_user_in_org(target, current_user.organization_id)
                    .await
                {
                    Ok(Some(user)) => user.id,
                    Ok(None) => {
                        return JsonResponse::not_found("User not found").into_response()
                    }
                    Err(e) => {
                        error!(?e, "Failed to resolve time-off subject");
                        return JsonResponse::server_error("Database error").into_response();
                    }
                }
            } else {
                current_user.id
            }
        }
        _ => current_user.id,
    };

    let Some(start_raw) = payload.start_date.as_deref() else {
        return JsonResponse::bad_request("Start and end dates are required.").into_response();
    };
    let Some(end_raw) = payload.end_date.as_deref() else {
        return JsonResponse::bad_request("Start and end dates are required.").into_response();
    };
    let Some(start_date) = parse_timestamp(start_raw) else {
        return JsonResponse::bad_request("The start date could not be parsed.").into_response();
    };
    let Some(end_date) = parse_timestamp(end_raw) else {
        return JsonResponse::bad_request("The end date could not be parsed.").into_response();
    };
    // A single-day request (equal dates) is fine.
    if end_date < start_date {
        return JsonResponse::bad_request("The end date cannot be before the start date.")
            .into_response();
    }

    let kind = match payload.kind.as_deref().and_then(TimeOffType::parse) {
        Some(kind) => kind,
        None => return JsonResponse::bad_request("Invalid time off type.").into_response(),
    };

    let new_request = NewTimeOffRequest {
        organization_id: current_user.organization_id,
        user_id,
        start_date,
        end_date,
        kind,
        reason: payload.reason,
    };
    match state.requests.create_time_off(&new_request).await {
        Ok(request) => Json(request).into_response(),
        Err(e) => {
            error!(?e, "Failed to create time-off request");
            JsonResponse::server_error("Could not create request").into_response()
        }
    }
}

#[derive(Deserialize, Serialize)]
pub struct ReviewPayload {
    pub status: String,
}

pub async fn review_time_off(
    State(state): State<AppState>,
    AuthSession(current_user): AuthSession,
    Path(request_id): Path<Uuid>,
    Json(payload): Json<ReviewPayload>,
) -> Response {
    if let Err(forbidden) = require(current_user.role, Capability::ReviewTimeOff) {
        return forbidden;
    }

    let status = match RequestStatus::parse(&payload.status) {
        Some(RequestStatus::Approved) => RequestStatus::Approved,
        Some(RequestStatus::Denied) => RequestStatus::Denied,
        _ => {
            return JsonResponse::bad_request("Status must be approved or denied.")
                .into_response()
        }
    };

    let existing = match state
        .requests
        .find_time_off(request_id, current_user.organization_id)
        .await
    {
        Ok(Some(request)) => request,
        Ok(None) => return JsonResponse::not_found("Request not found").into_response(),
        Err(e) => {
            error!(?e, "Failed to load time-off request");
            return JsonResponse::server_error("Database error").into_response();
        }
    };
    if existing.status != RequestStatus::Pending {
        return JsonResponse::bad_request("This request has already been reviewed.")
            .into_response();
    }

    let reviewed = match state
        .requests
        .review_time_off(
            request_id,
            current_user.organization_id,
            status,
            current_user.id,
            OffsetDateTime::now_utc(),
        )
        .await
    {
        Ok(Some(request)) => request,
        // A concurrent reviewer won the pending-row race.
        Ok(None) => {
            return JsonResponse::bad_request("This request has already been reviewed.")
                .into_response()
        }
        Err(e) => {
            error!(?e, "Failed to review time-off request");
            return JsonResponse::server_error("Database error").into_response();
        }
    };

    notify_review_outcome(&state, &reviewed).await;

    Json(reviewed).into_response()
}

async fn notify_review_outcome(state: &AppState, request: &TimeOffRequest) {
    let (kind, verdict) = match request.status {
        RequestStatus::Approved => (NotificationType::TimeOffApproved, "approved"),
        RequestStatus::Denied => (NotificationType::TimeOffDenied, "denied"),
        RequestStatus::Pending => return,
    };
    state
        .notifier
        .notify(
            request.organization_id,
            request.user_id,
            kind,
            &format!("Time off {verdict}"),
            &format!(
                "Your {} request from {} to {} was {verdict}.",
                request.kind.as_str(),
                request.start_date.date(),
                request.end_date.date()
            ),
        )
        .await;
}
