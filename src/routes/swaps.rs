use axum::{
    extract::{Json, Path, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::error;
use uuid::Uuid;

use crate::authz::{require, role_allows, Capability};
use crate::db::request_repository::NewShiftSwapRequest;
use crate::models::notification::NotificationType;
use crate::models::time_off::RequestStatus;
use crate::responses::JsonResponse;
use crate::routes::auth::session::AuthSession;
use crate::state::AppState;

/// Employees see swaps where they are requester or target; reviewers see
/// the whole organization.
pub async fn list_swaps(
    State(state): State<AppState>,
    AuthSession(current_user): AuthSession,
) -> Response {
    let result = if role_allows(current_user.role, Capability::ReviewSwaps) {
        state.requests.list_swaps(current_user.organization_id).await
    } else {
        state
            .requests
            .list_swaps_for_user(current_user.organization_id, current_user.id)
            .await
    };

    match result {
        Ok(swaps) => Json(swaps).into_response(),
        Err(e) => {
            error!(?e, "Failed to list swap requests");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}

#[derive(Deserialize, Serialize, Default)]
pub struct CreateSwapPayload {
    #[serde(default)]
    pub shift_id: Option<Uuid>,
    #[serde(default)]
    pub target_user_id: Option<Uuid>,
    #[serde(default)]
    pub reason: Option<String>,
}

pub async fn create_swap(
    State(state): State<AppState>,
    AuthSession(current_user): AuthSession,
    Json(payload): Json<CreateSwapPayload>,
) -> Response {
    let Some(shift_id) = payload.shift_id else {
        return JsonResponse::bad_request("A shift is required.").into_response();
    };
    let Some(target_user_id) = payload.target_user_id else {
        return JsonResponse::bad_request("A target user is required.").into_response();
    };

    let shift = match state
        .schedule
        .find_shift(shift_id, current_user.organization_id)
        .await
    {
        Ok(Some(shift)) => shift,
        Ok(None) => return JsonResponse::not_found("Shift not found").into_response(),
        Err(e) => {
            error!(?e, "Failed to load shift for swap");
            return JsonResponse::server_error("Database error").into_response();
        }
    };
    // Only the current holder may offer a shift away.
    if shift.user_id != Some(current_user.id) {
        return JsonResponse::bad_request("You can only offer shifts assigned to you.")
            .into_response();
    }

    match state
        .users
        .find_user_in_org(target_user_id, current_user.organization_id)
        .await
    {
        Ok(Some(_)) => {}
        Ok(None) => return JsonResponse::not_found("User not found").into_response(),
        Err(e) => {
            error!(?e, "Failed to resolve swap target");
            return JsonResponse::server_error("Database error").into_response();
        }
    }

    let new_request = NewShiftSwapRequest {
        organization_id: current_user.organization_id,
        shift_id,
        requester_id: current_user.id,
        target_user_id,
        reason: payload.reason,
    };
    let swap = match state.requests.create_swap(&new_request).await {
        Ok(swap) => swap,
        Err(e) => {
            error!(?e, "Failed to create swap request");
            return JsonResponse::server_error("Could not create request").into_response();
        }
    };

    state
        .notifier
        .notify(
            swap.organization_id,
            swap.target_user_id,
            NotificationType::ShiftSwapRequested,
            "Shift swap requested",
            &format!(
                "A teammate wants to hand you their shift on {}.",
                shift.start_time.date()
            ),
        )
        .await;

    Json(swap).into_response()
}

#[derive(Deserialize, Serialize)]
pub struct ReviewSwapPayload {
    pub status: String,
}

pub async fn review_swap(
    State(state): State<AppState>,
    AuthSession(current_user): AuthSession,
    Path(request_id): Path<Uuid>,
    Json(payload): Json<ReviewSwapPayload>,
) -> Response {
    if let Err(forbidden) = require(current_user.role, Capability::ReviewSwaps) {
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
        .find_swap(request_id, current_user.organization_id)
        .await
    {
        Ok(Some(swap)) => swap,
        Ok(None) => return JsonResponse::not_found("Request not found").into_response(),
        Err(e) => {
            error!(?e, "Failed to load swap request");
            return JsonResponse::server_error("Database error").into_response();
        }
    };
    if existing.status != RequestStatus::Pending {
        return JsonResponse::bad_request("This request has already been reviewed.")
            .into_response();
    }

    let now = OffsetDateTime::now_utc();
    let reviewed = match status {
        // Approval reassigns the shift in the same transaction as the
        // status flip; a partial state is never observable.
        RequestStatus::Approved => {
            state
                .requests
                .approve_swap_and_reassign(
                    request_id,
                    current_user.organization_id,
                    current_user.id,
                    now,
                )
                .await
        }
        _ => {
            state
                .requests
                .deny_swap(request_id, current_user.organization_id, current_user.id, now)
                .await
        }
    };

    let swap = match reviewed {
        Ok(Some(swap)) => swap,
        // A concurrent reviewer won the pending-row race.
        Ok(None) => {
            return JsonResponse::bad_request("This request has already been reviewed.")
                .into_response()
        }
        Err(e) => {
            error!(?e, "Failed to review swap request");
            return JsonResponse::server_error("Database error").into_response();
        }
    };

    match swap.status {
        RequestStatus::Approved => {
            state
                .notifier
                .notify(
                    swap.organization_id,
                    swap.requester_id,
                    NotificationType::ShiftSwapApproved,
                    "Shift swap approved",
                    "Your shift swap request was approved.",
                )
                .await;
            state
                .notifier
                .notify(
                    swap.organization_id,
                    swap.target_user_id,
                    NotificationType::ShiftAssigned,
                    "New shift assigned",
                    "A shift has been reassigned to you through a swap.",
                )
                .await;
        }
        RequestStatus::Denied => {
            state
                .notifier
                .notify(
                    swap.organization_id,
                    swap.requester_id,
                    NotificationType::ShiftSwapDenied,
                    "Shift swap denied",
                    "Your shift swap request was denied.",
                )
                .await;
        }
        RequestStatus::Pending => {}
    }

    Json(swap).into_response()
}
