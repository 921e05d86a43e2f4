use axum::{
    extract::{Json, Path, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::error;
use uuid::Uuid;

use crate::authz::{require, Capability};
use crate::db::schedule_repository::{NewShift, ShiftChanges};
use crate::models::notification::NotificationType;
use crate::models::shift::{Shift, ShiftStatus};
use crate::responses::JsonResponse;
use crate::routes::auth::session::AuthSession;
use crate::state::AppState;
use crate::utils::timestamps::parse_timestamp;

/// The client sends `"unassigned"` (or an empty string) to clear a
/// shift's assignee; both normalize to NULL.
fn normalize_assignee(raw: &str) -> Result<Option<Uuid>, Response> {
    match raw {
        "unassigned" | "" => Ok(None),
        value => Uuid::parse_str(value)
            .map(Some)
            .map_err(|_| JsonResponse::bad_request("Invalid user id.").into_response()),
    }
}

fn parse_required_time(raw: Option<&str>, which: &str) -> Result<OffsetDateTime, Response> {
    let Some(raw) = raw else {
        return Err(
            JsonResponse::bad_request("Start and end times are required.").into_response(),
        );
    };
    parse_timestamp(raw).ok_or_else(|| {
        JsonResponse::bad_request(&format!("The {which} time could not be parsed."))
            .into_response()
    })
}

pub async fn list_shifts(
    State(state): State<AppState>,
    AuthSession(current_user): AuthSession,
) -> Response {
    match state
        .schedule
        .list_shifts(current_user.organization_id)
        .await
    {
        Ok(shifts) => Json(shifts).into_response(),
        Err(e) => {
            error!(?e, "Failed to list shifts");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}

#[derive(Deserialize, Serialize, Default)]
pub struct CreateShiftPayload {
    #[serde(default)]
    pub location_id: Option<Uuid>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

pub async fn create_shift(
    State(state): State<AppState>,
    AuthSession(current_user): AuthSession,
    Json(payload): Json<CreateShiftPayload>,
) -> Response {
    if let Err(forbidden) = require(current_user.role, Capability::ManageShifts) {
        return forbidden;
    }

    let Some(location_id) = payload.location_id else {
        return JsonResponse::bad_request("A location is required.").into_response();
    };

    let start_time = match parse_required_time(payload.start_time.as_deref(), "start") {
        Ok(ts) => ts,
        Err(response) => return response,
    };
    let end_time = match parse_required_time(payload.end_time.as_deref(), "end") {
        Ok(ts) => ts,
        Err(response) => return response,
    };
    if end_time <= start_time {
        return JsonResponse::bad_request("The end time must be after the start time.")
            .into_response();
    }

    let user_id = match payload.user_id.as_deref() {
        None => None,
        Some(raw) => match normalize_assignee(raw) {
            Ok(user_id) => user_id,
            Err(response) => return response,
        },
    };

    let status = match payload.status.as_deref() {
        None => ShiftStatus::Scheduled,
        Some(raw) => match ShiftStatus::parse(raw) {
            Some(status) => status,
            None => return JsonResponse::bad_request("Invalid shift status.").into_response(),
        },
    };

    let new_shift = NewShift {
        organization_id: current_user.organization_id,
        location_id,
        user_id,
        start_time,
        end_time,
        position: payload.position,
        notes: payload.notes,
        status,
    };
    let shift = match state.schedule.create_shift(&new_shift).await {
        Ok(shift) => shift,
        Err(e) => {
            error!(?e, "Failed to create shift");
            return JsonResponse::server_error("Could not create shift").into_response();
        }
    };

    if let Some(assignee) = shift.user_id {
        state
            .notifier
            .notify(
                shift.organization_id,
                assignee,
                NotificationType::ShiftAssigned,
                "New shift assigned",
                &format!("You have been assigned a shift on {}.", shift.start_time.date()),
            )
            .await;
    }

    Json(shift).into_response()
}

#[derive(Deserialize, Serialize, Default)]
pub struct UpdateShiftPayload {
    #[serde(default)]
    pub location_id: Option<Uuid>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

pub async fn update_shift(
    State(state): State<AppState>,
    AuthSession(current_user): AuthSession,
    Path(shift_id): Path<Uuid>,
    Json(payload): Json<UpdateShiftPayload>,
) -> Response {
    if let Err(forbidden) = require(current_user.role, Capability::ManageShifts) {
        return forbidden;
    }

    let existing = match state
        .schedule
        .find_shift(shift_id, current_user.organization_id)
        .await
    {
        Ok(Some(shift)) => shift,
        Ok(None) => return JsonResponse::not_found("Shift not found").into_response(),
        Err(e) => {
            error!(?e, "Failed to load shift");
            return JsonResponse::server_error("Database error").into_response();
        }
    };

    let mut changes = ShiftChanges {
        location_id: payload.location_id,
        position: payload.position,
        notes: payload.notes,
        ..Default::default()
    };

    if let Some(raw) = payload.user_id.as_deref() {
        match normalize_assignee(raw) {
            Ok(user_id) => changes.user_id = Some(user_id),
            Err(response) => return response,
        }
    }

    if let Some(raw) = payload.start_time.as_deref() {
        match parse_timestamp(raw) {
            Some(ts) => changes.start_time = Some(ts),
            None => {
                return JsonResponse::bad_request("The start time could not be parsed.")
                    .into_response()
            }
        }
    }
    if let Some(raw) = payload.end_time.as_deref() {
        match parse_timestamp(raw) {
            Some(ts) => changes.end_time = Some(ts),
            None => {
                return JsonResponse::bad_request("The end time could not be parsed.")
                    .into_response()
            }
        }
    }

    // The ordering invariant holds over the merged row, not just the
    // fields present in this request.
    let merged_start = changes.start_time.unwrap_or(existing.start_time);
    let merged_end = changes.end_time.unwrap_or(existing.end_time);
    if merged_end <= merged_start {
        return JsonResponse::bad_request("The end time must be after the start time.")
            .into_response();
    }

    if let Some(raw) = payload.status.as_deref() {
        match ShiftStatus::parse(raw) {
            Some(status) => changes.status = Some(status),
            None => return JsonResponse::bad_request("Invalid shift status.").into_response(),
        }
    }

    let updated = match state
        .schedule
        .update_shift(shift_id, current_user.organization_id, &changes)
        .await
    {
        Ok(Some(shift)) => shift,
        Ok(None) => return JsonResponse::not_found("Shift not found").into_response(),
        Err(e) => {
            error!(?e, "Failed to update shift");
            return JsonResponse::server_error("Database error").into_response();
        }
    };

    notify_shift_changes(&state, &existing, &updated).await;

    Json(updated).into_response()
}

/// Assignment, publication, and reschedule fan-out after a shift write.
async fn notify_shift_changes(state: &AppState, before: &Shift, after: &Shift) {
    if after.user_id != before.user_id {
        if let Some(assignee) = after.user_id {
            state
                .notifier
                .notify(
                    after.organization_id,
                    assignee,
                    NotificationType::ShiftAssigned,
                    "New shift assigned",
                    &format!("You have been assigned a shift on {}.", after.start_time.date()),
                )
                .await;
        }
        return;
    }

    let Some(assignee) = after.user_id else {
        return;
    };

    if after.status == ShiftStatus::Published && before.status != ShiftStatus::Published {
        state
            .notifier
            .notify(
                after.organization_id,
                assignee,
                NotificationType::SchedulePublished,
                "Schedule published",
                &format!("Your shift on {} has been published.", after.start_time.date()),
            )
            .await;
    } else if after.start_time != before.start_time || after.end_time != before.end_time {
        state
            .notifier
            .notify(
                after.organization_id,
                assignee,
                NotificationType::ShiftChanged,
                "Shift updated",
                &format!("Your shift on {} has changed.", after.start_time.date()),
            )
            .await;
    }
}

pub async fn delete_shift(
    State(state): State<AppState>,
    AuthSession(current_user): AuthSession,
    Path(shift_id): Path<Uuid>,
) -> Response {
    if let Err(forbidden) = require(current_user.role, Capability::ManageShifts) {
        return forbidden;
    }

    match state
        .schedule
        .delete_shift(shift_id, current_user.organization_id)
        .await
    {
        Ok(true) => JsonResponse::success("Shift deleted").into_response(),
        Ok(false) => JsonResponse::not_found("Shift not found").into_response(),
        Err(e) => {
            error!(?e, "Failed to delete shift");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}
