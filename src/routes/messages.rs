use axum::{
    extract::{Json, Path, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::db::inbox_repository::NewMessage;
use crate::models::notification::NotificationType;
use crate::responses::JsonResponse;
use crate::routes::auth::session::AuthSession;
use crate::state::AppState;

pub async fn list_messages(
    State(state): State<AppState>,
    AuthSession(current_user): AuthSession,
) -> Response {
    match state
        .inbox
        .list_messages(current_user.organization_id)
        .await
    {
        Ok(messages) => Json(messages).into_response(),
        Err(e) => {
            error!(?e, "Failed to list messages");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}

#[derive(Deserialize, Serialize, Default)]
pub struct CreateMessagePayload {
    /// Absent means a broadcast to the whole organization.
    #[serde(default)]
    pub recipient_id: Option<Uuid>,
    pub subject: String,
    pub body: String,
}

pub async fn create_message(
    State(state): State<AppState>,
    AuthSession(current_user): AuthSession,
    Json(payload): Json<CreateMessagePayload>,
) -> Response {
    let subject = payload.subject.trim();
    if subject.is_empty() {
        return JsonResponse::bad_request("A subject is required.").into_response();
    }
    if payload.body.trim().is_empty() {
        return JsonResponse::bad_request("A message body is required.").into_response();
    }

    if let Some(recipient_id) = payload.recipient_id {
        match state
            .users
            .find_user_in_org(recipient_id, current_user.organization_id)
            .await
        {
            Ok(Some(_)) => {}
            Ok(None) => return JsonResponse::not_found("User not found").into_response(),
            Err(e) => {
                error!(?e, "Failed to resolve message recipient");
                return JsonResponse::server_error("Database error").into_response();
            }
        }
    }

    let new_message = NewMessage {
        organization_id: current_user.organization_id,
        sender_id: current_user.id,
        recipient_id: payload.recipient_id,
        subject: subject.to_string(),
        body: payload.body,
        is_broadcast: payload.recipient_id.is_none(),
    };
    let message = match state.inbox.create_message(&new_message).await {
        Ok(message) => message,
        Err(e) => {
            error!(?e, "Failed to create message");
            return JsonResponse::server_error("Could not send message").into_response();
        }
    };

    // Fan-out happens after the message row is committed and never fails
    // the send.
    match message.recipient_id {
        None => {
            state
                .notifier
                .broadcast(
                    message.organization_id,
                    message.sender_id,
                    &message.subject,
                    &message.body,
                )
                .await;
        }
        Some(recipient_id) => {
            state
                .notifier
                .notify(
                    message.organization_id,
                    recipient_id,
                    NotificationType::Announcement,
                    &message.subject,
                    &message.body,
                )
                .await;
        }
    }

    Json(message).into_response()
}

pub async fn mark_message_read(
    State(state): State<AppState>,
    AuthSession(current_user): AuthSession,
    Path(message_id): Path<Uuid>,
) -> Response {
    match state
        .inbox
        .mark_message_read(message_id, current_user.organization_id)
        .await
    {
        Ok(Some(message)) => Json(message).into_response(),
        Ok(None) => JsonResponse::not_found("Message not found").into_response(),
        Err(e) => {
            error!(?e, "Failed to mark message read");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}
