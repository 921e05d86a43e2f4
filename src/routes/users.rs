use axum::{
    extract::{Json, Path, State},
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::authz::{can_edit_user, require, role_allows, Capability};
use crate::db::user_repository::{NewUser, UserChanges};
use crate::models::user::Role;
use crate::responses::JsonResponse;
use crate::routes::auth::session::AuthSession;
use crate::state::AppState;
use crate::utils::password::hash_password;

pub async fn list_users(
    State(state): State<AppState>,
    AuthSession(current_user): AuthSession,
) -> Response {
    match state.users.list_users(current_user.organization_id).await {
        Ok(users) => Json(users).into_response(),
        Err(e) => {
            error!(?e, "Failed to list users");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}

#[derive(Deserialize, Serialize)]
pub struct CreateUserPayload {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub hourly_rate: Option<Decimal>,
    #[serde(default)]
    pub position: Option<String>,
}

pub async fn create_user(
    State(state): State<AppState>,
    AuthSession(current_user): AuthSession,
    Json(payload): Json<CreateUserPayload>,
) -> Response {
    if let Err(forbidden) = require(current_user.role, Capability::ManageUsers) {
        return forbidden;
    }

    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return JsonResponse::bad_request("A valid email address is required.").into_response();
    }
    if payload.password.len() < 6 {
        return JsonResponse::bad_request("Password must be at least 6 characters.")
            .into_response();
    }

    // Owners are only ever created through registration.
    let role = match payload.role.as_deref() {
        None => Role::Employee,
        Some(value) => match Role::parse(value) {
            Some(Role::Owner) | None => {
                return JsonResponse::bad_request("Role must be employee or manager.")
                    .into_response()
            }
            Some(role) => role,
        },
    };

    match state.users.is_email_taken(&email).await {
        Ok(true) => return JsonResponse::bad_request("Email already in use").into_response(),
        Ok(false) => {}
        Err(e) => {
            error!(?e, "Failed to check email");
            return JsonResponse::server_error("Database error").into_response();
        }
    }

    let password_hash = match hash_password(&payload.password) {
        Ok(hash) => hash,
        Err(_) => return JsonResponse::server_error("Password hashing failed").into_response(),
    };

    let new_user = NewUser {
        organization_id: current_user.organization_id,
        email,
        password_hash,
        first_name: payload.first_name.trim().to_string(),
        last_name: payload.last_name.trim().to_string(),
        phone: payload.phone,
        role,
        hourly_rate: payload.hourly_rate,
        position: payload.position,
    };
    match state.users.create_user(&new_user).await {
        Ok(user) => Json(user).into_response(),
        Err(e) => {
            error!(?e, "Failed to create user");
            JsonResponse::server_error("Could not create user").into_response()
        }
    }
}

#[derive(Deserialize, Serialize, Default)]
pub struct UpdateUserPayload {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub hourly_rate: Option<Decimal>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

pub async fn update_user(
    State(state): State<AppState>,
    AuthSession(current_user): AuthSession,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateUserPayload>,
) -> Response {
    if !can_edit_user(current_user.role, current_user.id, user_id) {
        return JsonResponse::forbidden("You can only edit your own profile.").into_response();
    }

    let mut changes = UserChanges {
        first_name: payload.first_name,
        last_name: payload.last_name,
        phone: payload.phone,
        position: payload.position,
        ..Default::default()
    };

    // Privileged fields are dropped, not rejected, for self-service
    // edits: the rest of the payload still applies.
    if role_allows(current_user.role, Capability::ManageUsers) {
        if let Some(value) = payload.role.as_deref() {
            match Role::parse(value) {
                Some(role) => changes.role = Some(role),
                None => return JsonResponse::bad_request("Invalid role.").into_response(),
            }
        }
        changes.hourly_rate = payload.hourly_rate;
        changes.is_active = payload.is_active;
    }

    match state
        .users
        .update_user(user_id, current_user.organization_id, &changes)
        .await
    {
        Ok(Some(user)) => Json(user).into_response(),
        Ok(None) => JsonResponse::not_found("User not found").into_response(),
        Err(e) => {
            error!(?e, "Failed to update user");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}
