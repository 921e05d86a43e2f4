use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use crate::db::schedule_repository::NewLocation;
use crate::db::user_repository::NewUser;
use crate::models::user::Role;
use crate::responses::JsonResponse;
use crate::routes::auth::session::issue_session_headers;
use crate::state::AppState;
use crate::utils::password::hash_password;

const DEFAULT_LOCATION_NAME: &str = "Main Location";
const DEFAULT_TIMEZONE: &str = "America/New_York";

#[derive(Deserialize, Serialize)]
pub struct RegisterPayload {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub organization_name: String,
}

/// Bootstraps a tenant: the organization, its owner account, and a
/// default location, then signs the owner in.
pub async fn handle_register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Response {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return JsonResponse::bad_request("A valid email address is required.").into_response();
    }
    if payload.password.len() < 6 {
        return JsonResponse::bad_request("Password must be at least 6 characters.")
            .into_response();
    }
    if payload.first_name.trim().is_empty() || payload.last_name.trim().is_empty() {
        return JsonResponse::bad_request("First and last name are required.").into_response();
    }
    let organization_name = payload.organization_name.trim();
    if organization_name.is_empty() {
        return JsonResponse::bad_request("An organization name is required.").into_response();
    }

    match state.users.is_email_taken(&email).await {
        Ok(true) => return JsonResponse::bad_request("Email already in use").into_response(),
        Ok(false) => {}
        Err(e) => {
            error!(?e, "Failed to check email during registration");
            return JsonResponse::server_error("Database error").into_response();
        }
    }

    let organization = match state.users.create_organization(organization_name).await {
        Ok(org) => org,
        Err(e) => {
            error!(?e, "Failed to create organization");
            return JsonResponse::server_error("Could not create organization").into_response();
        }
    };

    let password_hash = match hash_password(&payload.password) {
        Ok(hash) => hash,
        Err(_) => return JsonResponse::server_error("Password hashing failed").into_response(),
    };

    let new_user = NewUser {
        organization_id: organization.id,
        email,
        password_hash,
        first_name: payload.first_name.trim().to_string(),
        last_name: payload.last_name.trim().to_string(),
        phone: None,
        role: Role::Owner,
        hourly_rate: None,
        position: None,
    };
    let user = match state.users.create_user(&new_user).await {
        Ok(user) => user,
        Err(e) => {
            error!(?e, "Failed to create owner account");
            return JsonResponse::server_error("Could not create user").into_response();
        }
    };

    let default_location = NewLocation {
        organization_id: organization.id,
        name: DEFAULT_LOCATION_NAME.to_string(),
        address: None,
        timezone: DEFAULT_TIMEZONE.to_string(),
    };
    if let Err(e) = state.schedule.create_location(&default_location).await {
        error!(?e, "Failed to create default location");
        return JsonResponse::server_error("Could not create default location").into_response();
    }

    match issue_session_headers(&user) {
        Ok(headers) => (StatusCode::OK, headers, Json(json!({ "user": user }))).into_response(),
        Err(e) => {
            error!(?e, "Failed to issue session token");
            JsonResponse::server_error("Token generation failed").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        extract::Request,
        http::StatusCode,
        routing::post,
        Router,
    };
    use tower::ServiceExt;

    use super::{handle_register, RegisterPayload};
    use crate::db::mock_db::MockDb;
    use crate::models::user::Role;
    use crate::state::AppState;

    fn build_app(db: Arc<MockDb>) -> Router {
        std::env::set_var("JWT_SECRET", "0123456789abcdef0123456789abcdef");
        Router::new()
            .route("/register", post(handle_register))
            .with_state(AppState::for_tests(db))
    }

    fn payload() -> RegisterPayload {
        RegisterPayload {
            email: "a@x.com".into(),
            password: "secret1".into(),
            first_name: "Ada".into(),
            last_name: "Owner".into(),
            organization_name: "Acme".into(),
        }
    }

    async fn send(app: Router, payload: &RegisterPayload) -> axum::http::Response<axum::body::Body> {
        app.oneshot(
            Request::post("/register")
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_vec(payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_register_creates_org_owner_and_default_location() {
        std::env::set_var("JWT_SECRET", "0123456789abcdef0123456789abcdef");
        let db = Arc::new(MockDb::default());
        let res = send(build_app(db.clone()), &payload()).await;

        assert_eq!(res.status(), StatusCode::OK);
        let set_cookie = res.headers().get("set-cookie").unwrap().to_str().unwrap();
        assert!(set_cookie.contains("auth_token="));
        assert!(set_cookie.contains("HttpOnly"));

        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["user"]["email"], "a@x.com");
        assert_eq!(json["user"]["role"], "owner");
        // Credentials never serialize.
        assert!(json["user"].get("password_hash").is_none());

        assert_eq!(db.organizations.lock().unwrap().len(), 1);
        let users = db.users.lock().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].role, Role::Owner);
        let locations = db.locations.lock().unwrap();
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].name, "Main Location");
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_email() {
        std::env::set_var("JWT_SECRET", "0123456789abcdef0123456789abcdef");
        let db = Arc::new(MockDb::default());
        let first = send(build_app(db.clone()), &payload()).await;
        assert_eq!(first.status(), StatusCode::OK);

        let mut second_payload = payload();
        second_payload.organization_name = "Other Org".into();
        let second = send(build_app(db.clone()), &second_payload).await;
        assert_eq!(second.status(), StatusCode::BAD_REQUEST);
        assert_eq!(db.organizations.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_register_rejects_short_password() {
        let db = Arc::new(MockDb::default());
        let mut bad = payload();
        bad.password = "short".into();
        let res = send(build_app(db), &bad).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_register_db_error_is_500() {
        let db = Arc::new(MockDb {
            should_fail: true,
            ..Default::default()
        });
        let res = send(build_app(db), &payload()).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
