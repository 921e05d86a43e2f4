use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use crate::responses::JsonResponse;
use crate::routes::auth::session::{issue_session_headers, AuthSession};
use crate::state::AppState;
use crate::utils::password::verify_password;

#[derive(Deserialize, Serialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

pub async fn handle_login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Response {
    let email = payload.email.trim().to_lowercase();
    let user = match state.users.find_user_by_email(&email).await {
        Ok(Some(record)) => record,
        Ok(None) => return JsonResponse::unauthorized("Invalid credentials").into_response(),
        Err(e) => {
            error!(?e, "Failed to load user for login");
            return JsonResponse::server_error("Database error").into_response();
        }
    };

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => match issue_session_headers(&user) {
            Ok(headers) => {
                (StatusCode::OK, headers, Json(json!({ "user": user }))).into_response()
            }
            Err(e) => {
                error!(?e, "Failed to issue session token");
                JsonResponse::server_error("Token generation failed").into_response()
            }
        },
        Ok(false) => JsonResponse::unauthorized("Invalid credentials").into_response(),
        Err(e) => {
            error!(?e, "Password verification error");
            JsonResponse::server_error("Internal error").into_response()
        }
    }
}

pub async fn handle_me(
    State(state): State<AppState>,
    AuthSession(current_user): AuthSession,
) -> Response {
    match state.users.find_user_by_id(current_user.id).await {
        Ok(Some(user)) => Json(json!({ "user": user })).into_response(),
        Ok(None) => JsonResponse::not_found("User not found").into_response(),
        Err(e) => {
            error!(?e, "Failed to load current user");
            JsonResponse::server_error("Database error").into_response()
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
        routing::{get, post},
        Router,
    };
    use tower::ServiceExt;

    use super::{handle_login, handle_me, LoginPayload};
    use crate::db::mock_db::MockDb;
    use crate::models::user::Role;
    use crate::routes::test_support::{auth_cookie_for, seeded_user};
    use crate::state::AppState;

    fn build_app(db: Arc<MockDb>) -> Router {
        std::env::set_var("JWT_SECRET", "0123456789abcdef0123456789abcdef");
        Router::new()
            .route("/login", post(handle_login))
            .route("/me", get(handle_me))
            .with_state(AppState::for_tests(db))
    }

    #[tokio::test]
    async fn test_login_success_sets_cookie_and_strips_hash() {
        let db = Arc::new(MockDb::default());
        let user = seeded_user(&db, Role::Employee, "password123");

        let payload = LoginPayload {
            email: user.email.clone(),
            password: "password123".into(),
        };
        let res = build_app(db)
            .oneshot(
                Request::post("/login")
                    .header("Content-Type", "application/json")
                    .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let set_cookie = res.headers().get("set-cookie").unwrap().to_str().unwrap();
        assert!(set_cookie.contains("auth_token="));

        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["user"]["email"], user.email);
        assert!(json["user"].get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let db = Arc::new(MockDb::default());
        let user = seeded_user(&db, Role::Employee, "password123");

        let payload = LoginPayload {
            email: user.email,
            password: "wrong-password".into(),
        };
        let res = build_app(db)
            .oneshot(
                Request::post("/login")
                    .header("Content-Type", "application/json")
                    .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let db = Arc::new(MockDb::default());
        let payload = LoginPayload {
            email: "unknown@example.com".into(),
            password: "irrelevant".into(),
        };
        let res = build_app(db)
            .oneshot(
                Request::post("/login")
                    .header("Content-Type", "application/json")
                    .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_me_returns_current_user() {
        let db = Arc::new(MockDb::default());
        let user = seeded_user(&db, Role::Manager, "password123");
        let cookie = auth_cookie_for(&user);

        let res = build_app(db)
            .oneshot(
                Request::get("/me")
                    .header("Cookie", cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["user"]["email"], user.email);
        assert_eq!(json["user"]["role"], "manager");
    }

    #[tokio::test]
    async fn test_me_without_cookie_is_unauthorized() {
        let db = Arc::new(MockDb::default());
        let res = build_app(db)
            .oneshot(Request::get("/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
