use axum::{
    extract::{Json, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::responses::JsonResponse;
use crate::routes::auth::session::AuthSession;
use crate::state::AppState;
use crate::utils::password::{hash_password, verify_password};

#[derive(Deserialize, Serialize)]
pub struct ChangePasswordPayload {
    pub current_password: String,
    pub new_password: String,
}

pub async fn handle_change_password(
    State(state): State<AppState>,
    AuthSession(current_user): AuthSession,
    Json(payload): Json<ChangePasswordPayload>,
) -> Response {
    if payload.new_password.len() < 6 {
        return JsonResponse::bad_request("Password must be at least 6 characters.")
            .into_response();
    }

    let user = match state.users.find_user_by_id(current_user.id).await {
        Ok(Some(user)) => user,
        Ok(None) => return JsonResponse::not_found("User not found").into_response(),
        Err(e) => {
            error!(?e, "Failed to load user for password change");
            return JsonResponse::server_error("Database error").into_response();
        }
    };

    match verify_password(&payload.current_password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            return JsonResponse::bad_request("Current password is incorrect.").into_response()
        }
        Err(e) => {
            error!(?e, "Password verification error");
            return JsonResponse::server_error("Internal error").into_response();
        }
    }

    let password_hash = match hash_password(&payload.new_password) {
        Ok(hash) => hash,
        Err(_) => return JsonResponse::server_error("Password hashing failed").into_response(),
    };

    match state
        .users
        .update_user_password(current_user.id, &password_hash)
        .await
    {
        Ok(()) => JsonResponse::success("Password updated").into_response(),
        Err(e) => {
            error!(?e, "Failed to store new password");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{body::Body, extract::Request, http::StatusCode, routing::post, Router};
    use tower::ServiceExt;

    use super::{handle_change_password, ChangePasswordPayload};
    use crate::db::mock_db::MockDb;
    use crate::models::user::Role;
    use crate::routes::test_support::{auth_cookie_for, seeded_user};
    use crate::state::AppState;
    use crate::utils::password::verify_password;

    fn build_app(db: Arc<MockDb>) -> Router {
        Router::new()
            .route("/change-password", post(handle_change_password))
            .with_state(AppState::for_tests(db))
    }

    async fn send(
        app: Router,
        cookie: &str,
        payload: &ChangePasswordPayload,
    ) -> axum::http::Response<axum::body::Body> {
        app.oneshot(
            Request::post("/change-password")
                .header("Content-Type", "application/json")
                .header("Cookie", cookie)
                .body(Body::from(serde_json::to_vec(payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_change_password_replaces_hash() {
        let db = Arc::new(MockDb::default());
        let user = seeded_user(&db, Role::Employee, "oldpassword");
        let cookie = auth_cookie_for(&user);

        let res = send(
            build_app(db.clone()),
            &cookie,
            &ChangePasswordPayload {
                current_password: "oldpassword".into(),
                new_password: "newpassword".into(),
            },
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let users = db.users.lock().unwrap();
        assert!(verify_password("newpassword", &users[0].password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_change_password_requires_current_match() {
        let db = Arc::new(MockDb::default());
        let user = seeded_user(&db, Role::Employee, "oldpassword");
        let cookie = auth_cookie_for(&user);

        let res = send(
            build_app(db.clone()),
            &cookie,
            &ChangePasswordPayload {
                current_password: "not-the-password".into(),
                new_password: "newpassword".into(),
            },
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let users = db.users.lock().unwrap();
        assert!(verify_password("oldpassword", &users[0].password_hash).unwrap());
    }
}
