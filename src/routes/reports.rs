use axum::{
    extract::{Json, State},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::authz::{require, Capability};
use crate::responses::JsonResponse;
use crate::routes::auth::session::AuthSession;
use crate::state::AppState;

/// Owner-only aggregate dump: the organization's shifts, users, and
/// time-off requests in one payload for offline reporting.
pub async fn get_reports(
    State(state): State<AppState>,
    AuthSession(current_user): AuthSession,
) -> Response {
    if let Err(forbidden) = require(current_user.role, Capability::ViewReports) {
        return forbidden;
    }

    let organization_id = current_user.organization_id;
    let shifts = match state.schedule.list_shifts(organization_id).await {
        Ok(shifts) => shifts,
        Err(e) => {
            error!(?e, "Failed to load shifts for report");
            return JsonResponse::server_error("Database error").into_response();
        }
    };
    let users = match state.users.list_users(organization_id).await {
        Ok(users) => users,
        Err(e) => {
            error!(?e, "Failed to load users for report");
            return JsonResponse::server_error("Database error").into_response();
        }
    };
    let time_off_requests = match state.requests.list_time_off(organization_id).await {
        Ok(requests) => requests,
        Err(e) => {
            error!(?e, "Failed to load time-off for report");
            return JsonResponse::server_error("Database error").into_response();
        }
    };

    Json(json!({
        "shifts": shifts,
        "users": users,
        "time_off_requests": time_off_requests,
    }))
    .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        extract::Request,
        http::StatusCode,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    use super::get_reports;
    use crate::db::mock_db::MockDb;
    use crate::models::user::Role;
    use crate::routes::test_support::{
        auth_cookie_for, seeded_location, seeded_shift, seeded_user, seeded_user_in_org,
    };
    use crate::state::AppState;

    fn build_app(db: Arc<MockDb>) -> Router {
        Router::new()
            .route("/reports", get(get_reports))
            .with_state(AppState::for_tests(db))
    }

    #[tokio::test]
    async fn test_reports_reject_managers_too() {
        let db = Arc::new(MockDb::default());
        let manager = seeded_user(&db, Role::Manager, "password123");

        let res = build_app(db)
            .oneshot(
                Request::get("/reports")
                    .header("Cookie", auth_cookie_for(&manager))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_owner_gets_aggregate_with_hashes_stripped() {
        let db = Arc::new(MockDb::default());
        let owner = seeded_user(&db, Role::Owner, "password123");
        seeded_user_in_org(&db, owner.organization_id, Role::Employee);
        let location = seeded_location(&db, owner.organization_id);
        seeded_shift(&db, owner.organization_id, location.id, None);

        let res = build_app(db)
            .oneshot(
                Request::get("/reports")
                    .header("Cookie", auth_cookie_for(&owner))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["shifts"].as_array().unwrap().len(), 1);
        assert_eq!(json["users"].as_array().unwrap().len(), 2);
        assert!(json["users"]
            .as_array()
            .unwrap()
            .iter()
            .all(|u| u.get("password_hash").is_none()));
        assert_eq!(json["time_off_requests"].as_array().unwrap().len(), 0);
    }
}
