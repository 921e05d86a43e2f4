use axum::{
    extract::{Json, Path, State},
    response::{IntoResponse, Response},
};
use tracing::error;
use uuid::Uuid;

use crate::responses::JsonResponse;
use crate::routes::auth::session::AuthSession;
use crate::state::AppState;

pub async fn list_notifications(
    State(state): State<AppState>,
    AuthSession(current_user): AuthSession,
) -> Response {
    match state.inbox.list_notifications(current_user.id).await {
        Ok(notifications) => Json(notifications).into_response(),
        Err(e) => {
            error!(?e, "Failed to list notifications");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}

/// Marks one of the caller's notifications read. Idempotent; another
/// user's notification is indistinguishable from a missing one.
pub async fn mark_notification_read(
    State(state): State<AppState>,
    AuthSession(current_user): AuthSession,
    Path(notification_id): Path<Uuid>,
) -> Response {
    match state
        .inbox
        .mark_notification_read(notification_id, current_user.id)
        .await
    {
        Ok(Some(notification)) => Json(notification).into_response(),
        Ok(None) => JsonResponse::not_found("Notification not found").into_response(),
        Err(e) => {
            error!(?e, "Failed to mark notification read");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}

pub async fn mark_all_notifications_read(
    State(state): State<AppState>,
    AuthSession(current_user): AuthSession,
) -> Response {
    match state
        .inbox
        .mark_all_notifications_read(current_user.id)
        .await
    {
        Ok(()) => JsonResponse::success("All notifications marked as read").into_response(),
        Err(e) => {
            error!(?e, "Failed to mark notifications read");
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
        routing::{get, patch, post},
        Router,
    };
    use time::OffsetDateTime;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::{list_notifications, mark_all_notifications_read, mark_notification_read};
    use crate::db::mock_db::MockDb;
    use crate::models::notification::{Notification, NotificationType};
    use crate::models::user::{Role, User};
    use crate::routes::test_support::{auth_cookie_for, seeded_user, seeded_user_in_org};
    use crate::state::AppState;

    fn build_app(db: Arc<MockDb>) -> Router {
        Router::new()
            .route("/notifications", get(list_notifications))
            .route("/notifications/{id}", patch(mark_notification_read))
            .route(
                "/notifications/mark-all-read",
                post(mark_all_notifications_read),
            )
            .with_state(AppState::for_tests(db))
    }

    fn seeded_notification(db: &MockDb, user: &User, is_read: bool) -> Notification {
        let notification = Notification {
            id: Uuid::new_v4(),
            organization_id: user.organization_id,
            user_id: user.id,
            kind: NotificationType::Announcement,
            title: "Test".into(),
            message: "Message".into(),
            is_read,
            created_at: OffsetDateTime::now_utc(),
        };
        db.notifications.lock().unwrap().push(notification.clone());
        notification
    }

    #[tokio::test]
    async fn test_marking_read_twice_is_a_no_op() {
        let db = Arc::new(MockDb::default());
        let user = seeded_user(&db, Role::Employee, "password123");
        let notification = seeded_notification(&db, &user, false);

        for _ in 0..2 {
            let res = build_app(db.clone())
                .oneshot(
                    Request::patch(&format!("/notifications/{}", notification.id))
                        .header("Cookie", auth_cookie_for(&user))
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::OK);
        }

        assert!(db.notifications.lock().unwrap()[0].is_read);
    }

    #[tokio::test]
    async fn test_cannot_touch_another_users_notification() {
        let db = Arc::new(MockDb::default());
        let user = seeded_user(&db, Role::Employee, "password123");
        let other = seeded_user_in_org(&db, user.organization_id, Role::Employee);
        let notification = seeded_notification(&db, &other, false);

        let res = build_app(db.clone())
            .oneshot(
                Request::patch(&format!("/notifications/{}", notification.id))
                    .header("Cookie", auth_cookie_for(&user))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert!(!db.notifications.lock().unwrap()[0].is_read);
    }

    #[tokio::test]
    async fn test_list_is_own_only() {
        let db = Arc::new(MockDb::default());
        let user = seeded_user(&db, Role::Employee, "password123");
        let other = seeded_user_in_org(&db, user.organization_id, Role::Employee);
        seeded_notification(&db, &user, false);
        seeded_notification(&db, &other, false);

        let res = build_app(db)
            .oneshot(
                Request::get("/notifications")
                    .header("Cookie", auth_cookie_for(&user))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_mark_all_read() {
        let db = Arc::new(MockDb::default());
        let user = seeded_user(&db, Role::Employee, "password123");
        seeded_notification(&db, &user, false);
        seeded_notification(&db, &user, false);
        seeded_notification(&db, &user, true);

        let res = build_app(db.clone())
            .oneshot(
                Request::post("/notifications/mark-all-read")
                    .header("Cookie", auth_cookie_for(&user))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert!(db
            .notifications
            .lock()
            .unwrap()
            .iter()
            .all(|n| n.is_read));
    }
}
