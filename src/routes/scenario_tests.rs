//! End-to-end flows driven through the full API router, cookie to
//! cookie, the way a client would use it.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::StatusCode,
    Router,
};
use tower::ServiceExt;

use crate::db::mock_db::MockDb;
use crate::routes::api_router;
use crate::state::AppState;

fn build_app(db: Arc<MockDb>) -> Router {
    std::env::set_var("JWT_SECRET", "0123456789abcdef0123456789abcdef");
    api_router().with_state(AppState::for_tests(db))
}

/// The auth_token cookie pair out of a Set-Cookie header.
fn session_cookie(res: &axum::http::Response<Body>) -> String {
    let set_cookie = res
        .headers()
        .get("set-cookie")
        .expect("response should set a cookie")
        .to_str()
        .unwrap();
    set_cookie
        .split(';')
        .next()
        .expect("cookie should have a value")
        .to_string()
}

async fn post_json(
    app: Router,
    path: &str,
    cookie: Option<&str>,
    body: serde_json::Value,
) -> axum::http::Response<Body> {
    let mut builder = Request::post(path).header("Content-Type", "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header("Cookie", cookie);
    }
    app.oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

async fn patch_json(
    app: Router,
    path: &str,
    cookie: &str,
    body: serde_json::Value,
) -> axum::http::Response<Body> {
    app.oneshot(
        Request::patch(path)
            .header("Content-Type", "application/json")
            .header("Cookie", cookie)
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn get_json(app: Router, path: &str, cookie: &str) -> serde_json::Value {
    let res = app
        .oneshot(
            Request::get(path)
                .header("Cookie", cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn time_off_approval_flow_end_to_end() {
    let db = Arc::new(MockDb::default());

    // The owner registers the organization.
    let res = post_json(
        build_app(db.clone()),
        "/api/auth/register",
        None,
        serde_json::json!({
            "email": "a@x.com",
            "password": "secret1",
            "first_name": "Ada",
            "last_name": "Owner",
            "organization_name": "Acme"
        }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let owner_cookie = session_cookie(&res);

    // The owner creates an employee and a manager.
    let res = post_json(
        build_app(db.clone()),
        "/api/users",
        Some(&owner_cookie),
        serde_json::json!({
            "email": "e@x.com",
            "password": "secret1",
            "first_name": "Evan",
            "last_name": "Employee"
        }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let res = post_json(
        build_app(db.clone()),
        "/api/users",
        Some(&owner_cookie),
        serde_json::json!({
            "email": "m@x.com",
            "password": "secret1",
            "first_name": "Mia",
            "last_name": "Manager",
            "role": "manager"
        }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    // The employee logs in and requests vacation.
    let res = post_json(
        build_app(db.clone()),
        "/api/auth/login",
        None,
        serde_json::json!({ "email": "e@x.com", "password": "secret1" }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let employee_cookie = session_cookie(&res);

    let res = post_json(
        build_app(db.clone()),
        "/api/time-off",
        Some(&employee_cookie),
        serde_json::json!({
            "type": "vacation",
            "start_date": "2024-03-01",
            "end_date": "2024-03-03"
        }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let request: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(request["status"], "pending");
    let request_id = request["id"].as_str().unwrap().to_string();

    // The manager approves it.
    let res = post_json(
        build_app(db.clone()),
        "/api/auth/login",
        None,
        serde_json::json!({ "email": "m@x.com", "password": "secret1" }),
    )
    .await;
    let manager_cookie = session_cookie(&res);

    let res = patch_json(
        build_app(db.clone()),
        &format!("/api/time-off/{request_id}"),
        &manager_cookie,
        serde_json::json!({ "status": "approved" }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    // The employee polls their notifications: one unread approval.
    let notifications = get_json(
        build_app(db.clone()),
        "/api/notifications",
        &employee_cookie,
    )
    .await;
    let notifications = notifications.as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["type"], "time_off_approved");
    assert_eq!(notifications[0]["is_read"], false);
}

#[tokio::test]
async fn swap_approval_flow_reassigns_the_shift() {
    let db = Arc::new(MockDb::default());

    let res = post_json(
        build_app(db.clone()),
        "/api/auth/register",
        None,
        serde_json::json!({
            "email": "owner@swap.com",
            "password": "secret1",
            "first_name": "Olive",
            "last_name": "Owner",
            "organization_name": "Swapco"
        }),
    )
    .await;
    let owner_cookie = session_cookie(&res);

    for (email, first_name) in [("r@swap.com", "Riley"), ("t@swap.com", "Toni")] {
        let res = post_json(
            build_app(db.clone()),
            "/api/users",
            Some(&owner_cookie),
            serde_json::json!({
                "email": email,
                "password": "secret1",
                "first_name": first_name,
                "last_name": "Employee"
            }),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }
    let (requester_id, target_id) = {
        let users = db.users.lock().unwrap();
        let requester = users.iter().find(|u| u.email == "r@swap.com").unwrap();
        let target = users.iter().find(|u| u.email == "t@swap.com").unwrap();
        (requester.id, target.id)
    };
    let location_id = db.locations.lock().unwrap()[0].id;

    // The owner schedules the requester.
    let res = post_json(
        build_app(db.clone()),
        "/api/shifts",
        Some(&owner_cookie),
        serde_json::json!({
            "location_id": location_id,
            "user_id": requester_id.to_string(),
            "start_time": "2024-03-04T09:00:00Z",
            "end_time": "2024-03-04T17:00:00Z"
        }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let shift_id = db.shifts.lock().unwrap()[0].id;

    // The requester offers the shift to the target.
    let res = post_json(
        build_app(db.clone()),
        "/api/auth/login",
        None,
        serde_json::json!({ "email": "r@swap.com", "password": "secret1" }),
    )
    .await;
    let requester_cookie = session_cookie(&res);
    let res = post_json(
        build_app(db.clone()),
        "/api/swaps",
        Some(&requester_cookie),
        serde_json::json!({
            "shift_id": shift_id,
            "target_user_id": target_id,
            "reason": "appointment"
        }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let swap_id = db.swaps.lock().unwrap()[0].id;

    // The owner approves; both the swap and the shift must change.
    let res = patch_json(
        build_app(db.clone()),
        &format!("/api/swaps/{swap_id}"),
        &owner_cookie,
        serde_json::json!({ "status": "approved" }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    assert_eq!(db.shifts.lock().unwrap()[0].user_id, Some(target_id));
    let swaps = db.swaps.lock().unwrap();
    assert_eq!(
        swaps[0].status,
        crate::models::time_off::RequestStatus::Approved
    );
    assert!(swaps[0].reviewed_at.is_some());
}
