use axum::{
    http::{header::SET_COOKIE, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
};
use time::Duration as TimeDuration;

use crate::responses::JsonResponse;
use crate::routes::auth::session::build_auth_cookie;

pub async fn handle_logout() -> impl IntoResponse {
    let expired_cookie = build_auth_cookie(String::new(), TimeDuration::seconds(0));

    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&expired_cookie.to_string()) {
        headers.insert(SET_COOKIE, value);
    }

    (StatusCode::OK, headers, JsonResponse::success("Logged out"))
}
