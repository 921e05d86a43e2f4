use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::{Duration as TimeDuration, OffsetDateTime};
use uuid::Uuid;

use crate::models::user::{Role, User};
use crate::responses::JsonResponse;
use crate::routes::auth::claims::Claims;
use crate::utils::jwt::{create_jwt, decode_jwt, JwtError};

pub const AUTH_COOKIE: &str = "auth_token";
/// Session lifetime, matching the cookie max-age.
pub const SESSION_TTL_DAYS: i64 = 7;

/// The resolved caller, threaded explicitly into every handler. Built
/// once per request from the session cookie; handlers never touch the
/// raw token.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, PartialEq)]
pub struct AuthSession(pub CurrentUser);

impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(AUTH_COOKIE)
            .ok_or_else(|| JsonResponse::unauthorized("Authentication required").into_response())?;

        let claims = decode_jwt(token.value())
            .map_err(|_| JsonResponse::unauthorized("Invalid or expired session").into_response())?
            .claims;

        let id = Uuid::parse_str(&claims.id)
            .map_err(|_| JsonResponse::unauthorized("Invalid session").into_response())?;
        let organization_id = Uuid::parse_str(&claims.organization_id)
            .map_err(|_| JsonResponse::unauthorized("Invalid session").into_response())?;

        Ok(AuthSession(CurrentUser {
            id,
            organization_id,
            email: claims.email,
            role: claims.role,
        }))
    }
}

pub fn build_auth_cookie(token: String, max_age: TimeDuration) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, token))
        .http_only(true)
        .secure(false)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(max_age)
        .build()
}

/// Mint the session cookie headers for a freshly authenticated user.
pub fn issue_session_headers(user: &User) -> Result<HeaderMap, JwtError> {
    let ttl = TimeDuration::days(SESSION_TTL_DAYS);
    let expires_at = OffsetDateTime::now_utc() + ttl;
    let claims = Claims {
        id: user.id.to_string(),
        organization_id: user.organization_id.to_string(),
        email: user.email.clone(),
        role: user.role,
        exp: expires_at.unix_timestamp() as usize,
    };

    let token = create_jwt(&claims)?;
    let cookie = build_auth_cookie(token, ttl);

    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
        headers.insert(header::SET_COOKIE, value);
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use axum::{
        extract::FromRequestParts,
        http::{header, Method, Request, StatusCode},
    };
    use axum_extra::extract::cookie::Cookie;
    use std::time::{SystemTime, UNIX_EPOCH};
    use uuid::Uuid;

    use crate::models::user::Role;
    use crate::routes::auth::claims::Claims;
    use crate::routes::auth::session::AuthSession;
    use crate::utils::jwt::create_jwt;

    fn make_valid_jwt() -> String {
        std::env::set_var("JWT_SECRET", "0123456789abcdef0123456789abcdef");
        let claims = Claims {
            id: Uuid::new_v4().to_string(),
            organization_id: Uuid::new_v4().to_string(),
            email: "test@example.com".into(),
            role: Role::Manager,
            exp: (SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_secs()
                + 3600) as usize,
        };
        create_jwt(&claims).expect("JWT should create successfully")
    }

    #[tokio::test]
    async fn test_valid_token_extracted() {
        let jwt = make_valid_jwt();
        let cookie = Cookie::new("auth_token", jwt);

        let request = Request::builder()
            .method(Method::GET)
            .uri("/")
            .header(header::COOKIE, cookie.to_string())
            .body(())
            .unwrap();

        let mut parts = request.into_parts().0;
        let result = AuthSession::from_request_parts(&mut parts, &()).await;

        let session = result.expect("session should resolve");
        assert_eq!(session.0.email, "test@example.com");
        assert_eq!(session.0.role, Role::Manager);
    }

    #[tokio::test]
    async fn test_missing_cookie_returns_unauthorized() {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/")
            .body(())
            .unwrap();

        let mut parts = request.into_parts().0;
        let result = AuthSession::from_request_parts(&mut parts, &()).await;

        let rejection = result.expect_err("missing cookie should be rejected");
        assert_eq!(rejection.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_token_returns_unauthorized() {
        std::env::set_var("JWT_SECRET", "0123456789abcdef0123456789abcdef");
        let cookie = Cookie::new("auth_token", "invalid.token.here");

        let request = Request::builder()
            .method(Method::GET)
            .uri("/")
            .header(header::COOKIE, cookie.to_string())
            .body(())
            .unwrap();

        let mut parts = request.into_parts().0;
        let result = AuthSession::from_request_parts(&mut parts, &()).await;

        let rejection = result.expect_err("garbage token should be rejected");
        assert_eq!(rejection.status(), StatusCode::UNAUTHORIZED);
    }
}
