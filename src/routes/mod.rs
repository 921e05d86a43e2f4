use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::state::AppState;

pub mod auth;
pub mod availability;
pub mod locations;
pub mod messages;
pub mod notifications;
pub mod reports;
pub mod shifts;
pub mod swaps;
pub mod time_off;
pub mod users;

#[cfg(test)]
pub mod test_support;

#[cfg(test)]
mod scenario_tests;

/// The full API surface; the binary attaches state and middleware.
pub fn api_router() -> Router<AppState> {
    let auth_routes = Router::new()
        .route("/register", post(auth::handle_register))
        .route("/login", post(auth::handle_login))
        .route("/logout", post(auth::handle_logout))
        .route("/me", get(auth::handle_me))
        .route("/change-password", post(auth::handle_change_password));

    Router::new()
        .nest("/api/auth", auth_routes)
        .route(
            "/api/users",
            get(users::list_users).post(users::create_user),
        )
        .route("/api/users/{id}", patch(users::update_user))
        .route(
            "/api/locations",
            get(locations::list_locations).post(locations::create_location),
        )
        .route("/api/locations/{id}", patch(locations::update_location))
        .route(
            "/api/shifts",
            get(shifts::list_shifts).post(shifts::create_shift),
        )
        .route(
            "/api/shifts/{id}",
            patch(shifts::update_shift).delete(shifts::delete_shift),
        )
        .route(
            "/api/time-off",
            get(time_off::list_time_off).post(time_off::create_time_off),
        )
        .route("/api/time-off/{id}", patch(time_off::review_time_off))
        .route(
            "/api/notifications",
            get(notifications::list_notifications),
        )
        .route(
            "/api/notifications/{id}",
            patch(notifications::mark_notification_read),
        )
        .route(
            "/api/notifications/mark-all-read",
            post(notifications::mark_all_notifications_read),
        )
        .route(
            "/api/messages",
            get(messages::list_messages).post(messages::create_message),
        )
        .route("/api/messages/{id}", patch(messages::mark_message_read))
        .route(
            "/api/swaps",
            get(swaps::list_swaps).post(swaps::create_swap),
        )
        .route("/api/swaps/{id}", patch(swaps::review_swap))
        .route(
            "/api/availability",
            get(availability::list_availability).post(availability::create_availability),
        )
        .route("/api/reports", get(reports::get_reports))
}
