//! Fixtures shared by the route test modules: seeded mock entities and
//! a signed session cookie for driving extractor-guarded handlers.

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::db::mock_db::MockDb;
use crate::models::location::Location;
use crate::models::shift::{Shift, ShiftStatus};
use crate::models::user::{Role, User};
use crate::routes::auth::claims::Claims;
use crate::utils::jwt::create_jwt;
use crate::utils::password::hash_password;

pub fn test_user(organization_id: Uuid, role: Role) -> User {
    User {
        id: Uuid::new_v4(),
        organization_id,
        email: format!("user-{}@example.com", Uuid::new_v4()),
        password_hash: String::new(),
        first_name: "Test".into(),
        last_name: "User".into(),
        phone: None,
        role,
        hourly_rate: None,
        position: None,
        is_active: true,
        created_at: OffsetDateTime::now_utc(),
    }
}

/// Seed a user in a fresh organization with a real argon2 hash.
pub fn seeded_user(db: &MockDb, role: Role, password: &str) -> User {
    let mut user = test_user(Uuid::new_v4(), role);
    user.password_hash = hash_password(password).unwrap();
    db.users.lock().unwrap().push(user.clone());
    user
}

/// Seed a user into an existing organization; no usable password.
pub fn seeded_user_in_org(db: &MockDb, organization_id: Uuid, role: Role) -> User {
    let user = test_user(organization_id, role);
    db.users.lock().unwrap().push(user.clone());
    user
}

pub fn seeded_location(db: &MockDb, organization_id: Uuid) -> Location {
    let location = Location {
        id: Uuid::new_v4(),
        organization_id,
        name: "Main Location".into(),
        address: None,
        timezone: "America/New_York".into(),
        is_active: true,
        created_at: OffsetDateTime::now_utc(),
    };
    db.locations.lock().unwrap().push(location.clone());
    location
}

pub fn seeded_shift(
    db: &MockDb,
    organization_id: Uuid,
    location_id: Uuid,
    user_id: Option<Uuid>,
) -> Shift {
    let start = OffsetDateTime::now_utc() + Duration::hours(1);
    let shift = Shift {
        id: Uuid::new_v4(),
        organization_id,
        location_id,
        user_id,
        start_time: start,
        end_time: start + Duration::hours(8),
        position: None,
        notes: None,
        status: ShiftStatus::Scheduled,
        created_at: OffsetDateTime::now_utc(),
    };
    db.shifts.lock().unwrap().push(shift.clone());
    shift
}

/// A Cookie header value carrying a valid session for the given user.
pub fn auth_cookie_for(user: &User) -> String {
    std::env::set_var("JWT_SECRET", "0123456789abcdef0123456789abcdef");
    let claims = Claims {
        id: user.id.to_string(),
        organization_id: user.organization_id.to_string(),
        email: user.email.clone(),
        role: user.role,
        exp: (OffsetDateTime::now_utc() + Duration::hours(1)).unix_timestamp() as usize,
    };
    let token = create_jwt(&claims).expect("test JWT should encode");
    format!("auth_token={token}")
}
