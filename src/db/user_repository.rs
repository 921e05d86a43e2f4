use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{organization::Organization, user::Role, user::User};

pub struct NewUser {
    pub organization_id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: Role,
    pub hourly_rate: Option<Decimal>,
    pub position: Option<String>,
}

/// Partial update. `None` leaves the column untouched; the privileged
/// fields (`role`, `hourly_rate`, `is_active`) are cleared by the route
/// layer before this struct reaches the store when the caller may not
/// set them.
#[derive(Default)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub role: Option<Role>,
    pub hourly_rate: Option<Decimal>,
    pub is_active: Option<bool>,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_organization(&self, name: &str) -> Result<Organization, sqlx::Error>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
    async fn is_email_taken(&self, email: &str) -> Result<bool, sqlx::Error>;
    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error>;
    /// Tenant-checked lookup: misses when the user exists in another organization.
    async fn find_user_in_org(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<User>, sqlx::Error>;
    async fn create_user(&self, new_user: &NewUser) -> Result<User, sqlx::Error>;
    async fn list_users(&self, organization_id: Uuid) -> Result<Vec<User>, sqlx::Error>;
    async fn update_user(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        changes: &UserChanges,
    ) -> Result<Option<User>, sqlx::Error>;
    async fn update_user_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), sqlx::Error>;
}
