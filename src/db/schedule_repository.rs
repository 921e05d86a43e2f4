use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::models::{
    availability::Availability,
    location::Location,
    shift::{Shift, ShiftStatus},
};

pub struct NewLocation {
    pub organization_id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub timezone: String,
}

#[derive(Default)]
pub struct LocationChanges {
    pub name: Option<String>,
    pub address: Option<String>,
    pub timezone: Option<String>,
    pub is_active: Option<bool>,
}

pub struct NewShift {
    pub organization_id: Uuid,
    pub location_id: Uuid,
    pub user_id: Option<Uuid>,
    pub start_time: OffsetDateTime,
    pub end_time: OffsetDateTime,
    pub position: Option<String>,
    pub notes: Option<String>,
    pub status: ShiftStatus,
}

/// `user_id` is tri-state: `None` leaves the assignment alone,
/// `Some(None)` unassigns, `Some(Some(id))` reassigns.
#[derive(Default)]
pub struct ShiftChanges {
    pub location_id: Option<Uuid>,
    pub user_id: Option<Option<Uuid>>,
    pub start_time: Option<OffsetDateTime>,
    pub end_time: Option<OffsetDateTime>,
    pub position: Option<String>,
    pub notes: Option<String>,
    pub status: Option<ShiftStatus>,
}

pub struct NewAvailability {
    pub user_id: Uuid,
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
    pub is_available: bool,
}

#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn create_location(&self, new_location: &NewLocation) -> Result<Location, sqlx::Error>;
    async fn list_locations(&self, organization_id: Uuid) -> Result<Vec<Location>, sqlx::Error>;
    async fn update_location(
        &self,
        location_id: Uuid,
        organization_id: Uuid,
        changes: &LocationChanges,
    ) -> Result<Option<Location>, sqlx::Error>;

    async fn create_shift(&self, new_shift: &NewShift) -> Result<Shift, sqlx::Error>;
    async fn list_shifts(&self, organization_id: Uuid) -> Result<Vec<Shift>, sqlx::Error>;
    async fn find_shift(
        &self,
        shift_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<Shift>, sqlx::Error>;
    async fn update_shift(
        &self,
        shift_id: Uuid,
        organization_id: Uuid,
        changes: &ShiftChanges,
    ) -> Result<Option<Shift>, sqlx::Error>;
    /// Hard delete. Returns false when the shift is missing or cross-tenant.
    async fn delete_shift(
        &self,
        shift_id: Uuid,
        organization_id: Uuid,
    ) -> Result<bool, sqlx::Error>;

    async fn create_availability(
        &self,
        new_availability: &NewAvailability,
    ) -> Result<Availability, sqlx::Error>;
    async fn list_availability(&self, user_id: Uuid) -> Result<Vec<Availability>, sqlx::Error>;
}
