use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::models::{
    swap::ShiftSwapRequest,
    time_off::{RequestStatus, TimeOffRequest, TimeOffType},
};

pub struct NewTimeOffRequest {
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub start_date: OffsetDateTime,
    pub end_date: OffsetDateTime,
    pub kind: TimeOffType,
    pub reason: Option<String>,
}

pub struct NewShiftSwapRequest {
    pub organization_id: Uuid,
    pub shift_id: Uuid,
    pub requester_id: Uuid,
    pub target_user_id: Uuid,
    pub reason: Option<String>,
}

#[async_trait]
pub trait RequestRepository: Send + Sync {
    async fn create_time_off(
        &self,
        new_request: &NewTimeOffRequest,
    ) -> Result<TimeOffRequest, sqlx::Error>;
    async fn list_time_off(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<TimeOffRequest>, sqlx::Error>;
    async fn list_time_off_for_user(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<TimeOffRequest>, sqlx::Error>;
    async fn find_time_off(
        &self,
        request_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<TimeOffRequest>, sqlx::Error>;
    /// Resolves a pending request. Returns None when the request is
    /// missing, cross-tenant, or no longer pending — the guard that makes
    /// concurrent double-review impossible.
    async fn review_time_off(
        &self,
        request_id: Uuid,
        organization_id: Uuid,
        status: RequestStatus,
        reviewer_id: Uuid,
        reviewed_at: OffsetDateTime,
    ) -> Result<Option<TimeOffRequest>, sqlx::Error>;

    async fn create_swap(
        &self,
        new_request: &NewShiftSwapRequest,
    ) -> Result<ShiftSwapRequest, sqlx::Error>;
    async fn list_swaps(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<ShiftSwapRequest>, sqlx::Error>;
    /// Swaps where the user is requester or target.
    async fn list_swaps_for_user(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<ShiftSwapRequest>, sqlx::Error>;
    async fn find_swap(
        &self,
        request_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<ShiftSwapRequest>, sqlx::Error>;
    async fn deny_swap(
        &self,
        request_id: Uuid,
        organization_id: Uuid,
        reviewer_id: Uuid,
        reviewed_at: OffsetDateTime,
    ) -> Result<Option<ShiftSwapRequest>, sqlx::Error>;
    /// Approves the swap and moves the shift to the target user inside a
    /// single transaction: both rows change or neither does.
    async fn approve_swap_and_reassign(
        &self,
        request_id: Uuid,
        organization_id: Uuid,
        reviewer_id: Uuid,
        reviewed_at: OffsetDateTime,
    ) -> Result<Option<ShiftSwapRequest>, sqlx::Error>;
}
