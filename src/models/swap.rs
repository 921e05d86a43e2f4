use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::models::time_off::RequestStatus;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ShiftSwapRequest {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub shift_id: Uuid,
    pub requester_id: Uuid,
    pub target_user_id: Uuid,
    pub status: RequestStatus,
    pub reason: Option<String>,
    pub reviewed_by: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub reviewed_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
