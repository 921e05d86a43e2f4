use serde::{Deserialize, Serialize};
use sqlx::{prelude::Type, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "time_off_type")]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TimeOffType {
    Vacation,
    Sick,
    Personal,
    Unpaid,
}

impl TimeOffType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "vacation" => Some(TimeOffType::Vacation),
            "sick" => Some(TimeOffType::Sick),
            "personal" => Some(TimeOffType::Personal),
            "unpaid" => Some(TimeOffType::Unpaid),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOffType::Vacation => "vacation",
            TimeOffType::Sick => "sick",
            TimeOffType::Personal => "personal",
            TimeOffType::Unpaid => "unpaid",
        }
    }
}

/// Shared by time-off and shift-swap requests. Approved and denied are
/// terminal; the review UPDATE carries a `status = 'pending'` guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "request_status")]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Denied,
}

impl RequestStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(RequestStatus::Pending),
            "approved" => Some(RequestStatus::Approved),
            "denied" => Some(RequestStatus::Denied),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TimeOffRequest {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub start_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_date: OffsetDateTime,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: TimeOffType,
    pub status: RequestStatus,
    pub reason: Option<String>,
    pub reviewed_by: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub reviewed_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
