use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub sender_id: Uuid,
    /// None means broadcast to the whole organization.
    pub recipient_id: Option<Uuid>,
    pub subject: String,
    pub body: String,
    pub is_read: bool,
    pub is_broadcast: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
