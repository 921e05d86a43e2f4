use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Recurring weekly availability window. Times are wall-clock "HH:MM"
/// strings in the user's location timezone, day_of_week is 0 (Sunday)
/// through 6 (Saturday).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Availability {
    pub id: Uuid,
    pub user_id: Uuid,
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
    pub is_available: bool,
}
