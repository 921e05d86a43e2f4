use serde::{Deserialize, Serialize};

use crate::models::user::Role;

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Claims {
    pub id: String, // user UUID
    pub organization_id: String,
    pub email: String,
    pub role: Role,
    pub exp: usize, // expiration (as UNIX timestamp)
}
