pub mod availability;
pub mod location;
pub mod message;
pub mod notification;
pub mod organization;
pub mod shift;
pub mod swap;
pub mod time_off;
pub mod user;
