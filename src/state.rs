use std::sync::Arc;

use crate::db::{
    inbox_repository::InboxRepository, request_repository::RequestRepository,
    schedule_repository::ScheduleRepository, user_repository::UserRepository,
};
use crate::services::notifier::Notifier;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub schedule: Arc<dyn ScheduleRepository>,
    pub requests: Arc<dyn RequestRepository>,
    pub inbox: Arc<dyn InboxRepository>,
    pub notifier: Notifier,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        schedule: Arc<dyn ScheduleRepository>,
        requests: Arc<dyn RequestRepository>,
        inbox: Arc<dyn InboxRepository>,
    ) -> Self {
        let notifier = Notifier::new(users.clone(), inbox.clone());
        Self {
            users,
            schedule,
            requests,
            inbox,
            notifier,
        }
    }
}

#[cfg(test)]
impl AppState {
    /// All four repositories backed by the same in-memory store.
    pub fn for_tests(db: Arc<crate::db::mock_db::MockDb>) -> Self {
        Self::new(db.clone(), db.clone(), db.clone(), db)
    }
}
