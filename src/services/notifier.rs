use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use crate::db::inbox_repository::{InboxRepository, NewNotification};
use crate::db::user_repository::UserRepository;
use crate::models::notification::NotificationType;

/// Translates domain state transitions into per-recipient notification
/// rows. Strictly best-effort: a failed insert is logged and skipped so
/// the primary state transition is never blocked or rolled back. Fan-out
/// to many recipients is therefore not atomic — a failure partway
/// through leaves the earlier rows committed.
#[derive(Clone)]
pub struct Notifier {
    users: Arc<dyn UserRepository>,
    inbox: Arc<dyn InboxRepository>,
}

impl Notifier {
    pub fn new(users: Arc<dyn UserRepository>, inbox: Arc<dyn InboxRepository>) -> Self {
        Self { users, inbox }
    }

    pub async fn notify(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        kind: NotificationType,
        title: &str,
        message: &str,
    ) {
        let new_notification = NewNotification {
            organization_id,
            user_id,
            kind,
            title: title.to_string(),
            message: message.to_string(),
        };
        if let Err(error) = self.inbox.create_notification(&new_notification).await {
            warn!(%user_id, ?kind, ?error, "Failed to record notification");
        }
    }

    /// One notification per active user in the organization except the
    /// sender.
    pub async fn broadcast(
        &self,
        organization_id: Uuid,
        sender_id: Uuid,
        title: &str,
        message: &str,
    ) {
        let users = match self.users.list_users(organization_id).await {
            Ok(users) => users,
            Err(error) => {
                warn!(%organization_id, ?error, "Failed to load broadcast recipients");
                return;
            }
        };

        for user in users
            .iter()
            .filter(|u| u.is_active && u.id != sender_id)
        {
            self.notify(
                organization_id,
                user.id,
                NotificationType::Announcement,
                title,
                message,
            )
            .await;
        }
    }
}
