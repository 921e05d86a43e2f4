use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    message::Message,
    notification::{Notification, NotificationType},
};

pub struct NewNotification {
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
}

pub struct NewMessage {
    pub organization_id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Option<Uuid>,
    pub subject: String,
    pub body: String,
    pub is_broadcast: bool,
}

#[async_trait]
pub trait InboxRepository: Send + Sync {
    async fn create_notification(
        &self,
        new_notification: &NewNotification,
    ) -> Result<Notification, sqlx::Error>;
    async fn list_notifications(&self, user_id: Uuid) -> Result<Vec<Notification>, sqlx::Error>;
    /// Scoped to the recipient: another user's notification is a miss.
    /// Marking an already-read notification again is a no-op.
    async fn mark_notification_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Notification>, sqlx::Error>;
    async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<(), sqlx::Error>;

    async fn create_message(&self, new_message: &NewMessage) -> Result<Message, sqlx::Error>;
    async fn list_messages(&self, organization_id: Uuid) -> Result<Vec<Message>, sqlx::Error>;
    async fn mark_message_read(
        &self,
        message_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<Message>, sqlx::Error>;
}
