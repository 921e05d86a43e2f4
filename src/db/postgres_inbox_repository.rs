use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{message::Message, notification::Notification};

use super::inbox_repository::{InboxRepository, NewMessage, NewNotification};

const NOTIFICATION_COLUMNS: &str =
    "id, organization_id, user_id, type, title, message, is_read, created_at";
const MESSAGE_COLUMNS: &str =
    "id, organization_id, sender_id, recipient_id, subject, body, is_read, is_broadcast, created_at";

pub struct PostgresInboxRepository {
    pub pool: PgPool,
}

#[async_trait]
impl InboxRepository for PostgresInboxRepository {
    async fn create_notification(
        &self,
        new_notification: &NewNotification,
    ) -> Result<Notification, sqlx::Error> {
        sqlx::query_as::<_, Notification>(&format!(
            r#"
            INSERT INTO notifications (organization_id, user_id, type, title, message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        ))
        .bind(new_notification.organization_id)
        .bind(new_notification.user_id)
        .bind(new_notification.kind)
        .bind(&new_notification.title)
        .bind(&new_notification.message)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_notifications(&self, user_id: Uuid) -> Result<Vec<Notification>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications
             WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn mark_notification_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Notification>, sqlx::Error> {
        // is_read = true is idempotent, so no status guard here.
        sqlx::query_as::<_, Notification>(&format!(
            r#"
            UPDATE notifications SET is_read = true
            WHERE id = $1 AND user_id = $2
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        ))
        .bind(notification_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE notifications SET is_read = true WHERE user_id = $1 AND is_read = false")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn create_message(&self, new_message: &NewMessage) -> Result<Message, sqlx::Error> {
        sqlx::query_as::<_, Message>(&format!(
            r#"
            INSERT INTO messages
                (organization_id, sender_id, recipient_id, subject, body, is_broadcast)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(new_message.organization_id)
        .bind(new_message.sender_id)
        .bind(new_message.recipient_id)
        .bind(&new_message.subject)
        .bind(&new_message.body)
        .bind(new_message.is_broadcast)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_messages(&self, organization_id: Uuid) -> Result<Vec<Message>, sqlx::Error> {
        sqlx::query_as::<_, Message>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages
             WHERE organization_id = $1 ORDER BY created_at DESC"
        ))
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn mark_message_read(
        &self,
        message_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<Message>, sqlx::Error> {
        sqlx::query_as::<_, Message>(&format!(
            r#"
            UPDATE messages SET is_read = true
            WHERE id = $1 AND organization_id = $2
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(message_id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await
    }
}
