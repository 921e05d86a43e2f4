use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{organization::Organization, user::User};

use super::user_repository::{NewUser, UserChanges, UserRepository};

const USER_COLUMNS: &str = "id, organization_id, email, password_hash, first_name, last_name, \
     phone, role, hourly_rate, position, is_active, created_at";

pub struct PostgresUserRepository {
    pub pool: PgPool,
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create_organization(&self, name: &str) -> Result<Organization, sqlx::Error> {
        sqlx::query_as::<_, Organization>(
            r#"
            INSERT INTO organizations (name)
            VALUES ($1)
            RETURNING id, name, plan_tier, created_at
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    async fn is_email_taken(&self, email: &str) -> Result<bool, sqlx::Error> {
        let found: Option<i32> = sqlx::query_scalar("SELECT 1 FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_user_in_org(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND organization_id = $2"
        ))
        .bind(user_id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_user(&self, new_user: &NewUser) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users
                (organization_id, email, password_hash, first_name, last_name,
                 phone, role, hourly_rate, position)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(new_user.organization_id)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.phone)
        .bind(new_user.role)
        .bind(new_user.hourly_rate)
        .bind(&new_user.position)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_users(&self, organization_id: Uuid) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE organization_id = $1 ORDER BY first_name"
        ))
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn update_user(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        changes: &UserChanges,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                first_name  = COALESCE($3, first_name),
                last_name   = COALESCE($4, last_name),
                phone       = COALESCE($5, phone),
                position    = COALESCE($6, position),
                role        = COALESCE($7, role),
                hourly_rate = COALESCE($8, hourly_rate),
                is_active   = COALESCE($9, is_active)
            WHERE id = $1 AND organization_id = $2
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(organization_id)
        .bind(&changes.first_name)
        .bind(&changes.last_name)
        .bind(&changes.phone)
        .bind(&changes.position)
        .bind(changes.role)
        .bind(changes.hourly_rate)
        .bind(changes.is_active)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_user_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
