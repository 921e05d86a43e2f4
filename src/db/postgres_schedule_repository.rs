use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{availability::Availability, location::Location, shift::Shift};

use super::schedule_repository::{
    LocationChanges, NewAvailability, NewLocation, NewShift, ScheduleRepository, ShiftChanges,
};

const LOCATION_COLUMNS: &str = "id, organization_id, name, address, timezone, is_active, created_at";
const SHIFT_COLUMNS: &str = "id, organization_id, location_id, user_id, start_time, end_time, \
     position, notes, status, created_at";

pub struct PostgresScheduleRepository {
    pub pool: PgPool,
}

#[async_trait]
impl ScheduleRepository for PostgresScheduleRepository {
    async fn create_location(&self, new_location: &NewLocation) -> Result<Location, sqlx::Error> {
        sqlx::query_as::<_, Location>(&format!(
            r#"
            INSERT INTO locations (organization_id, name, address, timezone)
            VALUES ($1, $2, $3, $4)
            RETURNING {LOCATION_COLUMNS}
            "#
        ))
        .bind(new_location.organization_id)
        .bind(&new_location.name)
        .bind(&new_location.address)
        .bind(&new_location.timezone)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_locations(&self, organization_id: Uuid) -> Result<Vec<Location>, sqlx::Error> {
        sqlx::query_as::<_, Location>(&format!(
            "SELECT {LOCATION_COLUMNS} FROM locations WHERE organization_id = $1 ORDER BY name"
        ))
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn update_location(
        &self,
        location_id: Uuid,
        organization_id: Uuid,
        changes: &LocationChanges,
    ) -> Result<Option<Location>, sqlx::Error> {
        sqlx::query_as::<_, Location>(&format!(
            r#"
            UPDATE locations SET
                name      = COALESCE($3, name),
                address   = COALESCE($4, address),
                timezone  = COALESCE($5, timezone),
                is_active = COALESCE($6, is_active)
            WHERE id = $1 AND organization_id = $2
            RETURNING {LOCATION_COLUMNS}
            "#
        ))
        .bind(location_id)
        .bind(organization_id)
        .bind(&changes.name)
        .bind(&changes.address)
        .bind(&changes.timezone)
        .bind(changes.is_active)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_shift(&self, new_shift: &NewShift) -> Result<Shift, sqlx::Error> {
        sqlx::query_as::<_, Shift>(&format!(
            r#"
            INSERT INTO shifts
                (organization_id, location_id, user_id, start_time, end_time,
                 position, notes, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {SHIFT_COLUMNS}
            "#
        ))
        .bind(new_shift.organization_id)
        .bind(new_shift.location_id)
        .bind(new_shift.user_id)
        .bind(new_shift.start_time)
        .bind(new_shift.end_time)
        .bind(&new_shift.position)
        .bind(&new_shift.notes)
        .bind(new_shift.status)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_shifts(&self, organization_id: Uuid) -> Result<Vec<Shift>, sqlx::Error> {
        sqlx::query_as::<_, Shift>(&format!(
            "SELECT {SHIFT_COLUMNS} FROM shifts WHERE organization_id = $1 ORDER BY start_time"
        ))
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn find_shift(
        &self,
        shift_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<Shift>, sqlx::Error> {
        sqlx::query_as::<_, Shift>(&format!(
            "SELECT {SHIFT_COLUMNS} FROM shifts WHERE id = $1 AND organization_id = $2"
        ))
        .bind(shift_id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_shift(
        &self,
        shift_id: Uuid,
        organization_id: Uuid,
        changes: &ShiftChanges,
    ) -> Result<Option<Shift>, sqlx::Error> {
        // $6/$7 carry the tri-state assignment: only rewrite user_id when
        // the caller actually sent the field.
        sqlx::query_as::<_, Shift>(&format!(
            r#"
            UPDATE shifts SET
                location_id = COALESCE($3, location_id),
                start_time  = COALESCE($4, start_time),
                end_time    = COALESCE($5, end_time),
                user_id     = CASE WHEN $6 THEN $7 ELSE user_id END,
                position    = COALESCE($8, position),
                notes       = COALESCE($9, notes),
                status      = COALESCE($10, status)
            WHERE id = $1 AND organization_id = $2
            RETURNING {SHIFT_COLUMNS}
            "#
        ))
        .bind(shift_id)
        .bind(organization_id)
        .bind(changes.location_id)
        .bind(changes.start_time)
        .bind(changes.end_time)
        .bind(changes.user_id.is_some())
        .bind(changes.user_id.flatten())
        .bind(&changes.position)
        .bind(&changes.notes)
        .bind(changes.status)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_shift(
        &self,
        shift_id: Uuid,
        organization_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM shifts WHERE id = $1 AND organization_id = $2")
            .bind(shift_id)
            .bind(organization_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_availability(
        &self,
        new_availability: &NewAvailability,
    ) -> Result<Availability, sqlx::Error> {
        sqlx::query_as::<_, Availability>(
            r#"
            INSERT INTO availability (user_id, day_of_week, start_time, end_time, is_available)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, day_of_week, start_time, end_time, is_available
            "#,
        )
        .bind(new_availability.user_id)
        .bind(new_availability.day_of_week)
        .bind(&new_availability.start_time)
        .bind(&new_availability.end_time)
        .bind(new_availability.is_available)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_availability(&self, user_id: Uuid) -> Result<Vec<Availability>, sqlx::Error> {
        sqlx::query_as::<_, Availability>(
            "SELECT id, user_id, day_of_week, start_time, end_time, is_available
             FROM availability WHERE user_id = $1 ORDER BY day_of_week, start_time",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }
}
