use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::models::{
    swap::ShiftSwapRequest,
    time_off::{RequestStatus, TimeOffRequest},
};

use super::request_repository::{NewShiftSwapRequest, NewTimeOffRequest, RequestRepository};

const TIME_OFF_COLUMNS: &str = "id, organization_id, user_id, start_date, end_date, type, \
     status, reason, reviewed_by, reviewed_at, created_at";
const SWAP_COLUMNS: &str = "id, organization_id, shift_id, requester_id, target_user_id, \
     status, reason, reviewed_by, reviewed_at, created_at";

pub struct PostgresRequestRepository {
    pub pool: PgPool,
}

#[async_trait]
impl RequestRepository for PostgresRequestRepository {
    async fn create_time_off(
        &self,
        new_request: &NewTimeOffRequest,
    ) -> Result<TimeOffRequest, sqlx::Error> {
        sqlx::query_as::<_, TimeOffRequest>(&format!(
            r#"
            INSERT INTO time_off_requests
                (organization_id, user_id, start_date, end_date, type, reason)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TIME_OFF_COLUMNS}
            "#
        ))
        .bind(new_request.organization_id)
        .bind(new_request.user_id)
        .bind(new_request.start_date)
        .bind(new_request.end_date)
        .bind(new_request.kind)
        .bind(&new_request.reason)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_time_off(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<TimeOffRequest>, sqlx::Error> {
        sqlx::query_as::<_, TimeOffRequest>(&format!(
            "SELECT {TIME_OFF_COLUMNS} FROM time_off_requests
             WHERE organization_id = $1 ORDER BY created_at DESC"
        ))
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_time_off_for_user(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<TimeOffRequest>, sqlx::Error> {
        sqlx::query_as::<_, TimeOffRequest>(&format!(
            "SELECT {TIME_OFF_COLUMNS} FROM time_off_requests
             WHERE organization_id = $1 AND user_id = $2 ORDER BY created_at DESC"
        ))
        .bind(organization_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn find_time_off(
        &self,
        request_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<TimeOffRequest>, sqlx::Error> {
        sqlx::query_as::<_, TimeOffRequest>(&format!(
            "SELECT {TIME_OFF_COLUMNS} FROM time_off_requests
             WHERE id = $1 AND organization_id = $2"
        ))
        .bind(request_id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn review_time_off(
        &self,
        request_id: Uuid,
        organization_id: Uuid,
        status: RequestStatus,
        reviewer_id: Uuid,
        reviewed_at: OffsetDateTime,
    ) -> Result<Option<TimeOffRequest>, sqlx::Error> {
        sqlx::query_as::<_, TimeOffRequest>(&format!(
            r#"
            UPDATE time_off_requests
            SET status = $3, reviewed_by = $4, reviewed_at = $5
            WHERE id = $1 AND organization_id = $2 AND status = 'pending'
            RETURNING {TIME_OFF_COLUMNS}
            "#
        ))
        .bind(request_id)
        .bind(organization_id)
        .bind(status)
        .bind(reviewer_id)
        .bind(reviewed_at)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_swap(
        &self,
        new_request: &NewShiftSwapRequest,
    ) -> Result<ShiftSwapRequest, sqlx::Error> {
        sqlx::query_as::<_, ShiftSwapRequest>(&format!(
            r#"
            INSERT INTO shift_swap_requests
                (organization_id, shift_id, requester_id, target_user_id, reason)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {SWAP_COLUMNS}
            "#
        ))
        .bind(new_request.organization_id)
        .bind(new_request.shift_id)
        .bind(new_request.requester_id)
        .bind(new_request.target_user_id)
        .bind(&new_request.reason)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_swaps(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<ShiftSwapRequest>, sqlx::Error> {
        sqlx::query_as::<_, ShiftSwapRequest>(&format!(
            "SELECT {SWAP_COLUMNS} FROM shift_swap_requests
             WHERE organization_id = $1 ORDER BY created_at DESC"
        ))
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_swaps_for_user(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<ShiftSwapRequest>, sqlx::Error> {
        sqlx::query_as::<_, ShiftSwapRequest>(&format!(
            "SELECT {SWAP_COLUMNS} FROM shift_swap_requests
             WHERE organization_id = $1 AND (requester_id = $2 OR target_user_id = $2)
             ORDER BY created_at DESC"
        ))
        .bind(organization_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn find_swap(
        &self,
        request_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<ShiftSwapRequest>, sqlx::Error> {
        sqlx::query_as::<_, ShiftSwapRequest>(&format!(
            "SELECT {SWAP_COLUMNS} FROM shift_swap_requests
             WHERE id = $1 AND organization_id = $2"
        ))
        .bind(request_id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn deny_swap(
        &self,
        request_id: Uuid,
        organization_id: Uuid,
        reviewer_id: Uuid,
        reviewed_at: OffsetDateTime,
    ) -> Result<Option<ShiftSwapRequest>, sqlx::Error> {
        sqlx::query_as::<_, ShiftSwapRequest>(&format!(
            r#"
            UPDATE shift_swap_requests
            SET status = 'denied', reviewed_by = $3, reviewed_at = $4
            WHERE id = $1 AND organization_id = $2 AND status = 'pending'
            RETURNING {SWAP_COLUMNS}
            "#
        ))
        .bind(request_id)
        .bind(organization_id)
        .bind(reviewer_id)
        .bind(reviewed_at)
        .fetch_optional(&self.pool)
        .await
    }

    async fn approve_swap_and_reassign(
        &self,
        request_id: Uuid,
        organization_id: Uuid,
        reviewer_id: Uuid,
        reviewed_at: OffsetDateTime,
    ) -> Result<Option<ShiftSwapRequest>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let swap = sqlx::query_as::<_, ShiftSwapRequest>(&format!(
            r#"
            UPDATE shift_swap_requests
            SET status = 'approved', reviewed_by = $3, reviewed_at = $4
            WHERE id = $1 AND organization_id = $2 AND status = 'pending'
            RETURNING {SWAP_COLUMNS}
            "#
        ))
        .bind(request_id)
        .bind(organization_id)
        .bind(reviewer_id)
        .bind(reviewed_at)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(swap) = swap else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query("UPDATE shifts SET user_id = $1 WHERE id = $2 AND organization_id = $3")
            .bind(swap.target_user_id)
            .bind(swap.shift_id)
            .bind(organization_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(swap))
    }
}
