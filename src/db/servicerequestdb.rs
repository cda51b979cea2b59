use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::types::BigDecimal;
use uuid::Uuid;

use crate::dtos::servicerequestdtos::CreateServiceRequestDto;
use crate::models::servicerequestmodel::{ServiceRequest, ServiceRequestStatus};

#[async_trait]
pub trait ServiceRequestExt {
    async fn create_service_request(
        &self,
        dto: &CreateServiceRequestDto,
    ) -> Result<ServiceRequest, sqlx::Error>;

    async fn get_service_request(
        &self,
        request_id: Uuid,
    ) -> Result<Option<ServiceRequest>, sqlx::Error>;

    async fn list_service_requests(
        &self,
        status: Option<ServiceRequestStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ServiceRequest>, sqlx::Error>;

    /// Pending -> Scheduled, applying an optional confirmed price. The WHERE
    /// clause is the transition guard: a request in any other status returns
    /// no row and stays untouched.
    async fn mark_request_scheduled(
        &self,
        request_id: Uuid,
        confirmed_price: Option<&BigDecimal>,
    ) -> Result<Option<ServiceRequest>, sqlx::Error>;

    async fn mark_request_in_progress(
        &self,
        request_id: Uuid,
    ) -> Result<Option<ServiceRequest>, sqlx::Error>;

    async fn complete_service_request(
        &self,
        request_id: Uuid,
        actual_price: Option<&BigDecimal>,
        actual_duration_minutes: Option<i32>,
    ) -> Result<Option<ServiceRequest>, sqlx::Error>;

    async fn cancel_service_request(
        &self,
        request_id: Uuid,
        reason: Option<&str>,
    ) -> Result<Option<ServiceRequest>, sqlx::Error>;

    async fn schedule_walkthrough(
        &self,
        request_id: Uuid,
        date: NaiveDate,
        time: Option<NaiveTime>,
    ) -> Result<Option<ServiceRequest>, sqlx::Error>;

    /// Sum of quantity * unit_price over the request's product line items,
    /// None when the request has no line items at all.
    async fn product_line_total(
        &self,
        request_id: Uuid,
    ) -> Result<Option<BigDecimal>, sqlx::Error>;
}

#[async_trait]
impl ServiceRequestExt for super::db::DBClient {
    async fn create_service_request(
        &self,
        dto: &CreateServiceRequestDto,
    ) -> Result<ServiceRequest, sqlx::Error> {
        sqlx::query_as::<_, ServiceRequest>(
            r#"
            INSERT INTO service_requests
            (user_id, property_id, service_id, priority, scheduled_date, scheduled_time,
             estimated_price, estimated_duration_minutes, is_recurring,
             recurrence_frequency, recurrence_end_date, notes)
            VALUES ($1, $2, $3, COALESCE($4, 'normal'::service_request_priority),
                    $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(dto.user_id)
        .bind(dto.property_id)
        .bind(dto.service_id)
        .bind(dto.priority)
        .bind(dto.scheduled_date)
        .bind(dto.scheduled_time)
        .bind(&dto.estimated_price)
        .bind(dto.estimated_duration_minutes)
        .bind(dto.is_recurring)
        .bind(dto.recurrence_frequency)
        .bind(dto.recurrence_end_date)
        .bind(dto.notes.as_deref())
        .fetch_one(&self.pool)
        .await
    }

    async fn get_service_request(
        &self,
        request_id: Uuid,
    ) -> Result<Option<ServiceRequest>, sqlx::Error> {
        sqlx::query_as::<_, ServiceRequest>("SELECT * FROM service_requests WHERE id = $1")
            .bind(request_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn list_service_requests(
        &self,
        status: Option<ServiceRequestStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ServiceRequest>, sqlx::Error> {
        sqlx::query_as::<_, ServiceRequest>(
            r#"
            SELECT * FROM service_requests
            WHERE ($1::service_request_status IS NULL OR status = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn mark_request_scheduled(
        &self,
        request_id: Uuid,
        confirmed_price: Option<&BigDecimal>,
    ) -> Result<Option<ServiceRequest>, sqlx::Error> {
        sqlx::query_as::<_, ServiceRequest>(
            r#"
            UPDATE service_requests
            SET status = 'scheduled',
                estimated_price = COALESCE($1, estimated_price),
                updated_at = NOW()
            WHERE id = $2 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(confirmed_price)
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn mark_request_in_progress(
        &self,
        request_id: Uuid,
    ) -> Result<Option<ServiceRequest>, sqlx::Error> {
        sqlx::query_as::<_, ServiceRequest>(
            r#"
            UPDATE service_requests
            SET status = 'in_progress', updated_at = NOW()
            WHERE id = $1 AND status = 'scheduled'
            RETURNING *
            "#,
        )
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn complete_service_request(
        &self,
        request_id: Uuid,
        actual_price: Option<&BigDecimal>,
        actual_duration_minutes: Option<i32>,
    ) -> Result<Option<ServiceRequest>, sqlx::Error> {
        sqlx::query_as::<_, ServiceRequest>(
            r#"
            UPDATE service_requests
            SET status = 'completed',
                completed_date = CURRENT_DATE,
                actual_price = COALESCE($1, actual_price),
                actual_duration_minutes = COALESCE($2, actual_duration_minutes),
                updated_at = NOW()
            WHERE id = $3 AND status IN ('scheduled', 'in_progress')
            RETURNING *
            "#,
        )
        .bind(actual_price)
        .bind(actual_duration_minutes)
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn cancel_service_request(
        &self,
        request_id: Uuid,
        reason: Option<&str>,
    ) -> Result<Option<ServiceRequest>, sqlx::Error> {
        sqlx::query_as::<_, ServiceRequest>(
            r#"
            UPDATE service_requests
            SET status = 'cancelled', cancellation_reason = $1, updated_at = NOW()
            WHERE id = $2 AND status NOT IN ('completed', 'cancelled')
            RETURNING *
            "#,
        )
        .bind(reason)
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn schedule_walkthrough(
        &self,
        request_id: Uuid,
        date: NaiveDate,
        time: Option<NaiveTime>,
    ) -> Result<Option<ServiceRequest>, sqlx::Error> {
        sqlx::query_as::<_, ServiceRequest>(
            r#"
            UPDATE service_requests
            SET walkthrough_date = $1, walkthrough_time = $2, updated_at = NOW()
            WHERE id = $3 AND status NOT IN ('completed', 'cancelled')
            RETURNING *
            "#,
        )
        .bind(date)
        .bind(time)
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn product_line_total(
        &self,
        request_id: Uuid,
    ) -> Result<Option<BigDecimal>, sqlx::Error> {
        let total: Option<BigDecimal> = sqlx::query_scalar(
            r#"
            SELECT SUM(quantity * unit_price)
            FROM service_request_products
            WHERE service_request_id = $1
            "#,
        )
        .bind(request_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }
}
