use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::models::visitmodel::{ServiceVisit, ServiceVisitStatus};

#[async_trait]
pub trait ServiceVisitExt {
    async fn find_latest_visit(
        &self,
        contract_id: Uuid,
    ) -> Result<Option<ServiceVisit>, sqlx::Error>;

    async fn visit_exists_on(
        &self,
        contract_id: Uuid,
        date: NaiveDate,
    ) -> Result<bool, sqlx::Error>;

    /// Inserts a pending visit; returns None when a visit already exists for
    /// (contract, date). The unique index is the authoritative guard, so a
    /// racing scheduler tick loses cleanly instead of erroring.
    async fn create_visit(
        &self,
        contract_id: Uuid,
        service_request_id: Option<Uuid>,
        scheduled_date: NaiveDate,
        scheduled_time: Option<NaiveTime>,
    ) -> Result<Option<ServiceVisit>, sqlx::Error>;

    async fn list_visits_for_contract(
        &self,
        contract_id: Uuid,
    ) -> Result<Vec<ServiceVisit>, sqlx::Error>;

    /// Field staff resolving a pending visit. Only pending visits transition.
    async fn resolve_visit(
        &self,
        visit_id: Uuid,
        status: ServiceVisitStatus,
        notes: Option<&str>,
    ) -> Result<Option<ServiceVisit>, sqlx::Error>;
}

#[async_trait]
impl ServiceVisitExt for super::db::DBClient {
    async fn find_latest_visit(
        &self,
        contract_id: Uuid,
    ) -> Result<Option<ServiceVisit>, sqlx::Error> {
        sqlx::query_as::<_, ServiceVisit>(
            r#"
            SELECT * FROM service_visits
            WHERE contract_id = $1
            ORDER BY scheduled_date DESC
            LIMIT 1
            "#,
        )
        .bind(contract_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn visit_exists_on(
        &self,
        contract_id: Uuid,
        date: NaiveDate,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM service_visits
                WHERE contract_id = $1 AND scheduled_date = $2
            )
            "#,
        )
        .bind(contract_id)
        .bind(date)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn create_visit(
        &self,
        contract_id: Uuid,
        service_request_id: Option<Uuid>,
        scheduled_date: NaiveDate,
        scheduled_time: Option<NaiveTime>,
    ) -> Result<Option<ServiceVisit>, sqlx::Error> {
        sqlx::query_as::<_, ServiceVisit>(
            r#"
            INSERT INTO service_visits
            (contract_id, service_request_id, scheduled_date, scheduled_time, status)
            VALUES ($1, $2, $3, $4, 'pending')
            ON CONFLICT (contract_id, scheduled_date) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(contract_id)
        .bind(service_request_id)
        .bind(scheduled_date)
        .bind(scheduled_time)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_visits_for_contract(
        &self,
        contract_id: Uuid,
    ) -> Result<Vec<ServiceVisit>, sqlx::Error> {
        sqlx::query_as::<_, ServiceVisit>(
            r#"
            SELECT * FROM service_visits
            WHERE contract_id = $1
            ORDER BY scheduled_date ASC
            "#,
        )
        .bind(contract_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn resolve_visit(
        &self,
        visit_id: Uuid,
        status: ServiceVisitStatus,
        notes: Option<&str>,
    ) -> Result<Option<ServiceVisit>, sqlx::Error> {
        sqlx::query_as::<_, ServiceVisit>(
            r#"
            UPDATE service_visits
            SET status = $1, notes = COALESCE($2, notes), updated_at = NOW()
            WHERE id = $3 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(notes)
        .bind(visit_id)
        .fetch_optional(&self.pool)
        .await
    }
}
