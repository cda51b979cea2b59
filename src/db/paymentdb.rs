use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::paymentmodel::{NewPayment, Payment, PaymentStatus};

/// Name of the partial unique index that allows at most one non-terminal
/// payment per contract. Inserts that trip it are the DuplicateObligation
/// signal, not a bug.
pub const ACTIVE_PAYMENT_CONSTRAINT: &str = "payments_one_active_per_contract";

pub fn is_active_payment_conflict(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| {
            db.is_unique_violation() && db.constraint() == Some(ACTIVE_PAYMENT_CONSTRAINT)
        })
        .unwrap_or(false)
}

#[async_trait]
pub trait PaymentExt {
    async fn create_payment(&self, new: &NewPayment) -> Result<Payment, sqlx::Error>;

    async fn get_payment(&self, payment_id: Uuid) -> Result<Option<Payment>, sqlx::Error>;

    async fn find_payment_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Payment>, sqlx::Error>;

    async fn has_active_payment(&self, contract_id: Uuid) -> Result<bool, sqlx::Error>;

    async fn list_payments_for_contract(
        &self,
        contract_id: Uuid,
    ) -> Result<Vec<Payment>, sqlx::Error>;

    async fn update_payment_from_event(
        &self,
        payment_id: Uuid,
        status: PaymentStatus,
        provider_payment_id: Option<&str>,
        failure_reason: Option<&str>,
        paid_at: Option<DateTime<Utc>>,
    ) -> Result<Payment, sqlx::Error>;
}

#[async_trait]
impl PaymentExt for super::db::DBClient {
    async fn create_payment(&self, new: &NewPayment) -> Result<Payment, sqlx::Error> {
        sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments
            (user_id, contract_id, service_request_id, amount, currency, status,
             provider, description, reference, expires_at)
            VALUES ($1, $2, $3, $4, $5, 'pending', $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(new.user_id)
        .bind(new.contract_id)
        .bind(new.service_request_id)
        .bind(&new.amount)
        .bind(&new.currency)
        .bind(&new.provider)
        .bind(new.description.as_deref())
        .bind(&new.reference)
        .bind(new.expires_at)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_payment(&self, payment_id: Uuid) -> Result<Option<Payment>, sqlx::Error> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
            .bind(payment_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_payment_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Payment>, sqlx::Error> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE reference = $1")
            .bind(reference)
            .fetch_optional(&self.pool)
            .await
    }

    async fn has_active_payment(&self, contract_id: Uuid) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM payments
                WHERE contract_id = $1
                AND status IN ('pending', 'requires_action', 'processing')
            )
            "#,
        )
        .bind(contract_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn list_payments_for_contract(
        &self,
        contract_id: Uuid,
    ) -> Result<Vec<Payment>, sqlx::Error> {
        sqlx::query_as::<_, Payment>(
            r#"
            SELECT * FROM payments
            WHERE contract_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(contract_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn update_payment_from_event(
        &self,
        payment_id: Uuid,
        status: PaymentStatus,
        provider_payment_id: Option<&str>,
        failure_reason: Option<&str>,
        paid_at: Option<DateTime<Utc>>,
    ) -> Result<Payment, sqlx::Error> {
        sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments
            SET status = $1,
                provider_payment_id = COALESCE($2, provider_payment_id),
                failure_reason = $3,
                paid_at = COALESCE($4, paid_at),
                updated_at = NOW()
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(provider_payment_id)
        .bind(failure_reason)
        .bind(paid_at)
        .bind(payment_id)
        .fetch_one(&self.pool)
        .await
    }
}
