use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use uuid::Uuid;

use crate::models::contractmodel::{Contract, ContractStatus, NewContract};

#[async_trait]
pub trait ContractExt {
    /// Persists a factory-built contract, allocating the next
    /// `CONT-<year>-<seq>` number. Retries when two approvals race on the
    /// same sequence slot.
    async fn create_contract(&self, new: &NewContract) -> Result<Contract, sqlx::Error>;

    async fn get_contract(&self, contract_id: Uuid) -> Result<Option<Contract>, sqlx::Error>;

    async fn list_contracts(&self, limit: i64, offset: i64) -> Result<Vec<Contract>, sqlx::Error>;

    async fn find_active_contracts(&self) -> Result<Vec<Contract>, sqlx::Error>;

    /// Active contracts whose next payment is due on exactly `due_on`.
    async fn find_contracts_due_on(&self, due_on: NaiveDate)
        -> Result<Vec<Contract>, sqlx::Error>;

    /// Active contracts whose next payment due date is strictly before `today`.
    async fn find_overdue_contracts(&self, today: NaiveDate)
        -> Result<Vec<Contract>, sqlx::Error>;

    async fn update_contract_status(
        &self,
        contract_id: Uuid,
        status: ContractStatus,
        is_active: bool,
    ) -> Result<Option<Contract>, sqlx::Error>;

    async fn append_contract_note(
        &self,
        contract_id: Uuid,
        note: &str,
    ) -> Result<Option<Contract>, sqlx::Error>;

    /// Records a successful payment: bumps last_payment_date and moves
    /// next_payment_due in one statement so the schedule never goes backward
    /// under concurrent writers.
    async fn advance_payment_schedule(
        &self,
        contract_id: Uuid,
        next_payment_due: Option<NaiveDate>,
        paid_on: NaiveDate,
    ) -> Result<Option<Contract>, sqlx::Error>;
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

#[async_trait]
impl ContractExt for super::db::DBClient {
    async fn create_contract(&self, new: &NewContract) -> Result<Contract, sqlx::Error> {
        let year = Utc::now().year();
        let mut attempt = 0;

        loop {
            attempt += 1;

            let count: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM contracts WHERE contract_number LIKE $1",
            )
            .bind(format!("CONT-{}-%", year))
            .fetch_one(&self.pool)
            .await?;

            let contract_number = format!("CONT-{}-{:04}", year, count + 1);

            let inserted = sqlx::query_as::<_, Contract>(
                r#"
                INSERT INTO contracts
                (client_id, property_id, service_request_id, contract_number, status,
                 start_date, end_date, payment_amount, payment_frequency, next_payment_due,
                 work_days, work_start_time, work_end_time, service_frequency,
                 terms, notes, scope, is_active, estimated_duration_minutes)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                        $11, $12, $13, $14, $15, $16, $17, $18, $19)
                RETURNING *
                "#,
            )
            .bind(new.client_id)
            .bind(new.property_id)
            .bind(new.service_request_id)
            .bind(&contract_number)
            .bind(new.status)
            .bind(new.start_date)
            .bind(new.end_date)
            .bind(&new.payment_amount)
            .bind(new.payment_frequency)
            .bind(new.next_payment_due)
            .bind(new.work_days.as_deref())
            .bind(new.work_start_time)
            .bind(new.work_end_time)
            .bind(new.service_frequency)
            .bind(new.terms.as_deref())
            .bind(new.notes.as_deref())
            .bind(new.scope.as_deref())
            .bind(new.is_active)
            .bind(new.estimated_duration_minutes)
            .fetch_one(&self.pool)
            .await;

            match inserted {
                Ok(contract) => return Ok(contract),
                Err(err) if attempt < 3 && is_unique_violation(&err) => continue,
                Err(err) => return Err(err),
            }
        }
    }

    async fn get_contract(&self, contract_id: Uuid) -> Result<Option<Contract>, sqlx::Error> {
        sqlx::query_as::<_, Contract>("SELECT * FROM contracts WHERE id = $1")
            .bind(contract_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn list_contracts(&self, limit: i64, offset: i64) -> Result<Vec<Contract>, sqlx::Error> {
        sqlx::query_as::<_, Contract>(
            "SELECT * FROM contracts ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn find_active_contracts(&self) -> Result<Vec<Contract>, sqlx::Error> {
        sqlx::query_as::<_, Contract>(
            r#"
            SELECT * FROM contracts
            WHERE status = 'active' AND is_active = true
            ORDER BY start_date ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn find_contracts_due_on(
        &self,
        due_on: NaiveDate,
    ) -> Result<Vec<Contract>, sqlx::Error> {
        sqlx::query_as::<_, Contract>(
            r#"
            SELECT * FROM contracts
            WHERE status = 'active' AND is_active = true AND next_payment_due = $1
            ORDER BY next_payment_due ASC
            "#,
        )
        .bind(due_on)
        .fetch_all(&self.pool)
        .await
    }

    async fn find_overdue_contracts(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<Contract>, sqlx::Error> {
        sqlx::query_as::<_, Contract>(
            r#"
            SELECT * FROM contracts
            WHERE status = 'active' AND is_active = true AND next_payment_due < $1
            ORDER BY next_payment_due ASC
            "#,
        )
        .bind(today)
        .fetch_all(&self.pool)
        .await
    }

    async fn update_contract_status(
        &self,
        contract_id: Uuid,
        status: ContractStatus,
        is_active: bool,
    ) -> Result<Option<Contract>, sqlx::Error> {
        sqlx::query_as::<_, Contract>(
            r#"
            UPDATE contracts
            SET status = $1, is_active = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(is_active)
        .bind(contract_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn append_contract_note(
        &self,
        contract_id: Uuid,
        note: &str,
    ) -> Result<Option<Contract>, sqlx::Error> {
        sqlx::query_as::<_, Contract>(
            r#"
            UPDATE contracts
            SET notes = CASE WHEN notes IS NULL THEN $1 ELSE notes || E'\n\n' || $1 END,
                updated_at = NOW()
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(note)
        .bind(contract_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn advance_payment_schedule(
        &self,
        contract_id: Uuid,
        next_payment_due: Option<NaiveDate>,
        paid_on: NaiveDate,
    ) -> Result<Option<Contract>, sqlx::Error> {
        sqlx::query_as::<_, Contract>(
            r#"
            UPDATE contracts
            SET next_payment_due = $1, last_payment_date = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(next_payment_due)
        .bind(paid_on)
        .bind(contract_id)
        .fetch_optional(&self.pool)
        .await
    }
}
