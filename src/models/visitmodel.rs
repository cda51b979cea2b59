use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "service_visit_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ServiceVisitStatus {
    Pending,
    Completed,
    Skipped,
    Cancelled,
}

/// One concrete occurrence of work under a contract. Uniqueness of
/// (contract_id, scheduled_date) is enforced by the storage layer.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct ServiceVisit {
    pub id: Uuid,
    pub contract_id: Uuid,
    pub service_request_id: Option<Uuid>,

    pub scheduled_date: NaiveDate,
    pub scheduled_time: Option<NaiveTime>,
    pub status: ServiceVisitStatus,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
