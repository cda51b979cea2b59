use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::BigDecimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::servicerequestmodel::Frequency;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "contract_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Draft,
    Active,
    Paused,
    Completed,
    Cancelled,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Contract {
    pub id: Uuid,
    pub client_id: Uuid,
    pub property_id: Uuid,
    pub service_request_id: Option<Uuid>,

    // E.g. "CONT-2025-0001", sequential per calendar year
    pub contract_number: String,
    pub status: ContractStatus,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,

    pub payment_amount: BigDecimal,
    pub payment_frequency: Frequency,
    pub next_payment_due: Option<NaiveDate>,
    pub last_payment_date: Option<NaiveDate>,

    pub work_days: Option<Vec<String>>,
    pub work_start_time: Option<NaiveTime>,
    pub work_end_time: Option<NaiveTime>,
    pub service_frequency: Frequency,

    pub terms: Option<String>,
    pub notes: Option<String>,
    pub scope: Option<String>,

    pub is_active: bool,
    pub total_contract_value: Option<BigDecimal>,
    pub estimated_duration_minutes: Option<i32>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fully resolved contract payload produced by the factory. Persistence
/// allocates the contract number and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewContract {
    pub client_id: Uuid,
    pub property_id: Uuid,
    pub service_request_id: Option<Uuid>,

    pub status: ContractStatus,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,

    pub payment_amount: BigDecimal,
    pub payment_frequency: Frequency,
    pub next_payment_due: Option<NaiveDate>,

    pub work_days: Option<Vec<String>>,
    pub work_start_time: Option<NaiveTime>,
    pub work_end_time: Option<NaiveTime>,
    pub service_frequency: Frequency,

    pub terms: Option<String>,
    pub notes: Option<String>,
    pub scope: Option<String>,

    pub is_active: bool,
    pub estimated_duration_minutes: Option<i32>,
}
