use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::types::BigDecimal;
use uuid::Uuid;
use validator::Validate;

use crate::models::servicerequestmodel::{Frequency, ServiceRequestPriority, ServiceRequestStatus};

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateServiceRequestDto {
    pub user_id: Uuid,
    pub property_id: Uuid,
    pub service_id: Uuid,

    pub priority: Option<ServiceRequestPriority>,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,

    pub estimated_price: BigDecimal,
    #[validate(range(min = 1))]
    pub estimated_duration_minutes: Option<i32>,

    pub is_recurring: bool,
    pub recurrence_frequency: Frequency,
    pub recurrence_end_date: Option<NaiveDate>,

    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,
}

impl CreateServiceRequestDto {
    /// The recurrence end date, when present, must not precede the first
    /// scheduled occurrence.
    pub fn validate_recurrence_window(&self) -> Result<(), String> {
        match self.recurrence_end_date {
            Some(end) if end < self.scheduled_date => Err(format!(
                "recurrenceEndDate {} is before scheduledDate {}",
                end, self.scheduled_date
            )),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct ApproveServiceRequestDto {
    pub approved_by: Option<Uuid>,
    pub confirmed_price: Option<BigDecimal>,

    #[validate(length(max = 2000, message = "Note must be at most 2000 characters"))]
    pub admin_note: Option<String>,
    pub terms: Option<String>,
    pub scope: Option<String>,

    pub work_days: Option<Vec<String>>,
    pub work_start_time: Option<NaiveTime>,
    pub work_end_time: Option<NaiveTime>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CancelServiceRequestDto {
    #[validate(length(min = 1, max = 2000, message = "A cancellation reason is required"))]
    pub cancellation_reason: String,
}

#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct CompleteServiceRequestDto {
    pub actual_price: Option<BigDecimal>,
    #[validate(range(min = 1))]
    pub actual_duration_minutes: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScheduleWalkthroughDto {
    pub walkthrough_date: NaiveDate,
    pub walkthrough_time: Option<NaiveTime>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RequestQueryDto {
    pub status: Option<ServiceRequestStatus>,
    #[validate(range(min = 1))]
    pub page: Option<usize>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<usize>,
}
