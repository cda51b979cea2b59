use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::BigDecimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::service::error::ServiceError;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "service_request_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ServiceRequestStatus {
    Pending,
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl ServiceRequestStatus {
    pub fn to_str(&self) -> &str {
        match self {
            ServiceRequestStatus::Pending => "pending",
            ServiceRequestStatus::Scheduled => "scheduled",
            ServiceRequestStatus::InProgress => "in_progress",
            ServiceRequestStatus::Completed => "completed",
            ServiceRequestStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "service_request_priority", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ServiceRequestPriority {
    Low,
    Normal,
    High,
    Urgent,
}

/// Cadence shared by service recurrence and payment scheduling. The payment
/// side never carries `Daily`; [`Frequency::payment_view`] collapses it.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "recurrence_frequency", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    OneTime,
    Daily,
    Weekly,
    BiWeekly,
    Monthly,
    Quarterly,
}

impl Frequency {
    /// Maps a service recurrence onto the billing cadence a contract derives
    /// from it. Daily service is billed as a single upfront charge.
    pub fn payment_view(&self) -> Frequency {
        match self {
            Frequency::Weekly => Frequency::Weekly,
            Frequency::BiWeekly => Frequency::BiWeekly,
            Frequency::Monthly => Frequency::Monthly,
            Frequency::Quarterly => Frequency::Quarterly,
            Frequency::Daily | Frequency::OneTime => Frequency::OneTime,
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = ServiceError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "one_time" => Ok(Frequency::OneTime),
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "bi_weekly" => Ok(Frequency::BiWeekly),
            "monthly" => Ok(Frequency::Monthly),
            "quarterly" => Ok(Frequency::Quarterly),
            other => Err(ServiceError::InvalidFrequency(other.to_string())),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct ServiceRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub property_id: Uuid,
    pub service_id: Uuid,

    pub status: ServiceRequestStatus,
    pub priority: ServiceRequestPriority,

    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub walkthrough_date: Option<NaiveDate>,
    pub walkthrough_time: Option<NaiveTime>,
    pub completed_date: Option<NaiveDate>,

    pub estimated_price: BigDecimal,
    pub actual_price: Option<BigDecimal>,
    pub estimated_duration_minutes: Option<i32>,
    pub actual_duration_minutes: Option<i32>,

    pub is_recurring: bool,
    pub recurrence_frequency: Frequency,
    pub recurrence_end_date: Option<NaiveDate>,

    pub cancellation_reason: Option<String>,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_payment_view_mapping() {
        assert_eq!(Frequency::Weekly.payment_view(), Frequency::Weekly);
        assert_eq!(Frequency::BiWeekly.payment_view(), Frequency::BiWeekly);
        assert_eq!(Frequency::Monthly.payment_view(), Frequency::Monthly);
        assert_eq!(Frequency::Quarterly.payment_view(), Frequency::Quarterly);
        assert_eq!(Frequency::Daily.payment_view(), Frequency::OneTime);
        assert_eq!(Frequency::OneTime.payment_view(), Frequency::OneTime);
    }

    #[test]
    fn test_frequency_parsing_rejects_unknown_values() {
        assert_eq!(Frequency::from_str("bi_weekly").unwrap(), Frequency::BiWeekly);
        assert!(matches!(
            Frequency::from_str("fortnightly"),
            Err(ServiceError::InvalidFrequency(_))
        ));
        assert!(matches!(
            Frequency::from_str(""),
            Err(ServiceError::InvalidFrequency(_))
        ));
    }
}
