use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::BigDecimal;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    RequiresAction,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    Refunded,
}

impl PaymentStatus {
    /// A terminal payment no longer blocks new obligations for its contract.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Succeeded
                | PaymentStatus::Failed
                | PaymentStatus::Canceled
                | PaymentStatus::Refunded
        )
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Payment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub contract_id: Option<Uuid>,
    pub service_request_id: Option<Uuid>,

    pub amount: BigDecimal,
    pub currency: String,
    pub status: PaymentStatus,
    pub provider: String,

    pub description: Option<String>,
    pub reference: String,
    pub provider_payment_id: Option<String>,
    pub failure_reason: Option<String>,

    pub paid_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new billing attempt. Status always starts Pending;
/// the gateway webhook moves it from there.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub user_id: Uuid,
    pub contract_id: Option<Uuid>,
    pub service_request_id: Option<Uuid>,
    pub amount: BigDecimal,
    pub currency: String,
    pub provider: String,
    pub description: Option<String>,
    pub reference: String,
    pub expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(PaymentStatus::Succeeded.is_terminal());
        assert!(PaymentStatus::Refunded.is_terminal());
        assert!(!PaymentStatus::Pending.is_terminal());
        assert!(!PaymentStatus::RequiresAction.is_terminal());
        assert!(!PaymentStatus::Processing.is_terminal());
    }
}
