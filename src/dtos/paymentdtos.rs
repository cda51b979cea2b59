use serde::{Deserialize, Serialize};
use sqlx::types::BigDecimal;
use uuid::Uuid;
use validator::Validate;

use crate::models::paymentmodel::PaymentStatus;

#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct CreatePaymentDto {
    pub contract_id: Option<Uuid>,
    pub service_request_id: Option<Uuid>,
    pub amount: Option<BigDecimal>,
    #[validate(length(equal = 3, message = "Currency must be a 3-letter code"))]
    pub currency: Option<String>,
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
}

/// Simplified gateway callback: the processor reports a status change for a
/// payment we issued, identified by our reference.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct PaymentWebhookDto {
    #[validate(length(min = 1))]
    pub reference: String,
    pub status: PaymentStatus,
    pub provider_payment_id: Option<String>,
    pub failure_reason: Option<String>,
}
