use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use num_traits::Zero;
use sqlx::types::BigDecimal;

use crate::db::{
    contractdb::ContractExt,
    db::DBClient,
    paymentdb::{is_active_payment_conflict, PaymentExt},
    servicerequestdb::ServiceRequestExt,
    userdb::UserExt,
};
use crate::dtos::paymentdtos::CreatePaymentDto;
use crate::models::contractmodel::Contract;
use crate::models::paymentmodel::{NewPayment, Payment, PaymentStatus};
use crate::models::servicerequestmodel::Frequency;
use crate::service::notification_service::NotificationService;
use crate::service::{error::ServiceError, recurrence};
use crate::utils::reference::generate_payment_reference;

/// Next due date after a successful charge. The schedule only ever moves
/// forward, anchored on the due date that was just settled; a one-time
/// contract is done charging.
pub fn next_due_after_success(
    current_due: Option<NaiveDate>,
    frequency: Frequency,
    today: NaiveDate,
) -> Option<NaiveDate> {
    match (current_due, frequency) {
        (_, Frequency::OneTime) => None,
        (Some(due), frequency) => recurrence::next_occurrence(due, frequency),
        // A recurring contract with no due date on record re-anchors on today.
        (None, _) => Some(today),
    }
}

#[derive(Debug, Clone)]
pub struct PaymentService {
    db_client: Arc<DBClient>,
    notifications: Arc<NotificationService>,
    default_currency: String,
}

impl PaymentService {
    pub fn new(
        db_client: Arc<DBClient>,
        notifications: Arc<NotificationService>,
        default_currency: String,
    ) -> Self {
        Self {
            db_client,
            notifications,
            default_currency,
        }
    }

    /// The single creation path for contract obligations, shared by the
    /// approval flow (immediate one-time charges) and the obligation
    /// monitor. The partial unique index on active payments is the dedup
    /// guard; a collision surfaces as DuplicateObligation.
    pub async fn create_for_contract(&self, contract: &Contract) -> Result<Payment, ServiceError> {
        let client = self
            .db_client
            .get_user(contract.client_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {}", contract.client_id)))?;

        let new = NewPayment {
            user_id: client.id,
            contract_id: Some(contract.id),
            service_request_id: contract.service_request_id,
            amount: contract.payment_amount.clone(),
            currency: self.default_currency.clone(),
            provider: "manual".to_string(),
            description: Some(format!("Contract {} payment", contract.contract_number)),
            reference: generate_payment_reference(),
            expires_at: None,
        };

        let payment = match self.db_client.create_payment(&new).await {
            Ok(payment) => payment,
            Err(err) if is_active_payment_conflict(&err) => {
                return Err(ServiceError::DuplicateObligation(contract.id));
            }
            Err(err) => return Err(err.into()),
        };

        tracing::info!(
            "Payment {} created for contract {} ({} {})",
            payment.reference,
            contract.contract_number,
            payment.amount,
            payment.currency
        );

        if let Err(error) = self
            .notifications
            .notify_payment_link(&client, &payment, contract.next_payment_due)
            .await
        {
            tracing::error!(
                "Failed to send payment link email for {}: {}",
                payment.reference,
                error
            );
        }

        Ok(payment)
    }

    /// Admin-initiated creation against a contract or a bare service
    /// request. Contract payments funnel through the same guarded path the
    /// monitor uses.
    pub async fn create_payment(&self, dto: &CreatePaymentDto) -> Result<Payment, ServiceError> {
        if let Some(contract_id) = dto.contract_id {
            let contract = self
                .db_client
                .get_contract(contract_id)
                .await?
                .ok_or_else(|| ServiceError::NotFound(format!("Contract {}", contract_id)))?;
            return self.create_for_contract(&contract).await;
        }

        let request_id = dto
            .service_request_id
            .ok_or_else(|| ServiceError::Other(
                "A contractId or serviceRequestId must be provided".to_string(),
            ))?;

        let request = self
            .db_client
            .get_service_request(request_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Service request {}", request_id)))?;

        let client = self
            .db_client
            .get_user(request.user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {}", request.user_id)))?;

        let amount = dto
            .amount
            .clone()
            .unwrap_or_else(|| request.estimated_price.clone());
        if amount <= BigDecimal::zero() {
            return Err(ServiceError::MissingPrice);
        }

        let new = NewPayment {
            user_id: client.id,
            contract_id: None,
            service_request_id: Some(request.id),
            amount,
            currency: dto
                .currency
                .clone()
                .unwrap_or_else(|| self.default_currency.clone()),
            provider: "manual".to_string(),
            description: dto
                .description
                .clone()
                .or(Some(format!("Service request {} payment", request.id))),
            reference: generate_payment_reference(),
            expires_at: None,
        };

        let payment = self.db_client.create_payment(&new).await?;
        tracing::info!(
            "Payment {} created for service request {}",
            payment.reference,
            request.id
        );

        if let Err(error) = self
            .notifications
            .notify_payment_link(&client, &payment, None)
            .await
        {
            tracing::error!(
                "Failed to send payment link email for {}: {}",
                payment.reference,
                error
            );
        }

        Ok(payment)
    }

    /// Applies a gateway status event to a payment looked up by reference.
    /// Replays of terminal events are ignored so the contract schedule can
    /// never be advanced twice for one charge.
    pub async fn apply_gateway_event(
        &self,
        reference: &str,
        status: PaymentStatus,
        provider_payment_id: Option<&str>,
        failure_reason: Option<&str>,
    ) -> Result<Payment, ServiceError> {
        let payment = self
            .db_client
            .find_payment_by_reference(reference)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Payment {}", reference)))?;

        if payment.status.is_terminal() {
            tracing::warn!(
                "Ignoring {:?} event for terminal payment {}",
                status,
                payment.reference
            );
            return Ok(payment);
        }

        let paid_at = match status {
            PaymentStatus::Succeeded | PaymentStatus::Refunded => Some(Utc::now()),
            _ => None,
        };
        let failure_reason = match status {
            PaymentStatus::Failed | PaymentStatus::Canceled => failure_reason,
            _ => None,
        };

        let updated = self
            .db_client
            .update_payment_from_event(payment.id, status, provider_payment_id, failure_reason, paid_at)
            .await?;

        match status {
            PaymentStatus::Succeeded => self.handle_payment_success(&updated).await?,
            PaymentStatus::Failed | PaymentStatus::Canceled => {
                self.handle_payment_failure(&updated, failure_reason).await;
            }
            _ => {}
        }

        Ok(updated)
    }

    async fn handle_payment_success(&self, payment: &Payment) -> Result<(), ServiceError> {
        if let Some(contract_id) = payment.contract_id {
            let contract = self
                .db_client
                .get_contract(contract_id)
                .await?
                .ok_or_else(|| ServiceError::NotFound(format!("Contract {}", contract_id)))?;

            let today = Utc::now().date_naive();
            let next_due = next_due_after_success(
                contract.next_payment_due,
                contract.payment_frequency,
                today,
            );

            self.db_client
                .advance_payment_schedule(contract.id, next_due, today)
                .await?;

            tracing::info!(
                "Contract {} payment schedule advanced to {:?}",
                contract.contract_number,
                next_due
            );
        }

        if let Ok(Some(client)) = self.db_client.get_user(payment.user_id).await {
            if let Err(error) = self.notifications.notify_payment_receipt(&client, payment).await {
                tracing::error!(
                    "Failed to send receipt email for {}: {}",
                    payment.reference,
                    error
                );
            }
        }

        Ok(())
    }

    async fn handle_payment_failure(&self, payment: &Payment, failure_reason: Option<&str>) {
        if let Ok(Some(client)) = self.db_client.get_user(payment.user_id).await {
            if let Err(error) = self
                .notifications
                .notify_payment_failed(&client, payment, failure_reason)
                .await
            {
                tracing::error!(
                    "Failed to send failure email for {}: {}",
                    payment.reference,
                    error
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_monthly_schedule_advances_from_due_date() {
        let next = next_due_after_success(
            Some(date(2025, 1, 15)),
            Frequency::Monthly,
            date(2025, 1, 16),
        );
        assert_eq!(next, Some(date(2025, 2, 15)));
    }

    #[test]
    fn test_one_time_contract_stops_charging() {
        let next = next_due_after_success(
            Some(date(2025, 3, 1)),
            Frequency::OneTime,
            date(2025, 3, 1),
        );
        assert_eq!(next, None);
        assert_eq!(
            next_due_after_success(None, Frequency::OneTime, date(2025, 3, 1)),
            None
        );
    }

    #[test]
    fn test_missing_due_date_reanchors_on_today() {
        let next = next_due_after_success(None, Frequency::Weekly, date(2025, 3, 1));
        assert_eq!(next, Some(date(2025, 3, 1)));
    }

    #[test]
    fn test_advance_never_moves_backward() {
        let due = date(2025, 1, 15);
        for frequency in [
            Frequency::Weekly,
            Frequency::BiWeekly,
            Frequency::Monthly,
            Frequency::Quarterly,
        ] {
            let next = next_due_after_success(Some(due), frequency, date(2025, 1, 20)).unwrap();
            assert!(next > due, "{:?} moved the schedule backward", frequency);
        }
    }
}
