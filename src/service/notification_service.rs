use crate::config::Config;
use crate::mail::mails::{self, ContractEmailData, PaymentEmailData};
use crate::models::contractmodel::Contract;
use crate::models::paymentmodel::Payment;
use crate::models::propertymodel::Property;
use crate::models::usermodel::User;
use crate::service::contract_document::format_payment_frequency;
use crate::service::error::ServiceError;

/// Templated customer mail. Every call is fire-and-forget from the caller's
/// point of view: failures are returned so the caller can log them, but they
/// must never abort the owning operation.
#[derive(Debug, Clone)]
pub struct NotificationService {
    config: Config,
}

impl NotificationService {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn notify_welcome(
        &self,
        user: &User,
        temporary_password: &str,
    ) -> Result<(), ServiceError> {
        tracing::info!("Welcome notification for new customer {}", user.email);
        mails::send_welcome_email(&self.config, &user.email, &user.full_name(), temporary_password)
            .await
    }

    pub async fn notify_contract_approved(
        &self,
        user: &User,
        contract: &Contract,
        property: &Property,
        contract_sheet_html: &str,
    ) -> Result<(), ServiceError> {
        tracing::info!(
            "Contract approval notification for {} ({})",
            user.email,
            contract.contract_number
        );

        let data = ContractEmailData {
            client_name: user.full_name(),
            contract_number: contract.contract_number.clone(),
            start_date: contract.start_date.format("%B %d, %Y").to_string(),
            end_date: contract
                .end_date
                .map(|date| date.format("%B %d, %Y").to_string()),
            payment_amount: contract.payment_amount.to_string(),
            payment_frequency: format_payment_frequency(contract.payment_frequency).to_string(),
            next_payment_due: contract
                .next_payment_due
                .map(|date| date.format("%B %d, %Y").to_string()),
            property_name: property.name.clone(),
            property_address: property.address.clone(),
            dashboard_url: format!(
                "{}/dashboard/contracts/{}",
                self.config.app_url, contract.id
            ),
        };

        mails::send_contract_approved_email(&self.config, &user.email, &data, contract_sheet_html)
            .await
    }

    pub async fn notify_payment_link(
        &self,
        user: &User,
        payment: &Payment,
        due_date: Option<chrono::NaiveDate>,
    ) -> Result<(), ServiceError> {
        tracing::info!(
            "Payment link notification for {} (reference {})",
            user.email,
            payment.reference
        );

        let data = PaymentEmailData {
            client_name: user.full_name(),
            reference: payment.reference.clone(),
            amount: payment.amount.to_string(),
            currency: payment.currency.clone(),
            description: payment
                .description
                .clone()
                .unwrap_or_else(|| "your service payment".to_string()),
            due_date: due_date.map(|date| date.format("%B %d, %Y").to_string()),
        };

        mails::send_payment_link_email(&self.config, &user.email, &data).await
    }

    pub async fn notify_payment_receipt(
        &self,
        user: &User,
        payment: &Payment,
    ) -> Result<(), ServiceError> {
        tracing::info!(
            "Payment receipt notification for {} (reference {})",
            user.email,
            payment.reference
        );

        let data = PaymentEmailData {
            client_name: user.full_name(),
            reference: payment.reference.clone(),
            amount: payment.amount.to_string(),
            currency: payment.currency.clone(),
            description: payment
                .description
                .clone()
                .unwrap_or_else(|| "your service payment".to_string()),
            due_date: None,
        };

        mails::send_payment_receipt_email(&self.config, &user.email, &data).await
    }

    pub async fn notify_payment_failed(
        &self,
        user: &User,
        payment: &Payment,
        failure_reason: Option<&str>,
    ) -> Result<(), ServiceError> {
        tracing::info!(
            "Payment failure notification for {} (reference {})",
            user.email,
            payment.reference
        );

        let data = PaymentEmailData {
            client_name: user.full_name(),
            reference: payment.reference.clone(),
            amount: payment.amount.to_string(),
            currency: payment.currency.clone(),
            description: payment
                .description
                .clone()
                .unwrap_or_else(|| "your service payment".to_string()),
            due_date: None,
        };

        mails::send_payment_failed_email(&self.config, &user.email, &data, failure_reason).await
    }
}
