use super::sendmail::send_email;
use crate::config::Config;
use crate::service::error::ServiceError;

/// Everything the contract-approval template needs, pre-formatted.
#[derive(Debug, Clone)]
pub struct ContractEmailData {
    pub client_name: String,
    pub contract_number: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub payment_amount: String,
    pub payment_frequency: String,
    pub next_payment_due: Option<String>,
    pub property_name: String,
    pub property_address: String,
    pub dashboard_url: String,
}

#[derive(Debug, Clone)]
pub struct PaymentEmailData {
    pub client_name: String,
    pub reference: String,
    pub amount: String,
    pub currency: String,
    pub description: String,
    pub due_date: Option<String>,
}

pub async fn send_welcome_email(
    config: &Config,
    to_email: &str,
    client_name: &str,
    temporary_password: &str,
) -> Result<(), ServiceError> {
    let subject = "Welcome - your account is ready";
    let template_path = "src/mail/templates/Welcome-email.html";
    let placeholders = vec![
        ("{{client_name}}".to_string(), client_name.to_string()),
        ("{{email}}".to_string(), to_email.to_string()),
        (
            "{{temporary_password}}".to_string(),
            temporary_password.to_string(),
        ),
        ("{{app_url}}".to_string(), config.app_url.clone()),
    ];

    send_email(config, to_email, subject, template_path, &placeholders).await
}

pub async fn send_contract_approved_email(
    config: &Config,
    to_email: &str,
    data: &ContractEmailData,
    contract_sheet_html: &str,
) -> Result<(), ServiceError> {
    let subject = format!("Your service contract {} is active", data.contract_number);
    let template_path = "src/mail/templates/Contract-approved.html";
    let placeholders = vec![
        ("{{client_name}}".to_string(), data.client_name.clone()),
        ("{{contract_number}}".to_string(), data.contract_number.clone()),
        ("{{start_date}}".to_string(), data.start_date.clone()),
        (
            "{{end_date}}".to_string(),
            data.end_date.clone().unwrap_or_else(|| "Open-ended".to_string()),
        ),
        ("{{payment_amount}}".to_string(), data.payment_amount.clone()),
        (
            "{{payment_frequency}}".to_string(),
            data.payment_frequency.clone(),
        ),
        (
            "{{next_payment_due}}".to_string(),
            data.next_payment_due.clone().unwrap_or_else(|| "-".to_string()),
        ),
        ("{{property_name}}".to_string(), data.property_name.clone()),
        (
            "{{property_address}}".to_string(),
            data.property_address.clone(),
        ),
        ("{{dashboard_url}}".to_string(), data.dashboard_url.clone()),
        (
            "{{contract_sheet}}".to_string(),
            contract_sheet_html.to_string(),
        ),
    ];

    send_email(config, to_email, &subject, template_path, &placeholders).await
}

pub async fn send_payment_link_email(
    config: &Config,
    to_email: &str,
    data: &PaymentEmailData,
) -> Result<(), ServiceError> {
    let subject = format!("Payment due - {}", data.description);
    let template_path = "src/mail/templates/Payment-link.html";
    let placeholders = vec![
        ("{{client_name}}".to_string(), data.client_name.clone()),
        ("{{reference}}".to_string(), data.reference.clone()),
        ("{{amount}}".to_string(), data.amount.clone()),
        ("{{currency}}".to_string(), data.currency.clone()),
        ("{{description}}".to_string(), data.description.clone()),
        (
            "{{due_date}}".to_string(),
            data.due_date.clone().unwrap_or_else(|| "now".to_string()),
        ),
        ("{{app_url}}".to_string(), config.app_url.clone()),
    ];

    send_email(config, to_email, &subject, template_path, &placeholders).await
}

pub async fn send_payment_receipt_email(
    config: &Config,
    to_email: &str,
    data: &PaymentEmailData,
) -> Result<(), ServiceError> {
    let subject = format!("Payment received - {}", data.reference);
    let template_path = "src/mail/templates/Payment-receipt.html";
    let placeholders = vec![
        ("{{client_name}}".to_string(), data.client_name.clone()),
        ("{{reference}}".to_string(), data.reference.clone()),
        ("{{amount}}".to_string(), data.amount.clone()),
        ("{{currency}}".to_string(), data.currency.clone()),
        ("{{description}}".to_string(), data.description.clone()),
    ];

    send_email(config, to_email, &subject, template_path, &placeholders).await
}

pub async fn send_payment_failed_email(
    config: &Config,
    to_email: &str,
    data: &PaymentEmailData,
    failure_reason: Option<&str>,
) -> Result<(), ServiceError> {
    let subject = format!("Payment failed - {}", data.reference);
    let template_path = "src/mail/templates/Payment-failed.html";
    let placeholders = vec![
        ("{{client_name}}".to_string(), data.client_name.clone()),
        ("{{reference}}".to_string(), data.reference.clone()),
        ("{{amount}}".to_string(), data.amount.clone()),
        ("{{currency}}".to_string(), data.currency.clone()),
        ("{{description}}".to_string(), data.description.clone()),
        (
            "{{failure_reason}}".to_string(),
            failure_reason.unwrap_or("The payment could not be processed").to_string(),
        ),
    ];

    send_email(config, to_email, &subject, template_path, &placeholders).await
}
