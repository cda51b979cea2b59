use std::fs;

use lettre::{
    message::{header::ContentType, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    Message, SmtpTransport, Transport,
};

use crate::config::Config;
use crate::service::error::ServiceError;

pub fn validate_email(email: &str) -> Result<(), ServiceError> {
    if email.is_empty() {
        return Err(ServiceError::Mail("Email recipient cannot be empty".to_string()));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ServiceError::Mail(format!("Invalid email address: {}", email)));
    };

    if local.is_empty() || domain.is_empty() || domain.starts_with('.') || !domain.contains('.') {
        return Err(ServiceError::Mail(format!("Invalid email address: {}", email)));
    }

    Ok(())
}

/// Reads an HTML template, substitutes `{{placeholder}}` pairs and sends the
/// result over SMTP. Callers treat delivery as best-effort.
pub async fn send_email(
    config: &Config,
    to_email: &str,
    subject: &str,
    template_path: &str,
    placeholders: &[(String, String)],
) -> Result<(), ServiceError> {
    validate_email(to_email)?;

    let mut html_body = fs::read_to_string(template_path).map_err(|e| {
        tracing::error!("Failed to read email template {}: {}", template_path, e);
        ServiceError::Mail(format!("Template not found: {}", template_path))
    })?;

    for (key, value) in placeholders {
        html_body = html_body.replace(key, value);
    }

    let message = Message::builder()
        .from(
            config
                .from_email
                .parse()
                .map_err(|e| ServiceError::Mail(format!("Invalid sender address: {}", e)))?,
        )
        .to(to_email
            .parse()
            .map_err(|e| ServiceError::Mail(format!("Invalid recipient address: {}", e)))?)
        .subject(subject)
        .multipart(MultiPart::alternative().singlepart(
            SinglePart::builder()
                .header(ContentType::TEXT_HTML)
                .body(html_body),
        ))
        .map_err(|e| ServiceError::Mail(format!("Failed to build email: {}", e)))?;

    let credentials = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());
    let mailer = SmtpTransport::relay(&config.smtp_host)
        .map_err(|e| ServiceError::Mail(format!("SMTP relay error: {}", e)))?
        .port(config.smtp_port)
        .credentials(credentials)
        .build();

    match mailer.send(&message) {
        Ok(_) => {
            tracing::info!("Email sent to {} ({})", to_email, subject);
            Ok(())
        }
        Err(e) => {
            tracing::error!("SMTP send to {} failed: {}", to_email, e);
            Err(ServiceError::Mail(format!("SMTP send failed: {}", e)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(validate_email("test@example.com").is_ok());
        assert!(validate_email("user.name+tag@domain.co.uk").is_ok());
        assert!(validate_email("invalid-email").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("test@.com").is_err());
        assert!(validate_email("").is_err());
    }
}
