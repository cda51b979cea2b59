use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::paymentdb::PaymentExt,
    dtos::paymentdtos::{CreatePaymentDto, PaymentWebhookDto},
    error::HttpError,
    AppState,
};

pub fn payment_handler() -> Router {
    Router::new()
        .route("/", post(create_payment))
        .route("/:payment_id", get(get_payment))
        .route("/webhook", post(payment_webhook))
}

pub async fn create_payment(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CreatePaymentDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let payment = app_state.payment_service.create_payment(&body).await?;
    Ok(Json(payment))
}

pub async fn get_payment(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(payment_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let payment = app_state
        .db_client
        .get_payment(payment_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(format!("Payment {} not found", payment_id)))?;

    Ok(Json(payment))
}

/// Gateway callback endpoint. The processor reports status changes for
/// payments we issued; success here drives the contract schedule forward.
pub async fn payment_webhook(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<PaymentWebhookDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let payment = app_state
        .payment_service
        .apply_gateway_event(
            &body.reference,
            body.status,
            body.provider_payment_id.as_deref(),
            body.failure_reason.as_deref(),
        )
        .await?;

    Ok(Json(payment))
}
