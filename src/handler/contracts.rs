use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::{get, patch},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{contractdb::ContractExt, paymentdb::PaymentExt, visitdb::ServiceVisitExt},
    dtos::contractdtos::{CancelContractDto, ContractQueryDto},
    error::HttpError,
    models::contractmodel::{Contract, ContractStatus},
    AppState,
};

pub fn contract_handler() -> Router {
    Router::new()
        .route("/", get(list_contracts))
        .route("/:contract_id", get(get_contract))
        .route("/:contract_id/visits", get(list_contract_visits))
        .route("/:contract_id/payments", get(list_contract_payments))
        .route("/:contract_id/activate", patch(activate_contract))
        .route("/:contract_id/pause", patch(pause_contract))
        .route("/:contract_id/complete", patch(complete_contract))
        .route("/:contract_id/cancel", patch(cancel_contract))
}

pub async fn list_contracts(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<ContractQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let limit = query.limit.unwrap_or(20) as i64;
    let offset = ((query.page.unwrap_or(1).saturating_sub(1)) as i64) * limit;

    let contracts = app_state
        .db_client
        .list_contracts(limit, offset)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(contracts))
}

pub async fn get_contract(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(contract_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let contract = load_contract(&app_state, contract_id).await?;
    Ok(Json(contract))
}

pub async fn list_contract_visits(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(contract_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    load_contract(&app_state, contract_id).await?;

    let visits = app_state
        .db_client
        .list_visits_for_contract(contract_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(visits))
}

pub async fn list_contract_payments(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(contract_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    load_contract(&app_state, contract_id).await?;

    let payments = app_state
        .db_client
        .list_payments_for_contract(contract_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(payments))
}

pub async fn activate_contract(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(contract_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let contract = load_contract(&app_state, contract_id).await?;

    if contract.status == ContractStatus::Active {
        return Err(HttpError::bad_request("Contract is already active"));
    }

    let updated = set_status(&app_state, contract_id, ContractStatus::Active, true).await?;
    tracing::info!("Contract activated: {}", updated.contract_number);
    Ok(Json(updated))
}

pub async fn pause_contract(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(contract_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let contract = load_contract(&app_state, contract_id).await?;

    if contract.status == ContractStatus::Paused {
        return Err(HttpError::bad_request("Contract is already paused"));
    }

    let updated = set_status(&app_state, contract_id, ContractStatus::Paused, false).await?;
    tracing::info!("Contract paused: {}", updated.contract_number);
    Ok(Json(updated))
}

pub async fn complete_contract(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(contract_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let contract = load_contract(&app_state, contract_id).await?;

    if contract.status == ContractStatus::Completed {
        return Err(HttpError::bad_request("Contract is already completed"));
    }

    let updated = set_status(&app_state, contract_id, ContractStatus::Completed, false).await?;
    tracing::info!("Contract completed: {}", updated.contract_number);
    Ok(Json(updated))
}

pub async fn cancel_contract(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(contract_id): Path<Uuid>,
    Json(body): Json<CancelContractDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let contract = load_contract(&app_state, contract_id).await?;

    if contract.status == ContractStatus::Cancelled {
        return Err(HttpError::bad_request("Contract is already cancelled"));
    }

    if let Some(reason) = body.reason.as_deref().filter(|reason| !reason.is_empty()) {
        app_state
            .db_client
            .append_contract_note(contract_id, &format!("Cancellation reason: {}", reason))
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?;
    }

    let updated = set_status(&app_state, contract_id, ContractStatus::Cancelled, false).await?;
    tracing::info!("Contract cancelled: {}", updated.contract_number);
    Ok(Json(updated))
}

async fn load_contract(
    app_state: &Arc<AppState>,
    contract_id: Uuid,
) -> Result<Contract, HttpError> {
    app_state
        .db_client
        .get_contract(contract_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(format!("Contract {} not found", contract_id)))
}

async fn set_status(
    app_state: &Arc<AppState>,
    contract_id: Uuid,
    status: ContractStatus,
    is_active: bool,
) -> Result<Contract, HttpError> {
    app_state
        .db_client
        .update_contract_status(contract_id, status, is_active)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found(format!("Contract {} not found", contract_id)))
}
