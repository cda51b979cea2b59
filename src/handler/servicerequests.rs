use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::servicerequestdb::ServiceRequestExt,
    dtos::servicerequestdtos::{
        ApproveServiceRequestDto, CancelServiceRequestDto, CompleteServiceRequestDto,
        CreateServiceRequestDto, RequestQueryDto, ScheduleWalkthroughDto,
    },
    error::HttpError,
    AppState,
};

pub fn service_request_handler() -> Router {
    Router::new()
        .route("/", post(create_service_request).get(list_service_requests))
        .route("/:request_id", get(get_service_request))
        .route("/:request_id/approve", patch(approve_service_request))
        .route("/:request_id/start", patch(start_service_request))
        .route("/:request_id/complete", patch(complete_service_request))
        .route("/:request_id/cancel", patch(cancel_service_request))
        .route("/:request_id/walkthrough", patch(schedule_walkthrough))
}

pub async fn create_service_request(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CreateServiceRequestDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;
    body.validate_recurrence_window()
        .map_err(HttpError::bad_request)?;

    let request = app_state
        .db_client
        .create_service_request(&body)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(request))
}

pub async fn list_service_requests(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<RequestQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let limit = query.limit.unwrap_or(20) as i64;
    let offset = ((query.page.unwrap_or(1).saturating_sub(1)) as i64) * limit;

    let requests = app_state
        .db_client
        .list_service_requests(query.status, limit, offset)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(requests))
}

pub async fn get_service_request(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(request_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let request = app_state
        .db_client
        .get_service_request(request_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| {
            HttpError::not_found(format!("Service request {} not found", request_id))
        })?;

    Ok(Json(request))
}

pub async fn approve_service_request(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(request_id): Path<Uuid>,
    Json(body): Json<ApproveServiceRequestDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let approver_id = body.approved_by.unwrap_or_else(Uuid::nil);

    let outcome = app_state
        .approval_service
        .approve(request_id, &body, approver_id)
        .await?;

    Ok(Json(outcome))
}

pub async fn start_service_request(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(request_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let updated = app_state
        .db_client
        .mark_request_in_progress(request_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    match updated {
        Some(request) => Ok(Json(request)),
        None => Err(transition_rejection(&app_state, request_id, "start").await),
    }
}

pub async fn complete_service_request(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(request_id): Path<Uuid>,
    Json(body): Json<CompleteServiceRequestDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let updated = app_state
        .db_client
        .complete_service_request(
            request_id,
            body.actual_price.as_ref(),
            body.actual_duration_minutes,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    match updated {
        Some(request) => Ok(Json(request)),
        None => Err(transition_rejection(&app_state, request_id, "complete").await),
    }
}

pub async fn cancel_service_request(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(request_id): Path<Uuid>,
    Json(body): Json<CancelServiceRequestDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let updated = app_state
        .db_client
        .cancel_service_request(request_id, Some(&body.cancellation_reason))
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    match updated {
        Some(request) => Ok(Json(request)),
        None => Err(transition_rejection(&app_state, request_id, "cancel").await),
    }
}

pub async fn schedule_walkthrough(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(request_id): Path<Uuid>,
    Json(body): Json<ScheduleWalkthroughDto>,
) -> Result<impl IntoResponse, HttpError> {
    let updated = app_state
        .db_client
        .schedule_walkthrough(request_id, body.walkthrough_date, body.walkthrough_time)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    match updated {
        Some(request) => Ok(Json(request)),
        None => Err(transition_rejection(&app_state, request_id, "reschedule").await),
    }
}

/// A guarded transition came back empty: either the request is gone or its
/// current status forbids the action.
async fn transition_rejection(
    app_state: &Arc<AppState>,
    request_id: Uuid,
    action: &str,
) -> HttpError {
    match app_state.db_client.get_service_request(request_id).await {
        Ok(Some(request)) => HttpError::bad_request(format!(
            "Cannot {} a service request in status {}",
            action,
            request.status.to_str()
        )),
        Ok(None) => HttpError::not_found(format!("Service request {} not found", request_id)),
        Err(e) => HttpError::server_error(e.to_string()),
    }
}
