use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::patch,
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::visitdb::ServiceVisitExt,
    dtos::visitdtos::ResolveVisitDto,
    error::HttpError,
    models::visitmodel::ServiceVisitStatus,
    AppState,
};

pub fn visit_handler() -> Router {
    Router::new()
        .route("/:visit_id/complete", patch(complete_visit))
        .route("/:visit_id/skip", patch(skip_visit))
        .route("/:visit_id/cancel", patch(cancel_visit))
}

pub async fn complete_visit(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(visit_id): Path<Uuid>,
    Json(body): Json<ResolveVisitDto>,
) -> Result<impl IntoResponse, HttpError> {
    resolve(&app_state, visit_id, ServiceVisitStatus::Completed, body).await
}

pub async fn skip_visit(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(visit_id): Path<Uuid>,
    Json(body): Json<ResolveVisitDto>,
) -> Result<impl IntoResponse, HttpError> {
    resolve(&app_state, visit_id, ServiceVisitStatus::Skipped, body).await
}

pub async fn cancel_visit(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(visit_id): Path<Uuid>,
    Json(body): Json<ResolveVisitDto>,
) -> Result<impl IntoResponse, HttpError> {
    resolve(&app_state, visit_id, ServiceVisitStatus::Cancelled, body).await
}

async fn resolve(
    app_state: &Arc<AppState>,
    visit_id: Uuid,
    status: ServiceVisitStatus,
    body: ResolveVisitDto,
) -> Result<axum::Json<crate::models::visitmodel::ServiceVisit>, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let updated = app_state
        .db_client
        .resolve_visit(visit_id, status, body.notes.as_deref())
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    updated.map(Json).ok_or_else(|| {
        HttpError::bad_request(format!(
            "Visit {} is not pending or does not exist",
            visit_id
        ))
    })
}
