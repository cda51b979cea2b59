use std::sync::Arc;

use axum::{routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    handler::{
        contracts::contract_handler, payments::payment_handler,
        servicerequests::service_request_handler, visits::visit_handler,
    },
    AppState,
};

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_route = Router::new()
        .nest("/service-requests", service_request_handler())
        .nest("/contracts", contract_handler())
        .nest("/payments", payment_handler())
        .nest("/visits", visit_handler())
        .layer(TraceLayer::new_for_http());

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_route)
        .layer(Extension(app_state))
}
