mod config;
mod db;
mod dtos;
mod error;
mod handler;
mod mail;
mod models;
mod routes;
mod service;
mod utils;

use std::sync::Arc;

use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use config::Config;
use dotenv::dotenv;
use routes::create_router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::filter::LevelFilter;

use crate::db::db::DBClient;
use service::{
    approval_service::ApprovalService, notification_service::NotificationService,
    payment_monitor::PaymentObligationMonitor, payment_service::PaymentService,
    visit_scheduler::VisitScheduler,
};

#[derive(Debug, Clone)]
pub struct AppState {
    pub env: Config,
    pub db_client: Arc<DBClient>,
    // Services
    pub notification_service: Arc<NotificationService>,
    pub payment_service: Arc<PaymentService>,
    pub approval_service: Arc<ApprovalService>,
    pub visit_scheduler: Arc<VisitScheduler>,
    pub payment_monitor: Arc<PaymentObligationMonitor>,
}

impl AppState {
    pub fn new(db_client: DBClient, config: Config) -> Self {
        let db_client_arc = Arc::new(db_client);

        let notification_service = Arc::new(NotificationService::new(config.clone()));

        let payment_service = Arc::new(PaymentService::new(
            db_client_arc.clone(),
            notification_service.clone(),
            config.default_currency.clone(),
        ));

        let approval_service = Arc::new(ApprovalService::new(
            db_client_arc.clone(),
            payment_service.clone(),
            notification_service.clone(),
        ));

        let visit_scheduler = Arc::new(VisitScheduler::new(
            db_client_arc.clone(),
            config.schedule.clone(),
        ));

        let payment_monitor = Arc::new(PaymentObligationMonitor::new(
            db_client_arc.clone(),
            payment_service.clone(),
            config.schedule.clone(),
        ));

        Self {
            env: config,
            db_client: db_client_arc,
            notification_service,
            payment_service,
            approval_service,
            visit_scheduler,
            payment_monitor,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .init();

    dotenv().ok();

    let config = Config::init();

    let pool = match PgPoolOptions::new()
        .max_connections(20)
        .min_connections(5)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            tracing::info!("Connection to the database is successful");
            pool
        }
        Err(err) => {
            tracing::error!("Failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    let db_client = DBClient::new(pool);

    let allowed_origins = vec![
        config.app_url.parse::<HeaderValue>().unwrap(),
        "http://localhost:5173".parse::<HeaderValue>().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::PATCH]);

    let app_state = Arc::new(AppState::new(db_client, config.clone()));

    let app = create_router(app_state.clone()).layer(cors);

    // Timer-driven jobs: daily visit materialization and the short-interval
    // payment obligation scan.
    let app_state_clone = app_state.clone();
    tokio::spawn(async move {
        service::background_jobs::start_visit_scheduler_job(app_state_clone).await;
    });

    let app_state_clone = app_state.clone();
    tokio::spawn(async move {
        service::background_jobs::start_payment_monitor_job(app_state_clone).await;
    });

    tracing::info!("Server is running on http://localhost:{}", config.port);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", &config.port))
        .await
        .unwrap();

    axum::serve(listener, app).await.unwrap();
}
