pub mod approval_service;
pub mod background_jobs;
pub mod contract_document;
pub mod contract_factory;
pub mod error;
pub mod notification_service;
pub mod payment_monitor;
pub mod payment_service;
pub mod recurrence;
pub mod visit_scheduler;
