//! API layer for TutorHub
//!
//! HTTP handlers for parents, students, classes, subscriptions and class
//! registrations, mounted under `/api`.

#![forbid(unsafe_code)]

pub mod dto;
pub mod enrich;
pub mod handlers;

use actix_web::{error, web, HttpRequest, HttpResponse};
use tutorhub_core::AppError;
use tutorhub_db::Store;
use tutorhub_services::{EnrollmentEngine, SubscriptionLedger};

use handlers::{
    configure_classes, configure_health, configure_parents, configure_registrations,
    configure_students, configure_subscriptions,
};

/// Register the `/api` scope
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(configure_health)
            .configure(configure_parents)
            .configure(configure_students)
            .configure(configure_classes)
            .configure(configure_subscriptions)
            .configure(configure_registrations),
    );
}

/// Register shared state, extractor error handlers and all routes
///
/// Services are built from `store` so every handler works against the same
/// backend.
pub fn configure_app(cfg: &mut web::ServiceConfig, store: &Store) {
    cfg.app_data(web::Data::new(store.clone()))
        .app_data(web::Data::new(SubscriptionLedger::from_store(store)))
        .app_data(web::Data::new(EnrollmentEngine::new(store)))
        .app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .configure(configure_routes)
        .default_service(web::to(route_not_found));
}

fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::Validation(format!("Invalid JSON body: {}", err)).into()
}

// An identifier that cannot be parsed can never resolve to a record.
fn path_error(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::NotFound(format!("Resource not found: {}", err)).into()
}

fn query_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::Validation(format!("Invalid query string: {}", err)).into()
}

async fn route_not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound("Route not found".to_string()))
}
