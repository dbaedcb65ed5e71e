//! Subscription handlers
//!
//! CRUD goes through the subscription ledger so every write is validated;
//! `PATCH /subscriptions/{id}/use` records one attended session.

use crate::dto::{
    MessageResponse, SubscriptionCreateRequest, SubscriptionFilter, SubscriptionUpdateRequest,
    UseSessionResponse,
};
use crate::enrich;
use actix_web::{web, HttpResponse};
use tracing::{info, instrument, warn};
use tutorhub_core::AppError;
use tutorhub_db::Store;
use tutorhub_services::SubscriptionLedger;
use uuid::Uuid;
use validator::Validate;

/// GET /api/subscriptions?student_id=
#[instrument(skip(store, ledger))]
pub async fn list_subscriptions(
    store: web::Data<Store>,
    ledger: web::Data<SubscriptionLedger>,
    query: web::Query<SubscriptionFilter>,
) -> Result<HttpResponse, AppError> {
    let subscriptions = ledger.list(query.student_id).await?;
    Ok(HttpResponse::Ok().json(enrich::subscriptions(&store, subscriptions).await?))
}

/// GET /api/subscriptions/{id}
#[instrument(skip(store, ledger))]
pub async fn get_subscription(
    store: web::Data<Store>,
    ledger: web::Data<SubscriptionLedger>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let subscription = ledger.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(enrich::subscription(&store, subscription).await?))
}

/// POST /api/subscriptions
#[instrument(skip(store, ledger, req))]
pub async fn create_subscription(
    store: web::Data<Store>,
    ledger: web::Data<SubscriptionLedger>,
    req: web::Json<SubscriptionCreateRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Subscription creation validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let created = ledger.create(&req.into_inner().into_subscription()).await?;
    Ok(HttpResponse::Created().json(enrich::subscription(&store, created).await?))
}

/// PUT /api/subscriptions/{id}
#[instrument(skip(store, ledger, req))]
pub async fn update_subscription(
    store: web::Data<Store>,
    ledger: web::Data<SubscriptionLedger>,
    path: web::Path<Uuid>,
    req: web::Json<SubscriptionUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    req.validate().map_err(|e| {
        warn!("Subscription update validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let updated = ledger.update(id, &req.into_inner().into_changes()).await?;

    info!(id = %id, "Subscription updated successfully");
    Ok(HttpResponse::Ok().json(enrich::subscription(&store, updated).await?))
}

/// DELETE /api/subscriptions/{id}
#[instrument(skip(ledger))]
pub async fn delete_subscription(
    ledger: web::Data<SubscriptionLedger>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    ledger.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Subscription deleted")))
}

/// Record one attended session
///
/// PATCH /api/subscriptions/{id}/use
#[instrument(skip(store, ledger))]
pub async fn use_session(
    store: web::Data<Store>,
    ledger: web::Data<SubscriptionLedger>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let subscription = ledger.consume_session(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(UseSessionResponse {
        message: "Session recorded successfully".to_string(),
        subscription: enrich::subscription(&store, subscription).await?,
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/subscriptions")
            .route("", web::get().to(list_subscriptions))
            .route("", web::post().to(create_subscription))
            .route("/{id}", web::get().to(get_subscription))
            .route("/{id}", web::put().to(update_subscription))
            .route("/{id}", web::delete().to(delete_subscription))
            .route("/{id}/use", web::patch().to(use_session)),
    );
}
