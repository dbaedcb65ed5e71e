//! Class handlers
//!
//! HTTP handlers for the class catalog.

use crate::dto::{ClassCreateRequest, ClassFilter, ClassUpdateRequest, MessageResponse};
use actix_web::{web, HttpResponse};
use tracing::{debug, info, instrument, warn};
use tutorhub_core::traits::{ClassRepository, Repository};
use tutorhub_core::AppError;
use tutorhub_db::Store;
use uuid::Uuid;
use validator::Validate;

/// List classes, optionally only those meeting on one day
///
/// GET /api/classes?day=
#[instrument(skip(store))]
pub async fn list_classes(
    store: web::Data<Store>,
    query: web::Query<ClassFilter>,
) -> Result<HttpResponse, AppError> {
    let classes = match query.day.as_deref().filter(|d| !d.is_empty()) {
        Some(day) => {
            debug!(day = %day, "Listing classes by day");
            store.classes.list_by_day(day).await?
        }
        None => store.classes.find_all().await?,
    };
    Ok(HttpResponse::Ok().json(classes))
}

/// Get a single class by ID
///
/// GET /api/classes/{id}
#[instrument(skip(store))]
pub async fn get_class(
    store: web::Data<Store>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let class = store
        .classes
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::ClassNotFound(id.to_string()))?;
    Ok(HttpResponse::Ok().json(class))
}

/// Create a new class
///
/// POST /api/classes
#[instrument(skip(store, req))]
pub async fn create_class(
    store: web::Data<Store>,
    req: web::Json<ClassCreateRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Class creation validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let class = req.into_inner().into_class();
    class.validate().map_err(AppError::Validation)?;

    let created = store.classes.create(&class).await?;
    info!(id = %created.id, name = %created.name, "Class created successfully");
    Ok(HttpResponse::Created().json(created))
}

/// Update an existing class
///
/// PUT /api/classes/{id}
#[instrument(skip(store, req))]
pub async fn update_class(
    store: web::Data<Store>,
    path: web::Path<Uuid>,
    req: web::Json<ClassUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    req.validate().map_err(|e| {
        warn!("Class update validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let mut class = store
        .classes
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::ClassNotFound(id.to_string()))?;

    req.into_inner().apply(&mut class);
    class.validate().map_err(AppError::Validation)?;

    let updated = store
        .classes
        .update(&class)
        .await?
        .ok_or_else(|| AppError::ClassNotFound(id.to_string()))?;

    info!(id = %id, "Class updated successfully");
    Ok(HttpResponse::Ok().json(updated))
}

/// Delete a class
///
/// DELETE /api/classes/{id}
///
/// Registrations pointing at the class are kept.
#[instrument(skip(store))]
pub async fn delete_class(
    store: web::Data<Store>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    if !store.classes.delete(id).await? {
        return Err(AppError::ClassNotFound(id.to_string()));
    }

    info!(id = %id, "Class deleted");
    Ok(HttpResponse::Ok().json(MessageResponse::new("Class deleted")))
}

/// Configure class routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/classes")
            .route("", web::get().to(list_classes))
            .route("", web::post().to(create_class))
            .route("/{id}", web::get().to(get_class))
            .route("/{id}", web::put().to(update_class))
            .route("/{id}", web::delete().to(delete_class)),
    );
}
