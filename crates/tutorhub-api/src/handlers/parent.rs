//! Parent handlers
//!
//! HTTP handlers for parent management endpoints.

use crate::dto::{MessageResponse, ParentCreateRequest, ParentUpdateRequest};
use actix_web::{web, HttpResponse};
use tracing::{debug, info, instrument, warn};
use tutorhub_core::models::Parent;
use tutorhub_core::traits::{ParentRepository, Repository};
use tutorhub_core::AppError;
use tutorhub_db::Store;
use uuid::Uuid;
use validator::Validate;

async fn ensure_email_free(store: &Store, parent: &Parent) -> Result<(), AppError> {
    if let Some(existing) = store.parents.find_by_email(&parent.email).await? {
        if existing.id != parent.id {
            warn!(email = %parent.email, "Duplicate parent email");
            return Err(AppError::AlreadyExists(format!(
                "Parent with email {} already exists",
                parent.email
            )));
        }
    }
    Ok(())
}

/// List all parents
///
/// GET /api/parents
#[instrument(skip(store))]
pub async fn list_parents(store: web::Data<Store>) -> Result<HttpResponse, AppError> {
    debug!("Listing all parents");
    let parents = store.parents.find_all().await?;
    Ok(HttpResponse::Ok().json(parents))
}

/// Get a single parent by ID
///
/// GET /api/parents/{id}
#[instrument(skip(store))]
pub async fn get_parent(
    store: web::Data<Store>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let parent = store
        .parents
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::ParentNotFound(id.to_string()))?;
    Ok(HttpResponse::Ok().json(parent))
}

/// Create a new parent
///
/// POST /api/parents
#[instrument(skip(store, req))]
pub async fn create_parent(
    store: web::Data<Store>,
    req: web::Json<ParentCreateRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Parent creation validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let parent = req.into_inner().into_parent();
    parent.validate().map_err(AppError::Validation)?;
    ensure_email_free(&store, &parent).await?;

    let created = store.parents.create(&parent).await?;
    info!(id = %created.id, "Parent created successfully");
    Ok(HttpResponse::Created().json(created))
}

/// Update an existing parent
///
/// PUT /api/parents/{id}
#[instrument(skip(store, req))]
pub async fn update_parent(
    store: web::Data<Store>,
    path: web::Path<Uuid>,
    req: web::Json<ParentUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    req.validate().map_err(|e| {
        warn!("Parent update validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let mut parent = store
        .parents
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::ParentNotFound(id.to_string()))?;

    req.into_inner().apply(&mut parent);
    parent.validate().map_err(AppError::Validation)?;
    ensure_email_free(&store, &parent).await?;

    let updated = store
        .parents
        .update(&parent)
        .await?
        .ok_or_else(|| AppError::ParentNotFound(id.to_string()))?;

    info!(id = %id, "Parent updated successfully");
    Ok(HttpResponse::Ok().json(updated))
}

/// Delete a parent
///
/// DELETE /api/parents/{id}
#[instrument(skip(store))]
pub async fn delete_parent(
    store: web::Data<Store>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    if !store.parents.delete(id).await? {
        return Err(AppError::ParentNotFound(id.to_string()));
    }

    info!(id = %id, "Parent deleted");
    Ok(HttpResponse::Ok().json(MessageResponse::new("Parent deleted")))
}

/// Configure parent routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/parents")
            .route("", web::get().to(list_parents))
            .route("", web::post().to(create_parent))
            .route("/{id}", web::get().to(get_parent))
            .route("/{id}", web::put().to(update_parent))
            .route("/{id}", web::delete().to(delete_parent)),
    );
}
