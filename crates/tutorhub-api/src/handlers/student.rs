//! Student handlers

use crate::dto::{MessageResponse, StudentCreateRequest, StudentFilter, StudentUpdateRequest};
use crate::enrich;
use actix_web::{web, HttpResponse};
use tracing::{debug, info, instrument, warn};
use tutorhub_core::traits::{Repository, StudentRepository};
use tutorhub_core::AppError;
use tutorhub_db::Store;
use uuid::Uuid;
use validator::Validate;

/// GET /api/students?parent_id=
#[instrument(skip(store))]
pub async fn list_students(
    store: web::Data<Store>,
    query: web::Query<StudentFilter>,
) -> Result<HttpResponse, AppError> {
    debug!("Listing students");
    let students = match query.parent_id {
        Some(parent_id) => store.students.list_by_parent(parent_id).await?,
        None => store.students.find_all().await?,
    };
    Ok(HttpResponse::Ok().json(enrich::students(&store, students).await?))
}

/// GET /api/students/{id}
#[instrument(skip(store))]
pub async fn get_student(
    store: web::Data<Store>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let student = store
        .students
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::StudentNotFound(id.to_string()))?;
    Ok(HttpResponse::Ok().json(enrich::student(&store, student).await?))
}

/// POST /api/students
#[instrument(skip(store, req))]
pub async fn create_student(
    store: web::Data<Store>,
    req: web::Json<StudentCreateRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Student creation validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let student = req.into_inner().into_student().map_err(AppError::Validation)?;
    student.validate().map_err(AppError::Validation)?;

    let created = store.students.create(&student).await?;
    info!(id = %created.id, parent_id = %created.parent_id, "Student created successfully");
    Ok(HttpResponse::Created().json(enrich::student(&store, created).await?))
}

/// PUT /api/students/{id}
#[instrument(skip(store, req))]
pub async fn update_student(
    store: web::Data<Store>,
    path: web::Path<Uuid>,
    req: web::Json<StudentUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    req.validate().map_err(|e| {
        warn!("Student update validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let mut student = store
        .students
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::StudentNotFound(id.to_string()))?;

    req.into_inner()
        .apply(&mut student)
        .map_err(AppError::Validation)?;
    student.validate().map_err(AppError::Validation)?;

    let updated = store
        .students
        .update(&student)
        .await?
        .ok_or_else(|| AppError::StudentNotFound(id.to_string()))?;

    info!(id = %id, "Student updated successfully");
    Ok(HttpResponse::Ok().json(enrich::student(&store, updated).await?))
}

/// DELETE /api/students/{id}
///
/// Subscriptions and registrations of the student are kept.
#[instrument(skip(store))]
pub async fn delete_student(
    store: web::Data<Store>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    if !store.students.delete(id).await? {
        return Err(AppError::StudentNotFound(id.to_string()));
    }

    info!(id = %id, "Student deleted");
    Ok(HttpResponse::Ok().json(MessageResponse::new("Student deleted")))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/students")
            .route("", web::get().to(list_students))
            .route("", web::post().to(create_student))
            .route("/{id}", web::get().to(get_student))
            .route("/{id}", web::put().to(update_student))
            .route("/{id}", web::delete().to(delete_student)),
    );
}
