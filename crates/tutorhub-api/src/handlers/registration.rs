//! Class registration handlers
//!
//! Registering and removing students go through the enrollment engine.
//! The by-id routes read and delete registration records directly.

use crate::dto::{
    MessageResponse, RegisterStudentRequest, RegisterStudentResponse, RegistrationFilter,
    RemoveStudentResponse,
};
use crate::enrich;
use actix_web::{web, HttpResponse};
use tracing::{debug, info, instrument};
use tutorhub_core::traits::{EnrollmentRepository, Repository};
use tutorhub_core::AppError;
use tutorhub_db::Store;
use tutorhub_services::EnrollmentEngine;
use uuid::Uuid;

/// List registrations, optionally by class and/or student
///
/// GET /api/classregistrations?class_id=&student_id=
#[instrument(skip(store))]
pub async fn list_registrations(
    store: web::Data<Store>,
    query: web::Query<RegistrationFilter>,
) -> Result<HttpResponse, AppError> {
    debug!("Listing class registrations");
    let mut enrollments = match (query.class_id, query.student_id) {
        (Some(class_id), _) => store.enrollments.list_by_class(class_id).await?,
        (None, Some(student_id)) => store.enrollments.list_by_student(student_id).await?,
        (None, None) => store.enrollments.find_all().await?,
    };
    if let (Some(_), Some(student_id)) = (query.class_id, query.student_id) {
        enrollments.retain(|e| e.student_id == student_id);
    }

    Ok(HttpResponse::Ok().json(enrich::registrations(&store, enrollments).await?))
}

/// GET /api/classregistrations/{id}
#[instrument(skip(store))]
pub async fn get_registration(
    store: web::Data<Store>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let enrollment = store
        .enrollments
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::EnrollmentNotFound(id.to_string()))?;
    Ok(HttpResponse::Ok().json(enrich::registration(&store, enrollment).await?))
}

/// DELETE /api/classregistrations/{id}
#[instrument(skip(store))]
pub async fn delete_registration(
    store: web::Data<Store>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    if !store.enrollments.delete(id).await? {
        return Err(AppError::EnrollmentNotFound(id.to_string()));
    }

    info!(id = %id, "Class registration deleted");
    Ok(HttpResponse::Ok().json(MessageResponse::new("Class registration deleted")))
}

/// Register a student to a class
///
/// POST /api/classregistrations/classes/{class_id}/register
#[instrument(skip(store, engine, req))]
pub async fn register_student(
    store: web::Data<Store>,
    engine: web::Data<EnrollmentEngine>,
    path: web::Path<Uuid>,
    req: web::Json<RegisterStudentRequest>,
) -> Result<HttpResponse, AppError> {
    let class_id = path.into_inner();
    let registration = engine.register_student(class_id, req.student_id).await?;

    Ok(HttpResponse::Created().json(RegisterStudentResponse {
        message: "Student registered to class successfully".to_string(),
        registration: enrich::registration(&store, registration.enrollment).await?,
        subscription_info: registration.subscription.into(),
    }))
}

/// Remove a student from a class
///
/// DELETE /api/classregistrations/classes/{class_id}/students/{student_id}
#[instrument(skip(engine))]
pub async fn remove_student(
    engine: web::Data<EnrollmentEngine>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, AppError> {
    let (class_id, student_id) = path.into_inner();
    let removed = engine.remove_student(class_id, student_id).await?;

    Ok(HttpResponse::Ok().json(RemoveStudentResponse {
        message: "Student removed from class successfully".to_string(),
        removed_registration: removed,
    }))
}

/// Configure class registration routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/classregistrations")
            .route("", web::get().to(list_registrations))
            .route(
                "/classes/{class_id}/register",
                web::post().to(register_student),
            )
            .route(
                "/classes/{class_id}/students/{student_id}",
                web::delete().to(remove_student),
            )
            .route("/{id}", web::get().to(get_registration))
            .route("/{id}", web::delete().to(delete_registration)),
    );
}
