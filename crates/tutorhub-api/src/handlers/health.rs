//! Health check handler

use actix_web::{web, HttpResponse};
use serde_json::json;
use tutorhub_db::Store;

/// GET /api/health
pub async fn health_check(store: web::Data<Store>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": "tutorhub",
        "version": env!("CARGO_PKG_VERSION"),
        "storage": store.backend().to_string(),
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}
