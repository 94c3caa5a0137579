// src/handlers/health.rs
// DOCUMENTATION: Health check handler
// PURPOSE: Report service status and local store size

use crate::db::PlaceRepository;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use sqlx::SqlitePool;

pub async fn health_check(pool: web::Data<SqlitePool>) -> impl Responder {
    let database = match PlaceRepository::count(pool.get_ref()).await {
        Ok(places) => json!({ "status": "ok", "places": places }),
        Err(e) => json!({ "status": "error", "message": e.to_string() }),
    };

    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": "places-explorer",
        "version": env!("CARGO_PKG_VERSION"),
        "database": database
    }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}
