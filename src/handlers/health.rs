// src/handlers/health.rs
// DOCUMENTATION: Health check handler
// PURPOSE: Simple endpoint to verify service status

use crate::services::SelectionEngine;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

pub async fn health_check(engine: web::Data<SelectionEngine>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": "shno-nakel",
        "version": env!("CARGO_PKG_VERSION"),
        "wheels_spinning": engine.spinning_count()
    }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}
