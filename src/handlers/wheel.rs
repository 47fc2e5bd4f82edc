// src/handlers/wheel.rs
// DOCUMENTATION: HTTP handlers for the spin wheel
// PURPOSE: Parse requests, call the selection engine, return responses

use crate::errors::ServiceError;
use crate::models::{PickRequest, WheelRequest, WheelStateQuery};
use crate::services::{RestaurantPicker, SelectionEngine, DEFAULT_WHEEL};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde_json::json;
use validator::Validate;

const CLIENT_HEADER: &str = "X-Client-Id";

/// Key of the caller's wheel
/// DOCUMENTATION: Explicit `client_id` first, then the X-Client-Id header,
/// then the peer address. Callers with none of these share one wheel.
fn wheel_key(http: &HttpRequest, client_id: Option<&str>) -> String {
    let header = http
        .headers()
        .get(CLIENT_HEADER)
        .and_then(|value| value.to_str().ok());

    client_id
        .or(header)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .or_else(|| http.peer_addr().map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| DEFAULT_WHEEL.to_string())
}

/// POST /wheel/segments
/// Build the wedges for a cuisine list and filter
pub async fn build_segments(
    engine: web::Data<SelectionEngine>,
    req: web::Json<WheelRequest>,
) -> Result<impl Responder, ServiceError> {
    if let Err(e) = req.validate() {
        return Err(ServiceError::ValidationError(e.to_string()));
    }

    let segments = engine.build_segments(&req.cuisines, &req.active_filter);
    Ok(HttpResponse::Ok().json(json!({
        "active_filter": req.active_filter,
        "segments": segments,
    })))
}

/// POST /wheel/spin
/// Spin the wheel
///
/// DOCUMENTATION: Responds once the spin animation window has elapsed.
/// A second spin on the same caller's wheel gets 409, an empty "all" wheel
/// gets 422. Other callers spin independently.
pub async fn spin(
    http: HttpRequest,
    engine: web::Data<SelectionEngine>,
    req: web::Json<WheelRequest>,
) -> Result<impl Responder, ServiceError> {
    if let Err(e) = req.validate() {
        return Err(ServiceError::ValidationError(e.to_string()));
    }

    let wheel = wheel_key(&http, req.client_id.as_deref());
    let outcome = engine
        .spin(
            &wheel,
            req.current_rotation_degrees,
            &req.cuisines,
            &req.active_filter,
        )
        .await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// GET /wheel/state
pub async fn state(
    http: HttpRequest,
    engine: web::Data<SelectionEngine>,
    query: web::Query<WheelStateQuery>,
) -> impl Responder {
    let wheel = wheel_key(&http, query.client_id.as_deref());
    HttpResponse::Ok().json(engine.state(&wheel))
}

/// POST /wheel/pick
/// Pick one restaurant from the winning category, avoiding recent repeats
pub async fn pick(
    picker: web::Data<RestaurantPicker>,
    req: web::Json<PickRequest>,
) -> Result<impl Responder, ServiceError> {
    if let Err(e) = req.validate() {
        return Err(ServiceError::ValidationError(e.to_string()));
    }

    let mut rng = rand::rng();
    let chosen = picker.pick(&req.candidates, &mut rng);
    Ok(HttpResponse::Ok().json(chosen))
}

/// Configuration for wheel routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/wheel")
            .route("/segments", web::post().to(build_segments))
            .route("/spin", web::post().to(spin))
            .route("/state", web::get().to(state))
            .route("/pick", web::post().to(pick)),
    );
}
