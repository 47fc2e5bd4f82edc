// src/handlers/locations.rs
// DOCUMENTATION: HTTP handlers for restaurant location resolution
// PURPOSE: Resolve coordinates, batch-resolve with GeoJSON output, order by distance

use crate::errors::ServiceError;
use crate::models::{NearestRequest, ResolveBatchRequest, ResolveRequest};
use crate::services::geo::{format_distance, haversine_km, sort_by_distance, to_feature_collection};
use crate::services::{with_distance, LocationResolver};
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use validator::Validate;

/// POST /locations/resolve
/// Resolve one restaurant
pub async fn resolve(
    resolver: web::Data<LocationResolver>,
    req: web::Json<ResolveRequest>,
) -> Result<impl Responder, ServiceError> {
    if let Err(e) = req.validate() {
        return Err(ServiceError::ValidationError(e.to_string()));
    }

    let ResolveRequest { query, reference } = req.into_inner();
    let location = resolver.resolve(&query, reference).await;

    Ok(HttpResponse::Ok().json(with_distance(&query.restaurant_id, location, reference)))
}

/// POST /locations/resolve-batch
/// Resolve many restaurants sequentially
///
/// DOCUMENTATION: Providers are paced between live calls, so large batches take a while.
/// The response carries the per-restaurant list and a GeoJSON
/// FeatureCollection of the located ones.
pub async fn resolve_batch(
    resolver: web::Data<LocationResolver>,
    req: web::Json<ResolveBatchRequest>,
) -> Result<impl Responder, ServiceError> {
    if let Err(e) = req.validate() {
        return Err(ServiceError::ValidationError(e.to_string()));
    }

    log::info!("Batch resolve requested for {} restaurants", req.queries.len());

    let results = resolver.resolve_many(&req.queries, req.reference).await;
    let features = to_feature_collection(&results);

    Ok(HttpResponse::Ok().json(json!({
        "total": results.len(),
        "results": results,
        "features": features,
    })))
}

/// POST /locations/nearest
/// Order restaurants by distance from a reference point
pub async fn nearest(req: web::Json<NearestRequest>) -> Result<impl Responder, ServiceError> {
    if let Err(e) = req.validate() {
        return Err(ServiceError::ValidationError(e.to_string()));
    }

    let NearestRequest {
        mut restaurants,
        reference,
    } = req.into_inner();

    if !reference.is_valid() {
        return Err(ServiceError::InvalidInput(
            "reference coordinate out of range".to_string(),
        ));
    }

    sort_by_distance(&mut restaurants, reference, |r| {
        r.coordinate.filter(|c| c.is_valid())
    });

    let ordered: Vec<_> = restaurants
        .into_iter()
        .map(|r| {
            let distance_km = r
                .coordinate
                .filter(|c| c.is_valid())
                .map(|c| (haversine_km(reference, c) * 100.0).round() / 100.0);
            json!({
                "id": r.id,
                "coordinate": r.coordinate,
                "distance_km": distance_km,
                "distance_label": distance_km.map(format_distance),
            })
        })
        .collect();

    Ok(HttpResponse::Ok().json(ordered))
}

/// Configuration for location routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/locations")
            .route("/resolve", web::post().to(resolve))
            .route("/resolve-batch", web::post().to(resolve_batch))
            .route("/nearest", web::post().to(nearest)),
    );
}
