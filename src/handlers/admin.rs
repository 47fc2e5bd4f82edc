// src/handlers/admin.rs
// DOCUMENTATION: Admin handlers for the location cache
// PURPOSE: Inspect and invalidate resolved locations via REST endpoints

use crate::config::Config;
use crate::errors::ServiceError;
use crate::services::LocationResolver;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde_json::json;

/// GET /admin/locations/cache
/// Get location cache statistics
///
/// DOCUMENTATION: Requires admin authentication via X-Admin-Token header
pub async fn cache_stats(
    resolver: web::Data<LocationResolver>,
    config: web::Data<Config>,
    req: HttpRequest,
) -> Result<impl Responder, ServiceError> {
    verify_admin_token(&req, &config)?;

    let stats = resolver.cache_stats().await;
    Ok(HttpResponse::Ok().json(json!({
        "cache": stats,
        "providers": resolver.provider_ids(),
    })))
}

/// DELETE /admin/locations/cache
/// Drop every cached location
///
/// DOCUMENTATION: The next resolve for each name reaches the providers again
pub async fn clear_cache(
    resolver: web::Data<LocationResolver>,
    config: web::Data<Config>,
    req: HttpRequest,
) -> Result<impl Responder, ServiceError> {
    verify_admin_token(&req, &config)?;

    let removed = resolver.clear_cache().await;
    log::info!("Admin cleared location cache ({} entries)", removed);

    Ok(HttpResponse::Ok().json(json!({ "removed_entries": removed })))
}

/// Helper function to verify admin authentication
/// DOCUMENTATION: Checks X-Admin-Token header against configured admin token
fn verify_admin_token(req: &HttpRequest, config: &Config) -> Result<(), ServiceError> {
    let token = req
        .headers()
        .get("X-Admin-Token")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            log::warn!("Admin request without token");
            ServiceError::Unauthorized
        })?;

    if token != config.admin_token {
        log::warn!("Admin request with invalid token");
        return Err(ServiceError::Unauthorized);
    }

    Ok(())
}

/// Configuration for admin routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/locations/cache", web::get().to(cache_stats))
            .route("/locations/cache", web::delete().to(clear_cache)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RestaurantLocationQuery;
    use crate::services::geo::RegionBounds;
    use crate::services::LocationCache;
    use actix_web::{http::StatusCode, test, App};

    fn test_config() -> web::Data<Config> {
        let mut config = Config::from_env();
        config.admin_token = "secret".to_string();
        web::Data::new(config)
    }

    #[actix_web::test]
    async fn test_missing_token_is_401() {
        let resolver = web::Data::new(LocationResolver::new(
            Vec::new(),
            LocationCache::new(),
            RegionBounds::kuwait(),
        ));
        let app = test::init_service(
            App::new()
                .app_data(resolver)
                .app_data(test_config())
                .configure(config),
        )
        .await;

        let req = test::TestRequest::get().uri("/admin/locations/cache").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::delete()
            .uri("/admin/locations/cache")
            .insert_header(("X-Admin-Token", "wrong"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_stats_then_clear() {
        let resolver = web::Data::new(LocationResolver::new(
            Vec::new(),
            LocationCache::new(),
            RegionBounds::kuwait(),
        ));
        resolver
            .resolve(&RestaurantLocationQuery::named("r1", "Slice"), None)
            .await;

        let app = test::init_service(
            App::new()
                .app_data(resolver.clone())
                .app_data(test_config())
                .configure(config),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/admin/locations/cache")
            .insert_header(("X-Admin-Token", "secret"))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["cache"]["total_entries"], 1);
        assert_eq!(body["cache"]["unresolved_entries"], 1);

        let req = test::TestRequest::delete()
            .uri("/admin/locations/cache")
            .insert_header(("X-Admin-Token", "secret"))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["removed_entries"], 1);
        assert_eq!(resolver.cache_stats().await.total_entries, 0);
    }
}
