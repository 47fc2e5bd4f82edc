// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, wheel and location services, and start HTTP server

mod config;
mod errors;
mod handlers;
mod models;
mod services;

use actix_web::{middleware::Logger, web, App, HttpServer};
use config::Config;
use dotenv::dotenv;
use services::{LocationResolver, RestaurantPicker, SelectionEngine, SynonymTable, WheelSettings};
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        let log_level = if !config.log_level.is_empty() {
            config.log_level.as_str()
        } else {
            "info,actix_web=info"
        };
        std::env::set_var("RUST_LOG", log_level);
    }
    env_logger::init();

    if let Err(e) = config.validate() {
        log::error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    log::info!("Starting shno-nakel microservice...");
    log::info!("Environment: {}", config.environment);
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );

    // 4. Spin wheel
    let mut synonyms = SynonymTable::builtin();
    synonyms.extend(&config.cuisine_synonyms);
    log::info!("Loaded {} cuisine synonyms", synonyms.alias_count());

    let engine = web::Data::new(SelectionEngine::new(WheelSettings {
        full_rotations: config.wheel_full_rotations,
        forced_segments: config.wheel_forced_segments,
        spin_duration: config.spin_duration(),
        synonyms,
    }));
    let picker = web::Data::new(RestaurantPicker::new(config.anti_repeat_history));

    // 5. Location resolver (shared cache across workers)
    let resolver = web::Data::new(LocationResolver::from_config(&config));
    log::info!("Location providers: {:?}", resolver.provider_ids());

    // 6. Start HTTP server
    let server_addr = format!("{}:{}", config.server_address, config.server_port);
    let config_data = web::Data::new(config);

    HttpServer::new(move || {
        App::new()
            // Application state
            .app_data(config_data.clone())
            .app_data(engine.clone())
            .app_data(picker.clone())
            .app_data(resolver.clone())
            // Middleware
            .wrap(Logger::default())
            .wrap(actix_web::middleware::Compress::default())
            // Routes
            .configure(handlers::health_config)
            .configure(handlers::wheel_config)
            .configure(handlers::locations_config)
            .configure(handlers::admin_config)
    })
    .bind(&server_addr)?
    .run()
    .await
}
