// src/handlers/mod.rs
// DOCUMENTATION: Handlers module organization
// PURPOSE: Re-export handler components

pub mod admin;
pub mod health;
pub mod locations;
pub mod wheel;

pub use admin::config as admin_config;
pub use health::config as health_config;
pub use locations::config as locations_config;
pub use wheel::config as wheel_config;
