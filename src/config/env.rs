// src/config/env.rs
// DOCUMENTATION: Environment variable management
// PURPOSE: Load and validate configuration from .env files

use dotenv::dotenv;
use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration loaded from environment variables
/// DOCUMENTATION: Centralizes all configuration in one struct
/// Load with Config::from_env() at application startup
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "127.0.0.1")
    pub server_address: String,

    /// Server listen port (default 8003)
    pub server_port: u16,

    /// Environment: development, staging, production
    pub environment: String,

    /// Log level: debug, info, warn, error
    pub log_level: String,

    /// Admin authentication token (for cache management endpoints)
    pub admin_token: String,

    /// Google Maps API key, shared by Geocoding and Places Text Search
    pub google_maps_api_key: String,

    /// Base URL for Google Maps web services
    pub google_maps_base_url: String,

    /// Base URL for the Nominatim search endpoint
    pub nominatim_base_url: String,

    /// Descriptive User-Agent required by the Nominatim usage policy
    pub nominatim_user_agent: String,

    /// Pause between batch resolutions that hit Google
    pub google_batch_delay_ms: u64,

    /// Pause between batch resolutions that hit Nominatim
    pub nominatim_batch_delay_ms: u64,

    /// Full turns added to every spin (visual only)
    pub wheel_full_rotations: u32,

    /// Number of identical wedges drawn when a single category is forced
    pub wheel_forced_segments: usize,

    /// How long a spin stays in the spinning state
    pub wheel_spin_duration_ms: u64,

    /// How many recent picks the restaurant picker avoids
    pub anti_repeat_history: usize,

    /// Extra alias=canonical cuisine synonyms
    pub cuisine_synonyms: HashMap<String, String>,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Parse "pizza=italian,بيتزا=إيطالي" into a synonym map
/// Malformed pairs are skipped with a warning
pub fn parse_synonyms(raw: &str) -> HashMap<String, String> {
    let mut synonyms = HashMap::new();

    for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match pair.split_once('=') {
            Some((alias, canonical)) if !alias.trim().is_empty() && !canonical.trim().is_empty() => {
                synonyms.insert(alias.trim().to_string(), canonical.trim().to_string());
            }
            _ => log::warn!("Ignoring malformed cuisine synonym: {}", pair),
        }
    }

    synonyms
}

impl Config {
    /// Load configuration from environment variables
    /// DOCUMENTATION: Reads from .env or process environment
    /// Called once at application startup
    pub fn from_env() -> Self {
        // Load .env file if it exists
        dotenv().ok();

        Config {
            server_address: var_or("SERVER_ADDRESS", "127.0.0.1"),
            server_port: parse_or("SERVER_PORT", 8003),
            environment: var_or("ENVIRONMENT", "development"),
            log_level: var_or("LOG_LEVEL", "info"),
            admin_token: var_or("ADMIN_TOKEN", "admin-token-dev"),

            google_maps_api_key: var_or("GOOGLE_MAPS_API_KEY", ""),
            google_maps_base_url: var_or(
                "GOOGLE_MAPS_BASE_URL",
                "https://maps.googleapis.com/maps/api",
            ),
            nominatim_base_url: var_or(
                "NOMINATIM_BASE_URL",
                "https://nominatim.openstreetmap.org",
            ),
            nominatim_user_agent: env::var("NOMINATIM_USER_AGENT").unwrap_or_else(|_| {
                format!("shno-nakel/{} (restaurant discovery)", env!("CARGO_PKG_VERSION"))
            }),

            google_batch_delay_ms: parse_or("GOOGLE_BATCH_DELAY_MS", 100),
            nominatim_batch_delay_ms: parse_or("NOMINATIM_BATCH_DELAY_MS", 1100),

            wheel_full_rotations: parse_or("WHEEL_FULL_ROTATIONS", 5),
            wheel_forced_segments: parse_or("WHEEL_FORCED_SEGMENTS", 6),
            wheel_spin_duration_ms: parse_or("WHEEL_SPIN_DURATION_MS", 4000),
            anti_repeat_history: parse_or("ANTI_REPEAT_HISTORY", 1),

            cuisine_synonyms: parse_synonyms(&var_or("CUISINE_SYNONYMS", "")),
        }
    }

    pub fn google_batch_delay(&self) -> Duration {
        Duration::from_millis(self.google_batch_delay_ms)
    }

    pub fn nominatim_batch_delay(&self) -> Duration {
        Duration::from_millis(self.nominatim_batch_delay_ms)
    }

    pub fn spin_duration(&self) -> Duration {
        Duration::from_millis(self.wheel_spin_duration_ms)
    }

    /// Validate critical configuration
    /// DOCUMENTATION: Ensures application can start safely
    pub fn validate(&self) -> Result<(), String> {
        if self.wheel_full_rotations < 3 {
            return Err("WHEEL_FULL_ROTATIONS must be at least 3".to_string());
        }

        if self.wheel_forced_segments < 2 {
            return Err("WHEEL_FORCED_SEGMENTS must be at least 2".to_string());
        }

        if self.nominatim_user_agent.trim().is_empty() {
            return Err("NOMINATIM_USER_AGENT must not be blank".to_string());
        }

        if self.google_maps_api_key.is_empty() {
            log::warn!("GOOGLE_MAPS_API_KEY not configured - only Nominatim geocoding will run");
        }

        Ok(())
    }
}
