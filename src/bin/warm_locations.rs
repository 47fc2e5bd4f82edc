// src/bin/warm_locations.rs
// Operator tool: pre-resolve restaurant locations through a running shno-nakel
// so the first real user does not pay for the geocoding waterfall.
//
// Usage: warm_locations <restaurants.json>
// The file holds either an array of queries or {"queries": [...]}.

use anyhow::{bail, Context, Result};
use dotenv::dotenv;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::env;
use std::time::{Duration, Instant};

// --- ANSI colours ---
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const CYAN: &str = "\x1b[36m";

/// Chunk size per /locations/resolve-batch call
const DEFAULT_CHUNK: usize = 50;

#[derive(Deserialize, Debug)]
struct BatchResponse {
    #[serde(default)]
    results: Vec<BatchEntry>,
}

#[derive(Deserialize, Debug)]
struct BatchEntry {
    restaurant_id: String,
    confidence: String,
    #[serde(default)]
    source_provider_id: Option<String>,
}

#[derive(Debug, Default)]
struct WarmSummary {
    verified: usize,
    approximate: usize,
    unresolved: Vec<String>,
    failed_chunks: usize,
}

impl WarmSummary {
    fn record(&mut self, entry: &BatchEntry) {
        match entry.confidence.as_str() {
            "verified" => self.verified += 1,
            "approximate" => self.approximate += 1,
            _ => self.unresolved.push(entry.restaurant_id.clone()),
        }
    }
}

struct LocationWarmer {
    base_url: String,
    admin_token: Option<String>,
    client: Client,
}

impl LocationWarmer {
    fn new(base_url: String, admin_token: Option<String>) -> Result<Self> {
        // batches are paced server-side, allow plenty of time
        let client = Client::builder()
            .timeout(Duration::from_secs(900))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url,
            admin_token,
            client,
        })
    }

    async fn check_service_health(&self) -> bool {
        match self.client.get(format!("{}/health", self.base_url)).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    async fn resolve_chunk(&self, queries: &[Value]) -> Result<BatchResponse> {
        let url = format!("{}/locations/resolve-batch", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&json!({ "queries": queries }))
            .send()
            .await
            .context("resolve-batch request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            bail!("HTTP {} - {}", status, body);
        }

        response
            .json::<BatchResponse>()
            .await
            .context("Failed to parse resolve-batch response")
    }

    async fn print_cache_stats(&self) {
        let Some(token) = &self.admin_token else {
            return;
        };

        let response = self
            .client
            .get(format!("{}/admin/locations/cache", self.base_url))
            .header("X-Admin-Token", token)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                if let Ok(body) = resp.json::<Value>().await {
                    println!(
                        "{}🗄️  Server cache: {} entries ({} located){}",
                        BLUE,
                        body["cache"]["total_entries"],
                        body["cache"]["located_entries"],
                        RESET
                    );
                }
            }
            Ok(resp) => println!("{}⚠️  Cache stats unavailable: HTTP {}{}", YELLOW, resp.status(), RESET),
            Err(e) => println!("{}⚠️  Cache stats unavailable: {}{}", YELLOW, e, RESET),
        }
    }

    async fn run(&self, queries: &[Value], chunk_size: usize) -> Result<WarmSummary> {
        println!("\n{}🔍 Checking service status...{}", CYAN, RESET);
        if !self.check_service_health().await {
            println!("{}Please ensure shno-nakel is running (cargo run){}", YELLOW, RESET);
            bail!("Service unavailable at {}", self.base_url);
        }
        println!("{}✅ Service available{}\n", GREEN, RESET);

        println!("{}╔══════════════════════════════════════════════════════╗{}", CYAN, RESET);
        println!("{}║   📍 Location Warmer - Kuwait restaurants             ║{}", CYAN, RESET);
        println!("{}╚══════════════════════════════════════════════════════╝{}", CYAN, RESET);
        println!("\n{}📊 Restaurants to resolve: {}{}", BOLD, queries.len(), RESET);

        let mut summary = WarmSummary::default();
        let chunks: Vec<&[Value]> = queries.chunks(chunk_size.max(1)).collect();
        let total_chunks = chunks.len();

        for (i, chunk) in chunks.into_iter().enumerate() {
            let start_time = Instant::now();
            println!(
                "{}[{}/{}] Resolving {} restaurants...{}",
                CYAN,
                i + 1,
                total_chunks,
                chunk.len(),
                RESET
            );

            match self.resolve_chunk(chunk).await {
                Ok(response) => {
                    for entry in &response.results {
                        summary.record(entry);
                        log::debug!(
                            "{} -> {} ({:?})",
                            entry.restaurant_id,
                            entry.confidence,
                            entry.source_provider_id
                        );
                    }
                    println!(
                        "{}✅ chunk {} done ({:.1}s){}",
                        GREEN,
                        i + 1,
                        start_time.elapsed().as_secs_f64(),
                        RESET
                    );
                }
                Err(e) => {
                    summary.failed_chunks += 1;
                    println!("{}❌ chunk {} failed: {:#}{}", RED, i + 1, e, RESET);
                }
            }
        }

        Ok(summary)
    }
}

fn print_summary(summary: &WarmSummary) {
    println!("\n\n{}📋 Warm-up Summary{}", BOLD, RESET);
    println!("──────────────────────────────────────────────");
    println!("  • Verified:    {}{}{}", GREEN, summary.verified, RESET);
    println!("  • Approximate: {}{}{}", YELLOW, summary.approximate, RESET);
    println!("  • Not found:   {}{}{}", RED, summary.unresolved.len(), RESET);
    if summary.failed_chunks > 0 {
        println!("  • Failed chunks: {}{}{}", RED, summary.failed_chunks, RESET);
    }
    println!("──────────────────────────────────────────────");

    if !summary.unresolved.is_empty() {
        println!("{}Unresolved ids:{} {}", BOLD, RESET, summary.unresolved.join(", "));
    }
}

/// Accept a bare array or an object with a `queries` array
fn load_queries(raw: &str) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_str(raw).context("Input is not valid JSON")?;

    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("queries") {
            Some(Value::Array(items)) => Ok(items),
            _ => bail!("Expected a \"queries\" array"),
        },
        _ => bail!("Expected an array of restaurants"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let path = env::args()
        .nth(1)
        .context("Usage: warm_locations <restaurants.json>")?;
    let raw = std::fs::read_to_string(&path).with_context(|| format!("Cannot read {}", path))?;
    let queries = load_queries(&raw)?;

    let base_url = env::var("SHNO_NAKEL_URL").unwrap_or_else(|_| "http://localhost:8003".to_string());
    let chunk_size = env::var("WARM_CHUNK_SIZE")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_CHUNK);

    let warmer = LocationWarmer::new(base_url, env::var("ADMIN_TOKEN").ok())?;
    let summary = warmer.run(&queries, chunk_size).await?;

    print_summary(&summary);
    warmer.print_cache_stats().await;

    Ok(())
}
