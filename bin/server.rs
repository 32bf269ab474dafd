// Fraud Hunter - Web Server
// REST API with Axum over the detector pipeline

use anyhow::{Context, Result};
use fraud_hunter::api::{router, AppState};
use fraud_hunter::AnalysisConfig;
use std::path::PathBuf;

const DEFAULT_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_CONFIG: &str = "config.json";

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("🌐 Fraud Hunter - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config_path = std::env::var("FRAUD_HUNTER_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG));
    let config = AnalysisConfig::load_or_default(&config_path)?;
    println!(
        "✓ Config: threshold {}, fuzzy cutoff {}",
        config.threshold_amount, config.fuzzy_cutoff
    );

    let app = router(AppState::new(config));

    // Start server
    let addr = std::env::var("FRAUD_HUNTER_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to address {}", addr))?;

    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: POST http://{}/api/analyze", addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
