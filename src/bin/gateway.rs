//! Serves the routing gateway.
//!
//! Reads `ORS_API_KEY` (and optionally `ORS_UPSTREAM_URL`, `PORT`) from the
//! environment or a `.env` file.

use tracing::{info, warn};

use trip_planner::gateway::{Gateway, GatewayConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("trip_planner=info,tower_http=debug")
        .init();

    dotenvy::dotenv().ok();

    let config = GatewayConfig::from_env();
    if config.api_key.is_none() {
        warn!("ORS_API_KEY not configured, gateway will answer 503 with fallback");
    }

    let app = Gateway::new(config)?.router();

    let port = std::env::var("PORT")
        .ok()
        .and_then(|raw| raw.parse::<u16>().ok())
        .unwrap_or(3000);
    let addr = format!("0.0.0.0:{port}");
    info!("routing gateway listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
