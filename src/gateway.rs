//! Routing gateway: server-side proxy for the OpenRouteService API.
//!
//! Keeps the provider credential out of client hands and normalizes the
//! `directions` and `matrix` endpoints behind a single envelope route.
//! Every failure path becomes a structured response; errors the caller can
//! recover from by approximating carry `"fallback": true`.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use serde::Deserialize;
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::model::TravelProfile;

/// Hosted OpenRouteService API root.
pub const DEFAULT_UPSTREAM_URL: &str = "https://api.openrouteservice.org/v2";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Gateway configuration, injected at construction so tests can fake the
/// credential or point the upstream at a stub.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Upstream API key. `None` means the gateway answers 503 with
    /// `fallback: true` and never contacts the provider.
    pub api_key: Option<String>,
    pub upstream_url: String,
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl GatewayConfig {
    /// Reads `ORS_API_KEY` and `ORS_UPSTREAM_URL` from the environment.
    /// Meant for the binary edge; library callers construct the config
    /// directly.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("ORS_API_KEY").ok().filter(|k| !k.is_empty()),
            upstream_url: std::env::var("ORS_UPSTREAM_URL")
                .unwrap_or_else(|_| DEFAULT_UPSTREAM_URL.to_string()),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_upstream_url(mut self, upstream_url: impl Into<String>) -> Self {
        self.upstream_url = upstream_url.into();
        self
    }
}

/// The proxy itself: stateless aside from the cold-loaded config and the
/// shared HTTP client, so invocations may run concurrently without
/// coordination.
#[derive(Debug)]
pub struct Gateway {
    config: GatewayConfig,
    http: reqwest::Client,
}

impl Gateway {
    pub fn new(config: GatewayConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, http })
    }

    /// Builds the HTTP surface: `POST /api/openroute`, permissive CORS,
    /// preflight handled by the CORS layer, 405 for other methods.
    pub fn router(self) -> Router {
        let cors = CorsLayer::new()
            // mirrored origin is the wildcard that stays valid with the
            // credentials flag set
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true);

        Router::new()
            .route(
                "/api/openroute",
                post(route_request).fallback(method_not_allowed),
            )
            .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
            .with_state(Arc::new(self))
    }

    /// Exactly one outbound call per invocation.
    async fn forward(&self, call: UpstreamCall, api_key: &str) -> Response {
        info!(url = %call.url, "forwarding to routing provider");

        let result = self
            .http
            .post(&call.url)
            .header(reqwest::header::AUTHORIZATION, api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&call.body)
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                error!(%err, "routing provider unreachable");
                return internal_error(&err.to_string());
            }
        };

        let status = response.status().as_u16();
        if status == 429 {
            warn!("routing provider rate limit exceeded");
            return (
                StatusCode::TOO_MANY_REQUESTS,
                axum::Json(json!({ "error": "Rate limit exceeded", "fallback": true })),
            )
                .into_response();
        }

        if !(200..300).contains(&status) {
            let details = response.text().await.unwrap_or_default();
            error!(status, %details, "routing provider error");
            let status =
                StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            return (
                status,
                axum::Json(json!({
                    "error": "OpenRouteService API error",
                    "fallback": true,
                    "details": details,
                })),
            )
                .into_response();
        }

        match response.json::<Value>().await {
            Ok(data) => (StatusCode::OK, axum::Json(data)).into_response(),
            Err(err) => {
                error!(%err, "routing provider returned unparseable body");
                internal_error(&err.to_string())
            }
        }
    }
}

/// A validated request, ready for upstream dispatch.
struct UpstreamCall {
    url: String,
    body: Value,
}

#[derive(Deserialize)]
struct DirectionsPayload {
    coordinates: Vec<[f64; 2]>,
    #[serde(default)]
    profile: TravelProfile,
}

#[derive(Deserialize)]
struct MatrixPayload {
    locations: Vec<[f64; 2]>,
    #[serde(default = "default_metrics")]
    metrics: Vec<String>,
    #[serde(default = "default_matrix_profile")]
    profile: String,
}

fn default_metrics() -> Vec<String> {
    vec!["distance".to_string(), "duration".to_string()]
}

fn default_matrix_profile() -> String {
    TravelProfile::DrivingCar.as_str().to_string()
}

async fn route_request(
    State(gateway): State<Arc<Gateway>>,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    let Some(endpoint) = body.get("endpoint").and_then(Value::as_str) else {
        return client_error("Missing endpoint parameter");
    };

    let call = match endpoint {
        "directions" => match parse_directions(&gateway.config.upstream_url, &body) {
            Ok(call) => call,
            Err(response) => return response,
        },
        "matrix" => match parse_matrix(&gateway.config.upstream_url, &body) {
            Ok(call) => call,
            Err(response) => return response,
        },
        _ => return client_error("Invalid endpoint"),
    };

    let Some(api_key) = gateway.config.api_key.as_deref() else {
        warn!("upstream API key not configured, telling caller to fall back");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            axum::Json(json!({
                "error": "OpenRouteService API key not configured",
                "fallback": true,
            })),
        )
            .into_response();
    };

    gateway.forward(call, api_key).await
}

fn parse_directions(upstream_url: &str, body: &Value) -> Result<UpstreamCall, Response> {
    let payload: DirectionsPayload =
        serde_json::from_value(body.clone()).map_err(|_| client_error("Invalid coordinates"))?;
    if payload.coordinates.len() < 2 {
        return Err(client_error("Invalid coordinates"));
    }

    Ok(UpstreamCall {
        url: format!("{}/directions/{}", upstream_url, payload.profile.as_str()),
        body: json!({
            "coordinates": payload.coordinates,
            "instructions": false,
            "geometry": true,
            // structured geometry, not an encoded polyline
            "format": "geojson",
        }),
    })
}

fn parse_matrix(upstream_url: &str, body: &Value) -> Result<UpstreamCall, Response> {
    let payload: MatrixPayload =
        serde_json::from_value(body.clone()).map_err(|_| client_error("Invalid locations"))?;
    if payload.locations.len() < 2 {
        return Err(client_error("Invalid locations"));
    }

    Ok(UpstreamCall {
        url: format!("{}/matrix/{}", upstream_url, payload.profile),
        body: json!({
            "locations": payload.locations,
            "metrics": payload.metrics,
        }),
    })
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        axum::Json(json!({ "error": "Method not allowed" })),
    )
        .into_response()
}

fn client_error(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({ "error": message })),
    )
        .into_response()
}

fn internal_error(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        axum::Json(json!({
            "error": "Internal server error",
            "fallback": true,
            "message": message,
        })),
    )
        .into_response()
}
