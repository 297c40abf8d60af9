//! Planner-side client for the routing gateway.
//!
//! The gateway reports degradation through a `fallback` flag on its error
//! bodies. That flag is surfaced here as [`RoutingOutcome::Degraded`] so
//! callers must decide what to substitute instead of testing a boolean.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{Coordinate, Polyline, TravelProfile};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Why the gateway asked the caller to degrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradeReason {
    /// The gateway has no upstream credential configured.
    NotConfigured,
    /// The upstream provider rate-limited the request.
    RateLimited,
    /// The upstream provider returned a non-2xx status.
    Upstream { status: u16 },
    /// The gateway failed internally (network or parse failure upstream).
    Internal,
}

impl DegradeReason {
    fn from_status(status: u16) -> Self {
        match status {
            503 => Self::NotConfigured,
            429 => Self::RateLimited,
            500 => Self::Internal,
            status => Self::Upstream { status },
        }
    }
}

impl fmt::Display for DegradeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "routing service not configured"),
            Self::RateLimited => write!(f, "routing provider rate limit exceeded"),
            Self::Upstream { status } => write!(f, "routing provider error (status {status})"),
            Self::Internal => write!(f, "routing gateway internal error"),
        }
    }
}

/// Result of a gateway call that completed without a caller error.
#[derive(Debug, Clone, PartialEq)]
pub enum RoutingOutcome<T> {
    /// The provider answered; payload is road-accurate.
    Available(T),
    /// The gateway degraded; substitute an approximation.
    Degraded(DegradeReason),
}

/// Hard failures: caller bugs and transport problems reaching the gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway rejected request ({status}): {message}")]
    InvalidRequest { status: u16, message: String },
    #[error("gateway transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected gateway payload: {0}")]
    UnexpectedPayload(String),
}

/// All-pairs metrics from the provider's matrix endpoint.
///
/// Distances are meters, durations seconds; cells are `None` for pairs the
/// provider could not route.
#[derive(Debug, Clone, Deserialize)]
pub struct MatrixResponse {
    pub distances: Option<Vec<Vec<Option<f64>>>>,
    pub durations: Option<Vec<Vec<Option<f64>>>>,
}

/// One routed leg from the provider's directions endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsSummary {
    pub distance_km: f64,
    /// Whole minutes, rounded up.
    pub duration_min: u32,
    pub geometry: Polyline,
}

/// Provides the all-pairs travel matrix for a set of locations.
///
/// The matrix is indexed by the provided location order.
#[async_trait]
pub trait MatrixProvider {
    async fn matrix(
        &self,
        locations: &[Coordinate],
        profile: TravelProfile,
    ) -> Result<RoutingOutcome<MatrixResponse>, GatewayError>;
}

/// Provides road-accurate geometry for a single leg.
#[async_trait]
pub trait DirectionsProvider {
    async fn directions(
        &self,
        from: Coordinate,
        to: Coordinate,
        profile: TravelProfile,
    ) -> Result<RoutingOutcome<DirectionsSummary>, GatewayError>;
}

/// HTTP client for the routing gateway's envelope endpoint.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    endpoint: String,
    http: reqwest::Client,
}

impl GatewayClient {
    /// `endpoint` is the full URL of the gateway route, e.g.
    /// `http://localhost:3000/api/openroute`.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            endpoint: endpoint.into(),
            http,
        })
    }

    async fn post(
        &self,
        body: &impl Serialize,
    ) -> Result<RoutingOutcome<reqwest::Response>, GatewayError> {
        let response = self.http.post(&self.endpoint).json(body).send().await?;
        let status = response.status().as_u16();
        if response.status().is_success() {
            return Ok(RoutingOutcome::Available(response));
        }

        let body: GatewayErrorBody = response.json().await.unwrap_or_default();
        if body.fallback {
            Ok(RoutingOutcome::Degraded(DegradeReason::from_status(status)))
        } else {
            Err(GatewayError::InvalidRequest {
                status,
                message: body.error,
            })
        }
    }
}

#[async_trait]
impl MatrixProvider for GatewayClient {
    async fn matrix(
        &self,
        locations: &[Coordinate],
        profile: TravelProfile,
    ) -> Result<RoutingOutcome<MatrixResponse>, GatewayError> {
        let envelope = MatrixEnvelope {
            endpoint: "matrix",
            locations: locations.iter().map(|c| c.to_lon_lat()).collect(),
            metrics: ["distance", "duration"],
            profile: profile.as_str(),
        };

        match self.post(&envelope).await? {
            RoutingOutcome::Available(response) => {
                let data = response
                    .json::<MatrixResponse>()
                    .await
                    .map_err(|err| GatewayError::UnexpectedPayload(err.to_string()))?;
                Ok(RoutingOutcome::Available(data))
            }
            RoutingOutcome::Degraded(reason) => Ok(RoutingOutcome::Degraded(reason)),
        }
    }
}

#[async_trait]
impl DirectionsProvider for GatewayClient {
    async fn directions(
        &self,
        from: Coordinate,
        to: Coordinate,
        profile: TravelProfile,
    ) -> Result<RoutingOutcome<DirectionsSummary>, GatewayError> {
        let envelope = DirectionsEnvelope {
            endpoint: "directions",
            coordinates: vec![from.to_lon_lat(), to.to_lon_lat()],
            profile: profile.as_str(),
        };

        match self.post(&envelope).await? {
            RoutingOutcome::Available(response) => {
                let data = response
                    .json::<DirectionsResponse>()
                    .await
                    .map_err(|err| GatewayError::UnexpectedPayload(err.to_string()))?;
                Ok(RoutingOutcome::Available(data.into_summary()?))
            }
            RoutingOutcome::Degraded(reason) => Ok(RoutingOutcome::Degraded(reason)),
        }
    }
}

#[derive(Serialize)]
struct MatrixEnvelope {
    endpoint: &'static str,
    locations: Vec<[f64; 2]>,
    metrics: [&'static str; 2],
    profile: &'static str,
}

#[derive(Serialize)]
struct DirectionsEnvelope {
    endpoint: &'static str,
    coordinates: Vec<[f64; 2]>,
    profile: &'static str,
}

#[derive(Debug, Default, Deserialize)]
struct GatewayErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    fallback: bool,
}

/// GeoJSON feature collection returned by the directions endpoint.
#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    features: Vec<DirectionsFeature>,
}

#[derive(Debug, Deserialize)]
struct DirectionsFeature {
    properties: FeatureProperties,
    geometry: FeatureGeometry,
}

#[derive(Debug, Deserialize)]
struct FeatureProperties {
    summary: LegSummary,
}

#[derive(Debug, Deserialize)]
struct LegSummary {
    /// Meters.
    distance: f64,
    /// Seconds.
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct FeatureGeometry {
    coordinates: Vec<[f64; 2]>,
}

impl DirectionsResponse {
    fn into_summary(mut self) -> Result<DirectionsSummary, GatewayError> {
        if self.features.is_empty() {
            return Err(GatewayError::UnexpectedPayload(
                "directions response carried no features".to_string(),
            ));
        }
        let feature = self.features.remove(0);
        Ok(DirectionsSummary {
            distance_km: feature.properties.summary.distance / 1000.0,
            duration_min: (feature.properties.summary.duration / 60.0).ceil() as u32,
            geometry: Polyline::from_lon_lat(&feature.geometry.coordinates),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degrade_reason_maps_gateway_statuses() {
        assert_eq!(
            DegradeReason::from_status(503),
            DegradeReason::NotConfigured
        );
        assert_eq!(DegradeReason::from_status(429), DegradeReason::RateLimited);
        assert_eq!(DegradeReason::from_status(500), DegradeReason::Internal);
        assert_eq!(
            DegradeReason::from_status(502),
            DegradeReason::Upstream { status: 502 }
        );
    }

    #[test]
    fn matrix_envelope_uses_lon_lat_order() {
        let jakarta = Coordinate::new(-6.2088, 106.8456).unwrap();
        let envelope = MatrixEnvelope {
            endpoint: "matrix",
            locations: vec![jakarta.to_lon_lat()],
            metrics: ["distance", "duration"],
            profile: TravelProfile::DrivingCar.as_str(),
        };

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["endpoint"], "matrix");
        assert_eq!(json["locations"][0][0], 106.8456);
        assert_eq!(json["locations"][0][1], -6.2088);
        assert_eq!(json["profile"], "driving-car");
    }

    #[test]
    fn directions_response_converts_units_and_geometry() {
        let raw = serde_json::json!({
            "features": [{
                "properties": { "summary": { "distance": 42_500.0, "duration": 3_601.0 } },
                "geometry": { "type": "LineString", "coordinates": [[106.8, -6.2], [107.6, -6.9]] }
            }]
        });
        let response: DirectionsResponse = serde_json::from_value(raw).unwrap();
        let summary = response.into_summary().unwrap();

        assert!((summary.distance_km - 42.5).abs() < 1e-9);
        // 3601 s is a hair over 60 minutes; rounded up
        assert_eq!(summary.duration_min, 61);
        assert_eq!(summary.geometry.points(), &[(-6.2, 106.8), (-6.9, 107.6)]);
    }

    #[test]
    fn empty_directions_response_is_rejected() {
        let response: DirectionsResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            response.into_summary(),
            Err(GatewayError::UnexpectedPayload(_))
        ));
    }
}
