//! Domain model for itinerary planning.
//!
//! Destinations are owned by the catalog and read-only to the planner; a
//! [`Route`] is built fresh per planning invocation and never mutated after
//! it is returned.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Latitude or longitude outside the WGS84 range.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("coordinate out of range: latitude {latitude}, longitude {longitude}")]
pub struct InvalidCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Validates latitude ∈ [-90, 90] and longitude ∈ [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinate> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(InvalidCoordinate {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Wire order used by the routing provider: `[lon, lat]`.
    pub fn to_lon_lat(self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

/// Daily opening window in local time. `open` must not be after `close`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpeningHours {
    #[serde(with = "time_of_day")]
    pub open: NaiveTime,
    #[serde(with = "time_of_day")]
    pub close: NaiveTime,
}

impl OpeningHours {
    pub fn new(open: NaiveTime, close: NaiveTime) -> Self {
        Self { open, close }
    }
}

/// Catalog hours are `"HH:MM"` strings.
mod time_of_day {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(de::Error::custom)
    }
}

/// Routing profile accepted by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TravelProfile {
    #[default]
    #[serde(rename = "driving-car")]
    DrivingCar,
    #[serde(rename = "driving-hgv")]
    DrivingHgv,
    #[serde(rename = "cycling-regular")]
    CyclingRegular,
}

impl TravelProfile {
    /// URL path segment for the provider's endpoints.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DrivingCar => "driving-car",
            Self::DrivingHgv => "driving-hgv",
            Self::CyclingRegular => "cycling-regular",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub city: String,
    pub province: String,
}

/// A candidate sightseeing stop from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub id: u64,
    pub name: String,
    pub location: Place,
    pub coordinates: Coordinate,
    pub hours: OpeningHours,
    /// Typical on-site visit length in minutes.
    pub duration: u32,
    /// Ticket price in whole currency units.
    pub price: u64,
    /// Travel modes the destination is reachable by.
    #[serde(default)]
    pub transportation: Vec<TravelProfile>,
}

/// Leg geometry as a decoded coordinate sequence.
///
/// Points are `(latitude, longitude)` pairs. Encoding to and from compact
/// wire formats happens at API boundaries, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<(f64, f64)>,
}

impl Polyline {
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self { points }
    }

    /// Builds from the provider's `[lon, lat]` coordinate arrays.
    pub fn from_lon_lat(coords: &[[f64; 2]]) -> Self {
        Self {
            points: coords.iter().map(|c| (c[1], c[0])).collect(),
        }
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn into_points(self) -> Vec<(f64, f64)> {
        self.points
    }
}

/// One visited stop; position within [`Route::nodes`] is the visiting order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteNode {
    pub destination: Destination,
    /// Travel distance from the previous node (the origin for the first), km.
    pub distance_km: f64,
    /// Travel time from the previous node, minutes.
    pub duration_min: u32,
    /// Road geometry for the leg, when the provider supplied one.
    pub geometry: Option<Polyline>,
}

/// Where the route's distance/duration figures came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteSource {
    /// Every leg is backed by the routing provider.
    Provider,
    /// Every leg is a great-circle estimate.
    Estimated,
    /// Some legs degraded to estimates.
    Mixed,
}

/// A planned itinerary. Immutable once returned; planning again produces a
/// new `Route`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub nodes: Vec<RouteNode>,
    pub total_distance_km: f64,
    /// Travel plus on-site time, minutes.
    pub total_duration_min: u32,
    /// Sum of ticket prices. Transportation fares are not modeled.
    pub total_cost: u64,
    pub source: RouteSource,
}

impl Route {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
