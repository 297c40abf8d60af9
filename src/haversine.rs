//! Haversine travel estimates (fallback when the routing gateway degrades).
//!
//! Uses great-circle distance and an assumed average speed. Less accurate
//! than provider routing (ignores roads) but always available, so planning
//! can complete even when the gateway is rate-limited or unconfigured.

use rayon::prelude::*;

use crate::matrix::LegEstimate;
use crate::model::Coordinate;

/// Average driving speed assumption for time estimation.
const DEFAULT_SPEED_KMH: f64 = 40.0;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle estimator producing the same matrix shape as the gateway's
/// matrix endpoint.
#[derive(Debug, Clone)]
pub struct HaversineEstimator {
    /// Assumed average travel speed in km/h.
    pub speed_kmh: f64,
}

impl Default for HaversineEstimator {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
        }
    }
}

impl HaversineEstimator {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }

    /// Great-circle distance between two points in kilometers.
    pub fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
        let lat1_rad = from.latitude.to_radians();
        let lat2_rad = to.latitude.to_radians();
        let delta_lat = (to.latitude - from.latitude).to_radians();
        let delta_lon = (to.longitude - from.longitude).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_KM * c
    }

    /// Travel time for a distance, in whole minutes rounded up so travel is
    /// never underestimated.
    fn km_to_minutes(&self, km: f64) -> u32 {
        (km / self.speed_kmh * 60.0).ceil() as u32
    }

    fn leg(&self, from: Coordinate, to: Coordinate) -> LegEstimate {
        let distance_km = Self::haversine_km(from, to);
        LegEstimate {
            distance_km,
            duration_min: self.km_to_minutes(distance_km),
        }
    }

    /// All-pairs estimates, indexed by the provided location order.
    pub fn matrix_for(&self, locations: &[Coordinate]) -> Vec<Vec<LegEstimate>> {
        locations
            .par_iter()
            .enumerate()
            .map(|(i, from)| {
                locations
                    .iter()
                    .enumerate()
                    .map(|(j, to)| {
                        if i == j {
                            LegEstimate::default()
                        } else {
                            self.leg(*from, *to)
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn same_point_is_zero() {
        let dist = HaversineEstimator::haversine_km(coord(-6.2, 106.8), coord(-6.2, 106.8));
        assert!(dist < 0.001, "same point should have ~0 distance");
    }

    #[test]
    fn known_distance() {
        // Jakarta (-6.2088, 106.8456) to Yogyakarta (-7.8014, 110.3647)
        // is roughly 430 km great-circle.
        let dist =
            HaversineEstimator::haversine_km(coord(-6.2088, 106.8456), coord(-7.8014, 110.3647));
        assert!(
            dist > 400.0 && dist < 460.0,
            "Jakarta to Yogyakarta should be ~430km, got {}",
            dist
        );
    }

    #[test]
    fn matrix_diagonal_is_zero() {
        let estimator = HaversineEstimator::default();
        let locations = vec![coord(-6.2, 106.8), coord(-6.3, 106.9), coord(-6.4, 107.0)];
        let matrix = estimator.matrix_for(&locations);

        for (i, row) in matrix.iter().enumerate() {
            assert_eq!(row[i], LegEstimate::default(), "diagonal should be zero");
        }
    }

    #[test]
    fn matrix_symmetric() {
        let estimator = HaversineEstimator::default();
        let locations = vec![coord(-6.2, 106.8), coord(-7.8, 110.4)];
        let matrix = estimator.matrix_for(&locations);

        // Haversine is symmetric
        assert_eq!(matrix[0][1], matrix[1][0]);
    }

    #[test]
    fn travel_time_rounds_up() {
        let estimator = HaversineEstimator::new(40.0);
        // 10 km at 40 km/h = 15 minutes exactly
        assert_eq!(estimator.km_to_minutes(10.0), 15);
        // 10.1 km takes a hair over 15 minutes; never round down
        assert_eq!(estimator.km_to_minutes(10.1), 16);
    }
}
