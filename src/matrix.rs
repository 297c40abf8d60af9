//! Travel matrix construction: provider-backed, estimated on degradation.
//!
//! One matrix call covers origin plus all candidates, so network round-trips
//! stay O(1) regardless of destination count. Any degraded or failed outcome
//! drops to great-circle estimates with the exact same shape; the sequencer
//! never sees the difference.

use tracing::warn;

use crate::client::{MatrixProvider, MatrixResponse, RoutingOutcome};
use crate::haversine::HaversineEstimator;
use crate::model::{Coordinate, TravelProfile};

/// Distance/duration estimate for one ordered pair of points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LegEstimate {
    pub distance_km: f64,
    /// Whole minutes, rounded up.
    pub duration_min: u32,
}

/// Which path produced the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixSource {
    Provider,
    Estimated,
}

/// All-pairs travel estimates, indexed by input order; index 0 is the origin.
#[derive(Debug, Clone)]
pub struct TravelMatrix {
    entries: Vec<Vec<LegEstimate>>,
    source: MatrixSource,
}

impl TravelMatrix {
    pub fn new(entries: Vec<Vec<LegEstimate>>, source: MatrixSource) -> Self {
        Self { entries, source }
    }

    /// Number of points covered (origin included).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, from: usize, to: usize) -> LegEstimate {
        self.entries[from][to]
    }

    pub fn source(&self) -> MatrixSource {
        self.source
    }
}

/// Builds a [`TravelMatrix`] for the origin plus candidate destinations.
pub struct MatrixBuilder<'a, P> {
    provider: &'a P,
    estimator: HaversineEstimator,
    profile: TravelProfile,
}

impl<'a, P: MatrixProvider + Sync> MatrixBuilder<'a, P> {
    pub fn new(provider: &'a P, estimator: HaversineEstimator, profile: TravelProfile) -> Self {
        Self {
            provider,
            estimator,
            profile,
        }
    }

    /// Requests the provider matrix, estimating instead whenever the gateway
    /// degrades or the payload is unusable. Always returns a complete matrix.
    pub async fn build(&self, origin: Coordinate, destinations: &[Coordinate]) -> TravelMatrix {
        let mut locations = Vec::with_capacity(destinations.len() + 1);
        locations.push(origin);
        locations.extend_from_slice(destinations);

        match self.provider.matrix(&locations, self.profile).await {
            Ok(RoutingOutcome::Available(data)) => {
                match convert_provider_matrix(&data, locations.len()) {
                    Some(entries) => return TravelMatrix::new(entries, MatrixSource::Provider),
                    None => warn!("provider matrix malformed, estimating instead"),
                }
            }
            Ok(RoutingOutcome::Degraded(reason)) => {
                warn!(%reason, "matrix degraded, estimating instead");
            }
            Err(err) => {
                warn!(%err, "matrix request failed, estimating instead");
            }
        }

        TravelMatrix::new(
            self.estimator.matrix_for(&locations),
            MatrixSource::Estimated,
        )
    }
}

/// Meters/seconds from the provider become km (unrounded) and whole minutes
/// (rounded up). Returns `None` unless both grids are complete `n`×`n` with
/// finite, non-negative cells.
fn convert_provider_matrix(data: &MatrixResponse, n: usize) -> Option<Vec<Vec<LegEstimate>>> {
    let distances = data.distances.as_ref()?;
    let durations = data.durations.as_ref()?;
    if distances.len() != n || durations.len() != n {
        return None;
    }

    let mut entries = Vec::with_capacity(n);
    for (distance_row, duration_row) in distances.iter().zip(durations) {
        if distance_row.len() != n || duration_row.len() != n {
            return None;
        }
        let mut row = Vec::with_capacity(n);
        for (&meters, &seconds) in distance_row.iter().zip(duration_row) {
            let meters = meters.filter(|v| v.is_finite() && *v >= 0.0)?;
            let seconds = seconds.filter(|v| v.is_finite() && *v >= 0.0)?;
            row.push(LegEstimate {
                distance_km: meters / 1000.0,
                duration_min: (seconds / 60.0).ceil() as u32,
            });
        }
        entries.push(row);
    }
    Some(entries)
}
