//! Trip planning orchestration: matrix, then sequence, then itinerary.

use chrono::NaiveTime;
use tracing::info;

use crate::client::{DirectionsProvider, MatrixProvider};
use crate::haversine::HaversineEstimator;
use crate::itinerary::ItineraryBuilder;
use crate::matrix::MatrixBuilder;
use crate::model::{Coordinate, Destination, Route, TravelProfile};
use crate::sequencer::{SequenceOptions, sequence};

/// Planning parameters supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    pub profile: TravelProfile,
    /// Tour start, local time. Defaults to 08:00.
    pub start: Option<NaiveTime>,
    /// Per-day time budget in minutes; absent means unconstrained.
    pub time_budget_min: Option<u32>,
    /// Cap on the number of stops; absent means visit whatever fits.
    pub max_stops: Option<usize>,
}

/// Planning cannot even start. Degraded routing data is NOT an error; the
/// planner silently substitutes estimates for that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("traveler location is unavailable")]
    MissingOrigin,
    #[error("no destinations provided")]
    NoDestinations,
}

/// Plans complete itineraries against a routing gateway client.
///
/// Every call to [`plan`](Self::plan) produces a fresh [`Route`]; nothing is
/// cached or mutated across invocations, so one planner may serve concurrent
/// planning requests.
pub struct TripPlanner<C> {
    client: C,
    estimator: HaversineEstimator,
    options: PlanOptions,
}

impl<C> TripPlanner<C>
where
    C: MatrixProvider + DirectionsProvider + Sync,
{
    pub fn new(client: C, options: PlanOptions) -> Self {
        Self {
            client,
            estimator: HaversineEstimator::default(),
            options,
        }
    }

    /// Overrides the fallback estimator (e.g. a different assumed speed).
    pub fn with_estimator(mut self, estimator: HaversineEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    /// Produces the visiting order and totals for the given traveler
    /// position and catalog slice.
    ///
    /// An empty catalog and a missing origin are the only hard failures; a
    /// plan where no destination is feasible returns an empty `Route`.
    pub async fn plan(
        &self,
        origin: Option<Coordinate>,
        destinations: &[Destination],
    ) -> Result<Route, PlanError> {
        let origin = origin.ok_or(PlanError::MissingOrigin)?;
        if destinations.is_empty() {
            return Err(PlanError::NoDestinations);
        }

        let coordinates: Vec<Coordinate> =
            destinations.iter().map(|d| d.coordinates).collect();
        let matrix = MatrixBuilder::new(
            &self.client,
            self.estimator.clone(),
            self.options.profile,
        )
        .build(origin, &coordinates)
        .await;

        let stops = sequence(
            &matrix,
            destinations,
            &SequenceOptions {
                start: self.options.start,
                time_budget_min: self.options.time_budget_min,
                max_stops: self.options.max_stops,
            },
        );
        if stops.is_empty() {
            info!("no destination is feasible for this plan");
        }

        let route = ItineraryBuilder::new(&self.client, self.options.profile)
            .assemble(origin, destinations, &stops, matrix.source())
            .await;

        Ok(route)
    }
}
