//! Itinerary assembly: per-leg road geometry and totals.
//!
//! Each leg's directions request is independent, so the builder fans them
//! all out at once and joins before folding totals. A degraded leg keeps
//! its matrix estimate and simply carries no geometry; one bad leg never
//! fails the itinerary.

use futures::future::join_all;
use tracing::warn;

use crate::client::{DirectionsProvider, DirectionsSummary, RoutingOutcome};
use crate::matrix::MatrixSource;
use crate::model::{Coordinate, Destination, Route, RouteNode, RouteSource, TravelProfile};
use crate::sequencer::ScheduledStop;

pub struct ItineraryBuilder<'a, P> {
    directions: &'a P,
    profile: TravelProfile,
}

impl<'a, P: DirectionsProvider + Sync> ItineraryBuilder<'a, P> {
    pub fn new(directions: &'a P, profile: TravelProfile) -> Self {
        Self {
            directions,
            profile,
        }
    }

    /// Walks the sequenced stops, upgrading each leg with road-accurate
    /// figures where the provider answers, and folds distance, duration
    /// (travel plus on-site) and ticket cost into a fresh [`Route`].
    ///
    /// `matrix_source` records the quality of the estimates legs fall back
    /// to, so the route's provenance stays honest under partial degradation.
    pub async fn assemble(
        &self,
        origin: Coordinate,
        destinations: &[Destination],
        stops: &[ScheduledStop],
        matrix_source: MatrixSource,
    ) -> Route {
        let legs = join_all(stops.iter().enumerate().map(|(pos, stop)| {
            let from = match pos {
                0 => origin,
                _ => destinations[stops[pos - 1].index].coordinates,
            };
            let to = destinations[stop.index].coordinates;
            self.fetch_leg(from, to)
        }))
        .await;

        let mut nodes = Vec::with_capacity(stops.len());
        let mut total_distance_km = 0.0;
        let mut total_duration_min = 0u32;
        let mut total_cost = 0u64;
        let mut road_accurate = 0usize;

        for (stop, leg) in stops.iter().zip(legs) {
            let destination = destinations[stop.index].clone();
            let (distance_km, duration_min, geometry) = match leg {
                Some(summary) => {
                    road_accurate += 1;
                    (
                        summary.distance_km,
                        summary.duration_min,
                        Some(summary.geometry),
                    )
                }
                None => (stop.leg.distance_km, stop.leg.duration_min, None),
            };

            total_distance_km += distance_km;
            total_duration_min += duration_min + destination.duration;
            total_cost += destination.price;
            nodes.push(RouteNode {
                destination,
                distance_km,
                duration_min,
                geometry,
            });
        }

        let source = route_source(nodes.len(), road_accurate, matrix_source);
        Route {
            nodes,
            total_distance_km,
            total_duration_min,
            total_cost,
            source,
        }
    }

    async fn fetch_leg(&self, from: Coordinate, to: Coordinate) -> Option<DirectionsSummary> {
        match self.directions.directions(from, to, self.profile).await {
            Ok(RoutingOutcome::Available(summary)) => Some(summary),
            Ok(RoutingOutcome::Degraded(reason)) => {
                warn!(%reason, "leg directions degraded, keeping matrix figures");
                None
            }
            Err(err) => {
                warn!(%err, "leg directions failed, keeping matrix figures");
                None
            }
        }
    }
}

fn route_source(legs: usize, road_accurate: usize, matrix_source: MatrixSource) -> RouteSource {
    // legs that kept their matrix figures inherit the matrix's quality
    if matrix_source == MatrixSource::Provider {
        return RouteSource::Provider;
    }
    if legs > 0 && road_accurate == legs {
        RouteSource::Provider
    } else if road_accurate == 0 {
        RouteSource::Estimated
    } else {
        RouteSource::Mixed
    }
}
