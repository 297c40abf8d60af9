//! trip-planner core
//!
//! Plans multi-stop sightseeing itineraries: a routing gateway proxying the
//! OpenRouteService API, a travel matrix with great-circle fallback, a
//! greedy nearest-feasible-neighbor sequencer, and an itinerary aggregator
//! producing the final route with totals.

pub mod client;
pub mod gateway;
pub mod haversine;
pub mod itinerary;
pub mod matrix;
pub mod model;
pub mod planner;
pub mod sequencer;
