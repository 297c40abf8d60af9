//! Test fixtures for trip-planner.
//!
//! Provides a realistic destination catalog (Central Java / Yogyakarta
//! sights with real coordinates, hours and ticket prices) plus builders
//! for custom destinations.

pub mod java_destinations;

pub use java_destinations::*;
