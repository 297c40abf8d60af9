//! Visit-order sequencing: greedy nearest-feasible-neighbor.
//!
//! Deliberately not a traveling-salesman solver. The greedy pass with no
//! backtracking trades tour optimality for determinism and low latency;
//! once a candidate is infeasible it stays skipped, which loses nothing
//! because waiting is allowed and time only moves forward.

use std::cmp::Ordering;

use chrono::{NaiveTime, TimeDelta, Timelike};

use crate::matrix::{LegEstimate, TravelMatrix};
use crate::model::Destination;

const DEFAULT_START_MIN: u32 = 8 * 60;
const MINUTES_PER_DAY: i64 = 24 * 60;

/// Sequencing constraints. Absent fields are unconstrained.
#[derive(Debug, Clone, Default)]
pub struct SequenceOptions {
    /// Tour start, local time. Defaults to 08:00.
    pub start: Option<NaiveTime>,
    /// Per-day budget covering travel, waiting and on-site time, minutes.
    pub time_budget_min: Option<u32>,
    /// Cap on the number of stops.
    pub max_stops: Option<usize>,
}

/// One chosen stop, in visiting order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledStop {
    /// Index into the destination slice (matrix index minus one).
    pub index: usize,
    /// Matrix estimate for the leg arriving here.
    pub leg: LegEstimate,
    /// Clock time of arrival, before any wait for opening.
    pub arrival: NaiveTime,
    /// Clock time the visit ends.
    pub departure: NaiveTime,
}

struct Candidate {
    index: usize,
    leg: LegEstimate,
    close_min: u32,
    arrival_min: u32,
    service_start_min: u32,
    spent_min: u32,
}

/// Orders destinations by repeatedly taking the nearest candidate that can
/// still be reached within its opening hours and the remaining budget.
///
/// `destinations[i]` corresponds to matrix index `i + 1`; matrix index 0 is
/// the origin. Ties on distance prefer the earlier closing time, then the
/// lower input index. An empty result means nothing was feasible; that is a
/// valid outcome, not an error.
pub fn sequence(
    matrix: &TravelMatrix,
    destinations: &[Destination],
    options: &SequenceOptions,
) -> Vec<ScheduledStop> {
    let start_min = options.start.map_or(DEFAULT_START_MIN, minutes_from_midnight);
    let max_stops = options.max_stops.unwrap_or(destinations.len());

    let mut visited = vec![false; destinations.len()];
    let mut ruled_out = vec![false; destinations.len()];
    let mut stops = Vec::new();
    let mut current = 0usize;
    let mut elapsed_min = 0u32;

    while stops.len() < max_stops {
        let mut best: Option<Candidate> = None;

        for (i, destination) in destinations.iter().enumerate() {
            if visited[i] || ruled_out[i] {
                continue;
            }

            let leg = matrix.get(current, i + 1);
            let arrival_min = start_min + elapsed_min + leg.duration_min;
            let open_min = minutes_from_midnight(destination.hours.open);
            let close_min = minutes_from_midnight(destination.hours.close);

            if arrival_min > close_min {
                ruled_out[i] = true;
                continue;
            }

            // early arrivals wait for opening; the wait counts against the budget
            let service_start_min = arrival_min.max(open_min);
            let spent_min = (service_start_min - (start_min + elapsed_min)) + destination.duration;

            if let Some(budget) = options.time_budget_min {
                if elapsed_min + spent_min > budget {
                    ruled_out[i] = true;
                    continue;
                }
            }

            let candidate = Candidate {
                index: i,
                leg,
                close_min,
                arrival_min,
                service_start_min,
                spent_min,
            };

            let better = match &best {
                None => true,
                Some(incumbent) => match leg.distance_km.partial_cmp(&incumbent.leg.distance_km) {
                    Some(Ordering::Less) => true,
                    // tighter closing time first reduces later infeasibility
                    Some(Ordering::Equal) => close_min < incumbent.close_min,
                    _ => false,
                },
            };
            if better {
                best = Some(candidate);
            }
        }

        let Some(chosen) = best else {
            break;
        };

        let on_site = destinations[chosen.index].duration;
        visited[chosen.index] = true;
        stops.push(ScheduledStop {
            index: chosen.index,
            leg: chosen.leg,
            arrival: clock_time(chosen.arrival_min),
            departure: clock_time(chosen.service_start_min + on_site),
        });
        elapsed_min += chosen.spent_min;
        current = chosen.index + 1;
    }

    stops
}

fn minutes_from_midnight(time: NaiveTime) -> u32 {
    time.num_seconds_from_midnight() / 60
}

fn clock_time(minutes: u32) -> NaiveTime {
    // wraps past midnight
    NaiveTime::MIN + TimeDelta::minutes(i64::from(minutes) % MINUTES_PER_DAY)
}
