//! Central Java / Yogyakarta sightseeing catalog for realistic fixtures.
//!
//! Coordinates, opening hours and ticket prices mirror the real sights.

use chrono::NaiveTime;

use trip_planner::model::{Coordinate, Destination, OpeningHours, Place, TravelProfile};

/// Traveler origin: central Jakarta.
pub fn jakarta() -> Coordinate {
    Coordinate::new(-6.2088, 106.8456).expect("valid fixture coordinate")
}

pub fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid fixture time")
}

/// Builder for custom destinations in sequencer/planner tests.
pub fn destination(
    id: u64,
    name: &str,
    coordinates: Coordinate,
    open: NaiveTime,
    close: NaiveTime,
    duration: u32,
    price: u64,
) -> Destination {
    Destination {
        id,
        name: name.to_string(),
        location: Place {
            city: "Yogyakarta".to_string(),
            province: "DIY".to_string(),
        },
        coordinates,
        hours: OpeningHours::new(open, close),
        duration,
        price,
        transportation: vec![TravelProfile::DrivingCar],
    }
}

/// The five-sight catalog: Borobudur, Prambanan, the Kraton, Taman Sari
/// and Malioboro.
pub fn catalog() -> Vec<Destination> {
    vec![
        destination(
            1,
            "Candi Borobudur",
            Coordinate::new(-7.6079, 110.2038).expect("valid fixture coordinate"),
            hm(6, 0),
            hm(17, 0),
            120,
            50_000,
        ),
        destination(
            2,
            "Candi Prambanan",
            Coordinate::new(-7.7520, 110.4915).expect("valid fixture coordinate"),
            hm(6, 0),
            hm(18, 0),
            90,
            50_000,
        ),
        destination(
            3,
            "Keraton Yogyakarta",
            Coordinate::new(-7.8053, 110.3644).expect("valid fixture coordinate"),
            hm(8, 0),
            hm(14, 0),
            60,
            15_000,
        ),
        destination(
            4,
            "Taman Sari",
            Coordinate::new(-7.8099, 110.3594).expect("valid fixture coordinate"),
            hm(9, 0),
            hm(15, 0),
            45,
            5_000,
        ),
        destination(
            5,
            "Malioboro",
            Coordinate::new(-7.7926, 110.3656).expect("valid fixture coordinate"),
            hm(0, 0),
            hm(23, 59),
            120,
            0,
        ),
    ]
}
