// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Great-circle distance and proximity checks.
//!
//! Distances use the spherical law of cosines and are reported in statute
//! miles (one arc-minute of central angle is one nautical mile).

use crate::models::{Attraction, Location};

/// Statute miles per nautical mile.
pub const STATUTE_MILES_PER_NAUTICAL_MILE: f64 = 1.150_779_45;

/// Radius used for "attractions around here" listings.
pub const ATTRACTION_PROXIMITY_RANGE_MILES: f64 = 200.0;

/// Default radius within which a visit earns an attraction's reward.
pub const DEFAULT_PROXIMITY_BUFFER_MILES: f64 = 10.0;

/// Distance between two locations in statute miles.
pub fn distance(a: &Location, b: &Location) -> f64 {
    let lat1 = a.latitude().to_radians();
    let lon1 = a.longitude().to_radians();
    let lat2 = b.latitude().to_radians();
    let lon2 = b.longitude().to_radians();

    // Rounding can push the cosine just past 1.0 for identical points.
    let cos_angle = (lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * (lon1 - lon2).cos())
        .clamp(-1.0, 1.0);
    let angle = cos_angle.acos();

    let nautical_miles = 60.0 * angle.to_degrees();
    STATUTE_MILES_PER_NAUTICAL_MILE * nautical_miles
}

/// True if `location` lies within `radius_miles` of the attraction (inclusive).
pub fn is_within(attraction: &Attraction, location: &Location, radius_miles: f64) -> bool {
    distance(&attraction.location, location) <= radius_miles
}

/// True if `location` is within the fixed 200-mile attraction range.
pub fn is_within_attraction_proximity(attraction: &Attraction, location: &Location) -> bool {
    is_within(attraction, location, ATTRACTION_PROXIMITY_RANGE_MILES)
}
