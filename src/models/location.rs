// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Geographic coordinates and user visits.

use chrono::{DateTime, Utc};
use geo::Point;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RewardsError};
use crate::models::UserId;

/// A validated (latitude, longitude) pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLocation")]
pub struct Location {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawLocation {
    latitude: f64,
    longitude: f64,
}

impl Location {
    /// Create a location, rejecting out-of-range or non-finite values.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);

        if !valid {
            return Err(RewardsError::InvalidCoordinate {
                latitude,
                longitude,
            });
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl TryFrom<RawLocation> for Location {
    type Error = RewardsError;

    fn try_from(raw: RawLocation) -> Result<Self> {
        Location::new(raw.latitude, raw.longitude)
    }
}

impl TryFrom<Point<f64>> for Location {
    type Error = RewardsError;

    /// GeoJSON order: x is longitude, y is latitude.
    fn try_from(point: Point<f64>) -> Result<Self> {
        Location::new(point.y(), point.x())
    }
}

impl From<Location> for Point<f64> {
    fn from(location: Location) -> Self {
        Point::new(location.longitude, location.latitude)
    }
}

/// A single recorded position of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitedLocation {
    pub user_id: UserId,
    pub location: Location,
    pub time_visited: DateTime<Utc>,
}

impl VisitedLocation {
    pub fn new(user_id: UserId, location: Location, time_visited: DateTime<Utc>) -> Self {
        Self {
            user_id,
            location,
            time_visited,
        }
    }

    /// A visit recorded now.
    pub fn now(user_id: UserId, location: Location) -> Self {
        Self::new(user_id, location, Utc::now())
    }
}
