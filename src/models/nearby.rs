// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Ranked attraction descriptor returned by nearest-attraction queries.

use serde::{Deserialize, Serialize};

/// One entry of a nearest-attractions listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyAttraction {
    pub attraction_name: String,
    pub attraction_latitude: f64,
    pub attraction_longitude: f64,
    /// Query position the distance was measured from
    pub user_latitude: f64,
    pub user_longitude: f64,
    /// Great-circle distance in statute miles
    pub distance_miles: f64,
    pub reward_points: u32,
}
