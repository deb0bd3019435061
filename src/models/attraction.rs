// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Attraction model.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::models::Location;

/// Stable identifier of an attraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttractionId(pub Uuid);

impl AttractionId {
    /// Derive an id from the attraction name, for catalogs that omit one.
    pub fn from_name(name: &str) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()))
    }
}

impl fmt::Display for AttractionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A point of interest that users can earn rewards for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attraction {
    pub id: AttractionId,
    /// Attraction name (e.g., "Disneyland"). Rewards are deduplicated by name.
    pub name: String,
    pub city: String,
    pub state: String,
    pub location: Location,
}

impl Attraction {
    pub fn new(
        name: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        location: Location,
    ) -> Self {
        let name = name.into();
        Self {
            id: AttractionId::from_name(&name),
            name,
            city: city.into(),
            state: state.into(),
            location,
        }
    }
}
