// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Attraction catalog loading.

use crate::models::{Attraction, AttractionId, Location};
use geo::Point;
use geojson::GeoJson;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use uuid::Uuid;

/// Read-only, ordered set of attractions loaded once at startup.
#[derive(Debug, Default, Clone)]
pub struct AttractionCatalog {
    attractions: Vec<Attraction>,
}

impl AttractionCatalog {
    /// Build a catalog from attractions already in memory.
    pub fn from_attractions(attractions: Vec<Attraction>) -> Self {
        warn_duplicate_names(&attractions);
        Self { attractions }
    }

    /// Load attractions from a GeoJSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let json_data =
            fs::read_to_string(path.as_ref()).map_err(|e| CatalogError::IoError(e.to_string()))?;
        Self::load_from_json(&json_data)
    }

    /// Load attractions from a GeoJSON string.
    ///
    /// Expects a `FeatureCollection` of `Point` features with a `name`
    /// property and optional `id`, `city` and `state` properties. Features
    /// without a name are skipped.
    pub fn load_from_json(json_data: &str) -> Result<Self, CatalogError> {
        let geojson: GeoJson = json_data
            .parse()
            .map_err(|e: geojson::Error| CatalogError::ParseError(e.to_string()))?;

        let GeoJson::FeatureCollection(collection) = geojson else {
            return Err(CatalogError::ParseError("expected a FeatureCollection".to_string()));
        };

        let mut attractions = Vec::with_capacity(collection.features.len());

        for feature in collection.features {
            let Some(name) = feature
                .property("name")
                .and_then(|v| v.as_str())
                .map(str::to_string)
            else {
                tracing::warn!("Skipping attraction feature without a name");
                continue;
            };

            let text_property = |key: &str| {
                feature
                    .property(key)
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string()
            };
            let city = text_property("city");
            let state = text_property("state");

            let id = match feature.property("id").and_then(|v| v.as_str()) {
                Some(raw) => AttractionId(
                    Uuid::parse_str(raw).map_err(|_| CatalogError::InvalidId(raw.to_string()))?,
                ),
                None => AttractionId::from_name(&name),
            };

            let Some(geometry) = feature.geometry else {
                return Err(CatalogError::MissingGeometry(name));
            };
            let location = Self::convert_geometry(&name, geometry.value)?;

            attractions.push(Attraction {
                id,
                name,
                city,
                state,
                location,
            });
        }

        tracing::info!(count = attractions.len(), "Loaded attractions");
        Ok(Self::from_attractions(attractions))
    }

    /// Convert a GeoJSON point into a validated location.
    fn convert_geometry(name: &str, value: geojson::Value) -> Result<Location, CatalogError> {
        let point: Point<f64> = value
            .try_into()
            .map_err(|_| CatalogError::UnsupportedGeometry(name.to_string()))?;

        Location::try_from(point).map_err(|_| CatalogError::InvalidCoordinate(name.to_string()))
    }

    /// All attractions, in catalog order.
    pub fn list_attractions(&self) -> &[Attraction] {
        &self.attractions
    }

    pub fn len(&self) -> usize {
        self.attractions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attractions.is_empty()
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Attraction> {
        self.attractions.iter().find(|a| a.name == name)
    }
}

/// Rewards are keyed by attraction name, so two attractions sharing a name
/// can only ever earn one reward between them.
fn warn_duplicate_names(attractions: &[Attraction]) {
    let mut seen = HashSet::new();
    for attraction in attractions {
        if !seen.insert(attraction.name.as_str()) {
            tracing::warn!(
                attraction = %attraction.name,
                id = %attraction.id,
                "Duplicate attraction name in catalog; rewards for it will be shared"
            );
        }
    }
}

/// Errors from catalog loading.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read file: {0}")]
    IoError(String),

    #[error("Failed to parse GeoJSON: {0}")]
    ParseError(String),

    #[error("Attraction {0} has no geometry")]
    MissingGeometry(String),

    #[error("Unsupported geometry for {0} (expected Point)")]
    UnsupportedGeometry(String),

    #[error("Attraction {0} has an out-of-range coordinate")]
    InvalidCoordinate(String),

    #[error("Invalid attraction id: {0}")]
    InvalidId(String),
}
