// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Nearest-attraction ranking.

use futures_util::future::try_join_all;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{Result, RewardsError};
use crate::models::{Attraction, Location, NearbyAttraction, UserId};
use crate::services::catalog::AttractionCatalog;
use crate::services::distance;
use crate::services::oracle::RewardPointsOracle;

/// Read-only queries over the catalog relative to a position.
pub struct NearbyService<O> {
    catalog: Arc<AttractionCatalog>,
    oracle: Arc<O>,
    default_count: usize,
}

impl<O> Clone for NearbyService<O> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            oracle: Arc::clone(&self.oracle),
            default_count: self.default_count,
        }
    }
}

impl<O: RewardPointsOracle> NearbyService<O> {
    pub fn new(catalog: Arc<AttractionCatalog>, oracle: Arc<O>) -> Self {
        Self {
            catalog,
            oracle,
            default_count: Config::default().nearest_attractions_count,
        }
    }

    pub fn from_config(catalog: Arc<AttractionCatalog>, oracle: Arc<O>, config: &Config) -> Self {
        Self {
            catalog,
            oracle,
            default_count: config.nearest_attractions_count,
        }
    }

    /// The closest attractions to `location` (five unless configured
    /// otherwise), with the points each is worth to `user_id`.
    pub async fn nearest_attractions(
        &self,
        location: &Location,
        user_id: UserId,
    ) -> Result<Vec<NearbyAttraction>> {
        self.nearest_attractions_with_count(location, user_id, self.default_count)
            .await
    }

    /// The `count` closest attractions, nearest first.
    ///
    /// Attractions at equal distance keep their catalog order.
    pub async fn nearest_attractions_with_count(
        &self,
        location: &Location,
        user_id: UserId,
        count: usize,
    ) -> Result<Vec<NearbyAttraction>> {
        let mut ranked: Vec<(&Attraction, f64)> = self
            .catalog
            .list_attractions()
            .iter()
            .map(|attraction| (attraction, distance::distance(&attraction.location, location)))
            .collect();

        // sort_by is stable
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        ranked.truncate(count);

        let lookups = ranked
            .into_iter()
            .map(|(attraction, distance_miles)| async move {
                let reward_points = self
                    .oracle
                    .attraction_reward_points(attraction.id, user_id)
                    .await
                    .map_err(|source| RewardsError::Oracle {
                        attraction: attraction.name.clone(),
                        source,
                    })?;

                Ok::<_, RewardsError>(NearbyAttraction {
                    attraction_name: attraction.name.clone(),
                    attraction_latitude: attraction.location.latitude(),
                    attraction_longitude: attraction.location.longitude(),
                    user_latitude: location.latitude(),
                    user_longitude: location.longitude(),
                    distance_miles,
                    reward_points,
                })
            });

        try_join_all(lookups).await
    }

    /// Every attraction within the fixed 200-mile range, in catalog order.
    pub fn attractions_within_range(&self, location: &Location) -> Vec<&Attraction> {
        self.catalog
            .list_attractions()
            .iter()
            .filter(|attraction| distance::is_within_attraction_proximity(attraction, location))
            .collect()
    }
}
