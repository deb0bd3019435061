// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Attraction rewards: location-based reward attribution.
//!
//! This crate decides which attractions a user has earned rewards for from
//! their visit history, and ranks the attractions nearest to a position.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use config::Config;
use error::Result;
use services::{AttractionCatalog, NearbyService, RewardCentral, RewardsService};

/// Shared engine state.
pub struct AppState {
    pub config: Config,
    pub catalog: Arc<AttractionCatalog>,
    pub rewards_service: RewardsService<RewardCentral>,
    pub nearby_service: NearbyService<RewardCentral>,
}

impl AppState {
    /// Load the catalog named by `config` and wire up the services with the
    /// built-in reward oracle.
    pub fn load(config: Config) -> Result<Self> {
        tracing::info!(path = %config.attractions_path, "Loading attraction catalog");
        let catalog = Arc::new(AttractionCatalog::load_from_file(&config.attractions_path)?);

        let oracle = Arc::new(RewardCentral::with_latency(Duration::from_millis(
            config.oracle_latency_ms,
        )));

        let rewards_service =
            RewardsService::from_config(Arc::clone(&catalog), Arc::clone(&oracle), &config)?;
        let nearby_service = NearbyService::from_config(Arc::clone(&catalog), oracle, &config);

        Ok(Self {
            config,
            catalog,
            rewards_service,
            nearby_service,
        })
    }
}
