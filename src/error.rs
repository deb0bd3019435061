// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types shared by the reward engine.

use crate::services::catalog::CatalogError;
use crate::services::oracle::OracleError;
use crate::services::rewards::BatchReport;

/// Engine error type.
#[derive(Debug, thiserror::Error)]
pub enum RewardsError {
    #[error("Reward points lookup failed for {attraction}: {source}")]
    Oracle {
        attraction: String,
        #[source]
        source: OracleError,
    },

    #[error("Invalid coordinate: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("Invalid proximity buffer: {0} miles (must be positive and finite)")]
    InvalidProximityBuffer(f64),

    #[error("Reward calculation failed for {} of {} users", .0.failed, .0.total())]
    PartialBatchFailure(BatchReport),

    #[error("Attraction catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl RewardsError {
    /// Users whose calculation failed, if this is a batch failure.
    pub fn failed_users(&self) -> &[crate::services::rewards::UserFailure] {
        match self {
            RewardsError::PartialBatchFailure(report) => &report.failures,
            _ => &[],
        }
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, RewardsError>;
