// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - reward and ranking logic.

pub mod catalog;
pub mod distance;
pub mod nearby;
pub mod oracle;
pub mod rewards;

pub use catalog::{AttractionCatalog, CatalogError};
pub use distance::{distance, is_within_attraction_proximity};
pub use nearby::NearbyService;
pub use oracle::{OracleError, RewardCentral, RewardPointsOracle};
pub use rewards::{BatchReport, RewardsService, UserFailure};
