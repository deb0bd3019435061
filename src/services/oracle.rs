// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reward points lookup.
//!
//! The engine only needs "how many points is this attraction worth to this
//! user". [`RewardPointsOracle`] is that capability; [`RewardCentral`] is the
//! in-process implementation used by default.

use sha2::{Digest, Sha256};
use std::future::Future;
use std::time::Duration;

use crate::models::{AttractionId, UserId};

/// Highest point value [`RewardCentral`] hands out.
const MAX_REWARD_POINTS: u32 = 1000;

/// Source of reward point values.
///
/// Calls may be slow (network, simulated latency). Implementations must be
/// deterministic per (attraction, user) pair.
pub trait RewardPointsOracle: Send + Sync + 'static {
    fn attraction_reward_points(
        &self,
        attraction_id: AttractionId,
        user_id: UserId,
    ) -> impl Future<Output = Result<u32, OracleError>> + Send;
}

/// Errors from a reward points lookup.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("Reward service unavailable: {0}")]
    Unavailable(String),
}

/// Deterministic points service with optional simulated latency.
///
/// Points are derived from a SHA-256 of both ids, so the same pair always
/// scores the same, in the range `1..=1000`.
#[derive(Debug, Clone, Default)]
pub struct RewardCentral {
    latency: Duration,
}

impl RewardCentral {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every lookup by `latency`, to model a remote service.
    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }

    fn points_for(attraction_id: AttractionId, user_id: UserId) -> u32 {
        let digest = Sha256::new()
            .chain_update(attraction_id.0.as_bytes())
            .chain_update(user_id.0.as_bytes())
            .finalize();
        let seed = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
        seed % MAX_REWARD_POINTS + 1
    }
}

impl RewardPointsOracle for RewardCentral {
    async fn attraction_reward_points(
        &self,
        attraction_id: AttractionId,
        user_id: UserId,
    ) -> Result<u32, OracleError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(Self::points_for(attraction_id, user_id))
    }
}
