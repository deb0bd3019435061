// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reward attribution.
//!
//! Handles:
//! - Per-user reward calculation (visits × attractions, fanned out per visit)
//! - Batch calculation across many users on a bounded worker pool
//! - The runtime-adjustable proximity buffer

use futures_util::{stream, StreamExt, TryStreamExt};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::{available_cores, Config};
use crate::error::{Result, RewardsError};
use crate::models::{Attraction, User, UserId, UserReward, VisitedLocation};
use crate::services::catalog::AttractionCatalog;
use crate::services::distance::{self, DEFAULT_PROXIMITY_BUFFER_MILES};
use crate::services::oracle::RewardPointsOracle;

/// Calculates and records user rewards against a shared attraction catalog.
///
/// Cloning is cheap and clones share the catalog, the oracle and the
/// proximity buffer.
pub struct RewardsService<O> {
    catalog: Arc<AttractionCatalog>,
    oracle: Arc<O>,
    /// Proximity buffer in miles, stored as `f64` bits.
    proximity_buffer: Arc<AtomicU64>,
    default_proximity_buffer: f64,
    workers_per_core: usize,
    attraction_concurrency: usize,
}

impl<O> Clone for RewardsService<O> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            oracle: Arc::clone(&self.oracle),
            proximity_buffer: Arc::clone(&self.proximity_buffer),
            default_proximity_buffer: self.default_proximity_buffer,
            workers_per_core: self.workers_per_core,
            attraction_concurrency: self.attraction_concurrency,
        }
    }
}

impl<O: RewardPointsOracle> RewardsService<O> {
    /// Create a service with the built-in defaults (10 mile buffer).
    pub fn new(catalog: Arc<AttractionCatalog>, oracle: Arc<O>) -> Self {
        let defaults = Config::default();
        Self {
            catalog,
            oracle,
            proximity_buffer: Arc::new(AtomicU64::new(DEFAULT_PROXIMITY_BUFFER_MILES.to_bits())),
            default_proximity_buffer: DEFAULT_PROXIMITY_BUFFER_MILES,
            workers_per_core: defaults.workers_per_core,
            attraction_concurrency: defaults.attraction_concurrency,
        }
    }

    /// Create a service using configured buffer and pool sizes.
    ///
    /// The configured buffer becomes the value restored by
    /// [`reset_proximity_buffer_to_default`](Self::reset_proximity_buffer_to_default).
    pub fn from_config(
        catalog: Arc<AttractionCatalog>,
        oracle: Arc<O>,
        config: &Config,
    ) -> Result<Self> {
        let buffer = validate_buffer(config.proximity_buffer_miles)?;
        Ok(Self {
            catalog,
            oracle,
            proximity_buffer: Arc::new(AtomicU64::new(buffer.to_bits())),
            default_proximity_buffer: buffer,
            workers_per_core: config.workers_per_core.max(1),
            attraction_concurrency: config.attraction_concurrency.max(1),
        })
    }

    // ─── Proximity ───────────────────────────────────────────────────────────

    /// Current proximity buffer in miles.
    pub fn proximity_buffer(&self) -> f64 {
        f64::from_bits(self.proximity_buffer.load(Ordering::Acquire))
    }

    /// Change the proximity buffer for all subsequent calculations.
    ///
    /// Changing it while a batch is running is allowed but the batch may see
    /// either value for any given check.
    pub fn set_proximity_buffer(&self, miles: f64) -> Result<()> {
        let miles = validate_buffer(miles)?;
        self.proximity_buffer.store(miles.to_bits(), Ordering::Release);
        tracing::debug!(miles, "Proximity buffer updated");
        Ok(())
    }

    pub fn reset_proximity_buffer_to_default(&self) {
        self.proximity_buffer
            .store(self.default_proximity_buffer.to_bits(), Ordering::Release);
    }

    /// True if the visit is within the proximity buffer of the attraction.
    pub fn is_near_attraction(
        &self,
        visited_location: &VisitedLocation,
        attraction: &Attraction,
    ) -> bool {
        distance::is_within(attraction, &visited_location.location, self.proximity_buffer())
    }

    /// Points the attraction is worth to a given user.
    pub async fn reward_points_for_user(
        &self,
        attraction: &Attraction,
        user_id: UserId,
    ) -> Result<u32> {
        self.oracle
            .attraction_reward_points(attraction.id, user_id)
            .await
            .map_err(|source| RewardsError::Oracle {
                attraction: attraction.name.clone(),
                source,
            })
    }

    // ─── Single user ─────────────────────────────────────────────────────────

    /// Add every reward the user has earned but not yet received.
    ///
    /// Works on a snapshot of the visit history; visits appended while this
    /// runs are picked up by the next call. Attractions are checked
    /// concurrently for each visit. An oracle failure stops this user's pass;
    /// rewards recorded before it are kept.
    ///
    /// Returns the number of rewards added.
    pub async fn calculate_rewards(&self, user: &User) -> Result<usize> {
        let visits = user.visited_locations();
        let mut added = 0;

        for visit in &visits {
            let checks: Vec<_> = self
                .catalog
                .list_attractions()
                .iter()
                .map(|attraction| self.evaluate(user, visit, attraction))
                .collect();

            added += stream::iter(checks)
                .buffer_unordered(self.attraction_concurrency)
                .try_fold(0usize, |count, inserted| async move {
                    Ok(count + usize::from(inserted))
                })
                .await?;
        }

        tracing::debug!(
            user_id = %user.id(),
            user = user.user_name(),
            visits = visits.len(),
            added,
            total = user.reward_count(),
            "Calculated rewards"
        );

        Ok(added)
    }

    /// Check one (visit, attraction) pair and record a reward if it qualifies.
    async fn evaluate(
        &self,
        user: &User,
        visit: &VisitedLocation,
        attraction: &Attraction,
    ) -> Result<bool> {
        if user.has_reward_for(&attraction.name) || !self.is_near_attraction(visit, attraction) {
            return Ok(false);
        }

        let points = self.reward_points_for_user(attraction, user.id()).await?;
        let inserted = user.add_reward(UserReward::new(visit.clone(), attraction.clone(), points));

        if inserted {
            tracing::debug!(
                user_id = %user.id(),
                attraction = %attraction.name,
                points,
                "Reward earned"
            );
        }
        Ok(inserted)
    }

    // ─── Batch ───────────────────────────────────────────────────────────────

    /// Number of users processed at once by
    /// [`calculate_rewards_for_all_users`](Self::calculate_rewards_for_all_users).
    ///
    /// Capped at the most permits a semaphore can hold.
    pub fn worker_pool_size(&self) -> usize {
        available_cores()
            .checked_mul(self.workers_per_core)
            .map_or(Semaphore::MAX_PERMITS, |size| size.min(Semaphore::MAX_PERMITS))
    }

    /// Calculate rewards for every user, in parallel on a bounded pool.
    ///
    /// Every user runs to completion even if others fail. Failures are
    /// collected per user and returned as [`RewardsError::PartialBatchFailure`].
    /// Dropping the returned future aborts any users still in flight.
    pub async fn calculate_rewards_for_all_users(
        &self,
        users: &[Arc<User>],
    ) -> Result<BatchReport> {
        let pool_size = self.worker_pool_size();
        let permits = Arc::new(Semaphore::new(pool_size));
        let mut workers = JoinSet::new();

        tracing::info!(users = users.len(), pool_size, "Starting reward batch");

        for (index, user) in users.iter().enumerate() {
            let permit = Arc::clone(&permits)
                .acquire_owned()
                .await
                .map_err(|e| RewardsError::Internal(anyhow::anyhow!("Worker pool closed: {}", e)))?;
            let service = self.clone();
            let user = Arc::clone(user);

            workers.spawn(async move {
                let result = service.calculate_rewards(&user).await;
                drop(permit);
                (index, result)
            });
        }

        let mut pending: HashSet<usize> = (0..users.len()).collect();
        let mut report = BatchReport::default();

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((index, Ok(added))) => {
                    pending.remove(&index);
                    report.succeeded += 1;
                    report.rewards_added += added;
                }
                Ok((index, Err(e))) => {
                    pending.remove(&index);
                    let user_id = users[index].id();
                    tracing::warn!(%user_id, error = %e, "Reward calculation failed for user");
                    report.record_failure(user_id, e.to_string());
                }
                Err(e) => {
                    // Panicked workers never report their index; they are
                    // whatever is still pending once the set drains.
                    tracing::error!(error = %e, "Reward worker panicked");
                }
            }
        }

        let mut panicked: Vec<usize> = pending.into_iter().collect();
        panicked.sort_unstable();
        for index in panicked {
            report.record_failure(users[index].id(), "worker panicked".to_string());
        }

        tracing::info!(
            succeeded = report.succeeded,
            failed = report.failed,
            rewards_added = report.rewards_added,
            "Reward batch finished"
        );

        if report.is_complete_success() {
            Ok(report)
        } else {
            Err(RewardsError::PartialBatchFailure(report))
        }
    }
}

fn validate_buffer(miles: f64) -> Result<f64> {
    if miles.is_finite() && miles > 0.0 {
        Ok(miles)
    } else {
        Err(RewardsError::InvalidProximityBuffer(miles))
    }
}

/// A user whose reward calculation failed in a batch.
#[derive(Debug, Clone)]
pub struct UserFailure {
    pub user_id: UserId,
    pub error: String,
}

/// Outcome of a batch reward calculation.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Users whose calculation completed.
    pub succeeded: usize,
    /// Users whose calculation failed.
    pub failed: usize,
    /// Rewards added across all successful users.
    pub rewards_added: usize,
    pub failures: Vec<UserFailure>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Returns true if no user failed.
    pub fn is_complete_success(&self) -> bool {
        self.failed == 0
    }

    /// Returns true if some users succeeded and some failed.
    pub fn is_partial_failure(&self) -> bool {
        self.succeeded > 0 && self.failed > 0
    }

    fn record_failure(&mut self, user_id: UserId, error: String) {
        self.failed += 1;
        self.failures.push(UserFailure { user_id, error });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Location;
    use crate::services::oracle::RewardCentral;

    fn service() -> RewardsService<RewardCentral> {
        let origin = Location::new(0.0, 0.0).unwrap();
        let catalog = AttractionCatalog::from_attractions(vec![Attraction::new(
            "A", "City", "ST", origin,
        )]);
        RewardsService::new(Arc::new(catalog), Arc::new(RewardCentral::new()))
    }

    #[test]
    fn test_default_buffer() {
        assert_eq!(service().proximity_buffer(), DEFAULT_PROXIMITY_BUFFER_MILES);
    }

    #[test]
    fn test_set_and_reset_buffer() {
        let service = service();
        service.set_proximity_buffer(500.0).unwrap();
        assert_eq!(service.proximity_buffer(), 500.0);

        service.reset_proximity_buffer_to_default();
        assert_eq!(service.proximity_buffer(), 10.0);
    }

    #[test]
    fn test_rejects_bad_buffers() {
        let service = service();
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                service.set_proximity_buffer(bad),
                Err(RewardsError::InvalidProximityBuffer(_))
            ));
        }
        // Unchanged after rejected updates
        assert_eq!(service.proximity_buffer(), 10.0);
    }

    #[test]
    fn test_clones_share_buffer() {
        let service = service();
        let clone = service.clone();
        clone.set_proximity_buffer(42.0).unwrap();
        assert_eq!(service.proximity_buffer(), 42.0);
    }

    #[test]
    fn test_separate_instances_have_own_buffer() {
        let first = service();
        let second = service();
        first.set_proximity_buffer(1000.0).unwrap();
        assert_eq!(second.proximity_buffer(), 10.0);
    }

    #[test]
    fn test_from_config_sets_default() {
        let config = Config {
            proximity_buffer_miles: 25.0,
            ..Config::default()
        };
        let catalog = Arc::new(AttractionCatalog::default());
        let service =
            RewardsService::from_config(catalog, Arc::new(RewardCentral::new()), &config).unwrap();

        service.set_proximity_buffer(1.0).unwrap();
        service.reset_proximity_buffer_to_default();
        assert_eq!(service.proximity_buffer(), 25.0);
    }

    #[test]
    fn test_from_config_rejects_bad_buffer() {
        let config = Config {
            proximity_buffer_miles: -5.0,
            ..Config::default()
        };
        let catalog = Arc::new(AttractionCatalog::default());
        let result = RewardsService::from_config(catalog, Arc::new(RewardCentral::new()), &config);
        assert!(result.is_err());
    }

    #[test]
    fn test_worker_pool_is_oversubscribed() {
        let cores = available_cores();
        assert_eq!(service().worker_pool_size(), cores * 4);
    }

    #[tokio::test]
    async fn test_oversized_pool_is_capped() {
        // Bypasses Config::validate, as a hand-built Config can
        let config = Config {
            workers_per_core: usize::MAX / 2,
            ..Config::default()
        };
        let origin = Location::new(0.0, 0.0).unwrap();
        let catalog = AttractionCatalog::from_attractions(vec![Attraction::new(
            "A", "City", "ST", origin,
        )]);
        let service =
            RewardsService::from_config(Arc::new(catalog), Arc::new(RewardCentral::new()), &config)
                .unwrap();

        assert_eq!(service.worker_pool_size(), Semaphore::MAX_PERMITS);

        let user = Arc::new(User::new(UserId::new_random(), "jon"));
        user.add_visited_location(VisitedLocation::now(user.id(), origin));
        let report = service.calculate_rewards_for_all_users(&[user]).await.unwrap();
        assert_eq!(report.rewards_added, 1);
    }

    #[test]
    fn batch_report_complete_success() {
        let report = BatchReport {
            succeeded: 3,
            ..Default::default()
        };
        assert!(report.is_complete_success());
        assert!(!report.is_partial_failure());
        assert_eq!(report.total(), 3);
    }

    #[test]
    fn batch_report_partial_failure() {
        let mut report = BatchReport {
            succeeded: 2,
            ..Default::default()
        };
        report.record_failure(UserId::new_random(), "boom".to_string());

        assert!(!report.is_complete_success());
        assert!(report.is_partial_failure());
        assert_eq!(report.failures.len(), report.failed);
        assert_eq!(report.total(), 3);
    }

    #[test]
    fn batch_report_empty_is_success() {
        let report = BatchReport::default();
        assert!(report.is_complete_success());
        assert!(!report.is_partial_failure());
    }
}
