// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use attraction_rewards::models::{Attraction, AttractionId, Location, User, UserId, VisitedLocation};
use attraction_rewards::services::{
    AttractionCatalog, NearbyService, OracleError, RewardPointsOracle, RewardsService,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Oracle returning the same value for every lookup and counting calls.
#[allow(dead_code)]
#[derive(Default)]
pub struct StaticOracle {
    pub points: u32,
    pub calls: AtomicUsize,
}

#[allow(dead_code)]
impl StaticOracle {
    pub fn new(points: u32) -> Self {
        Self {
            points,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RewardPointsOracle for StaticOracle {
    async fn attraction_reward_points(
        &self,
        _attraction_id: AttractionId,
        _user_id: UserId,
    ) -> Result<u32, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Give other checks a chance to interleave with this one.
        tokio::task::yield_now().await;
        Ok(self.points)
    }
}

/// Oracle with a fixed latency that records how many lookups overlap.
#[allow(dead_code)]
pub struct SlowOracle {
    pub latency: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

#[allow(dead_code)]
impl SlowOracle {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Highest number of lookups that were running at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl RewardPointsOracle for SlowOracle {
    async fn attraction_reward_points(
        &self,
        _attraction_id: AttractionId,
        _user_id: UserId,
    ) -> Result<u32, OracleError> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(running, Ordering::SeqCst);
        tokio::time::sleep(self.latency).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(1)
    }
}

/// Oracle that fails for chosen users or attractions.
#[allow(dead_code)]
#[derive(Default)]
pub struct FailingOracle {
    pub points: u32,
    pub failing_users: HashSet<UserId>,
    pub failing_attractions: HashSet<AttractionId>,
}

impl RewardPointsOracle for FailingOracle {
    async fn attraction_reward_points(
        &self,
        attraction_id: AttractionId,
        user_id: UserId,
    ) -> Result<u32, OracleError> {
        if self.failing_users.contains(&user_id)
            || self.failing_attractions.contains(&attraction_id)
        {
            return Err(OracleError::Unavailable("mock failure".to_string()));
        }
        Ok(self.points)
    }
}

/// Oracle that panics for one user, to exercise worker panics in a batch.
#[allow(dead_code)]
pub struct PanickingOracle {
    pub panic_for: UserId,
}

impl RewardPointsOracle for PanickingOracle {
    async fn attraction_reward_points(
        &self,
        _attraction_id: AttractionId,
        user_id: UserId,
    ) -> Result<u32, OracleError> {
        if user_id == self.panic_for {
            panic!("oracle exploded");
        }
        Ok(1)
    }
}

#[allow(dead_code)]
pub fn loc(latitude: f64, longitude: f64) -> Location {
    Location::new(latitude, longitude).expect("test coordinate should be valid")
}

#[allow(dead_code)]
pub fn attraction(name: &str, latitude: f64, longitude: f64) -> Attraction {
    Attraction::new(name, "Test City", "TS", loc(latitude, longitude))
}

/// Load the bundled attraction catalog.
#[allow(dead_code)]
pub fn load_bundled_catalog() -> AttractionCatalog {
    AttractionCatalog::load_from_file("data/attractions.geojson")
        .expect("Failed to load attractions - is data/ committed?")
}

#[allow(dead_code)]
pub fn rewards_service<O: RewardPointsOracle>(
    attractions: Vec<Attraction>,
    oracle: Arc<O>,
) -> RewardsService<O> {
    RewardsService::new(
        Arc::new(AttractionCatalog::from_attractions(attractions)),
        oracle,
    )
}

#[allow(dead_code)]
pub fn nearby_service<O: RewardPointsOracle>(
    catalog: AttractionCatalog,
    oracle: Arc<O>,
) -> NearbyService<O> {
    NearbyService::new(Arc::new(catalog), oracle)
}

/// A user with one visit per given location.
#[allow(dead_code)]
pub fn user_visiting(name: &str, locations: &[Location]) -> User {
    let user = User::new(UserId::new_random(), name);
    for location in locations {
        user.add_visited_location(VisitedLocation::now(user.id(), *location));
    }
    user
}
