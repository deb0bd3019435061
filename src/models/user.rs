// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User model: visit history and earned rewards.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

use crate::models::{Attraction, VisitedLocation};

/// Stable identifier of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A reward earned for one attraction, tied to the visit that qualified it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserReward {
    pub visited_location: VisitedLocation,
    pub attraction: Attraction,
    pub reward_points: u32,
}

impl UserReward {
    pub fn new(
        visited_location: VisitedLocation,
        attraction: Attraction,
        reward_points: u32,
    ) -> Self {
        Self {
            visited_location,
            attraction,
            reward_points,
        }
    }
}

/// Concurrent reward set keyed by attraction name.
///
/// Insertion is atomic per key, so at most one reward per attraction name
/// ever lands regardless of how many tasks race on it. Each entry carries
/// its insertion sequence so snapshots come back in earn order.
#[derive(Debug, Default)]
pub struct RewardLedger {
    entries: DashMap<String, (u64, UserReward)>,
    next_seq: AtomicU64,
}

impl RewardLedger {
    /// Insert the reward unless one already exists for its attraction name.
    ///
    /// Returns `true` if the reward was added.
    pub fn insert_if_absent(&self, reward: UserReward) -> bool {
        match self.entries.entry(reward.attraction.name.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                slot.insert((seq, reward));
                true
            }
        }
    }

    pub fn contains(&self, attraction_name: &str) -> bool {
        self.entries.contains_key(attraction_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rewards in the order they were earned.
    pub fn snapshot(&self) -> Vec<UserReward> {
        let mut entries: Vec<(u64, UserReward)> = self
            .entries
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, reward)| reward).collect()
    }

    pub fn total_points(&self) -> u64 {
        self.entries
            .iter()
            .map(|entry| u64::from(entry.value().1.reward_points))
            .sum()
    }
}

/// A user as seen by the reward engine.
///
/// Both collections can be appended to from several tasks at once. The
/// engine only reads the visit history and only appends to the rewards.
#[derive(Debug)]
pub struct User {
    id: UserId,
    user_name: String,
    visited_locations: RwLock<Vec<VisitedLocation>>,
    rewards: RewardLedger,
}

impl User {
    pub fn new(id: UserId, user_name: impl Into<String>) -> Self {
        Self {
            id,
            user_name: user_name.into(),
            visited_locations: RwLock::new(Vec::new()),
            rewards: RewardLedger::default(),
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn add_visited_location(&self, visited_location: VisitedLocation) {
        self.visited_locations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(visited_location);
    }

    /// Snapshot of the visit history at the time of the call.
    pub fn visited_locations(&self) -> Vec<VisitedLocation> {
        self.visited_locations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_visited_location(&self) -> Option<VisitedLocation> {
        self.visited_locations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    pub fn clear_visited_locations(&self) {
        self.visited_locations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Record a reward. Returns `false` if the attraction was already rewarded.
    pub fn add_reward(&self, reward: UserReward) -> bool {
        self.rewards.insert_if_absent(reward)
    }

    pub fn has_reward_for(&self, attraction_name: &str) -> bool {
        self.rewards.contains(attraction_name)
    }

    pub fn rewards(&self) -> Vec<UserReward> {
        self.rewards.snapshot()
    }

    pub fn reward_count(&self) -> usize {
        self.rewards.len()
    }

    /// Sum of all reward points (what trip pricing is quoted against).
    pub fn total_reward_points(&self) -> u64 {
        self.rewards.total_points()
    }
}
