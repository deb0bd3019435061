// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the reward engine.

pub mod attraction;
pub mod location;
pub mod nearby;
pub mod user;

pub use attraction::{Attraction, AttractionId};
pub use location::{Location, VisitedLocation};
pub use nearby::NearbyAttraction;
pub use user::{RewardLedger, User, UserId, UserReward};
