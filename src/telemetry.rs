// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Logging setup for processes embedding the engine.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install structured JSON logging.
///
/// `RUST_LOG` overrides the default filter. Fails if a global subscriber
/// is already installed.
pub fn init_logging() -> Result<(), tracing_subscriber::util::TryInitError> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("attraction_rewards=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .try_init()
}
