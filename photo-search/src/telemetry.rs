//! Tracing initialization.
//!
//! Log output goes to stderr so stdout carries only results (image URLs). The filter defaults to
//! `info` and can be changed with `RUST_LOG`, e.g. `RUST_LOG=photo_search=debug`.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the fmt subscriber with an env filter.
pub fn init_telemetry() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()?;

    tracing::debug!("Telemetry initialized");
    Ok(())
}
