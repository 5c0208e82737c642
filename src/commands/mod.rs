// Command handlers module
pub mod channels;
pub mod completions;
pub mod config;
pub mod logging;
pub mod monitor;
pub mod read;
pub mod version;

use anyhow::Result;
use clap::ArgMatches;

use crate::core::config::Config;

// Re-exports for cleaner imports
pub use channels::execute as channels;
pub use version::execute as version;

/// Load the saved configuration and apply per-run overrides from the command line
pub fn load_config(matches: &ArgMatches) -> Result<Config> {
    let mut config = Config::load()?;
    apply_overrides(&mut config, matches);
    Ok(config)
}

fn apply_overrides(config: &mut Config, matches: &ArgMatches) {
    if let Some(host) = try_get::<String>(matches, "host") {
        config.store.host = host;
    }
    if let Some(port) = try_get::<u16>(matches, "port") {
        config.store.port = port;
    }
    if let Some(interval) = try_get::<u64>(matches, "interval") {
        config.poll_interval_ms = interval.max(1);
    }
}

// Not every subcommand defines every override
fn try_get<T: Clone + Send + Sync + 'static>(matches: &ArgMatches, id: &str) -> Option<T> {
    matches.try_get_one::<T>(id).ok().flatten().cloned()
}
