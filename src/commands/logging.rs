//! One-shot control of the publisher's logger.

use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::core::rig_monitor::{RedisConnector, StoreClient, StoreConnector, LOGGING_SIGNAL_KEY};
use crate::ui::{dimmed, success};

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = super::load_config(matches)?;

    let enabled = match matches.subcommand() {
        Some(("start", _)) => true,
        Some(("stop", _)) => false,
        _ => {
            println!("Use 'rigmon log --help' for more information.");
            return Ok(());
        }
    };

    let connector = RedisConnector::new(&config.store);
    write_logging_signal(&connector, enabled)
        .with_context(|| format!("Failed to reach sensor store at {}", config.store.url()))?;

    if enabled {
        success("✓ Logging start signal sent");
        dimmed("Remember to stop logging before closing the monitor: rigmon log stop");
    } else {
        success("✓ Logging stop signal sent");
    }
    Ok(())
}

/// Connect, write the logging signal once, disconnect
pub fn write_logging_signal<C: StoreConnector>(connector: &C, enabled: bool) -> Result<()> {
    let mut client = connector.connect()?;
    client.put(LOGGING_SIGNAL_KEY, if enabled { "1" } else { "0" })?;
    log::info!(
        "Logging signal {} written to {}",
        if enabled { "1" } else { "0" },
        connector.describe()
    );
    Ok(())
}
