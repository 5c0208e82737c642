//! Single poll, printed as a table or JSON.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::core::config::Config;
use crate::core::rig_monitor::{
    evaluate_alert, AlertKind, RedisConnector, SampleReader, Snapshot, StoreConnector,
};
use crate::ui::format_snapshot_table;

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = super::load_config(matches)?;
    let connector = RedisConnector::new(&config.store);

    let (snapshot, verdict) = read_once(&connector, &config)
        .with_context(|| format!("Failed to read sensor store at {}", config.store.url()))?;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(snapshot.as_ref())?);
    } else {
        print!("{}", format_snapshot_table(&snapshot, verdict, &config.alerts));
    }
    Ok(())
}

/// Poll every channel once with a zero offset and evaluate the limits
pub fn read_once<C: StoreConnector>(
    connector: &C,
    config: &Config,
) -> Result<(Arc<Snapshot>, Option<AlertKind>)> {
    let mut client = connector.connect()?;
    let mut reader = SampleReader::new();
    let snapshot = reader.poll(&mut client, 0);
    let verdict = evaluate_alert(&snapshot, &config.alerts);
    Ok((snapshot, verdict))
}
