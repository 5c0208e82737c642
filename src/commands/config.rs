use crate::core::Config;
use crate::ui::{dimmed, info, success};
use anyhow::{Context, Result};

pub fn execute(matches: &clap::ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("show", _)) => show(),
        Some(("path", _)) => path(),
        Some(("reset", _)) => reset(),
        Some(("set", sub_matches)) => set(sub_matches),
        _ => {
            println!("Use 'rigmon config --help' for more information.");
            Ok(())
        }
    }
}

fn show() -> Result<()> {
    let config = Config::load()?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn path() -> Result<()> {
    let path = Config::get_config_path()?;
    info(&path.display().to_string());
    if !path.exists() {
        dimmed("(not created yet, defaults are in use)");
    }
    Ok(())
}

fn reset() -> Result<()> {
    Config::default().save()?;
    success("✓ Configuration reset to defaults");
    Ok(())
}

fn set(matches: &clap::ArgMatches) -> Result<()> {
    let key = matches
        .get_one::<String>("key")
        .context("Key argument is required")?;
    let value = matches
        .get_one::<String>("value")
        .context("Value argument is required")?;

    let mut config = Config::load()?;
    config.set_value(key, value)?;
    config.save()?;

    success(&format!("✓ {} set to: {}", key, value));
    Ok(())
}
