use anyhow::Result;
use colored::Colorize;

use crate::core::rig_monitor::LOGGING_SIGNAL_KEY;
use crate::ui::format_channel_table;

/// List the sensor channels and their store keys
pub fn execute() -> Result<()> {
    println!("{}", "Sensor channels (read):".white().bold());
    print!("{}", format_channel_table());
    println!();
    println!("{}", "Logging signal (write):".white().bold());
    println!("  {} {}", LOGGING_SIGNAL_KEY.cyan(), "1 = start, 0 = stop".dimmed());
    Ok(())
}
