// Plain-terminal tables for one-shot commands

use colored::Colorize;

use crate::core::rig_monitor::{is_valid, AlertConfig, AlertKind, Channel, Snapshot};

const LABEL_WIDTH: usize = 28;
const VALUE_WIDTH: usize = 8;

/// Render a snapshot as a readings table
pub fn format_snapshot_table(
    snapshot: &Snapshot,
    verdict: Option<AlertKind>,
    limits: &AlertConfig,
) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{}\n",
        format!(
            "{:<LABEL_WIDTH$} {:>VALUE_WIDTH$}  {}",
            "Sensor", "Value", "Unit"
        )
        .bold()
    ));

    for (channel, value) in snapshot.sample.iter() {
        out.push_str(&row(channel.label(), value, channel.unit()));
    }
    out.push_str(&row(
        "ScrewJack Position (zeroed)",
        snapshot.screwjack_position_compensated,
        Channel::ScrewjackPosition.unit(),
    ));
    out.push_str(&row(
        "Max Bearing Temperature",
        snapshot.max_bearing_temp,
        Channel::FrontBearingTemp.unit(),
    ));

    out.push('\n');
    if !snapshot.store_ok {
        out.push_str(&format!("{}\n", "Store read failed".red().bold()));
    }
    match verdict {
        Some(kind) => out.push_str(&format!(
            "{}\n",
            format!("⚠ {}: {}", kind, kind.message(limits)).red().bold()
        )),
        None => out.push_str(&format!("{}\n", "No alert condition".green())),
    }

    out
}

fn row(label: &str, value: i64, unit: &str) -> String {
    let text = if is_valid(value) {
        format!("{:>VALUE_WIDTH$}", value).white().bold()
    } else {
        format!("{:>VALUE_WIDTH$}", "--").dimmed()
    };
    format!("{:<LABEL_WIDTH$} {}  {}\n", label, text, unit.dimmed())
}

/// Render the channel registry
pub fn format_channel_table() -> String {
    let mut out = String::new();
    for channel in Channel::ALL {
        out.push_str(&format!(
            "{:<LABEL_WIDTH$} {:<7} {}\n",
            channel.label(),
            channel.unit(),
            channel.key().cyan()
        ));
    }
    out
}
