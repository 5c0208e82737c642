// UI and formatting module

pub mod monitor_tui;
pub mod prompts;
pub mod readings;

// Re-export commonly used items for cleaner imports
pub use prompts::{dimmed, info, success, warn};
pub use readings::{format_channel_table, format_snapshot_table};
