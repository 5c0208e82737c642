//! Terminal dashboard for the rig monitor.
//!
//! Provides a real-time view of every sensor channel using ratatui.

mod app;
mod event_handler;
mod notice;
mod render;
mod widgets;

pub use app::{run_monitor_app, DashboardView, MonitorApp, StatusLevel, StatusLine};
pub use event_handler::MonitorEvent;
pub use notice::{Notice, NoticeBoard, TerminalAnnunciator};
