//! Rig monitor command handler.
//!
//! Runs the dashboard, or streams snapshots as JSON lines for scripting.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::ArgMatches;
use serde::Serialize;

use crate::core::config::Config;
use crate::core::rig_monitor::{
    AlarmRuntime, AlertPresenter, AlertState, LogAnnunciator, RedisConnector, SessionController,
    Snapshot, StoreConnector,
};
use crate::ui::monitor_tui::run_monitor_app;

const IDLE_WAIT: Duration = Duration::from_millis(100);

/// Execute the monitor command
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = super::load_config(matches)?;

    if matches.get_flag("json") {
        let with_logging = matches.get_flag("log");
        return run_json_output(&config, with_logging);
    }

    run_monitor_app(&config).context("Failed to run rig monitor")
}

/// One line of JSON output
#[derive(Serialize)]
struct JsonRecord<'a> {
    #[serde(flatten)]
    snapshot: &'a Snapshot,
    alert: AlertState,
    logging: bool,
}

/// Run in JSON output mode (for scripting)
fn run_json_output(config: &Config, with_logging: bool) -> Result<()> {
    let runtime = AlarmRuntime::new().context("Failed to start alarm runtime")?;
    let presenter = Arc::new(AlertPresenter::new(
        config.alerts.clone(),
        Duration::from_millis(config.alarm.repeat_interval_ms),
        Arc::new(LogAnnunciator),
        runtime.handle(),
    ));

    let mut session = SessionController::new(
        RedisConnector::new(&config.store),
        Arc::clone(&presenter),
        Duration::from_millis(config.poll_interval_ms),
    );
    session
        .start()
        .with_context(|| format!("Failed to connect to sensor store at {}", config.store.url()))?;

    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst))
        .context("Failed to install Ctrl-C handler")?;

    if with_logging {
        session.set_logging(true).context("Failed to start logging")?;
    }

    let result = stream_snapshots(&mut session, &running, &mut io::stdout().lock());

    // Logging started here is stopped here, otherwise shutdown is refused
    if !session.request_shutdown() {
        session.set_logging(false).context("Failed to stop logging")?;
        session.request_shutdown();
    }

    presenter.silence();
    drop(session);
    runtime.shutdown();

    result
}

/// Tick until `running` is cleared, writing one JSON line per snapshot
pub fn stream_snapshots<C: StoreConnector, W: Write>(
    session: &mut SessionController<C>,
    running: &AtomicBool,
    out: &mut W,
) -> Result<()> {
    while running.load(Ordering::SeqCst) {
        if session.tick_due(Instant::now()) {
            if let Some(snapshot) = session.tick() {
                let record = JsonRecord {
                    snapshot: &snapshot,
                    alert: session.presenter().state(),
                    logging: session.is_logging(),
                };
                serde_json::to_writer(&mut *out, &record)?;
                writeln!(out)?;
                out.flush()?;
            }
        }

        match session.time_until_tick(Instant::now()) {
            Some(wait) => thread::sleep(wait.min(IDLE_WAIT)),
            None => break,
        }
    }
    Ok(())
}
