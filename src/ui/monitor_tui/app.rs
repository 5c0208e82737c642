use std::io::{self, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::watch;

use crate::core::config::Config;
use crate::core::rig_monitor::{
    AlarmRuntime, AlertConfig, AlertKind, AlertPresenter, AlertState, RedisConnector,
    SessionController, Snapshot, StoreConnector,
};

use super::event_handler::MonitorEvent;
use super::notice::{Notice, NoticeBoard, TerminalAnnunciator};
use super::render::render_ui;

/// Longest the loop waits for input when no tick is scheduled
const IDLE_WAIT: Duration = Duration::from_millis(100);
/// How long a status message stays on screen
const STATUS_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusLine {
    pub text: String,
    pub level: StatusLevel,
    pub at: Instant,
}

/// Rig dashboard state
pub struct MonitorApp<C: StoreConnector> {
    pub session: SessionController<C>,
    pub notices: NoticeBoard,
    pub snapshot: Arc<Snapshot>,
    snapshot_rx: watch::Receiver<Arc<Snapshot>>,
    pub should_quit: bool,
    pub show_help: bool,
    pub status: Option<StatusLine>,
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub snapshot: Arc<Snapshot>,
    pub store: String,
    pub interval_ms: u128,
    pub reading: bool,
    pub logging: bool,
    pub position_offset: i64,
    pub alert_state: AlertState,
    pub pending: Option<AlertKind>,
    pub sounding: bool,
    pub notice: Option<Notice>,
    pub limits: AlertConfig,
    pub show_help: bool,
    pub status: Option<StatusLine>,
}

impl<C: StoreConnector> MonitorApp<C> {
    pub fn new(session: SessionController<C>, notices: NoticeBoard) -> Self {
        let snapshot_rx = session.subscribe();
        let snapshot = snapshot_rx.borrow().clone();

        Self {
            session,
            notices,
            snapshot,
            snapshot_rx,
            should_quit: false,
            show_help: false,
            status: None,
        }
    }

    /// Pull the latest snapshot published by the reader
    pub fn refresh(&mut self) {
        if self.snapshot_rx.has_changed().unwrap_or(false) {
            self.snapshot = self.snapshot_rx.borrow_and_update().clone();
        }
    }

    /// Run a poll cycle if one is due
    pub fn on_tick(&mut self, now: Instant) {
        if self.session.tick_due(now) {
            self.session.tick();
            self.refresh();
        }
    }

    /// Handle keyboard events
    pub fn handle_event(&mut self, event: MonitorEvent) {
        if self.show_help && event != MonitorEvent::None {
            self.show_help = false;
            return;
        }

        match event {
            MonitorEvent::Quit => {
                if self.session.request_shutdown() {
                    self.should_quit = true;
                } else {
                    self.set_status(
                        "Stop logging (l) before closing the monitor",
                        StatusLevel::Warning,
                    );
                }
            }
            MonitorEvent::ToggleHelp => self.show_help = true,
            MonitorEvent::ToggleLogging => {
                let enable = !self.session.is_logging();
                match self.session.set_logging(enable) {
                    Ok(()) if enable => self.set_status("Logging started", StatusLevel::Info),
                    Ok(()) => self.set_status("Logging stopped", StatusLevel::Info),
                    Err(e) => {
                        log::error!("Failed to switch logging: {}", e);
                        self.set_status(format!("Logging switch failed: {}", e), StatusLevel::Error)
                    }
                }
            }
            MonitorEvent::ResetOffset => {
                // Invalid readings are ignored without telling the operator
                if self.session.reset_offset() {
                    self.set_status(
                        format!("Screwjack position zeroed at {}", self.session.position_offset()),
                        StatusLevel::Info,
                    );
                }
            }
            MonitorEvent::Acknowledge => {
                self.session.presenter().acknowledge();
            }
            MonitorEvent::None => {}
        }
    }

    fn set_status(&mut self, text: impl Into<String>, level: StatusLevel) {
        self.status = Some(StatusLine {
            text: text.into(),
            level,
            at: Instant::now(),
        });
    }

    pub fn view(&self) -> DashboardView {
        let presenter: &Arc<AlertPresenter> = self.session.presenter();
        let status = self
            .status
            .as_ref()
            .filter(|s| s.at.elapsed() < STATUS_TTL)
            .cloned();

        DashboardView {
            snapshot: Arc::clone(&self.snapshot),
            store: self.session.store_description(),
            interval_ms: self.session.period().as_millis(),
            reading: self.session.is_reading(),
            logging: self.session.is_logging(),
            position_offset: self.session.position_offset(),
            alert_state: presenter.state(),
            pending: presenter.pending(),
            sounding: presenter.is_sounding(),
            notice: self.notices.current(),
            limits: presenter.config().clone(),
            show_help: self.show_help,
            status,
        }
    }
}

/// Run the rig dashboard against the configured Redis store
pub fn run_monitor_app(config: &Config) -> Result<()> {
    let runtime = AlarmRuntime::new().context("Failed to start alarm runtime")?;
    let notices = NoticeBoard::default();

    let presenter = Arc::new(AlertPresenter::new(
        config.alerts.clone(),
        Duration::from_millis(config.alarm.repeat_interval_ms),
        Arc::new(TerminalAnnunciator::new(notices.clone())),
        runtime.handle(),
    ));

    let mut session = SessionController::new(
        RedisConnector::new(&config.store),
        Arc::clone(&presenter),
        Duration::from_millis(config.poll_interval_ms),
    );

    // Connect before touching the terminal so a failure prints normally
    session
        .start()
        .with_context(|| format!("Failed to connect to sensor store at {}", config.store.url()))?;

    let mut app = MonitorApp::new(session, notices);

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let result = run_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    presenter.silence();
    drop(app);
    runtime.shutdown();

    result
}

fn run_loop<C: StoreConnector>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut MonitorApp<C>,
) -> Result<()> {
    loop {
        let view = app.view();
        terminal.draw(|frame| render_ui(frame, &view))?;

        // Between frames, so the bell never lands inside escape output
        if app.notices.take_bell() {
            let backend = terminal.backend_mut();
            if let Err(e) = backend.write_all(b"\x07").and_then(|_| backend.flush()) {
                log::debug!("Terminal bell failed: {}", e);
            }
        }

        let timeout = app
            .session
            .time_until_tick(Instant::now())
            .unwrap_or(IDLE_WAIT)
            .min(IDLE_WAIT);

        if event::poll(timeout).context("Event poll failed")? {
            if let Event::Key(key) = event::read().context("Event read failed")? {
                if key.kind == KeyEventKind::Press {
                    app.handle_event(MonitorEvent::from_key(key.code));
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }

        app.on_tick(Instant::now());
    }
}
