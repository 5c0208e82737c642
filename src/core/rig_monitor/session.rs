//! Session control: poll cadence, logging signal, offset reset, shutdown gating.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;

use super::alerts::evaluate_alert;
use super::channels::{Channel, LOGGING_SIGNAL_KEY};
use super::presenter::AlertPresenter;
use super::reader::SampleReader;
use super::sample::{is_valid, Snapshot};
use super::store::{StoreClient, StoreConnector};
use crate::error::{Result, RigError};

/// Owns the store connection and drives the poll loop cooperatively.
///
/// Nothing here spawns a thread: the caller's loop asks [`tick_due`] and
/// calls [`tick`], which reads synchronously and schedules the next tick one
/// period after it finished. A slow store therefore delays ticks, it never
/// overlaps them.
///
/// [`tick_due`]: SessionController::tick_due
/// [`tick`]: SessionController::tick
pub struct SessionController<C: StoreConnector> {
    connector: C,
    client: Option<C::Client>,
    reader: SampleReader,
    presenter: Arc<AlertPresenter>,
    period: Duration,
    next_tick: Option<Instant>,
    position_offset: i64,
    logging: bool,
}

impl<C: StoreConnector> SessionController<C> {
    pub fn new(connector: C, presenter: Arc<AlertPresenter>, period: Duration) -> Self {
        let mut reader = SampleReader::new();

        let alerts = Arc::clone(&presenter);
        reader.on_sample(move |snapshot| {
            let verdict = evaluate_alert(snapshot, alerts.config());
            alerts.present(verdict);
        });

        Self {
            connector,
            client: None,
            reader,
            presenter,
            period,
            next_tick: None,
            position_offset: 0,
            logging: false,
        }
    }

    /// Open the store connection and schedule the first tick.
    pub fn start(&mut self) -> Result<()> {
        if self.client.is_some() {
            return Ok(());
        }

        let client = self.connector.connect()?;
        log::info!(
            "Reading from {} every {} ms",
            self.connector.describe(),
            self.period.as_millis()
        );
        self.client = Some(client);
        self.next_tick = Some(Instant::now());
        Ok(())
    }

    /// Stop reading and drop the connection. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if self.client.take().is_some() {
            log::info!("Stopped reading from {}", self.connector.describe());
        }
        self.next_tick = None;
    }

    pub fn is_reading(&self) -> bool {
        self.client.is_some()
    }

    pub fn tick_due(&self, now: Instant) -> bool {
        matches!(self.next_tick, Some(at) if now >= at)
    }

    /// Time left until the next scheduled tick; `None` when stopped
    pub fn time_until_tick(&self, now: Instant) -> Option<Duration> {
        self.next_tick.map(|at| at.saturating_duration_since(now))
    }

    /// Run one poll cycle now. Returns `None` when not reading.
    pub fn tick(&mut self) -> Option<Arc<Snapshot>> {
        let client = self.client.as_mut()?;
        let snapshot = self.reader.poll(client, self.position_offset);
        self.next_tick = Some(Instant::now() + self.period);
        Some(snapshot)
    }

    /// Tell the publisher to start or stop its logger.
    pub fn set_logging(&mut self, enabled: bool) -> Result<()> {
        let client = self.client.as_mut().ok_or(RigError::NotConnected)?;
        client.put(LOGGING_SIGNAL_KEY, if enabled { "1" } else { "0" })?;

        if self.logging != enabled {
            log::info!("Logging {}", if enabled { "started" } else { "stopped" });
        }
        self.logging = enabled;
        Ok(())
    }

    pub fn is_logging(&self) -> bool {
        self.logging
    }

    /// Zero the screwjack position at its current raw reading.
    ///
    /// Ignored when the latest raw position is `NO_DATA`; returns whether the
    /// offset changed.
    pub fn reset_offset(&mut self) -> bool {
        let raw = self.reader.latest().get(Channel::ScrewjackPosition);
        if !is_valid(raw) {
            log::debug!("Offset reset ignored: no position reading");
            return false;
        }

        log::info!("Screwjack position zeroed at raw {}", raw);
        self.position_offset = raw;
        true
    }

    pub fn position_offset(&self) -> i64 {
        self.position_offset
    }

    /// Stop and allow the application to close, unless logging is running.
    pub fn request_shutdown(&mut self) -> bool {
        if self.logging {
            log::warn!("Shutdown refused while logging is active");
            return false;
        }
        self.stop();
        true
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.reader.subscribe()
    }

    pub fn latest(&self) -> Arc<Snapshot> {
        self.reader.latest()
    }

    pub fn presenter(&self) -> &Arc<AlertPresenter> {
        &self.presenter
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn store_description(&self) -> String {
        self.connector.describe()
    }
}

impl<C: StoreConnector> Drop for SessionController<C> {
    fn drop(&mut self) {
        self.stop();
    }
}
