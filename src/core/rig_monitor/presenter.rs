//! Debounced delivery of alerts to the operator.
//!
//! A raised alert starts two tasks sharing one cancellation token: the
//! notification, which waits for the operator to acknowledge it, and the
//! audible alarm, which repeats until the token is cancelled. Only the
//! acknowledgment (or a replacing alert) cancels the token, so a condition
//! that clears on its own keeps sounding until someone has seen it.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use super::alerts::{AlertConfig, AlertKind};

/// Output side of the presenter
pub trait Annunciator: Send + Sync + 'static {
    /// Put the notification in front of the operator
    fn show(&self, kind: AlertKind, message: &str);

    /// Remove the notification after acknowledgment
    fn dismiss(&self, kind: AlertKind);

    /// Play the audible alert once
    fn chime(&self);
}

/// Annunciator for headless runs: everything goes to the log
#[derive(Debug, Default)]
pub struct LogAnnunciator;

impl Annunciator for LogAnnunciator {
    fn show(&self, kind: AlertKind, message: &str) {
        log::warn!("ALERT [{}] {}", kind, message);
    }

    fn dismiss(&self, kind: AlertKind) {
        log::info!("Alert acknowledged: {}", kind);
    }

    fn chime(&self) {
        log::debug!("Alarm chime");
    }
}

/// Alert latch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertState {
    #[default]
    NoCondition,
    ConditionActive(AlertKind),
}

/// What the presenter has to do after a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Present a new alert
    Raise(AlertKind),
    /// Same condition still active, already presented
    Hold,
    /// Condition went away; the latch opens for the next alert
    Clear,
    /// Nothing was active and nothing is
    Idle,
}

impl AlertState {
    pub fn transition(self, verdict: Option<AlertKind>) -> (AlertState, Transition) {
        match (self, verdict) {
            (AlertState::NoCondition, None) => (self, Transition::Idle),
            (AlertState::NoCondition, Some(kind)) => {
                (AlertState::ConditionActive(kind), Transition::Raise(kind))
            }
            (AlertState::ConditionActive(current), Some(kind)) if current == kind => {
                (self, Transition::Hold)
            }
            (AlertState::ConditionActive(_), Some(kind)) => {
                (AlertState::ConditionActive(kind), Transition::Raise(kind))
            }
            (AlertState::ConditionActive(_), None) => (AlertState::NoCondition, Transition::Clear),
        }
    }

    pub fn active(self) -> Option<AlertKind> {
        match self {
            AlertState::NoCondition => None,
            AlertState::ConditionActive(kind) => Some(kind),
        }
    }
}

struct ActiveAlarm {
    kind: AlertKind,
    keep_playing: CancellationToken,
    ack_tx: Option<oneshot::Sender<()>>,
}

struct PresenterInner {
    state: AlertState,
    alarm: Option<ActiveAlarm>,
    presentations: u64,
}

/// Turns evaluator verdicts into at most one live alert
pub struct AlertPresenter {
    config: AlertConfig,
    repeat_interval: Duration,
    annunciator: Arc<dyn Annunciator>,
    runtime: Handle,
    inner: Mutex<PresenterInner>,
}

impl AlertPresenter {
    pub fn new(
        config: AlertConfig,
        repeat_interval: Duration,
        annunciator: Arc<dyn Annunciator>,
        runtime: Handle,
    ) -> Self {
        Self {
            config,
            repeat_interval,
            annunciator,
            runtime,
            inner: Mutex::new(PresenterInner {
                state: AlertState::NoCondition,
                alarm: None,
                presentations: 0,
            }),
        }
    }

    /// Feed the latest verdict
    pub fn present(&self, verdict: Option<AlertKind>) {
        let mut inner = self.inner.lock();
        let (next, transition) = inner.state.transition(verdict);
        inner.state = next;

        match transition {
            Transition::Raise(kind) => {
                log::warn!("Alert raised: {}", kind);
                self.raise(&mut inner, kind);
            }
            Transition::Clear => log::info!("Alert condition cleared"),
            Transition::Hold | Transition::Idle => {}
        }
    }

    fn raise(&self, inner: &mut PresenterInner, kind: AlertKind) {
        // Replace, never stack
        if let Some(previous) = inner.alarm.take() {
            previous.keep_playing.cancel();
        }

        let keep_playing = CancellationToken::new();
        let (ack_tx, ack_rx) = oneshot::channel::<()>();
        let message = kind.message(&self.config);

        let annunciator = Arc::clone(&self.annunciator);
        let token = keep_playing.clone();
        self.runtime.spawn(async move {
            annunciator.show(kind, &message);
            tokio::select! {
                ack = ack_rx => {
                    // Err means the alarm was replaced and the sender dropped
                    if ack.is_ok() {
                        token.cancel();
                        annunciator.dismiss(kind);
                    }
                }
                _ = token.cancelled() => {}
            }
        });

        let annunciator = Arc::clone(&self.annunciator);
        let token = keep_playing.clone();
        let repeat = self.repeat_interval;
        self.runtime.spawn(async move {
            while !token.is_cancelled() {
                annunciator.chime();
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(repeat) => {}
                }
            }
        });

        inner.alarm = Some(ActiveAlarm {
            kind,
            keep_playing,
            ack_tx: Some(ack_tx),
        });
        inner.presentations += 1;
    }

    /// Operator acknowledged the notification.
    ///
    /// Returns false when there was nothing waiting for acknowledgment.
    pub fn acknowledge(&self) -> bool {
        let mut inner = self.inner.lock();
        let Some(alarm) = inner.alarm.as_mut() else {
            return false;
        };
        match alarm.ack_tx.take() {
            Some(tx) => {
                log::info!("Operator acknowledged: {}", alarm.kind);
                tx.send(()).is_ok()
            }
            None => false,
        }
    }

    /// Silence everything, e.g. on exit
    pub fn silence(&self) {
        let mut inner = self.inner.lock();
        if let Some(alarm) = inner.alarm.take() {
            alarm.keep_playing.cancel();
        }
    }

    pub fn state(&self) -> AlertState {
        self.inner.lock().state
    }

    /// Kind of the alert still waiting for acknowledgment, if any
    pub fn pending(&self) -> Option<AlertKind> {
        let inner = self.inner.lock();
        inner
            .alarm
            .as_ref()
            .filter(|alarm| alarm.ack_tx.is_some())
            .map(|alarm| alarm.kind)
    }

    pub fn is_sounding(&self) -> bool {
        self.inner
            .lock()
            .alarm
            .as_ref()
            .map(|alarm| !alarm.keep_playing.is_cancelled())
            .unwrap_or(false)
    }

    /// Number of alerts presented so far
    pub fn presentations(&self) -> u64 {
        self.inner.lock().presentations
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }
}

impl Drop for AlertPresenter {
    fn drop(&mut self) {
        if let Some(alarm) = self.inner.get_mut().alarm.take() {
            alarm.keep_playing.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Recorder {
        shown: Mutex<Vec<AlertKind>>,
        dismissed: Mutex<Vec<AlertKind>>,
        chimes: AtomicUsize,
    }

    impl Annunciator for Recorder {
        fn show(&self, kind: AlertKind, _message: &str) {
            self.shown.lock().push(kind);
        }
        fn dismiss(&self, kind: AlertKind) {
            self.dismissed.lock().push(kind);
        }
        fn chime(&self) {
            self.chimes.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn presenter(recorder: &Arc<Recorder>) -> AlertPresenter {
        AlertPresenter::new(
            AlertConfig::default(),
            Duration::from_millis(10),
            Arc::clone(recorder) as Arc<dyn Annunciator>,
            Handle::current(),
        )
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[test]
    fn test_transitions() {
        use AlertKind::*;
        let none = AlertState::NoCondition;
        let pressure = AlertState::ConditionActive(PressureLimit);

        assert_eq!(none.transition(None), (none, Transition::Idle));
        assert_eq!(
            none.transition(Some(PressureLimit)),
            (pressure, Transition::Raise(PressureLimit))
        );
        assert_eq!(
            pressure.transition(Some(PressureLimit)),
            (pressure, Transition::Hold)
        );
        assert_eq!(
            pressure.transition(Some(Stall)),
            (AlertState::ConditionActive(Stall), Transition::Raise(Stall))
        );
        assert_eq!(pressure.transition(None), (none, Transition::Clear));
    }

    #[tokio::test]
    async fn test_same_condition_presented_once() {
        let recorder = Arc::new(Recorder::default());
        let presenter = presenter(&recorder);

        presenter.present(Some(AlertKind::PressureLimit));
        presenter.present(Some(AlertKind::PressureLimit));
        settle().await;

        assert_eq!(presenter.presentations(), 1);
        assert_eq!(*recorder.shown.lock(), vec![AlertKind::PressureLimit]);
        assert!(presenter.is_sounding());
        assert!(recorder.chimes.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_retrigger_after_clear() {
        let recorder = Arc::new(Recorder::default());
        let presenter = presenter(&recorder);

        presenter.present(Some(AlertKind::PressureLimit));
        presenter.present(None);
        presenter.present(Some(AlertKind::PressureLimit));
        settle().await;

        assert_eq!(presenter.presentations(), 2);
        assert_eq!(recorder.shown.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_clear_keeps_sounding_until_acknowledged() {
        let recorder = Arc::new(Recorder::default());
        let presenter = presenter(&recorder);

        presenter.present(Some(AlertKind::Stall));
        presenter.present(None);
        settle().await;

        assert_eq!(presenter.state(), AlertState::NoCondition);
        assert!(presenter.is_sounding());
        assert_eq!(presenter.pending(), Some(AlertKind::Stall));

        assert!(presenter.acknowledge());
        settle().await;

        assert!(!presenter.is_sounding());
        assert_eq!(presenter.pending(), None);
        assert_eq!(*recorder.dismissed.lock(), vec![AlertKind::Stall]);
        assert!(!presenter.acknowledge());
    }

    #[tokio::test]
    async fn test_alarm_stops_repeating_after_ack() {
        let recorder = Arc::new(Recorder::default());
        let presenter = presenter(&recorder);

        presenter.present(Some(AlertKind::TravelLimit));
        settle().await;
        presenter.acknowledge();
        settle().await;

        let chimes = recorder.chimes.load(Ordering::SeqCst);
        settle().await;
        assert_eq!(recorder.chimes.load(Ordering::SeqCst), chimes);
    }

    #[tokio::test]
    async fn test_new_condition_replaces_old() {
        let recorder = Arc::new(Recorder::default());
        let presenter = presenter(&recorder);

        presenter.present(Some(AlertKind::Stall));
        presenter.present(Some(AlertKind::TemperatureLimit));
        settle().await;

        assert_eq!(presenter.presentations(), 2);
        assert_eq!(presenter.pending(), Some(AlertKind::TemperatureLimit));
        assert!(recorder.dismissed.lock().is_empty());

        assert!(presenter.acknowledge());
        settle().await;
        assert!(!presenter.is_sounding());
    }

    #[tokio::test]
    async fn test_acknowledge_without_alert() {
        let recorder = Arc::new(Recorder::default());
        let presenter = presenter(&recorder);
        assert!(!presenter.acknowledge());
        assert!(!presenter.is_sounding());
    }
}
