use parking_lot::Mutex;
use rigmon::core::rig_monitor::{
    AlarmRuntime, AlertConfig, AlertKind, AlertPresenter, Annunciator, Channel, MemoryStore,
    SessionController, LOGGING_SIGNAL_KEY, NO_DATA,
};
use rigmon::RigError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

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

struct Rig {
    store: MemoryStore,
    recorder: Arc<Recorder>,
    session: SessionController<MemoryStore>,
    runtime: AlarmRuntime,
}

fn rig() -> Rig {
    let runtime = AlarmRuntime::new().unwrap();
    let recorder = Arc::new(Recorder::default());
    let presenter = Arc::new(AlertPresenter::new(
        AlertConfig::default(),
        Duration::from_millis(20),
        recorder.clone(),
        runtime.handle(),
    ));
    let store = MemoryStore::new();
    let session = SessionController::new(store.clone(), presenter, Duration::from_millis(33));

    Rig {
        store,
        recorder,
        session,
        runtime,
    }
}

fn settle() {
    thread::sleep(Duration::from_millis(80));
}

#[test]
fn test_reads_and_publishes_snapshots() {
    let mut rig = rig();
    rig.store.set(Channel::DrillTorque.key(), "42");
    rig.store.set(Channel::ScrewjackPosition.key(), "not a number");

    let mut rx = rig.session.subscribe();
    rig.session.start().unwrap();
    assert!(rig.session.tick_due(Instant::now()));

    let snapshot = rig.session.tick().unwrap();
    assert_eq!(snapshot.get(Channel::DrillTorque), 42);
    assert_eq!(snapshot.get(Channel::ScrewjackPosition), NO_DATA);
    assert_eq!(snapshot.get(Channel::HpuPressure), NO_DATA);
    assert!(snapshot.store_ok);

    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().cycle, snapshot.cycle);
    assert!(!rig.session.tick_due(Instant::now()));

    rig.runtime.shutdown();
}

#[test]
fn test_dropped_connection_yields_no_data_and_recovers() {
    let mut rig = rig();
    rig.store.set(Channel::HpuPressure.key(), "50");
    rig.session.start().unwrap();

    rig.store.fail_reads(true);
    let snapshot = rig.session.tick().unwrap();
    assert!(!snapshot.store_ok);
    assert!(snapshot.sample.iter().all(|(_, v)| v == NO_DATA));

    rig.store.fail_reads(false);
    let snapshot = rig.session.tick().unwrap();
    assert!(snapshot.store_ok);
    assert_eq!(snapshot.get(Channel::HpuPressure), 50);

    rig.runtime.shutdown();
}

#[test]
fn test_refused_connection_fails_start() {
    let mut rig = rig();
    rig.store.refuse_connections(true);

    assert!(rig.session.start().is_err());
    assert!(!rig.session.is_reading());
    assert!(rig.session.tick().is_none());

    rig.runtime.shutdown();
}

#[test]
fn test_alarm_raises_once_and_acknowledges() {
    let mut rig = rig();
    rig.store.set(Channel::HpuPressure.key(), "130");
    rig.session.start().unwrap();

    for _ in 0..3 {
        rig.session.tick();
    }
    settle();

    let presenter = rig.session.presenter().clone();
    assert_eq!(*rig.recorder.shown.lock(), vec![AlertKind::PressureLimit]);
    assert_eq!(presenter.presentations(), 1);
    assert!(presenter.is_sounding());
    assert!(rig.recorder.chimes.load(Ordering::SeqCst) >= 1);

    // Clearing the condition keeps the alarm until it is acknowledged
    rig.store.set(Channel::HpuPressure.key(), "20");
    rig.session.tick();
    assert_eq!(presenter.pending(), Some(AlertKind::PressureLimit));

    assert!(presenter.acknowledge());
    settle();
    assert!(!presenter.is_sounding());
    assert_eq!(*rig.recorder.dismissed.lock(), vec![AlertKind::PressureLimit]);

    let chimes = rig.recorder.chimes.load(Ordering::SeqCst);
    settle();
    assert_eq!(rig.recorder.chimes.load(Ordering::SeqCst), chimes);

    rig.runtime.shutdown();
}

#[test]
fn test_offset_reset_zeroes_position() {
    let mut rig = rig();
    rig.session.start().unwrap();

    // No reading yet
    rig.session.tick();
    assert!(!rig.session.reset_offset());
    assert_eq!(rig.session.position_offset(), 0);

    rig.store.set(Channel::ScrewjackPosition.key(), "12");
    rig.session.tick();
    assert!(rig.session.reset_offset());

    rig.store.set(Channel::ScrewjackPosition.key(), "15");
    let snapshot = rig.session.tick().unwrap();
    assert_eq!(snapshot.position_offset, 12);
    assert_eq!(snapshot.screwjack_position_compensated, 3);

    rig.runtime.shutdown();
}

#[test]
fn test_logging_blocks_shutdown() {
    let mut rig = rig();
    assert!(matches!(
        rig.session.set_logging(true),
        Err(RigError::NotConnected)
    ));

    rig.session.start().unwrap();
    rig.session.set_logging(true).unwrap();
    assert_eq!(rig.store.get(LOGGING_SIGNAL_KEY).as_deref(), Some("1"));

    assert!(!rig.session.request_shutdown());
    assert!(rig.session.is_reading());

    rig.session.set_logging(false).unwrap();
    assert_eq!(rig.store.get(LOGGING_SIGNAL_KEY).as_deref(), Some("0"));
    assert!(rig.session.request_shutdown());
    assert!(!rig.session.is_reading());

    rig.runtime.shutdown();
}
