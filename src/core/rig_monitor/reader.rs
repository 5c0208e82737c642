//! One poll cycle: read every channel, coerce, derive, publish.

use std::sync::Arc;

use tokio::sync::watch;

use super::channels::Channel;
use super::sample::{is_valid, Sample, Snapshot, NO_DATA};
use super::store::StoreClient;

/// Callback run after every completed poll
pub type SampleObserver = Box<dyn FnMut(&Snapshot) + Send>;

/// Reads the full channel registry from the store once per tick
pub struct SampleReader {
    keys: [&'static str; Channel::COUNT],
    cycle: u64,
    /// Channels whose last value was present but unusable
    bad_channels: [bool; Channel::COUNT],
    /// Whether the last reply had the wrong number of values
    short_reply: bool,
    snapshot_tx: watch::Sender<Arc<Snapshot>>,
    observers: Vec<SampleObserver>,
}

impl SampleReader {
    pub fn new() -> Self {
        let (snapshot_tx, _) = watch::channel(Arc::new(Snapshot::initial()));
        Self {
            keys: Channel::keys(),
            cycle: 0,
            bad_channels: [false; Channel::COUNT],
            short_reply: false,
            snapshot_tx,
            observers: Vec::new(),
        }
    }

    /// Register a callback invoked once per cycle, after the snapshot is complete
    pub fn on_sample<F>(&mut self, observer: F)
    where
        F: FnMut(&Snapshot) + Send + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Receiver that always holds the latest snapshot
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshot_tx.subscribe()
    }

    pub fn latest(&self) -> Arc<Snapshot> {
        self.snapshot_tx.borrow().clone()
    }

    pub fn cycles(&self) -> u64 {
        self.cycle
    }

    /// Run one poll cycle against `client`.
    ///
    /// Never fails: bad values become `NO_DATA`, a failed read becomes an
    /// all-`NO_DATA` snapshot with `store_ok` cleared.
    pub fn poll(&mut self, client: &mut dyn StoreClient, position_offset: i64) -> Arc<Snapshot> {
        self.cycle += 1;

        let (sample, store_ok) = match client.fetch(&self.keys) {
            Ok(values) => {
                self.check_reply_len(values.len());
                (self.assemble(values), true)
            }
            Err(e) => {
                log::warn!("Sensor read failed on cycle {}: {}", self.cycle, e);
                (Sample::empty(), false)
            }
        };

        let snapshot = Arc::new(Snapshot::new(self.cycle, sample, position_offset, store_ok));

        // send_replace keeps the value even when nobody is subscribed
        self.snapshot_tx.send_replace(Arc::clone(&snapshot));

        for observer in self.observers.iter_mut() {
            observer(&snapshot);
        }

        snapshot
    }

    fn assemble(&mut self, values: Vec<Option<String>>) -> Sample {
        let mut sample = Sample::empty();
        let mut values = values.into_iter();

        for channel in Channel::ALL {
            let raw = values.next().flatten();
            let value = match raw {
                None => NO_DATA,
                Some(text) => match parse_reading(&text) {
                    Some(v) => {
                        if self.bad_channels[channel.index()] {
                            log::info!("{} is readable again", channel.key());
                            self.bad_channels[channel.index()] = false;
                        }
                        v
                    }
                    None => {
                        self.report_unusable(channel, &text);
                        NO_DATA
                    }
                },
            };
            sample.set(channel, value);
        }

        sample
    }

    fn check_reply_len(&mut self, len: usize) {
        let expected = self.keys.len();
        if len == expected {
            if self.short_reply {
                log::info!("Store replies have {} values again", expected);
                self.short_reply = false;
            }
        } else if self.short_reply {
            log::debug!("Store still returns {} values for {} keys", len, expected);
        } else {
            log::warn!("Store returned {} values for {} keys", len, expected);
            self.short_reply = true;
        }
    }

    fn report_unusable(&mut self, channel: Channel, text: &str) {
        let seen = &mut self.bad_channels[channel.index()];
        if *seen {
            log::debug!("{} still unusable: {:?}", channel.key(), text);
        } else {
            log::warn!(
                "Unusable value {:?} for {}; treating as no data",
                text,
                channel.key()
            );
            *seen = true;
        }
    }
}

impl Default for SampleReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse one stored reading as an integer.
///
/// Values at or below `NO_DATA` are rejected so the sentinel stays the
/// smallest value a channel can carry.
pub fn parse_reading(text: &str) -> Option<i64> {
    text.trim().parse::<i64>().ok().filter(|v| is_valid(*v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rig_monitor::store::MemoryStore;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[test]
    fn test_parse_reading() {
        assert_eq!(parse_reading("42"), Some(42));
        assert_eq!(parse_reading(" -7\n"), Some(-7));
        assert_eq!(parse_reading("4.2"), None);
        assert_eq!(parse_reading(""), None);
        assert_eq!(parse_reading("abc"), None);
        assert_eq!(parse_reading("-9998"), Some(-9998));
        assert_eq!(parse_reading("-9999"), None);
        assert_eq!(parse_reading("-20000"), None);
    }

    #[test]
    fn test_values_below_sentinel_read_as_no_data() {
        let mut store = MemoryStore::new();
        store.set(Channel::FrontBearingTemp.key(), "-20000");
        store.set(Channel::RearBearingTemp.key(), "-20000");

        let mut reader = SampleReader::new();
        let snap = reader.poll(&mut store, 0);

        assert_eq!(snap.get(Channel::FrontBearingTemp), NO_DATA);
        assert_eq!(snap.max_bearing_temp, NO_DATA);
    }

    #[test]
    fn test_huge_position_with_negative_offset_does_not_panic() {
        let mut store = MemoryStore::new();
        store.set(Channel::ScrewjackPosition.key(), i64::MAX.to_string());

        let mut reader = SampleReader::new();
        let snap = reader.poll(&mut store, -5);

        assert!(snap.store_ok);
        assert_eq!(snap.get(Channel::ScrewjackPosition), i64::MAX);
        assert_eq!(snap.screwjack_position_compensated, NO_DATA);
    }

    #[test]
    fn test_bad_key_does_not_abort_cycle() {
        let mut store = MemoryStore::new();
        store.set(Channel::HpuPressure.key(), "garbage");
        store.set(Channel::DrillSpeed.key(), "120");

        let mut reader = SampleReader::new();
        let snap = reader.poll(&mut store, 0);

        assert!(snap.store_ok);
        assert_eq!(snap.get(Channel::HpuPressure), NO_DATA);
        assert_eq!(snap.get(Channel::DrillSpeed), 120);
        assert_eq!(snap.get(Channel::DrillTorque), NO_DATA);
    }

    #[test]
    fn test_failed_read_gives_empty_snapshot() {
        let mut store = MemoryStore::new();
        store.set(Channel::HpuPressure.key(), "80");
        store.fail_reads(true);

        let mut reader = SampleReader::new();
        let snap = reader.poll(&mut store, 0);

        assert!(!snap.store_ok);
        assert_eq!(snap.sample, Sample::empty());
    }

    #[test]
    fn test_short_reply_fills_no_data() {
        struct ShortStore;
        impl StoreClient for ShortStore {
            fn fetch(&mut self, _keys: &[&str]) -> crate::Result<Vec<Option<String>>> {
                Ok(vec![Some("5".to_string())])
            }
            fn put(&mut self, _key: &str, _value: &str) -> crate::Result<()> {
                Ok(())
            }
        }

        let mut reader = SampleReader::new();
        let snap = reader.poll(&mut ShortStore, 0);
        assert_eq!(snap.get(Channel::ALL[0]), 5);
        assert!(Channel::ALL[1..].iter().all(|&c| snap.get(c) == NO_DATA));
        assert!(reader.short_reply);

        reader.poll(&mut ShortStore, 0);
        assert!(reader.short_reply);

        let mut store = MemoryStore::new();
        reader.poll(&mut store, 0);
        assert!(!reader.short_reply);
    }

    #[test]
    fn test_observer_sees_completed_snapshot() {
        let mut store = MemoryStore::new();
        store.set(Channel::ScrewjackPosition.key(), "30");

        let calls = Arc::new(AtomicU64::new(0));
        let seen = Arc::clone(&calls);

        let mut reader = SampleReader::new();
        let rx = reader.subscribe();
        reader.on_sample(move |snap| {
            assert_eq!(snap.screwjack_position_compensated, 20);
            seen.fetch_add(1, Ordering::SeqCst);
        });

        reader.poll(&mut store, 10);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(rx.borrow().cycle, 1);

        reader.poll(&mut store, 10);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(reader.latest().cycle, 2);
    }
}
