use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::channels::Channel;

/// Sentinel stored for a channel whose value is absent, unparsable or below it
pub const NO_DATA: i64 = -9999;

/// Whether a reading carries real data
pub fn is_valid(value: i64) -> bool {
    value > NO_DATA
}

/// One reading per registered channel.
///
/// Backed by a fixed array so a channel can never be missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    values: [i64; Channel::COUNT],
}

impl Sample {
    /// A sample where every channel reads `NO_DATA`
    pub fn empty() -> Self {
        Self {
            values: [NO_DATA; Channel::COUNT],
        }
    }

    pub fn get(&self, channel: Channel) -> i64 {
        self.values[channel.index()]
    }

    pub fn set(&mut self, channel: Channel, value: i64) {
        self.values[channel.index()] = value;
    }

    /// Builder-style setter, handy when assembling fixtures
    pub fn with(mut self, channel: Channel, value: i64) -> Self {
        self.set(channel, value);
        self
    }

    pub fn is_valid(&self, channel: Channel) -> bool {
        is_valid(self.get(channel))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Channel, i64)> + '_ {
        Channel::ALL.iter().map(move |&ch| (ch, self.get(ch)))
    }
}

impl Default for Sample {
    fn default() -> Self {
        Self::empty()
    }
}

impl Serialize for Sample {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Channel::COUNT))?;
        for (channel, value) in self.iter() {
            map.serialize_entry(channel.key(), &value)?;
        }
        map.end()
    }
}

/// Everything one poll cycle produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub cycle: u64,
    pub timestamp: DateTime<Utc>,
    /// False when the whole store read failed and `sample` is all `NO_DATA`
    pub store_ok: bool,
    pub sample: Sample,
    pub position_offset: i64,
    pub screwjack_position_compensated: i64,
    pub max_bearing_temp: i64,
}

impl Snapshot {
    /// Derive the computed values for `sample` under the given offset
    pub fn new(cycle: u64, sample: Sample, position_offset: i64, store_ok: bool) -> Self {
        Self {
            cycle,
            timestamp: Utc::now(),
            store_ok,
            sample,
            position_offset,
            screwjack_position_compensated: compensate_position(
                sample.get(Channel::ScrewjackPosition),
                position_offset,
            ),
            max_bearing_temp: max_valid(
                sample.get(Channel::FrontBearingTemp),
                sample.get(Channel::RearBearingTemp),
            ),
        }
    }

    /// Snapshot shown before the first poll completes
    pub fn initial() -> Self {
        Self::new(0, Sample::empty(), 0, true)
    }

    pub fn get(&self, channel: Channel) -> i64 {
        self.sample.get(channel)
    }
}

/// `raw - offset`, or `NO_DATA` when there is no raw reading or the
/// difference does not fit
pub fn compensate_position(raw: i64, offset: i64) -> i64 {
    if !is_valid(raw) {
        return NO_DATA;
    }
    raw.checked_sub(offset).unwrap_or(NO_DATA)
}

/// Larger of two readings, ignoring any that carry no data
fn max_valid(a: i64, b: i64) -> i64 {
    match (is_valid(a), is_valid(b)) {
        (true, true) => a.max(b),
        (true, false) => a,
        (false, true) => b,
        (false, false) => NO_DATA,
    }
}
