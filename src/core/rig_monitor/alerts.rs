//! Safety limits for the rig.
//!
//! Evaluates the latest snapshot against configurable limits and reports the
//! single most important violated condition, if any.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::channels::Channel;
use super::sample::{Snapshot, NO_DATA};

/// Operating limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub max_temperature: i64,       // deg C, either bearing
    pub max_pressure: i64,          // bar, HPU
    pub min_stall_pressure: i64,    // bar, HPU pressure above which a stall is possible
    pub stall_speed_threshold: i64, // RPM or in/min
    pub max_screwjack_travel: i64,  // in, after offset compensation
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            max_temperature: 90,
            max_pressure: 105,
            min_stall_pressure: 60,
            stall_speed_threshold: 5,
            max_screwjack_travel: 25,
        }
    }
}

/// A critical rig condition, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    TemperatureLimit,
    PressureLimit,
    Stall,
    TravelLimit,
}

impl AlertKind {
    pub fn title(self) -> &'static str {
        match self {
            AlertKind::TemperatureLimit => "Bearing temperature limit",
            AlertKind::PressureLimit => "HPU pressure limit",
            AlertKind::Stall => "Stall detected",
            AlertKind::TravelLimit => "Screwjack travel limit",
        }
    }

    /// Message shown to the operator
    pub fn message(self, config: &AlertConfig) -> String {
        match self {
            AlertKind::TemperatureLimit => format!(
                "Bearing temperature is above {} {}. Stop the drill and let the bearings cool down.",
                config.max_temperature,
                Channel::FrontBearingTemp.unit()
            ),
            AlertKind::PressureLimit => format!(
                "HPU pressure is above {} {}. Reduce the load immediately.",
                config.max_pressure,
                Channel::HpuPressure.unit()
            ),
            AlertKind::Stall => format!(
                "Drill or screwjack is below {} while HPU pressure is above {} {}. The drill may be stalled.",
                config.stall_speed_threshold,
                config.min_stall_pressure,
                Channel::HpuPressure.unit()
            ),
            AlertKind::TravelLimit => format!(
                "Screwjack has travelled more than {} {} from zero. Stop advancing.",
                config.max_screwjack_travel,
                Channel::ScrewjackPosition.unit()
            ),
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Evaluate a snapshot; the first violated limit in priority order wins.
pub fn evaluate_alert(snapshot: &Snapshot, config: &AlertConfig) -> Option<AlertKind> {
    let sample = &snapshot.sample;

    // Temperature
    let bearing_temp = sample
        .get(Channel::FrontBearingTemp)
        .max(sample.get(Channel::RearBearingTemp));
    if bearing_temp > config.max_temperature {
        return Some(AlertKind::TemperatureLimit);
    }

    // Pressure
    let hpu_pressure = sample.get(Channel::HpuPressure);
    if hpu_pressure > config.max_pressure {
        return Some(AlertKind::PressureLimit);
    }

    // Stall: the NO_DATA guard keeps a missing speed from looking like zero speed
    let min_speed = sample
        .get(Channel::DrillSpeed)
        .min(sample.get(Channel::ScrewjackSpeed));
    if hpu_pressure > config.min_stall_pressure
        && min_speed > NO_DATA
        && min_speed < config.stall_speed_threshold
    {
        return Some(AlertKind::Stall);
    }

    // Travel
    if snapshot.screwjack_position_compensated > config.max_screwjack_travel {
        return Some(AlertKind::TravelLimit);
    }

    None
}
