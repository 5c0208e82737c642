//! Fixed registry of rig sensor channels.
//!
//! The store keys follow the `utec::<direction>::<quantity>::<location>` scheme
//! agreed with the publisher and must not change.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Store key the publisher watches to start or stop its CSV logger
pub const LOGGING_SIGNAL_KEY: &str = "utec::logging::start";

/// One physical sensor channel on the rig
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Channel {
    HpuPressure,
    DrillPressure,
    ScrewjackPressure,
    FluidPressure,
    ScrewjackSpeed,
    ScrewjackPosition,
    ScrewjackForce,
    DrillSpeed,
    DrillTorque,
    FrontBearingTemp,
    RearBearingTemp,
}

impl Channel {
    pub const COUNT: usize = 11;

    /// Registry order; this is also the order of the pipelined read.
    pub const ALL: [Channel; Channel::COUNT] = [
        Channel::HpuPressure,
        Channel::DrillPressure,
        Channel::ScrewjackPressure,
        Channel::FluidPressure,
        Channel::ScrewjackSpeed,
        Channel::ScrewjackPosition,
        Channel::ScrewjackForce,
        Channel::DrillSpeed,
        Channel::DrillTorque,
        Channel::FrontBearingTemp,
        Channel::RearBearingTemp,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn key(self) -> &'static str {
        match self {
            Channel::HpuPressure => "utec::read::pressure::hpu",
            Channel::DrillPressure => "utec::read::pressure::drill",
            Channel::ScrewjackPressure => "utec::read::pressure::screwjack",
            Channel::FluidPressure => "utec::read::pressure::fluid",
            Channel::ScrewjackSpeed => "utec::read::linear_speed::screwjack",
            Channel::ScrewjackPosition => "utec::read::position::screwjack",
            Channel::ScrewjackForce => "utec::read::force::drill",
            Channel::DrillSpeed => "utec::read::rotary_speed::drill",
            Channel::DrillTorque => "utec::read::torque::drill",
            Channel::FrontBearingTemp => "utec::read::temperature::front_bearing",
            Channel::RearBearingTemp => "utec::read::temperature::rear_bearing",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Channel::HpuPressure => "HPU Pressure",
            Channel::DrillPressure => "Drill Pressure",
            Channel::ScrewjackPressure => "ScrewJack Pressure",
            Channel::FluidPressure => "Drill Fluid Pressure",
            Channel::ScrewjackSpeed => "ScrewJack Speed",
            Channel::ScrewjackPosition => "ScrewJack Position",
            Channel::ScrewjackForce => "ScrewJack Force",
            Channel::DrillSpeed => "Drill Speed",
            Channel::DrillTorque => "Drill Torque",
            Channel::FrontBearingTemp => "Front Bearing Temperature",
            Channel::RearBearingTemp => "Rear Bearing Temperature",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Channel::HpuPressure
            | Channel::DrillPressure
            | Channel::ScrewjackPressure
            | Channel::FluidPressure => "bar",
            Channel::ScrewjackSpeed => "in/min",
            Channel::ScrewjackPosition => "in",
            Channel::ScrewjackForce => "kN",
            Channel::DrillSpeed => "RPM",
            Channel::DrillTorque => "Nm",
            Channel::FrontBearingTemp | Channel::RearBearingTemp => "deg C",
        }
    }

    /// Look a channel up by its store key
    pub fn from_key(key: &str) -> Option<Channel> {
        Channel::ALL.into_iter().find(|channel| channel.key() == key)
    }

    /// All store keys in registry order
    pub fn keys() -> [&'static str; Channel::COUNT] {
        Channel::ALL.map(Channel::key)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
