use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(pub String);

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MidiOutputDevice {
    pub id: DeviceId,
    pub name: String,
    pub is_available: bool,
}

/// MIDI channel, 0..15. Out-of-range values are clamped at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Channel(u8);

impl Channel {
    pub fn new(value: u8) -> Self {
        Self(value.min(15))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self(0)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
