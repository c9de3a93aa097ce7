use crate::types::Channel;
use serde::{Deserialize, Serialize};

pub const CC_BANK_SELECT: u8 = 0;
pub const CC_MODULATION_WHEEL: u8 = 1;
pub const CC_DATA_ENTRY: u8 = 6;
pub const CC_PAN: u8 = 10;
pub const CC_EXPRESSION: u8 = 11;
pub const CC_RPN_LSB: u8 = 100;
pub const CC_RPN_MSB: u8 = 101;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelMessage {
    NoteOn {
        channel: Channel,
        note: u8,
        velocity: u8,
    },
    NoteOff {
        channel: Channel,
        note: u8,
        velocity: u8,
    },
    ControlChange {
        channel: Channel,
        controller: u8,
        value: u8,
    },
    ProgramChange {
        channel: Channel,
        program: u8,
    },
    /// Coarse pitch wheel, value 0..127 (64 = centred).
    PitchWheel {
        channel: Channel,
        value: u8,
    },
}

/// Continuous controllers the envelope engine can drive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControllerKind {
    ModulationWheel,
    Pan,
    PitchWheel,
    Expression,
}

impl ControllerKind {
    /// Value sent when a chord supplies no breakpoints for this controller.
    pub fn default_value(self) -> u8 {
        match self {
            ControllerKind::ModulationWheel => 0,
            ControllerKind::Pan => 64,
            ControllerKind::PitchWheel => 64,
            ControllerKind::Expression => 127,
        }
    }

    /// The CC number for controllers carried as control-change messages.
    /// Pitch wheel has its own status byte and no CC id.
    pub fn controller_id(self) -> Option<u8> {
        match self {
            ControllerKind::ModulationWheel => Some(CC_MODULATION_WHEEL),
            ControllerKind::Pan => Some(CC_PAN),
            ControllerKind::PitchWheel => None,
            ControllerKind::Expression => Some(CC_EXPRESSION),
        }
    }

    pub fn message(self, channel: Channel, value: u8) -> ChannelMessage {
        match self.controller_id() {
            Some(controller) => ChannelMessage::ControlChange {
                channel,
                controller,
                value,
            },
            None => ChannelMessage::PitchWheel { channel, value },
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum MidiError {
    #[error("device not found: {0}")]
    DeviceNotFound(String),
    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("backend error: {0}")]
    Backend(String),
}

#[derive(thiserror::Error, Debug)]
pub enum SendError {
    #[error("output disconnected")]
    Disconnected,
    #[error("backend error: {0}")]
    Backend(String),
}

/// Outgoing message transport. Assumed reliable and ordering-preserving
/// for a single channel; failures propagate to the caller unretried.
pub trait OutputPort: Send {
    fn send(&mut self, message: ChannelMessage) -> Result<(), SendError>;
}
