use fioritura_ports::{ChannelMessage, ControllerKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where a message came from, fixing the coalescing order when several
/// messages land on the same millisecond offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum MessageCategory {
    Setup,
    SubChordOverride,
    ChordOn,
    ChordOff,
    Envelope(EnvelopeRank),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum EnvelopeRank {
    ModulationWheel,
    Pan,
    PitchWheel,
    Expression,
}

impl From<ControllerKind> for EnvelopeRank {
    fn from(kind: ControllerKind) -> Self {
        match kind {
            ControllerKind::ModulationWheel => EnvelopeRank::ModulationWheel,
            ControllerKind::Pan => EnvelopeRank::Pan,
            ControllerKind::PitchWheel => EnvelopeRank::PitchWheel,
            ControllerKind::Expression => EnvelopeRank::Expression,
        }
    }
}

/// The fully resolved, time-ordered message table for one chord
/// performance. Offsets are unique keys in ascending order; built fresh
/// per performance and consumed once.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    entries: BTreeMap<u32, Vec<ChannelMessage>>,
}

impl Schedule {
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[ChannelMessage])> {
        self.entries
            .iter()
            .map(|(&offset, messages)| (offset, messages.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The last offset carrying a message, i.e. the schedule's span.
    pub fn span_ms(&self) -> u32 {
        self.entries.keys().next_back().copied().unwrap_or(0)
    }

    pub fn messages_at(&self, offset: u32) -> Option<&[ChannelMessage]> {
        self.entries.get(&offset).map(Vec::as_slice)
    }

    pub fn into_entries(self) -> Vec<(u32, Vec<ChannelMessage>)> {
        self.entries.into_iter().collect()
    }
}

/// Accumulates (offset, category, message) triples, then coalesces
/// same-offset messages in category order (insertion order within a
/// category).
#[derive(Debug, Default)]
pub struct ScheduleBuilder {
    pending: Vec<(u32, MessageCategory, usize, ChannelMessage)>,
}

impl ScheduleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, offset_ms: u32, category: MessageCategory, message: ChannelMessage) {
        let sequence = self.pending.len();
        self.pending.push((offset_ms, category, sequence, message));
    }

    pub fn finish(mut self) -> Schedule {
        self.pending
            .sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));
        let mut entries: BTreeMap<u32, Vec<ChannelMessage>> = BTreeMap::new();
        for (offset, _, _, message) in self.pending {
            entries.entry(offset).or_default().push(message);
        }
        Schedule { entries }
    }
}
