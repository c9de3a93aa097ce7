use crate::schedule::Schedule;
use fioritura_ports::{Channel, ChannelMessage, OutputPort, SendError};
use parking_lot::{Condvar, Mutex};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

/// Clonable cancellation handle shared between a running dispatcher and
/// the orchestration that may stop it. Cancelling wakes a dispatcher
/// blocked mid-wait immediately.
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

#[derive(Default)]
struct CancelInner {
    cancelled: Mutex<bool>,
    condvar: Condvar,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        *self.inner.cancelled.lock() = true;
        self.inner.condvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.cancelled.lock()
    }

    /// Blocks for `wait`, returning early (true) if cancelled.
    fn cancelled_within(&self, wait: Duration) -> bool {
        let mut cancelled = self.inner.cancelled.lock();
        if !*cancelled && !wait.is_zero() {
            self.inner
                .condvar
                .wait_while_for(&mut cancelled, |cancelled| !*cancelled, wait);
        }
        *cancelled
    }
}

#[derive(thiserror::Error, Debug)]
pub enum DispatchError {
    #[error("transport send failed: {0}")]
    Send(#[from] SendError),
}

/// One suspension point: wait `wait_ms`, then send `messages` in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchStep {
    pub wait_ms: u32,
    pub messages: Vec<ChannelMessage>,
}

/// Replays one Schedule. The generator form (`next_step`) lets an outer
/// scheduler interleave many chords and drive the waits and sends itself;
/// `run_blocking` is the minimal single-chord player on top of it.
pub struct Dispatcher {
    entries: std::vec::IntoIter<(u32, Vec<ChannelMessage>)>,
    last_offset: u32,
    sounding: BTreeSet<(u8, u8)>,
}

impl Dispatcher {
    pub fn new(schedule: Schedule) -> Self {
        Self {
            entries: schedule.into_entries().into_iter(),
            last_offset: 0,
            sounding: BTreeSet::new(),
        }
    }

    /// The next scheduled offset as a wait-then-send step, or None when
    /// the schedule is exhausted.
    pub fn next_step(&mut self) -> Option<DispatchStep> {
        let (offset, messages) = self.entries.next()?;
        let wait_ms = offset - self.last_offset;
        self.last_offset = offset;
        Some(DispatchStep { wait_ms, messages })
    }

    /// Records that a message actually went out, so a later stop sweep
    /// releases exactly the notes left sounding. Callers driving
    /// `next_step` themselves must call this per sent message.
    pub fn message_sent(&mut self, message: &ChannelMessage) {
        match *message {
            ChannelMessage::NoteOn { channel, note, .. } => {
                self.sounding.insert((channel.get(), note));
            }
            ChannelMessage::NoteOff { channel, note, .. } => {
                self.sounding.remove(&(channel.get(), note));
            }
            _ => {}
        }
    }

    /// Note-offs for every note-on sent and not yet released.
    pub fn all_notes_off(&mut self) -> Vec<ChannelMessage> {
        std::mem::take(&mut self.sounding)
            .into_iter()
            .map(|(channel, note)| ChannelMessage::NoteOff {
                channel: Channel::new(channel),
                note,
                velocity: 64,
            })
            .collect()
    }

    /// Blocking replay: sleep between offsets, send each coalesced list in
    /// order. Cancellation is checked at every suspension point; on
    /// cancellation the note-off sweep still fires before returning.
    pub fn run_blocking(
        mut self,
        port: &mut dyn OutputPort,
        cancel: &CancelToken,
    ) -> Result<(), DispatchError> {
        while let Some(step) = self.next_step() {
            if cancel.cancelled_within(Duration::from_millis(step.wait_ms as u64)) {
                return self.sweep(port);
            }
            for message in &step.messages {
                port.send(*message)?;
                self.message_sent(message);
            }
        }
        Ok(())
    }

    fn sweep(&mut self, port: &mut dyn OutputPort) -> Result<(), DispatchError> {
        for message in self.all_notes_off() {
            port.send(message)?;
        }
        Ok(())
    }
}
