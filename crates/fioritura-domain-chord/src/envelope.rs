use fioritura_ports::{Channel, ChannelMessage, ControllerKind};
use serde::{Deserialize, Serialize};

/// One outgoing message plus the time to wait before the next one. A
/// sequence of these is the relative form of an envelope; the scheduler
/// converts it to absolute offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedMessage {
    pub message: ChannelMessage,
    pub ms_until_next: u32,
}

pub const DEFAULT_GRANULARITY_MS: u32 = 30;

/// Turns a sparse breakpoint list into a dense, timed controller message
/// sequence spanning exactly `total_ms`.
///
/// Zero or one breakpoint yields a single message at offset 0 (the kind's
/// default value when none is supplied). With N breakpoints the duration
/// splits into N-1 equal segments; within a segment a sample is emitted
/// every `granularity_ms`, values linearly interpolated, clamped to 0..127
/// and truncated. The last sample of each segment lands exactly on the
/// segment boundary, so the sleeps always sum to `total_ms`.
pub fn interpolate(
    kind: ControllerKind,
    breakpoints: &[u8],
    channel: Channel,
    total_ms: u32,
    granularity_ms: u32,
) -> Vec<TimedMessage> {
    let granularity_ms = granularity_ms.max(1);

    if breakpoints.len() < 2 {
        let value = breakpoints
            .first()
            .copied()
            .unwrap_or_else(|| kind.default_value());
        return vec![TimedMessage {
            message: kind.message(channel, value.min(127)),
            ms_until_next: total_ms,
        }];
    }

    // (offset, value) samples, starting with the first breakpoint at 0.
    let mut samples: Vec<(u32, u8)> = vec![(0, breakpoints[0].min(127))];
    let segments = (breakpoints.len() - 1) as u32;
    for segment in 0..segments {
        let start_ms = total_ms as u64 * segment as u64 / segments as u64;
        let end_ms = total_ms as u64 * (segment + 1) as u64 / segments as u64;
        let length_ms = (end_ms - start_ms) as u32;
        let from = breakpoints[segment as usize].min(127);
        let to = breakpoints[segment as usize + 1].min(127);

        let steps = (length_ms / granularity_ms).max(1);
        let step_value = (to as f64 - from as f64) / steps as f64;
        for step in 1..=steps {
            let offset = start_ms as u32 + (step * granularity_ms).min(length_ms);
            let value = if step == steps {
                to
            } else {
                (from as f64 + step_value * step as f64).clamp(0.0, 127.0) as u8
            };
            samples.push((offset, value));
        }
    }

    let mut out = Vec::with_capacity(samples.len());
    for (position, &(offset, value)) in samples.iter().enumerate() {
        let next_offset = samples
            .get(position + 1)
            .map(|&(next, _)| next)
            .unwrap_or(total_ms);
        out.push(TimedMessage {
            message: kind.message(channel, value),
            ms_until_next: next_offset - offset,
        });
    }
    out
}
