use crate::envelope::TimedMessage;
use fioritura_ports::{Channel, ControllerKind};
use serde::{Deserialize, Serialize};

/// Parametric expression shapes. Each renders to the same timed-message
/// form the envelope interpolator emits, bypassing interpolation, so the
/// scheduler merges them like any other envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Articulation {
    Staccato,
    HardStaccato,
    Tenuto,
    Accent,
    StrongAccent,
    Sforzato,
    Forzato,
    Default,
}

const STACCATO_CAP_MS: u32 = 900;
const HARD_STACCATO_CAP_MS: u32 = 900;
const ACCENT_CAP_MS: u32 = 600;
const STRONG_ACCENT_CAP_MS: u32 = 900;
const SFORZATO_SEGMENT_CAP_MS: u32 = 450;
const FORZATO_CAP_MS: u32 = 750;

impl Articulation {
    /// Renders the shape for a chord of `chord_ms`, starting from the
    /// ambient expression state. Sleeps always sum to exactly `chord_ms`;
    /// the final message holds for whatever the cap left over.
    pub fn render(self, current: u8, chord_ms: u32, channel: Channel) -> Vec<TimedMessage> {
        let current = current.min(127);
        let segments = match self {
            Articulation::Staccato => {
                let window = chord_ms.min(STACCATO_CAP_MS);
                vec![(current, window / 2), (0, chord_ms - window / 2)]
            }
            Articulation::HardStaccato => {
                let window = chord_ms.min(HARD_STACCATO_CAP_MS);
                vec![(127, window), (0, chord_ms - window)]
            }
            Articulation::Tenuto => {
                let peak = ((current as f32 * 1.3).min(127.0)) as u8;
                let half = chord_ms / 2;
                vec![(current, half), (peak, chord_ms - half), (0, 0)]
            }
            Articulation::Accent => {
                let window = chord_ms.min(ACCENT_CAP_MS);
                vec![(127, window), (current, chord_ms - window)]
            }
            Articulation::StrongAccent => {
                let window = chord_ms.min(STRONG_ACCENT_CAP_MS);
                let stage = window / 3;
                let midpoint = midpoint_above(current);
                vec![
                    (127, stage),
                    (midpoint, stage),
                    (current, chord_ms - 2 * stage),
                ]
            }
            Articulation::Sforzato => {
                let segment = (chord_ms / 2).min(SFORZATO_SEGMENT_CAP_MS);
                let midpoint = midpoint_above(current);
                vec![
                    (current, segment),
                    (127, segment),
                    (midpoint, chord_ms - 2 * segment),
                ]
            }
            Articulation::Forzato => {
                let window = chord_ms.min(FORZATO_CAP_MS);
                let midpoint = midpoint_above(current);
                vec![(127, window), (midpoint, chord_ms - window)]
            }
            Articulation::Default => vec![(current, chord_ms)],
        };

        segments
            .into_iter()
            .map(|(value, ms_until_next)| TimedMessage {
                message: ControllerKind::Expression.message(channel, value),
                ms_until_next,
            })
            .collect()
    }
}

fn midpoint_above(current: u8) -> u8 {
    current + (127 - current) / 2
}
