use crate::basic_chord::{synthesize_palette_chord, BasicChordDef, ChordError};
use crate::ornament::{apportion, expand_ornament, OrnamentSource};
use crate::settings::ChordSettings;
use serde::{Deserialize, Serialize};

/// Channel-level setup applied once at the start of a chord performance.
/// `None` means "leave the channel as it is".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceControls {
    pub bank: Option<u8>,
    pub patch: Option<u8>,
    /// Pitch bend sensitivity in semitones, sent as an RPN triple.
    pub pitch_wheel_deviation: Option<u8>,
}

/// Breakpoint lists for the continuous controllers, each independently
/// absent. Breakpoints are 0..127 values spread evenly over the chord.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeSet {
    pub pitch_wheel: Option<Vec<u8>>,
    pub pan: Option<Vec<u8>>,
    pub modulation_wheel: Option<Vec<u8>>,
    pub expression: Option<Vec<u8>>,
}

impl EnvelopeSet {
    pub fn is_empty(&self) -> bool {
        self.pitch_wheel.is_none()
            && self.pan.is_none()
            && self.modulation_wheel.is_none()
            && self.expression.is_none()
    }
}

/// The chord as ultimately performed: setup controls, ordered sub-chords
/// whose durations sum exactly to `ms_duration`, and envelopes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChordDef {
    pub ms_duration: u32,
    pub controls: PerformanceControls,
    pub has_chord_off: bool,
    pub sub_chords: Vec<BasicChordDef>,
    pub envelopes: EnvelopeSet,
}

impl ChordDef {
    /// Builds a chord from a palette entry, expanding its ornament when one
    /// is linked.
    pub fn from_palette(
        settings: &ChordSettings,
        index: usize,
        ornament: Option<&OrnamentSource>,
        envelopes: EnvelopeSet,
    ) -> Result<Self, ChordError> {
        let mut root = synthesize_palette_chord(settings, index)?;
        let ms_duration = root.ms_duration;
        let has_chord_off = root.has_chord_off;
        let controls = PerformanceControls {
            bank: root.bank,
            patch: root.patch,
            pitch_wheel_deviation: None,
        };
        // Setup messages own the chord-level bank/patch; sub-chords only
        // carry overrides that differ from it.
        root.bank = None;
        root.patch = None;

        let sub_chords = match ornament {
            Some(source) => expand_ornament(&root, source, ms_duration)?,
            None => vec![root],
        };

        Self::from_parts(ms_duration, controls, has_chord_off, sub_chords, envelopes)
    }

    /// Builds a chord from already-resolved parts, checking the duration
    /// invariant.
    pub fn from_parts(
        ms_duration: u32,
        controls: PerformanceControls,
        has_chord_off: bool,
        sub_chords: Vec<BasicChordDef>,
        envelopes: EnvelopeSet,
    ) -> Result<Self, ChordError> {
        if sub_chords.is_empty() {
            return Err(ChordError::EmptyChord);
        }
        for sub in &sub_chords {
            sub.validate()?;
        }
        let actual: u32 = sub_chords.iter().map(|sub| sub.ms_duration).sum();
        if actual != ms_duration {
            return Err(ChordError::DurationMismatch {
                actual,
                expected: ms_duration,
            });
        }
        Ok(Self {
            ms_duration,
            controls,
            has_chord_off,
            sub_chords,
            envelopes,
        })
    }

    /// Builds a single-voicing chord directly from input notes.
    pub fn from_notes(
        pitches: Vec<u8>,
        velocities: Vec<u8>,
        ms_duration: u32,
    ) -> Result<Self, ChordError> {
        let sub = BasicChordDef {
            ms_duration,
            bank: None,
            patch: None,
            has_chord_off: true,
            pitches,
            velocities,
        };
        sub.validate()?;
        Ok(Self {
            ms_duration,
            controls: PerformanceControls::default(),
            has_chord_off: true,
            sub_chords: vec![sub],
            envelopes: EnvelopeSet::default(),
        })
    }

    /// Local-override copy at a new duration. Sub-chord durations are
    /// refitted proportionally so the duration invariant holds on the copy.
    pub fn with_duration(&self, ms_duration: u32) -> Self {
        let weights: Vec<u32> = self.sub_chords.iter().map(|sub| sub.ms_duration).collect();
        let fitted = apportion(&weights, ms_duration);
        let mut copy = self.clone();
        copy.ms_duration = ms_duration;
        for (sub, &ms) in copy.sub_chords.iter_mut().zip(&fitted) {
            sub.ms_duration = ms;
        }
        copy
    }
}
