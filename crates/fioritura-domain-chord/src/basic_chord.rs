use crate::dynamics::dynamic_name;
use crate::settings::ChordSettings;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One concrete voicing: a pitch/velocity set with a duration, optional
/// bank/patch, and a chord-off flag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicChordDef {
    pub ms_duration: u32,
    pub bank: Option<u8>,
    pub patch: Option<u8>,
    pub has_chord_off: bool,
    pub pitches: Vec<u8>,
    pub velocities: Vec<u8>,
}

#[derive(thiserror::Error, Debug)]
pub enum ChordError {
    #[error("chord index {index} out of range ({count} chords defined)")]
    IndexOutOfRange { index: usize, count: usize },
    #[error("density {density} exceeds {intervals} interval(s) + 1")]
    DensityExceedsIntervals { density: u8, intervals: usize },
    #[error("chord density is zero")]
    ZeroDensity,
    #[error("chord has no pitches")]
    EmptyChord,
    #[error("pitch and velocity lists differ in length ({pitches} vs {velocities})")]
    PitchVelocityMismatch { pitches: usize, velocities: usize },
    #[error("sub-chord durations sum to {actual}, chord duration is {expected}")]
    DurationMismatch { actual: u32, expected: u32 },
    #[error("ornament number {number} is not a valid 1-based chord index")]
    InvalidOrnamentNumber { number: usize },
}

/// Builds the pitch/velocity set for one (settings, index) pair at the
/// given density.
pub fn synthesize_basic_chord(
    settings: &ChordSettings,
    index: usize,
    density: u8,
) -> Result<BasicChordDef, ChordError> {
    if index >= settings.chord_count() {
        return Err(ChordError::IndexOutOfRange {
            index,
            count: settings.chord_count(),
        });
    }
    if density == 0 {
        return Err(ChordError::ZeroDensity);
    }

    let row = settings.interval_row(index);
    if let Some(row) = row {
        if density as usize > row.len() + 1 {
            return Err(ChordError::DensityExceedsIntervals {
                density,
                intervals: row.len(),
            });
        }
    }

    let mut pitch = settings.midi_pitch(index);
    let mut pitches = Vec::with_capacity(density as usize);
    for voice in 0..density as usize {
        pitches.push(pitch);
        if voice + 1 < density as usize {
            if let Some(row) = row {
                pitch = (pitch as u16 + row[voice] as u16).min(127) as u8;
            }
        }
    }

    let velocities = spread_velocities(
        settings.velocity(index),
        settings.vertical_velocity_factor(index),
        density,
    );

    Ok(BasicChordDef {
        ms_duration: settings.duration_ms(index),
        bank: settings.bank_index(index),
        patch: settings.patch_index(index),
        has_chord_off: settings.has_chord_off(index),
        pitches,
        velocities,
    })
}

/// Convenience form using the palette's own density for the index.
pub fn synthesize_palette_chord(
    settings: &ChordSettings,
    index: usize,
) -> Result<BasicChordDef, ChordError> {
    if index >= settings.chord_count() {
        return Err(ChordError::IndexOutOfRange {
            index,
            count: settings.chord_count(),
        });
    }
    synthesize_basic_chord(settings, index, settings.chord_density(index))
}

/// Spreads `density` velocities from bottom to top per the vertical
/// velocity factor. Values are clamped to 0..127 and truncated.
fn spread_velocities(base: u8, factor: f32, density: u8) -> Vec<u8> {
    if factor == 1.0 || density == 1 {
        return vec![base; density as usize];
    }
    let bottom = if factor > 1.0 {
        base as f32 / factor
    } else {
        base as f32
    };
    let top = bottom * factor;
    let step = (top - bottom) / (density as f32 - 1.0);
    (0..density)
        .map(|voice| (bottom + step * voice as f32).clamp(0.0, 127.0) as u8)
        .collect()
}

impl BasicChordDef {
    pub fn validate(&self) -> Result<(), ChordError> {
        if self.pitches.is_empty() {
            return Err(ChordError::EmptyChord);
        }
        if self.pitches.len() != self.velocities.len() {
            return Err(ChordError::PitchVelocityMismatch {
                pitches: self.pitches.len(),
                velocities: self.velocities.len(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for BasicChordDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let loudest = self.velocities.iter().copied().max().unwrap_or(0);
        write!(
            f,
            "chord {:?} {} ({}ms)",
            self.pitches,
            dynamic_name(loudest),
            self.ms_duration
        )
    }
}
