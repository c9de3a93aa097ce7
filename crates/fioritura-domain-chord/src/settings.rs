use serde::{Deserialize, Serialize};

/// Parallel palette arrays as loaded by the enclosing application, indexed
/// by chord index. An optional array of length 0 means "use the field
/// default for every index"; otherwise it must cover every index used.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PaletteArrays {
    pub durations_ms: Vec<u32>,
    pub velocities: Vec<u8>,
    pub midi_pitches: Vec<u8>,
    pub chord_densities: Vec<u8>,
    /// Ordered interval rows, each a sequence of non-negative semitone offsets.
    pub inversions: Vec<Vec<u8>>,
    /// Selects an interval row per chord index; consulted only when more
    /// than one row exists.
    pub inversion_indices: Vec<usize>,
    pub vertical_velocity_factors: Vec<f32>,
    pub chord_offs: Vec<bool>,
    pub bank_indices: Vec<u8>,
    pub patch_indices: Vec<u8>,
}

#[derive(thiserror::Error, Debug)]
pub enum ChordSettingsError {
    #[error("required array {name} is empty")]
    EmptyRequiredArray { name: &'static str },
    #[error("array {name} has {len} entries but {required} chords are defined")]
    ArrayTooShort {
        name: &'static str,
        len: usize,
        required: usize,
    },
    #[error("duration at index {index} is zero")]
    ZeroDuration { index: usize },
    #[error("chord density at index {index} is zero")]
    ZeroDensity { index: usize },
    #[error("vertical velocity factor at index {index} is {factor}, must be positive")]
    NonPositiveFactor { index: usize, factor: f32 },
    #[error("{name} value {value} at index {index} exceeds 127")]
    ValueOutOfRange {
        name: &'static str,
        index: usize,
        value: u8,
    },
    #[error("inversion index {value} at index {index} out of range ({rows} rows)")]
    InversionIndexOutOfRange {
        index: usize,
        value: usize,
        rows: usize,
    },
}

/// Validated, immutable palette entry set. Constructed once, read per
/// chord index thereafter.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChordSettings {
    arrays: PaletteArrays,
    chord_count: usize,
}

impl ChordSettings {
    pub fn new(arrays: PaletteArrays) -> Result<Self, ChordSettingsError> {
        let chord_count = arrays.durations_ms.len();
        if chord_count == 0 {
            return Err(ChordSettingsError::EmptyRequiredArray {
                name: "durations_ms",
            });
        }

        check_required("velocities", arrays.velocities.len(), chord_count)?;
        check_required("midi_pitches", arrays.midi_pitches.len(), chord_count)?;
        check_required("chord_densities", arrays.chord_densities.len(), chord_count)?;
        check_optional("inversion_indices", arrays.inversion_indices.len(), chord_count)?;
        check_optional(
            "vertical_velocity_factors",
            arrays.vertical_velocity_factors.len(),
            chord_count,
        )?;
        check_optional("chord_offs", arrays.chord_offs.len(), chord_count)?;
        check_optional("bank_indices", arrays.bank_indices.len(), chord_count)?;
        check_optional("patch_indices", arrays.patch_indices.len(), chord_count)?;

        for (index, &ms) in arrays.durations_ms.iter().enumerate() {
            if ms == 0 {
                return Err(ChordSettingsError::ZeroDuration { index });
            }
        }
        for (index, &density) in arrays.chord_densities.iter().enumerate() {
            if density == 0 {
                return Err(ChordSettingsError::ZeroDensity { index });
            }
        }
        for (index, &factor) in arrays.vertical_velocity_factors.iter().enumerate() {
            if factor <= 0.0 {
                return Err(ChordSettingsError::NonPositiveFactor { index, factor });
            }
        }
        check_seven_bit("velocities", &arrays.velocities)?;
        check_seven_bit("midi_pitches", &arrays.midi_pitches)?;
        check_seven_bit("bank_indices", &arrays.bank_indices)?;
        check_seven_bit("patch_indices", &arrays.patch_indices)?;
        if arrays.inversions.len() > 1 {
            for (index, &value) in arrays.inversion_indices.iter().enumerate() {
                if value >= arrays.inversions.len() {
                    return Err(ChordSettingsError::InversionIndexOutOfRange {
                        index,
                        value,
                        rows: arrays.inversions.len(),
                    });
                }
            }
        }

        Ok(Self {
            arrays,
            chord_count,
        })
    }

    pub fn chord_count(&self) -> usize {
        self.chord_count
    }

    pub fn duration_ms(&self, index: usize) -> u32 {
        self.arrays.durations_ms[index]
    }

    pub fn velocity(&self, index: usize) -> u8 {
        self.arrays.velocities[index]
    }

    pub fn midi_pitch(&self, index: usize) -> u8 {
        self.arrays.midi_pitches[index]
    }

    pub fn chord_density(&self, index: usize) -> u8 {
        self.arrays.chord_densities[index]
    }

    /// The interval row for this chord index: the single row when exactly
    /// one exists, the indexed row when several exist, none when there are
    /// no rows at all.
    pub fn interval_row(&self, index: usize) -> Option<&[u8]> {
        match self.arrays.inversions.len() {
            0 => None,
            1 => Some(&self.arrays.inversions[0]),
            _ => {
                let row = *self.arrays.inversion_indices.get(index).unwrap_or(&0);
                Some(&self.arrays.inversions[row])
            }
        }
    }

    pub fn vertical_velocity_factor(&self, index: usize) -> f32 {
        self.arrays
            .vertical_velocity_factors
            .get(index)
            .copied()
            .unwrap_or(1.0)
    }

    pub fn has_chord_off(&self, index: usize) -> bool {
        self.arrays.chord_offs.get(index).copied().unwrap_or(true)
    }

    pub fn bank_index(&self, index: usize) -> Option<u8> {
        self.arrays.bank_indices.get(index).copied()
    }

    pub fn patch_index(&self, index: usize) -> Option<u8> {
        self.arrays.patch_indices.get(index).copied()
    }
}

fn check_required(
    name: &'static str,
    len: usize,
    required: usize,
) -> Result<(), ChordSettingsError> {
    if len == 0 {
        return Err(ChordSettingsError::EmptyRequiredArray { name });
    }
    if len < required {
        return Err(ChordSettingsError::ArrayTooShort {
            name,
            len,
            required,
        });
    }
    Ok(())
}

fn check_optional(
    name: &'static str,
    len: usize,
    required: usize,
) -> Result<(), ChordSettingsError> {
    if len != 0 && len < required {
        return Err(ChordSettingsError::ArrayTooShort {
            name,
            len,
            required,
        });
    }
    Ok(())
}

fn check_seven_bit(name: &'static str, values: &[u8]) -> Result<(), ChordSettingsError> {
    for (index, &value) in values.iter().enumerate() {
        if value > 127 {
            return Err(ChordSettingsError::ValueOutOfRange { name, index, value });
        }
    }
    Ok(())
}
