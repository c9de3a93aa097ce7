use crate::basic_chord::{synthesize_basic_chord, BasicChordDef, ChordError};
use crate::settings::ChordSettings;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An ornament definition: its own palette table, the externally resolved
/// 1-based index sequence (e.g. from a fractal generator), and the minimum
/// duration any fitted sub-chord may take.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrnamentSource {
    pub settings: ChordSettings,
    pub number_sequence: Vec<usize>,
    pub min_sub_chord_ms: u32,
}

/// Expands a root chord into ornament sub-chords fitted into `outer_ms`.
///
/// An empty number sequence degenerates to the root chord spanning the
/// whole duration. Fitted durations always sum to `outer_ms` exactly; if
/// the floor cannot be met the sequence collapses, dropping trailing
/// chords until it can, down to a single chord if necessary.
pub fn expand_ornament(
    root: &BasicChordDef,
    source: &OrnamentSource,
    outer_ms: u32,
) -> Result<Vec<BasicChordDef>, ChordError> {
    root.validate()?;

    if source.number_sequence.is_empty() {
        let mut single = root.clone();
        single.ms_duration = outer_ms;
        return Ok(vec![single]);
    }

    let mut provisional = Vec::with_capacity(source.number_sequence.len());
    for &number in &source.number_sequence {
        let index = number
            .checked_sub(1)
            .ok_or(ChordError::InvalidOrnamentNumber { number })?;
        let density = if index < source.settings.chord_count() {
            source.settings.chord_density(index)
        } else {
            return Err(ChordError::IndexOutOfRange {
                index,
                count: source.settings.chord_count(),
            });
        };
        provisional.push(synthesize_basic_chord(&source.settings, index, density)?);
    }

    let requested: Vec<u32> = provisional.iter().map(|sub| sub.ms_duration).collect();
    let fitted = fit_durations(&requested, outer_ms, source.min_sub_chord_ms);

    let mut expanded = Vec::with_capacity(fitted.len());
    for (sub, &ms) in provisional.iter().zip(&fitted) {
        expanded.push(combine_with_root(sub, root, ms));
    }
    Ok(expanded)
}

/// Distributes `outer_ms` over a prefix of the requested durations,
/// preserving their proportions, so the result sums exactly to `outer_ms`
/// and every entry meets the floor. Trailing chords are dropped while the
/// floor is violated; one chord always fits, floor or not.
fn fit_durations(requested: &[u32], outer_ms: u32, floor_ms: u32) -> Vec<u32> {
    let mut count = requested.len();
    while count > 1 {
        let fitted = apportion(&requested[..count], outer_ms);
        if fitted.iter().all(|&ms| ms >= floor_ms) {
            return fitted;
        }
        count -= 1;
    }
    vec![outer_ms]
}

/// Largest-remainder apportionment: integer shares proportional to the
/// weights, summing exactly to `total`. An all-zero weight list is shared
/// evenly.
pub(crate) fn apportion(weights: &[u32], total: u32) -> Vec<u32> {
    let mut sum: u64 = weights.iter().map(|&w| w as u64).sum();
    let even = vec![1u32; weights.len()];
    let weights: &[u32] = if sum == 0 {
        sum = weights.len() as u64;
        &even
    } else {
        weights
    };
    let mut shares: Vec<(usize, u64, u64)> = weights
        .iter()
        .enumerate()
        .map(|(position, &weight)| {
            let numerator = total as u64 * weight as u64;
            (position, numerator / sum, numerator % sum)
        })
        .collect();

    let assigned: u64 = shares.iter().map(|share| share.1).sum();
    let mut leftover = total as u64 - assigned;
    shares.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));
    for share in shares.iter_mut() {
        if leftover == 0 {
            break;
        }
        share.1 += 1;
        leftover -= 1;
    }
    shares.sort_by_key(|share| share.0);
    shares.into_iter().map(|share| share.1 as u32).collect()
}

/// Transposes the sub-chord by every root note, then collapses to unique
/// ascending pitches keeping the loudest velocity per pitch.
fn combine_with_root(sub: &BasicChordDef, root: &BasicChordDef, ms_duration: u32) -> BasicChordDef {
    let mut merged: BTreeMap<u8, u8> = BTreeMap::new();
    for (&root_pitch, &root_velocity) in root.pitches.iter().zip(&root.velocities) {
        for (&pitch, &velocity) in sub.pitches.iter().zip(&sub.velocities) {
            let combined_pitch = (pitch as u16 + root_pitch as u16).min(127) as u8;
            let combined_velocity = (velocity as u16 + root_velocity as u16).min(127) as u8;
            let entry = merged.entry(combined_pitch).or_insert(combined_velocity);
            if combined_velocity > *entry {
                *entry = combined_velocity;
            }
        }
    }

    BasicChordDef {
        ms_duration,
        bank: sub.bank,
        patch: sub.patch,
        has_chord_off: sub.has_chord_off,
        pitches: merged.keys().copied().collect(),
        velocities: merged.values().copied().collect(),
    }
}
