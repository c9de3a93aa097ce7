use fioritura_domain_chord::{
    BasicChordDef, ChordDef, ChordError, ChordSettings, EnvelopeSet, OrnamentSource,
    PaletteArrays, PerformanceControls,
};
use pretty_assertions::assert_eq;

fn sub(ms_duration: u32) -> BasicChordDef {
    BasicChordDef {
        ms_duration,
        bank: None,
        patch: None,
        has_chord_off: true,
        pitches: vec![60],
        velocities: vec![80],
    }
}

fn palette() -> ChordSettings {
    ChordSettings::new(PaletteArrays {
        durations_ms: vec![480],
        velocities: vec![80],
        midi_pitches: vec![60],
        chord_densities: vec![3],
        inversions: vec![vec![4, 3]],
        bank_indices: vec![5],
        patch_indices: vec![9],
        ..Default::default()
    })
    .unwrap()
}

#[test]
fn duration_mismatch_fails_at_construction() {
    let result = ChordDef::from_parts(
        500,
        PerformanceControls::default(),
        true,
        vec![sub(200), sub(200)],
        EnvelopeSet::default(),
    );
    assert!(matches!(
        result,
        Err(ChordError::DurationMismatch {
            actual: 400,
            expected: 500
        })
    ));
}

#[test]
fn palette_chord_hoists_bank_and_patch_into_controls() {
    let chord = ChordDef::from_palette(&palette(), 0, None, EnvelopeSet::default()).unwrap();

    assert_eq!(chord.controls.bank, Some(5));
    assert_eq!(chord.controls.patch, Some(9));
    assert_eq!(chord.ms_duration, 480);
    assert_eq!(chord.sub_chords.len(), 1);
    // No override left on the sub-chord once the controls own it.
    assert_eq!(chord.sub_chords[0].bank, None);
    assert_eq!(chord.sub_chords[0].patch, None);
    assert_eq!(chord.sub_chords[0].pitches, vec![60, 64, 67]);
}

#[test]
fn palette_chord_with_ornament_fills_the_whole_duration() {
    let ornament = OrnamentSource {
        settings: ChordSettings::new(PaletteArrays {
            durations_ms: vec![100, 100],
            velocities: vec![0, 0],
            midi_pitches: vec![0, 2],
            chord_densities: vec![1, 1],
            ..Default::default()
        })
        .unwrap(),
        number_sequence: vec![1, 2, 1],
        min_sub_chord_ms: 50,
    };
    let chord = ChordDef::from_palette(&palette(), 0, Some(&ornament), EnvelopeSet::default())
        .unwrap();

    assert_eq!(chord.sub_chords.len(), 3);
    let total: u32 = chord.sub_chords.iter().map(|sub| sub.ms_duration).sum();
    assert_eq!(total, 480);
}

#[test]
fn with_duration_refits_sub_chords_proportionally() {
    let chord = ChordDef::from_parts(
        600,
        PerformanceControls::default(),
        true,
        vec![sub(400), sub(200)],
        EnvelopeSet::default(),
    )
    .unwrap();

    let shrunk = chord.with_duration(300);
    assert_eq!(shrunk.ms_duration, 300);
    assert_eq!(shrunk.sub_chords[0].ms_duration, 200);
    assert_eq!(shrunk.sub_chords[1].ms_duration, 100);
    // The original is untouched.
    assert_eq!(chord.sub_chords[0].ms_duration, 400);
}

#[test]
fn from_notes_builds_a_single_voicing() {
    let chord = ChordDef::from_notes(vec![48, 55], vec![70, 70], 250).unwrap();
    assert_eq!(chord.sub_chords.len(), 1);
    assert_eq!(chord.ms_duration, 250);
    assert!(chord.envelopes.is_empty());
}
