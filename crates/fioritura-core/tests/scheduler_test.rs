use fioritura_core::{build_schedule, SchedulerConfig};
use fioritura_domain_chord::{
    Articulation, BasicChordDef, ChordDef, EnvelopeSet, PerformanceControls,
};
use fioritura_ports::{Channel, ChannelMessage, CC_BANK_SELECT, CC_EXPRESSION, CC_PAN};
use pretty_assertions::assert_eq;

fn channel() -> Channel {
    Channel::new(2)
}

fn sub(pitches: &[u8], velocities: &[u8], ms_duration: u32) -> BasicChordDef {
    BasicChordDef {
        ms_duration,
        bank: None,
        patch: None,
        has_chord_off: true,
        pitches: pitches.to_vec(),
        velocities: velocities.to_vec(),
    }
}

fn plain_chord(sub_chords: Vec<BasicChordDef>, envelopes: EnvelopeSet) -> ChordDef {
    let ms_duration = sub_chords.iter().map(|sub| sub.ms_duration).sum();
    ChordDef::from_parts(
        ms_duration,
        PerformanceControls::default(),
        true,
        sub_chords,
        envelopes,
    )
    .expect("chord should validate")
}

#[test]
fn setup_messages_land_at_offset_zero_in_order() {
    let mut chord = plain_chord(vec![sub(&[60], &[80], 500)], EnvelopeSet::default());
    chord.controls = PerformanceControls {
        bank: Some(3),
        patch: Some(17),
        pitch_wheel_deviation: Some(2),
    };

    let schedule = build_schedule(&chord, channel(), None, SchedulerConfig::default());
    let at_zero = schedule.messages_at(0).unwrap();

    assert_eq!(
        at_zero[0],
        ChannelMessage::ControlChange {
            channel: channel(),
            controller: CC_BANK_SELECT,
            value: 3
        }
    );
    assert_eq!(
        at_zero[1],
        ChannelMessage::ProgramChange {
            channel: channel(),
            program: 17
        }
    );
    // RPN triple, then the chord-on.
    assert_eq!(at_zero.len(), 6);
    assert!(matches!(
        at_zero[5],
        ChannelMessage::NoteOn { note: 60, velocity: 80, .. }
    ));
}

#[test]
fn sub_chords_walk_a_running_offset() {
    let chord = plain_chord(
        vec![sub(&[60, 64], &[80, 80], 300), sub(&[62], &[70], 200)],
        EnvelopeSet::default(),
    );
    let schedule = build_schedule(&chord, channel(), None, SchedulerConfig::default());

    let on_at_zero: Vec<_> = schedule
        .messages_at(0)
        .unwrap()
        .iter()
        .filter(|message| matches!(message, ChannelMessage::NoteOn { .. }))
        .collect();
    assert_eq!(on_at_zero.len(), 2);

    // First chord-off and second chord-on share offset 300; the fixed
    // category order puts the chord-on first.
    let at_300 = schedule.messages_at(300).unwrap();
    let kinds: Vec<u8> = at_300
        .iter()
        .map(|message| match message {
            ChannelMessage::NoteOn { .. } => 1,
            ChannelMessage::NoteOff { .. } => 0,
            _ => 2,
        })
        .collect();
    assert_eq!(kinds, vec![1, 0, 0]);

    assert_eq!(schedule.span_ms(), 500);
}

#[test]
fn chord_off_respects_the_sub_chord_flag() {
    let mut silent_off = sub(&[60], &[80], 500);
    silent_off.has_chord_off = false;
    let chord = plain_chord(vec![silent_off], EnvelopeSet::default());

    let schedule = build_schedule(&chord, channel(), None, SchedulerConfig::default());
    let offs: usize = schedule
        .iter()
        .map(|(_, messages)| {
            messages
                .iter()
                .filter(|message| matches!(message, ChannelMessage::NoteOff { .. }))
                .count()
        })
        .sum();
    assert_eq!(offs, 0);
}

#[test]
fn single_breakpoint_pan_emits_one_control_change_at_zero() {
    let chord = plain_chord(
        vec![sub(&[60], &[80], 1000)],
        EnvelopeSet {
            pan: Some(vec![64]),
            ..Default::default()
        },
    );
    let schedule = build_schedule(&chord, channel(), None, SchedulerConfig::default());

    let pans: Vec<(u32, ChannelMessage)> = schedule
        .iter()
        .flat_map(|(offset, messages)| {
            messages
                .iter()
                .filter(|message| {
                    matches!(
                        message,
                        ChannelMessage::ControlChange { controller: CC_PAN, .. }
                    )
                })
                .map(move |message| (offset, *message))
        })
        .collect();

    assert_eq!(
        pans,
        vec![(
            0,
            ChannelMessage::ControlChange {
                channel: channel(),
                controller: CC_PAN,
                value: 64
            }
        )]
    );
}

#[test]
fn envelopes_coalesce_after_note_events_in_fixed_order() {
    let chord = plain_chord(
        vec![sub(&[60], &[80], 300)],
        EnvelopeSet {
            pitch_wheel: Some(vec![64]),
            pan: Some(vec![32]),
            modulation_wheel: Some(vec![10]),
            expression: Some(vec![100]),
        },
    );
    let schedule = build_schedule(&chord, channel(), None, SchedulerConfig::default());
    let at_zero = schedule.messages_at(0).unwrap();

    // chord-on, then mod wheel, pan, pitch wheel, expression.
    assert!(matches!(at_zero[0], ChannelMessage::NoteOn { .. }));
    assert!(matches!(
        at_zero[1],
        ChannelMessage::ControlChange { controller: 1, value: 10, .. }
    ));
    assert!(matches!(
        at_zero[2],
        ChannelMessage::ControlChange { controller: CC_PAN, value: 32, .. }
    ));
    assert!(matches!(at_zero[3], ChannelMessage::PitchWheel { value: 64, .. }));
    assert!(matches!(
        at_zero[4],
        ChannelMessage::ControlChange { controller: CC_EXPRESSION, value: 100, .. }
    ));
}

#[test]
fn articulation_replaces_expression_interpolation() {
    let chord = plain_chord(
        vec![sub(&[60], &[80], 400)],
        EnvelopeSet {
            expression: Some(vec![90, 90]),
            ..Default::default()
        },
    );
    let schedule = build_schedule(
        &chord,
        channel(),
        Some(Articulation::Accent),
        SchedulerConfig::default(),
    );

    // Accent: 127 at 0, back to the ambient 90 at 400 (cap 600 > chord).
    let expressions: Vec<(u32, u8)> = schedule
        .iter()
        .flat_map(|(offset, messages)| {
            messages.iter().filter_map(move |message| match message {
                ChannelMessage::ControlChange {
                    controller: CC_EXPRESSION,
                    value,
                    ..
                } => Some((offset, *value)),
                _ => None,
            })
        })
        .collect();
    assert_eq!(expressions, vec![(0, 127), (400, 90)]);
}

#[test]
fn schedule_span_equals_chord_duration() {
    let chord = plain_chord(
        vec![sub(&[60], &[80], 250), sub(&[61], &[80], 250)],
        EnvelopeSet {
            expression: Some(vec![0, 127, 0]),
            ..Default::default()
        },
    );
    let schedule = build_schedule(&chord, channel(), None, SchedulerConfig::default());
    assert_eq!(schedule.span_ms(), 500);
}

#[test]
fn rebuilding_from_a_deep_clone_is_byte_identical() {
    let chord = plain_chord(
        vec![sub(&[60, 64, 67], &[80, 90, 100], 300), sub(&[62], &[70], 180)],
        EnvelopeSet {
            pitch_wheel: Some(vec![64, 80, 64]),
            expression: Some(vec![127, 0]),
            ..Default::default()
        },
    );
    let clone = chord.clone();

    let original = build_schedule(&chord, channel(), None, SchedulerConfig::default());
    let rebuilt = build_schedule(&clone, channel(), None, SchedulerConfig::default());

    let original_bytes = serde_json::to_vec(&original).unwrap();
    let rebuilt_bytes = serde_json::to_vec(&rebuilt).unwrap();
    assert_eq!(original_bytes, rebuilt_bytes);
}
