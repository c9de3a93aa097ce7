use crate::schedule::{EnvelopeRank, MessageCategory, Schedule, ScheduleBuilder};
use fioritura_domain_chord::{
    interpolate, Articulation, ChordDef, TimedMessage, DEFAULT_GRANULARITY_MS,
};
use fioritura_ports::{
    Channel, ChannelMessage, ControllerKind, CC_BANK_SELECT, CC_DATA_ENTRY, CC_RPN_LSB, CC_RPN_MSB,
};

#[derive(Clone, Copy, Debug)]
pub struct SchedulerConfig {
    /// Envelope sampling period.
    pub granularity_ms: u32,
    /// Expression state articulations start from when the chord carries no
    /// expression envelope of its own.
    pub ambient_expression: u8,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            granularity_ms: DEFAULT_GRANULARITY_MS,
            ambient_expression: ControllerKind::Expression.default_value(),
        }
    }
}

/// Builds the message table for one performance of a chord: setup at
/// offset 0, note-on/off per sub-chord, envelopes merged over the whole
/// duration, same-offset messages coalesced in fixed category order.
pub fn build_schedule(
    chord: &ChordDef,
    channel: Channel,
    articulation: Option<Articulation>,
    config: SchedulerConfig,
) -> Schedule {
    let mut builder = ScheduleBuilder::new();

    push_setup(&mut builder, chord, channel);
    push_sub_chords(&mut builder, chord, channel);
    push_envelopes(&mut builder, chord, channel, articulation, config);

    builder.finish()
}

fn push_setup(builder: &mut ScheduleBuilder, chord: &ChordDef, channel: Channel) {
    let controls = &chord.controls;
    if let Some(bank) = controls.bank {
        builder.push(
            0,
            MessageCategory::Setup,
            ChannelMessage::ControlChange {
                channel,
                controller: CC_BANK_SELECT,
                value: bank,
            },
        );
    }
    if let Some(patch) = controls.patch {
        builder.push(
            0,
            MessageCategory::Setup,
            ChannelMessage::ProgramChange {
                channel,
                program: patch,
            },
        );
    }
    if let Some(deviation) = controls.pitch_wheel_deviation {
        // RPN 0,0 (pitch bend sensitivity) then the semitone count.
        for (controller, value) in [
            (CC_RPN_MSB, 0),
            (CC_RPN_LSB, 0),
            (CC_DATA_ENTRY, deviation),
        ] {
            builder.push(
                0,
                MessageCategory::Setup,
                ChannelMessage::ControlChange {
                    channel,
                    controller,
                    value,
                },
            );
        }
    }
}

fn push_sub_chords(builder: &mut ScheduleBuilder, chord: &ChordDef, channel: Channel) {
    let mut offset: u32 = 0;
    for sub in &chord.sub_chords {
        if let Some(bank) = sub.bank {
            builder.push(
                offset,
                MessageCategory::SubChordOverride,
                ChannelMessage::ControlChange {
                    channel,
                    controller: CC_BANK_SELECT,
                    value: bank,
                },
            );
        }
        if let Some(patch) = sub.patch {
            builder.push(
                offset,
                MessageCategory::SubChordOverride,
                ChannelMessage::ProgramChange {
                    channel,
                    program: patch,
                },
            );
        }

        for (&pitch, &velocity) in sub.pitches.iter().zip(&sub.velocities) {
            builder.push(
                offset,
                MessageCategory::ChordOn,
                ChannelMessage::NoteOn {
                    channel,
                    note: pitch,
                    velocity,
                },
            );
        }
        if sub.has_chord_off {
            for &pitch in &sub.pitches {
                builder.push(
                    offset + sub.ms_duration,
                    MessageCategory::ChordOff,
                    ChannelMessage::NoteOff {
                        channel,
                        note: pitch,
                        velocity: 64,
                    },
                );
            }
        }
        offset += sub.ms_duration;
    }
}

fn push_envelopes(
    builder: &mut ScheduleBuilder,
    chord: &ChordDef,
    channel: Channel,
    articulation: Option<Articulation>,
    config: SchedulerConfig,
) {
    let envelopes = &chord.envelopes;
    let lanes: [(ControllerKind, Option<&Vec<u8>>); 3] = [
        (ControllerKind::ModulationWheel, envelopes.modulation_wheel.as_ref()),
        (ControllerKind::Pan, envelopes.pan.as_ref()),
        (ControllerKind::PitchWheel, envelopes.pitch_wheel.as_ref()),
    ];
    for (kind, breakpoints) in lanes {
        if let Some(breakpoints) = breakpoints {
            let timed = interpolate(
                kind,
                breakpoints,
                channel,
                chord.ms_duration,
                config.granularity_ms,
            );
            merge_timed(builder, kind, &timed);
        }
    }

    // Expression: an articulation's pre-built sequence takes precedence
    // over breakpoint interpolation.
    if let Some(articulation) = articulation {
        let current = envelopes
            .expression
            .as_ref()
            .and_then(|breakpoints| breakpoints.first().copied())
            .unwrap_or(config.ambient_expression);
        let timed = articulation.render(current, chord.ms_duration, channel);
        merge_timed(builder, ControllerKind::Expression, &timed);
    } else if let Some(breakpoints) = envelopes.expression.as_ref() {
        let timed = interpolate(
            ControllerKind::Expression,
            breakpoints,
            channel,
            chord.ms_duration,
            config.granularity_ms,
        );
        merge_timed(builder, ControllerKind::Expression, &timed);
    }
}

fn merge_timed(builder: &mut ScheduleBuilder, kind: ControllerKind, timed: &[TimedMessage]) {
    let mut offset: u32 = 0;
    for entry in timed {
        builder.push(
            offset,
            MessageCategory::Envelope(EnvelopeRank::from(kind)),
            entry.message,
        );
        offset += entry.ms_until_next;
    }
}
