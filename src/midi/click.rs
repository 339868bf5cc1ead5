// Metronome click tracks
// Accented click patterns for the time-signature dataset

use midly::{MidiMessage, Smf, TrackEventKind};
use serde::Serialize;

use super::{
    beat_to_tick, finish_track, note_off, note_on, smf_with_track, track_preamble, TimeSignature,
    TrackSpec,
};

/// Sound of a click track: which instrument plays it and how strong and
/// weak clicks differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClickConfig {
    /// Short name used in artifact filenames.
    pub name: &'static str,

    /// General MIDI program number.
    pub program: u8,

    /// Note sounded on accented clicks.
    pub strong_note: u8,

    /// Note sounded on unaccented clicks.
    pub weak_note: u8,

    pub strong_velocity: u8,
    pub weak_velocity: u8,
}

/// The five click sounds the time-signature dataset cycles through.
pub const CLICK_CONFIGS: [ClickConfig; 5] = [
    ClickConfig {
        name: "woodblock",
        program: 115,
        strong_note: 81,
        weak_note: 76,
        strong_velocity: 112,
        weak_velocity: 80,
    },
    ClickConfig {
        name: "agogo",
        program: 113,
        strong_note: 79,
        weak_note: 72,
        strong_velocity: 110,
        weak_velocity: 78,
    },
    ClickConfig {
        name: "taiko",
        program: 116,
        strong_note: 60,
        weak_note: 55,
        strong_velocity: 118,
        weak_velocity: 88,
    },
    ClickConfig {
        name: "synth_drum",
        program: 118,
        strong_note: 69,
        weak_note: 64,
        strong_velocity: 115,
        weak_velocity: 85,
    },
    ClickConfig {
        name: "tinkle_bell",
        program: 112,
        strong_note: 88,
        weak_note: 84,
        strong_velocity: 105,
        weak_velocity: 75,
    },
];

/// Length of each click as a fraction of a beat.
const CLICK_GATE_BEATS: f64 = 0.25;

/// MIDI reverb-depth controller.
const CC_REVERB_DEPTH: u8 = 91;

fn reverb_depth(reverb_level: u8) -> u8 {
    (reverb_level as u16 * 64).min(127) as u8
}

/// Build a click-track SMF: one click per beat unit, accented on the
/// downbeat of each measure. Compound meters additionally accent the
/// start of every three-click group.
pub fn click_track_smf<'a>(
    total_beats: u32,
    time_signature: TimeSignature,
    config: &ClickConfig,
    reverb_level: u8,
    spec: &'a TrackSpec,
) -> Smf<'a> {
    let mut events = track_preamble(spec);
    events.push((
        0,
        TrackEventKind::Midi {
            channel: spec.channel.into(),
            message: MidiMessage::Controller {
                controller: CC_REVERB_DEPTH.into(),
                value: reverb_depth(reverb_level).into(),
            },
        },
    ));

    // Clicks land on the signature's beat unit; the timeline itself is
    // in quarter-note beats, so an eighth-note unit clicks every 0.5.
    let beat_length = 4.0 / time_signature.unit as f64;
    let beats_per_measure = time_signature.beats as u32;
    for beat in 0..total_beats {
        let position = beat % beats_per_measure;
        let accented = if time_signature.is_compound() {
            position % 3 == 0
        } else {
            position == 0
        };
        let (note, velocity) = if accented {
            (config.strong_note, config.strong_velocity)
        } else {
            (config.weak_note, config.weak_velocity)
        };
        let start = beat as f64 * beat_length;
        events.push((beat_to_tick(start), note_on(spec.channel, note, velocity)));
        events.push((
            beat_to_tick(start + CLICK_GATE_BEATS * beat_length),
            note_off(spec.channel, note),
        ));
    }

    smf_with_track(finish_track(events))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(config: &ClickConfig) -> TrackSpec {
        TrackSpec {
            bpm: 120,
            time_signature: TimeSignature::new(4, 4),
            key_root: "C".to_string(),
            track_name: config.name.to_string(),
            program: config.program,
            channel: 0,
        }
    }

    fn count_note_ons_with(smf: &Smf, note: u8) -> usize {
        smf.tracks[0]
            .iter()
            .filter(|event| {
                matches!(
                    event.kind,
                    TrackEventKind::Midi {
                        message: MidiMessage::NoteOn { key, .. },
                        ..
                    } if u8::from(key) == note
                )
            })
            .count()
    }

    #[test]
    fn test_click_configs_are_distinct() {
        for (i, a) in CLICK_CONFIGS.iter().enumerate() {
            for b in &CLICK_CONFIGS[i + 1..] {
                assert_ne!(a.name, b.name);
                assert_ne!(a.program, b.program);
            }
        }
    }

    #[test]
    fn test_simple_meter_accents_downbeats() {
        let config = &CLICK_CONFIGS[0];
        let track_spec = spec(config);
        let smf = click_track_smf(
            8,
            TimeSignature::new(4, 4),
            config,
            0,
            &track_spec,
        );
        // Two measures of 4/4: two strong clicks, six weak.
        assert_eq!(count_note_ons_with(&smf, config.strong_note), 2);
        assert_eq!(count_note_ons_with(&smf, config.weak_note), 6);
    }

    #[test]
    fn test_compound_meter_accents_groups_of_three() {
        let config = &CLICK_CONFIGS[0];
        let track_spec = spec(config);
        let smf = click_track_smf(
            6,
            TimeSignature::new(6, 8),
            config,
            0,
            &track_spec,
        );
        // One measure of 6/8: accents on clicks 0 and 3.
        assert_eq!(count_note_ons_with(&smf, config.strong_note), 2);
        assert_eq!(count_note_ons_with(&smf, config.weak_note), 4);
    }

    #[test]
    fn test_reverb_depth_scales_with_level() {
        assert_eq!(reverb_depth(0), 0);
        assert_eq!(reverb_depth(1), 64);
        assert_eq!(reverb_depth(2), 127);
        assert_eq!(reverb_depth(5), 127);

        let config = &CLICK_CONFIGS[1];
        let track_spec = spec(config);
        let smf = click_track_smf(
            4,
            TimeSignature::new(4, 4),
            config,
            2,
            &track_spec,
        );
        let has_reverb = smf.tracks[0].iter().any(|event| {
            matches!(
                event.kind,
                TrackEventKind::Midi {
                    message: MidiMessage::Controller { controller, value },
                    ..
                } if u8::from(controller) == CC_REVERB_DEPTH && u8::from(value) == 127
            )
        });
        assert!(has_reverb);
    }
}
