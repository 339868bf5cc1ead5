// MIDI file building with the midly crate
// Converts beat-based event timelines into Standard MIDI Files with
// tempo, time-signature, and key-signature metadata

pub mod click;
pub mod instruments;

use std::fs;
use std::io;
use std::path::Path;

use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
};
use serde::{Deserialize, Serialize};

/// Pulses per quarter note. 480 gives comfortable resolution for the
/// beat-aligned content these datasets generate.
pub const TICKS_PER_BEAT: u16 = 480;

/// A musical time signature: beats per measure over the beat unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSignature {
    pub beats: u8,
    pub unit: u8,
}

impl TimeSignature {
    pub fn new(beats: u8, unit: u8) -> Self {
        TimeSignature { beats, unit }
    }

    /// Compound meters subdivide the beat in threes: 6/8, 9/8, 12/8.
    pub fn is_compound(&self) -> bool {
        self.unit == 8 && matches!(self.beats, 6 | 9 | 12)
    }

    /// Label used in filenames, e.g. "6_8".
    pub fn label(&self) -> String {
        format!("{}_{}", self.beats, self.unit)
    }
}

impl std::fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.beats, self.unit)
    }
}

/// Per-track metadata. None of these change the sound of a rendered
/// melody, but they make the artifact self-describing in a DAW.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackSpec {
    pub bpm: u32,
    pub time_signature: TimeSignature,

    /// Root note name for the key-signature meta event.
    pub key_root: String,

    /// Track name, typically the instrument name.
    pub track_name: String,

    /// General MIDI program number (0-127).
    pub program: u8,

    /// MIDI channel (0-15).
    pub channel: u8,
}

/// One note with beat-based timing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MelodyEvent {
    pub start_beat: f64,
    pub end_beat: f64,
    pub note: u8,
}

/// Several simultaneous notes with beat-based timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordEvent {
    pub start_beat: f64,
    pub end_beat: f64,
    pub notes: Vec<u8>,
}

/// Default velocity for generated content.
const NOTE_VELOCITY: u8 = 96;

/// Count of sharps (positive) or flats (negative) for the key-signature
/// meta event. Sharp spellings without a standard major key signature
/// (D#, G#, A#) fall back to their flat equivalents.
fn key_signature_accidentals(key_root: &str) -> i8 {
    match key_root {
        "C" | "B#" => 0,
        "G" => 1,
        "D" => 2,
        "A" => 3,
        "E" => 4,
        "B" | "Cb" => 5,
        "F#" | "Gb" => 6,
        "C#" | "Db" => -5,
        "F" | "E#" => -1,
        "Bb" | "A#" => -2,
        "Eb" | "D#" => -3,
        "Ab" | "G#" => -4,
        _ => 0,
    }
}

fn beat_to_tick(beat: f64) -> u32 {
    (beat * TICKS_PER_BEAT as f64).round() as u32
}

/// Meta and setup events shared by every generated track.
fn track_preamble<'a>(spec: &'a TrackSpec) -> Vec<(u32, TrackEventKind<'a>)> {
    let microseconds_per_beat = 60_000_000 / spec.bpm;
    vec![
        (
            0,
            TrackEventKind::Meta(MetaMessage::TrackName(spec.track_name.as_bytes())),
        ),
        (
            0,
            TrackEventKind::Meta(MetaMessage::Tempo(microseconds_per_beat.into())),
        ),
        (
            0,
            TrackEventKind::Meta(MetaMessage::TimeSignature(
                spec.time_signature.beats,
                spec.time_signature.unit.trailing_zeros() as u8,
                24,
                8,
            )),
        ),
        (
            0,
            TrackEventKind::Meta(MetaMessage::KeySignature(
                key_signature_accidentals(&spec.key_root),
                false,
            )),
        ),
        (
            0,
            TrackEventKind::Midi {
                channel: spec.channel.into(),
                message: MidiMessage::ProgramChange {
                    program: spec.program.into(),
                },
            },
        ),
    ]
}

/// Convert absolute-tick events into a delta-encoded track. Events at the
/// same tick are ordered note-off first so back-to-back notes are not cut.
fn finish_track<'a>(mut events: Vec<(u32, TrackEventKind<'a>)>) -> Track<'a> {
    events.sort_by_key(|(tick, kind)| {
        let is_on = matches!(
            kind,
            TrackEventKind::Midi {
                message: MidiMessage::NoteOn { .. },
                ..
            }
        );
        (*tick, is_on)
    });

    let mut track = Track::new();
    let mut last_tick = 0u32;
    for (tick, kind) in events {
        let delta = tick.saturating_sub(last_tick);
        track.push(TrackEvent {
            delta: delta.into(),
            kind,
        });
        last_tick = tick;
    }
    track.push(TrackEvent {
        delta: 0.into(),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    track
}

fn note_on(channel: u8, note: u8, velocity: u8) -> TrackEventKind<'static> {
    TrackEventKind::Midi {
        channel: channel.into(),
        message: MidiMessage::NoteOn {
            key: note.into(),
            vel: velocity.into(),
        },
    }
}

fn note_off(channel: u8, note: u8) -> TrackEventKind<'static> {
    TrackEventKind::Midi {
        channel: channel.into(),
        message: MidiMessage::NoteOff {
            key: note.into(),
            vel: 0.into(),
        },
    }
}

fn smf_with_track<'a>(track: Track<'a>) -> Smf<'a> {
    Smf {
        header: Header {
            format: Format::SingleTrack,
            timing: Timing::Metrical(TICKS_PER_BEAT.into()),
        },
        tracks: vec![track],
    }
}

/// Build a single-track SMF playing one note at a time.
pub fn melody_smf<'a>(events: &[MelodyEvent], spec: &'a TrackSpec) -> Smf<'a> {
    let mut track_events = track_preamble(spec);
    for event in events {
        track_events.push((
            beat_to_tick(event.start_beat),
            note_on(spec.channel, event.note, NOTE_VELOCITY),
        ));
        track_events.push((
            beat_to_tick(event.end_beat),
            note_off(spec.channel, event.note),
        ));
    }
    smf_with_track(finish_track(track_events))
}

/// Build a single-track SMF playing chords.
pub fn progression_smf<'a>(events: &[ChordEvent], spec: &'a TrackSpec) -> Smf<'a> {
    let mut track_events = track_preamble(spec);
    for event in events {
        for &note in &event.notes {
            track_events.push((
                beat_to_tick(event.start_beat),
                note_on(spec.channel, note, NOTE_VELOCITY),
            ));
            track_events.push((beat_to_tick(event.end_beat), note_off(spec.channel, note)));
        }
    }
    smf_with_track(finish_track(track_events))
}

/// Serialize an SMF to disk.
pub fn save_smf(smf: &Smf, path: &Path) -> io::Result<()> {
    let mut bytes = Vec::new();
    smf.write(&mut bytes)
        .map_err(|error| io::Error::new(io::ErrorKind::Other, error.to_string()))?;
    fs::write(path, bytes)
}
