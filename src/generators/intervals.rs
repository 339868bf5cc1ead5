// Interval dataset
// Two-note intervals from every chromatic base note in the middle
// octave, played up, down, or in unison

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{content_track_spec, silence_value, SynthContext};
use crate::dataset::{enumerate_rows, OutputRecord, Row, RowError, RowProcessor};
use crate::midi::instruments::Instrument;
use crate::midi::{melody_smf, progression_smf, save_smf, ChordEvent, MelodyEvent};
use crate::theory::pitch;

/// How the two notes of an interval are sounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlayStyle {
    Up,
    Down,
    Unison,
}

impl PlayStyle {
    pub const ALL: [PlayStyle; 3] = [PlayStyle::Up, PlayStyle::Down, PlayStyle::Unison];

    pub fn index(self) -> u8 {
        match self {
            PlayStyle::Up => 0,
            PlayStyle::Down => 1,
            PlayStyle::Unison => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PlayStyle::Up => "UP",
            PlayStyle::Down => "DOWN",
            PlayStyle::Unison => "UNISON",
        }
    }
}

/// Short interval name by semitone count (1-12).
pub fn interval_name(semitones: u8) -> &'static str {
    match semitones {
        1 => "m2",
        2 => "M2",
        3 => "m3",
        4 => "M3",
        5 => "P4",
        6 => "d5",
        7 => "P5",
        8 => "m6",
        9 => "M6",
        10 => "m7",
        11 => "M7",
        12 => "P8",
        _ => "",
    }
}

fn spelled_number(digit: char) -> &'static str {
    match digit {
        '2' => "second",
        '3' => "third",
        '4' => "fourth",
        '5' => "fifth",
        '6' => "sixth",
        '7' => "seventh",
        '8' => "eighth",
        _ => "",
    }
}

fn ordinal_name(digit: char) -> String {
    match digit {
        '2' => "2nd".to_string(),
        '3' => "3rd".to_string(),
        other => format!("{other}th"),
    }
}

/// Base notes: the octave from middle C upward.
pub fn base_midi_notes() -> Vec<u8> {
    (60..=71).collect()
}

/// Interval widths from minor second through perfect octave.
pub fn interval_values() -> Vec<u8> {
    (1..=12).collect()
}

/// The (base note, interval) axis, base notes slowest.
pub fn all_interval_settings() -> Vec<(u8, u8)> {
    let mut settings = Vec::new();
    for base in base_midi_notes() {
        for interval in interval_values() {
            settings.push((base, interval));
        }
    }
    settings
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntervalParams {
    pub base_midi_note: u8,
    pub semitones: u8,
    pub note_name: &'static str,
    pub play_style: PlayStyle,
    pub instrument: Instrument,
}

/// Content rows: (base, interval) x play style x instrument.
pub fn rows(
    settings: Vec<(u8, u8)>,
    instruments: Vec<Instrument>,
) -> impl Iterator<Item = Row<IntervalParams>> {
    let expanded = settings.into_iter().flat_map(move |(base, semitones)| {
        let note_name = pitch::note_name(base % 12);
        let instruments = instruments.clone();
        PlayStyle::ALL.into_iter().flat_map(move |play_style| {
            instruments
                .clone()
                .into_iter()
                .map(move |instrument| IntervalParams {
                    base_midi_note: base,
                    semitones,
                    note_name,
                    play_style,
                    instrument,
                })
        })
    });
    enumerate_rows(expanded, |_| 1)
}

fn file_stem(params: &IntervalParams) -> String {
    format!(
        "{}_{}_{}_{}_{}",
        params.note_name,
        params.semitones,
        params.play_style.name(),
        params.instrument.program,
        params.instrument.cleaned_name()
    )
}

/// Renders one interval per row.
pub struct IntervalAudioProcessor<'a> {
    pub synth: SynthContext<'a>,
}

impl RowProcessor for IntervalAudioProcessor<'_> {
    type Params = IntervalParams;

    fn process(
        &self,
        dataset_dir: &Path,
        row: &Row<IntervalParams>,
    ) -> Result<Vec<OutputRecord>, RowError> {
        let params = &row.params;
        let stem = file_stem(params);
        let midi_path = dataset_dir.join(format!("{stem}.mid"));
        let wav_path = dataset_dir.join(format!("{stem}.wav"));

        let spec = content_track_spec(params.note_name, &params.instrument);
        let low = params.base_midi_note;
        let high = params.base_midi_note + params.semitones;
        let smf = match params.play_style {
            PlayStyle::Up => melody_smf(&alternating_events(low, high), &spec),
            PlayStyle::Down => melody_smf(&alternating_events(high, low), &spec),
            PlayStyle::Unison => progression_smf(&unison_events(low, high), &spec),
        };
        save_smf(&smf, &midi_path)?;
        self.synth.renderer.render(&midi_path, &wav_path)?;
        let is_silent = self.synth.check_silence(&wav_path);

        let mut record = OutputRecord::new(row.index);
        record.set("root_note_name", params.note_name);
        record.set("root_note_pitch_class", params.base_midi_note % 12);
        record.set("interval", params.semitones);
        record.set("play_style", params.play_style.index());
        record.set("play_style_name", params.play_style.name());
        record.set("midi_note_val", params.base_midi_note);
        record.set("midi_program_num", params.instrument.program);
        record.set("midi_program_name", params.instrument.name);
        record.set("midi_category", params.instrument.category);
        record.set("midi_file_path", format!("{stem}.mid"));
        record.set("synth_file_path", format!("{stem}.wav"));
        record.set("synth_soundfont", self.synth.soundfont_name());
        record.set("is_silent", silence_value(is_silent));
        Ok(vec![record])
    }
}

/// Four repetitions of first-then-second, one beat per note.
fn alternating_events(first: u8, second: u8) -> Vec<MelodyEvent> {
    let mut events = Vec::new();
    let mut beat = 0.0;
    for _ in 0..4 {
        events.push(MelodyEvent {
            start_beat: beat,
            end_beat: beat + 1.0,
            note: first,
        });
        events.push(MelodyEvent {
            start_beat: beat + 1.0,
            end_beat: beat + 2.0,
            note: second,
        });
        beat += 2.0;
    }
    events
}

/// Eight one-beat strikes of both notes together.
fn unison_events(low: u8, high: u8) -> Vec<ChordEvent> {
    (0..8)
        .map(|beat| ChordEvent {
            start_beat: beat as f64,
            end_beat: (beat + 1) as f64,
            notes: vec![low, high],
        })
        .collect()
}

/// Prompt variants for one (base note, interval) setting.
pub fn interval_prompts(note_name: &str, semitones: u8) -> Vec<String> {
    let name = interval_name(semitones);
    let digit = name.chars().nth(1).unwrap_or('0');
    let nth = ordinal_name(digit);
    let spelled = spelled_number(digit);

    let mut prompts = vec![
        format!("Generate the interval {name} starting at {note_name}"),
        format!("{name} starting at {note_name}"),
        format!("{note_name} going up a {name}"),
        format!("{note_name} going down a {name}"),
    ];

    match name.chars().next() {
        Some('m') => {
            prompts.push(format!("A minor {nth} starting at {note_name}"));
            prompts.push(format!(
                "Minor interval of a {spelled} starting at {note_name}"
            ));
            prompts.push(format!("min{digit} interval from {note_name}"));
        }
        Some('M') => {
            prompts.push(format!("A major {nth} starting at {note_name}"));
            prompts.push(format!(
                "Major interval of a {spelled} starting at {note_name}"
            ));
            prompts.push(format!("maj{digit} interval from {note_name}"));
        }
        Some('d') => {
            prompts.push(format!("An augmented 4th starting at {note_name}"));
            prompts.push(format!("A diminished 5th starting at {note_name}"));
            prompts.push(format!(
                "Diminished interval of a {spelled} starting at {note_name}"
            ));
            prompts.push(format!("dim{digit} interval from {note_name}"));
        }
        Some('P') => {
            prompts.push(format!("A perfect {nth} starting at {note_name}"));
            prompts.push(format!(
                "Perfect interval of a {spelled} starting at {note_name}"
            ));
            prompts.push(format!("aug{digit} interval from {note_name}"));
        }
        _ => {}
    }
    if digit == '8' {
        prompts.push(format!("A perfect octave starting at {note_name}"));
    }

    // Target-note phrasings through the enharmonic resolver. Sharp bases
    // skip the directions whose targets have no comfortable spelling,
    // and A#/D# switch to their flat names when the target is natural.
    let Ok((up_note, down_note)) = pitch::interval_note_names(note_name, semitones) else {
        return prompts;
    };
    let is_sharp = pitch::is_accidental(note_name);

    if note_name != "A#" && note_name != "D#" {
        if !(semitones == 11 && is_sharp) {
            prompts.push(format!(
                "The interval given by the notes {note_name} going up to a {up_note}"
            ));
            prompts.push(format!(
                "Start at note {note_name} and go up to a {up_note}"
            ));
        }
        if !(semitones == 1 && is_sharp) {
            prompts.push(format!(
                "The interval given by the notes {note_name} going down to a {down_note}"
            ));
            prompts.push(format!(
                "Start at note {note_name} and go down to a {down_note}"
            ));
        }
    } else {
        let flat_name = pitch::enharmonic_of(note_name).unwrap_or(note_name);
        let down_label = if !down_note.ends_with('#') && semitones != 1 {
            flat_name
        } else {
            note_name
        };
        prompts.push(format!(
            "The interval given by the notes {down_label} going down to a {down_note}"
        ));
        prompts.push(format!(
            "Start at note {down_label} and go down to a {down_note}"
        ));
        let up_label = if !up_note.ends_with('#') && semitones != 11 {
            flat_name
        } else {
            note_name
        };
        prompts.push(format!(
            "The interval given by the notes {up_label} going up to a {up_note}"
        ));
        prompts.push(format!(
            "Start at note {up_label} and go up to a {up_note}"
        ));
    }

    prompts
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntervalPromptParams {
    pub base_midi_note: u8,
    pub semitones: u8,
    pub note_name: &'static str,
    pub prompts: Vec<String>,
}

/// Prompt rows: one per (base, interval), fanning out per variant.
pub fn prompt_rows(settings: Vec<(u8, u8)>) -> impl Iterator<Item = Row<IntervalPromptParams>> {
    let expanded = settings.into_iter().map(|(base, semitones)| {
        let note_name = pitch::note_name(base % 12);
        IntervalPromptParams {
            base_midi_note: base,
            semitones,
            note_name,
            prompts: interval_prompts(note_name, semitones),
        }
    });
    enumerate_rows(expanded, |params| params.prompts.len() as u64)
}

pub struct IntervalPromptProcessor;

impl RowProcessor for IntervalPromptProcessor {
    type Params = IntervalPromptParams;

    fn process(
        &self,
        _dataset_dir: &Path,
        row: &Row<IntervalPromptParams>,
    ) -> Result<Vec<OutputRecord>, RowError> {
        let params = &row.params;
        let mut records = Vec::with_capacity(params.prompts.len());
        for (offset, prompt) in params.prompts.iter().enumerate() {
            let mut record = OutputRecord::new(row.index + offset as u64);
            record.set("root_note_name", params.note_name);
            record.set("root_note_pitch_class", params.base_midi_note % 12);
            record.set("interval", params.semitones);
            record.set("midi_note_val", params.base_midi_note);
            record.set("prompt", prompt.as_str());
            records.push(record);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::instruments::{instruments, InstrumentFilter};

    #[test]
    fn test_axis_sizes() {
        assert_eq!(base_midi_notes().len(), 12);
        assert_eq!(interval_values().len(), 12);
        assert_eq!(all_interval_settings().len(), 144);
    }

    #[test]
    fn test_row_count_includes_play_styles() {
        let tonal = instruments(&InstrumentFilter::default());
        let count = rows(all_interval_settings(), tonal.clone()).count();
        assert_eq!(count, 144 * 3 * tonal.len());
    }

    #[test]
    fn test_interval_names() {
        assert_eq!(interval_name(1), "m2");
        assert_eq!(interval_name(6), "d5");
        assert_eq!(interval_name(12), "P8");
    }

    #[test]
    fn test_alternating_timeline_shape() {
        let events = alternating_events(60, 67);
        assert_eq!(events.len(), 8);
        assert_eq!(events[0].note, 60);
        assert_eq!(events[1].note, 67);
        assert_eq!(events[7].end_beat, 8.0);
    }

    #[test]
    fn test_unison_timeline_sounds_both_notes() {
        let events = unison_events(60, 72);
        assert_eq!(events.len(), 8);
        assert!(events.iter().all(|e| e.notes == vec![60, 72]));
    }

    #[test]
    fn test_prompts_spell_targets_through_the_resolver() {
        let prompts = interval_prompts("C", 1);
        assert!(prompts.iter().any(|p| p.contains("go up to a Db")));
        assert!(!prompts.iter().any(|p| p.contains("go up to a C#")));
    }

    #[test]
    fn test_perfect_fourth_prompt_family() {
        let prompts = interval_prompts("C", 5);
        assert!(prompts.iter().any(|p| p == "A perfect 4th starting at C"));
        assert!(prompts
            .iter()
            .any(|p| p == "Perfect interval of a fourth starting at C"));
    }

    #[test]
    fn test_sharp_bases_skip_awkward_directions() {
        // C# up a major 7th would land on B#; the up phrasings are kept
        // but a minor 2nd down from C# is skipped.
        let prompts = interval_prompts("C#", 1);
        assert!(!prompts.iter().any(|p| p.contains("going down to a")));

        let prompts = interval_prompts("C#", 11);
        assert!(!prompts.iter().any(|p| p.contains("going up to a")));
    }

    #[test]
    fn test_a_sharp_prefers_flat_labels_for_natural_targets() {
        // A# down a major 2nd reaches G#, a sharp target: keep A#.
        let down_sharp = interval_prompts("A#", 2);
        assert!(down_sharp
            .iter()
            .any(|p| p.contains("notes A# going down to a G#")));

        // A# down a minor 3rd reaches G, a natural target: flip to Bb.
        let down_natural = interval_prompts("A#", 3);
        assert!(down_natural
            .iter()
            .any(|p| p.contains("notes Bb going down to a G")));
    }

    #[test]
    fn test_prompt_fan_out_matches_emitted_records() {
        for row in prompt_rows(all_interval_settings()).take(30) {
            let records = IntervalPromptProcessor
                .process(Path::new("unused"), &row)
                .unwrap();
            assert_eq!(records.len() as u64, row.fan_out);
        }
    }
}
