// Chord-progression dataset
// Curated four-chord degree progressions in every key, with roman
// numeral and chord-walk prompts

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{content_track_spec, silence_value, SynthContext};
use crate::dataset::{ensure_unique, enumerate_rows, ConfigError, OutputRecord, Row, RowError, RowProcessor};
use crate::midi::instruments::Instrument;
use crate::midi::{progression_smf, save_smf, ChordEvent};
use crate::theory::chord::{roman_numeral, triad_on_degree, Inversion, KeyQuality};
use crate::theory::pitch;
use crate::theory::scale::{build_scale, major_scale_names, relative_major_name, Mode};

/// One progression: a mode and four 1-based scale degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Progression {
    pub mode: Mode,
    pub degrees: [u8; 4],
}

impl Progression {
    pub const fn new(mode: Mode, degrees: [u8; 4]) -> Self {
        Progression { mode, degrees }
    }

    /// Degrees joined with dashes: "1-4-5-1".
    pub fn degree_string(&self) -> String {
        self.degrees
            .iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Table label: "ionian-1-4-5-1".
    pub fn label(&self) -> String {
        format!("{}-{}", self.mode, self.degree_string())
    }

    /// Filename fragment: "ionian_1-4-5-1".
    pub fn file_label(&self) -> String {
        format!("{}_{}", self.mode, self.degree_string())
    }
}

/// The curated progression axis. Declared unique; the enumeration
/// validates that before any row is built.
pub const PROGRESSIONS: [Progression; 19] = [
    Progression::new(Mode::Ionian, [1, 4, 5, 1]),
    Progression::new(Mode::Ionian, [1, 4, 6, 5]),
    Progression::new(Mode::Ionian, [1, 5, 6, 4]),
    Progression::new(Mode::Ionian, [1, 6, 4, 5]),
    Progression::new(Mode::Ionian, [2, 5, 1, 6]),
    Progression::new(Mode::Ionian, [4, 1, 5, 6]),
    Progression::new(Mode::Ionian, [4, 5, 3, 6]),
    Progression::new(Mode::Ionian, [5, 4, 1, 5]),
    Progression::new(Mode::Ionian, [5, 6, 4, 1]),
    Progression::new(Mode::Ionian, [6, 4, 1, 5]),
    Progression::new(Mode::Aeolian, [1, 2, 5, 1]),
    Progression::new(Mode::Aeolian, [1, 3, 4, 1]),
    Progression::new(Mode::Aeolian, [1, 4, 5, 1]),
    Progression::new(Mode::Aeolian, [1, 6, 3, 7]),
    Progression::new(Mode::Aeolian, [1, 6, 7, 1]),
    Progression::new(Mode::Aeolian, [1, 6, 7, 3]),
    Progression::new(Mode::Aeolian, [1, 7, 6, 4]),
    Progression::new(Mode::Aeolian, [4, 7, 1, 1]),
    Progression::new(Mode::Aeolian, [7, 6, 7, 1]),
];

/// The 12 keys as (pitch class, sharp name) pairs.
pub fn all_keys() -> Vec<(u8, &'static str)> {
    (0..12u8).map(|pc| (pc, pitch::note_name(pc))).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressionParams {
    pub key_pitch_class: u8,
    pub key_name: &'static str,
    pub progression: Progression,
    pub instrument: Instrument,
}

/// Content rows: key x progression x instrument. Fails before building
/// anything if the progression axis contains a duplicate.
pub fn rows(
    progressions: Vec<Progression>,
    keys: Vec<(u8, &'static str)>,
    instruments: Vec<Instrument>,
) -> Result<impl Iterator<Item = Row<ProgressionParams>>, ConfigError> {
    ensure_unique(&progressions, "progressions")?;
    let settings = keys.into_iter().flat_map(move |(pc, key_name)| {
        let progressions = progressions.clone();
        let instruments = instruments.clone();
        progressions.into_iter().flat_map(move |progression| {
            instruments
                .clone()
                .into_iter()
                .map(move |instrument| ProgressionParams {
                    key_pitch_class: pc,
                    key_name,
                    progression,
                    instrument,
                })
        })
    });
    Ok(enumerate_rows(settings, |_| 1))
}

fn file_stem(params: &ProgressionParams) -> String {
    format!(
        "{}_{}_{}_{}",
        params.key_name,
        params.progression.file_label(),
        params.instrument.program,
        params.instrument.cleaned_name()
    )
}

/// Each degree's triad struck once for two beats, in sequence.
fn progression_events(params: &ProgressionParams) -> Result<Vec<ChordEvent>, RowError> {
    let scale = build_scale(params.key_pitch_class, params.progression.mode);
    let play_duration_beats = 2.0;
    let mut events = Vec::with_capacity(params.progression.degrees.len());
    for (i, &degree) in params.progression.degrees.iter().enumerate() {
        let (triad, _) = triad_on_degree(
            &scale,
            params.progression.mode,
            degree,
            Inversion::Root,
            &[],
        )?;
        events.push(ChordEvent {
            start_beat: i as f64 * play_duration_beats,
            end_beat: (i + 1) as f64 * play_duration_beats,
            notes: triad.midi_notes.to_vec(),
        });
    }
    Ok(events)
}

/// Renders one progression per row.
pub struct ProgressionAudioProcessor<'a> {
    pub synth: SynthContext<'a>,
}

impl RowProcessor for ProgressionAudioProcessor<'_> {
    type Params = ProgressionParams;

    fn process(
        &self,
        dataset_dir: &Path,
        row: &Row<ProgressionParams>,
    ) -> Result<Vec<OutputRecord>, RowError> {
        let params = &row.params;
        let stem = file_stem(params);
        let midi_path = dataset_dir.join(format!("{stem}.mid"));
        let wav_path = dataset_dir.join(format!("{stem}.wav"));

        let spec = content_track_spec(params.key_name, &params.instrument);
        let smf = progression_smf(&progression_events(params)?, &spec);
        save_smf(&smf, &midi_path)?;
        self.synth.renderer.render(&midi_path, &wav_path)?;
        let is_silent = self.synth.check_silence(&wav_path);

        let mut record = OutputRecord::new(row.index);
        record.set("key_note_name", params.key_name);
        record.set("key_note_pitch_class", params.key_pitch_class);
        record.set("chord_progression", params.progression.label());
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

/// Prompts for one (progression, key) pair without enharmonic
/// duplicates: per-chord root walks where the key has a spelled scale,
/// then degree-string and roman-numeral phrasings.
fn base_progression_prompts(progression: &Progression, key_name: &str) -> Vec<String> {
    let mut prompts = Vec::new();
    let degree_string = progression.degree_string();
    let key = KeyQuality::from_mode(progression.mode);
    let key_quality_word = match key {
        KeyQuality::Major => "major",
        KeyQuality::Minor => "minor",
    };

    let numerals: Vec<&str> = progression
        .degrees
        .iter()
        .filter_map(|&degree| roman_numeral(degree, key).ok())
        .map(|(numeral, _)| numeral)
        .collect();

    // Spelled chord roots come from the key's major scale; minor keys
    // read them out of the relative major.
    let chord_degree_names: Option<Vec<String>> = match key {
        KeyQuality::Major => major_scale_names(key_name).map(|degrees| {
            progression
                .degrees
                .iter()
                .map(|&d| degrees[(d - 1) as usize].to_string())
                .collect()
        }),
        KeyQuality::Minor => relative_major_name(key_name)
            .and_then(major_scale_names)
            .map(|degrees| {
                progression
                    .degrees
                    .iter()
                    .map(|&d| {
                        let position = (d as i32 - 3).rem_euclid(7) as usize;
                        degrees[position].to_string()
                    })
                    .collect()
            }),
    };
    if let Some(roots) = chord_degree_names {
        let labeled: Vec<String> = progression
            .degrees
            .iter()
            .zip(roots.iter())
            .filter_map(|(&degree, root)| {
                roman_numeral(degree, key)
                    .ok()
                    .map(|(_, quality_word)| format!("{root} {quality_word}"))
            })
            .collect();
        let walk = labeled.join("-");
        prompts.push(format!("The chords {walk}"));
        let abbreviated = walk
            .replace(" major", "maj")
            .replace(" minor", "min")
            .replace(" diminished", "dim");
        prompts.push(format!("The chords {abbreviated}"));
    }

    let numeral_string = numerals.join("-");
    prompts.push(format!(
        "Progression {degree_string} in {key_name} {key_quality_word}"
    ));
    prompts.push(format!(
        "Chord progression {degree_string} in {key_name} {}",
        progression.mode
    ));
    prompts.push(format!(
        "Chord progression {numeral_string} in {key_name} {key_quality_word}"
    ));
    prompts.push(format!(
        "Chord progression {numeral_string} in {key_name} {}",
        progression.mode
    ));
    prompts
}

/// All prompts for a (progression, key) pair, duplicated onto the key's
/// enharmonic spelling when it has one.
pub fn progression_prompts(progression: &Progression, key_name: &str) -> Vec<String> {
    let mut prompts = base_progression_prompts(progression, key_name);
    if let Some(enharmonic) = pitch::enharmonic_of(key_name) {
        prompts.extend(base_progression_prompts(progression, enharmonic));
    }
    prompts
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressionPromptParams {
    pub key_pitch_class: u8,
    pub key_name: &'static str,
    pub progression: Progression,
    pub prompts: Vec<String>,
}

/// Prompt rows: one per (key, progression), fanning out per variant.
pub fn prompt_rows(
    progressions: Vec<Progression>,
    keys: Vec<(u8, &'static str)>,
) -> Result<impl Iterator<Item = Row<ProgressionPromptParams>>, ConfigError> {
    ensure_unique(&progressions, "progressions")?;
    let settings = keys.into_iter().flat_map(move |(pc, key_name)| {
        progressions
            .clone()
            .into_iter()
            .map(move |progression| ProgressionPromptParams {
                key_pitch_class: pc,
                key_name,
                progression,
                prompts: progression_prompts(&progression, key_name),
            })
    });
    Ok(enumerate_rows(settings, |params| params.prompts.len() as u64))
}

pub struct ProgressionPromptProcessor;

impl RowProcessor for ProgressionPromptProcessor {
    type Params = ProgressionPromptParams;

    fn process(
        &self,
        _dataset_dir: &Path,
        row: &Row<ProgressionPromptParams>,
    ) -> Result<Vec<OutputRecord>, RowError> {
        let params = &row.params;
        let mut records = Vec::with_capacity(params.prompts.len());
        for (offset, prompt) in params.prompts.iter().enumerate() {
            let mut record = OutputRecord::new(row.index + offset as u64);
            record.set("key_note_name", params.key_name);
            record.set("key_note_pitch_class", params.key_pitch_class);
            record.set("chord_progression", params.progression.label());
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
    fn test_progression_axis_is_unique() {
        assert!(ensure_unique(&PROGRESSIONS, "progressions").is_ok());
    }

    #[test]
    fn test_duplicate_progressions_abort_before_any_row() {
        let mut progressions = PROGRESSIONS.to_vec();
        progressions.push(PROGRESSIONS[0]);
        let result = rows(
            progressions,
            all_keys(),
            instruments(&InstrumentFilter::default()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_row_count() {
        let tonal = instruments(&InstrumentFilter::default());
        let count = rows(PROGRESSIONS.to_vec(), all_keys(), tonal.clone())
            .unwrap()
            .count();
        assert_eq!(count, 12 * 19 * tonal.len());
    }

    #[test]
    fn test_progression_labels() {
        let progression = PROGRESSIONS[0];
        assert_eq!(progression.degree_string(), "1-4-5-1");
        assert_eq!(progression.label(), "ionian-1-4-5-1");
        assert_eq!(progression.file_label(), "ionian_1-4-5-1");
    }

    #[test]
    fn test_progression_events_follow_the_degrees() {
        let params = ProgressionParams {
            key_pitch_class: 0,
            key_name: "C",
            progression: Progression::new(Mode::Ionian, [1, 4, 5, 1]),
            instrument: instruments(&InstrumentFilter::default())[0],
        };
        let events = progression_events(&params).unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0].notes, vec![60, 64, 67]); // C major
        assert_eq!(events[1].notes, vec![65, 69, 72]); // F major
        assert_eq!(events[2].notes, vec![67, 71, 74]); // G major
        assert_eq!(events[3].notes, vec![60, 64, 67]);
    }

    #[test]
    fn test_major_key_prompts_walk_the_scale() {
        let progression = Progression::new(Mode::Ionian, [1, 4, 5, 1]);
        let prompts = base_progression_prompts(&progression, "C");
        assert!(prompts
            .contains(&"The chords C major-F major-G major-C major".to_string()));
        assert!(prompts.contains(&"The chords Cmaj-Fmaj-Gmaj-Cmaj".to_string()));
        assert!(prompts.contains(&"Chord progression I-IV-V-I in C ionian".to_string()));
        assert!(prompts.contains(&"Progression 1-4-5-1 in C major".to_string()));
    }

    #[test]
    fn test_minor_key_prompts_use_the_relative_major() {
        let progression = Progression::new(Mode::Aeolian, [1, 6, 7, 1]);
        let prompts = base_progression_prompts(&progression, "A");
        // A minor reads its roots from C major: degrees 1, 6, 7 are
        // A, F, and G.
        assert!(prompts
            .contains(&"The chords A minor-F major-G major-A minor".to_string()));
        assert!(prompts.contains(&"Chord progression i-VI-VII-i in A minor".to_string()));
    }

    #[test]
    fn test_prompt_fan_out_matches_emitted_records() {
        let rows: Vec<_> = prompt_rows(PROGRESSIONS.to_vec(), all_keys())
            .unwrap()
            .take(19)
            .collect();
        for row in rows {
            let records = ProgressionPromptProcessor
                .process(Path::new("unused"), &row)
                .unwrap();
            assert_eq!(records.len() as u64, row.fan_out);
        }
    }
}
