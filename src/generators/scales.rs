// Scale dataset
// Every mode on every chromatic tonic, played up and down, with modal
// paraphrases and spelled note-walk prompts

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{content_track_spec, silence_value, SynthContext};
use crate::dataset::{enumerate_rows, OutputRecord, Row, RowError, RowProcessor};
use crate::midi::instruments::Instrument;
use crate::midi::{melody_smf, save_smf, MelodyEvent};
use crate::theory::pitch;
use crate::theory::scale::{build_scale_with_octave, major_scale_names, Mode};

/// MIDI value the tonic sounds at: the middle octave.
const TONIC_MIDI_BASE: u8 = 60;

/// Direction the scale is played in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlayStyle {
    Up,
    Down,
}

impl PlayStyle {
    pub const ALL: [PlayStyle; 2] = [PlayStyle::Up, PlayStyle::Down];

    pub fn index(self) -> u8 {
        match self {
            PlayStyle::Up => 0,
            PlayStyle::Down => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PlayStyle::Up => "UP",
            PlayStyle::Down => "DOWN",
        }
    }
}

/// The (tonic name, mode) axis: 12 sharp-table tonics x 7 modes.
pub fn all_scales() -> Vec<(&'static str, Mode)> {
    let mut scales = Vec::new();
    for pitch_class in 0..12u8 {
        for mode in Mode::ALL {
            scales.push((pitch::note_name(pitch_class), mode));
        }
    }
    scales
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScaleParams {
    pub root_name: &'static str,
    pub mode: Mode,
    pub play_style: PlayStyle,
    pub instrument: Instrument,
}

/// Content rows: (tonic, mode) x play style x instrument.
pub fn rows(
    scales: Vec<(&'static str, Mode)>,
    instruments: Vec<Instrument>,
) -> impl Iterator<Item = Row<ScaleParams>> {
    let settings = scales.into_iter().flat_map(move |(root_name, mode)| {
        let instruments = instruments.clone();
        PlayStyle::ALL.into_iter().flat_map(move |play_style| {
            instruments
                .clone()
                .into_iter()
                .map(move |instrument| ScaleParams {
                    root_name,
                    mode,
                    play_style,
                    instrument,
                })
        })
    });
    enumerate_rows(settings, |_| 1)
}

fn file_stem(params: &ScaleParams) -> String {
    format!(
        "{}_{}_{}_{}_{}",
        params.root_name,
        params.mode,
        params.play_style.name(),
        params.instrument.program,
        params.instrument.cleaned_name()
    )
}

/// One-beat-per-note timeline of the scale with its octave, reversed
/// for the downward style.
fn scale_events(root_name: &str, mode: Mode, play_style: PlayStyle) -> Result<Vec<MelodyEvent>, RowError> {
    let tonic_pc = pitch::pitch_class(root_name).map_err(RowError::Theory)?;
    let mut notes: Vec<u8> = build_scale_with_octave(tonic_pc, mode)
        .into_iter()
        .map(|semitones| TONIC_MIDI_BASE + semitones)
        .collect();
    if play_style == PlayStyle::Down {
        notes.reverse();
    }
    Ok(notes
        .into_iter()
        .enumerate()
        .map(|(i, note)| MelodyEvent {
            start_beat: i as f64,
            end_beat: (i + 1) as f64,
            note,
        })
        .collect())
}

/// Renders one scale pass per row.
pub struct ScaleAudioProcessor<'a> {
    pub synth: SynthContext<'a>,
}

impl RowProcessor for ScaleAudioProcessor<'_> {
    type Params = ScaleParams;

    fn process(
        &self,
        dataset_dir: &Path,
        row: &Row<ScaleParams>,
    ) -> Result<Vec<OutputRecord>, RowError> {
        let params = &row.params;
        let stem = file_stem(params);
        let midi_path = dataset_dir.join(format!("{stem}.mid"));
        let wav_path = dataset_dir.join(format!("{stem}.wav"));

        let spec = content_track_spec(params.root_name, &params.instrument);
        let events = scale_events(params.root_name, params.mode, params.play_style)?;
        let smf = melody_smf(&events, &spec);
        save_smf(&smf, &midi_path)?;
        self.synth.renderer.render(&midi_path, &wav_path)?;
        let is_silent = self.synth.check_silence(&wav_path);

        let mut record = OutputRecord::new(row.index);
        record.set("root_note_name", params.root_name);
        record.set("mode", params.mode.name());
        record.set("play_style", params.play_style.index());
        record.set("play_style_name", params.play_style.name());
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

/// How each mode reads as an altered major scale and as an altered
/// minor scale, in that order.
fn mode_alterations(mode: Mode) -> [&'static str; 2] {
    match mode {
        Mode::Ionian => ["no alterations", "sharp 3, sharp 6, and sharp 7"],
        Mode::Dorian => ["flat 3 and flat 7", "sharp 6"],
        Mode::Phrygian => ["flat 2, flat 3, flat 6, and flat 7", "flat 2"],
        Mode::Lydian => ["sharp 4", "sharp 3, sharp 4, flat 6, and flat 7"],
        Mode::Mixolydian => ["flat 7", "sharp 3 and sharp 6"],
        Mode::Aeolian => ["flat 3, flat 6, and flat 7", "no alterations"],
        Mode::Locrian => ["flat 2, flat 3, flat 5, flat 6, and flat 7", "flat 2 and flat 5"],
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Prompts for one (tonic, mode) pair without enharmonic duplicates:
/// modal phrasings, alteration paraphrases, and, where the parent major
/// scale has a spelled form containing this tonic, note-walk prompts.
fn base_scale_prompts(root_name: &str, mode: Mode) -> Vec<String> {
    let mode_name = mode.name();
    let alterations = mode_alterations(mode);
    let mut prompts = vec![
        format!("{root_name} {mode_name} scale"),
        format!("{} scale starting on {root_name}", capitalize(mode_name)),
        format!("{root_name} major scale with {}", alterations[0]),
        format!("{root_name} minor scale with {}", alterations[1]),
        format!("{} mode on {root_name}", capitalize(mode_name)),
    ];

    // Walk down to the parent major root; the mode's tonic sits at the
    // mode's index within that scale. Tonics whose parent major has no
    // spelled form (through either enharmonic) get no walk prompts.
    let Ok(tonic_pc) = pitch::pitch_class(root_name) else {
        return prompts;
    };
    let parent_pc = (tonic_pc + 12 - mode.relative_major_offset()) % 12;
    let mut parent_name: &str = pitch::note_name(parent_pc);
    if major_scale_names(parent_name).is_none() {
        match pitch::enharmonic_of(parent_name) {
            Some(alternate) => parent_name = alternate,
            None => return prompts,
        }
    }
    let Some(mut degrees) = major_scale_names(parent_name) else {
        return prompts;
    };
    if !degrees.iter().any(|d| *d == root_name) {
        match pitch::enharmonic_of(parent_name).and_then(major_scale_names) {
            Some(alternate_degrees) => {
                parent_name = pitch::enharmonic_of(parent_name).unwrap_or(parent_name);
                degrees = alternate_degrees;
            }
            None => return prompts,
        }
        if !degrees.iter().any(|d| *d == root_name) {
            return prompts;
        }
    }

    let position = degrees.iter().position(|d| *d == root_name).unwrap_or(0);
    prompts.push(format!("{parent_name} scale starting at {root_name}"));

    let mut walk_up = String::from("The scale going up with notes ");
    for step in 0..7 {
        walk_up.push_str(degrees[(position + step) % 7]);
        walk_up.push(' ');
    }
    walk_up.push_str(root_name);
    prompts.push(walk_up);

    let mut walk_down = String::from("The scale going down with notes ");
    for step in (1..=7).rev() {
        walk_down.push_str(degrees[(position + step) % 7]);
        walk_down.push(' ');
    }
    walk_down.push_str(root_name);
    prompts.push(walk_down);

    prompts
}

/// All prompts for a (tonic, mode) pair, duplicated onto the tonic's
/// enharmonic spelling when it has one.
pub fn scale_prompts(root_name: &str, mode: Mode) -> Vec<String> {
    let mut prompts = base_scale_prompts(root_name, mode);
    if let Some(enharmonic) = pitch::enharmonic_of(root_name) {
        prompts.extend(base_scale_prompts(enharmonic, mode));
    }
    prompts
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScalePromptParams {
    pub root_name: &'static str,
    pub mode: Mode,
    pub prompts: Vec<String>,
}

/// Prompt rows: one per (tonic, mode), fanning out per prompt variant.
pub fn prompt_rows(
    scales: Vec<(&'static str, Mode)>,
) -> impl Iterator<Item = Row<ScalePromptParams>> {
    let settings = scales.into_iter().map(|(root_name, mode)| ScalePromptParams {
        root_name,
        mode,
        prompts: scale_prompts(root_name, mode),
    });
    enumerate_rows(settings, |params| params.prompts.len() as u64)
}

pub struct ScalePromptProcessor;

impl RowProcessor for ScalePromptProcessor {
    type Params = ScalePromptParams;

    fn process(
        &self,
        _dataset_dir: &Path,
        row: &Row<ScalePromptParams>,
    ) -> Result<Vec<OutputRecord>, RowError> {
        let params = &row.params;
        let mut records = Vec::with_capacity(params.prompts.len());
        for (offset, prompt) in params.prompts.iter().enumerate() {
            let mut record = OutputRecord::new(row.index + offset as u64);
            record.set("root_note", params.root_name);
            record.set("mode", params.mode.name());
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
    fn test_axis_and_row_counts() {
        assert_eq!(all_scales().len(), 84);
        let tonal = instruments(&InstrumentFilter::default());
        let count = rows(all_scales(), tonal.clone()).count();
        assert_eq!(count, 84 * 2 * tonal.len());
    }

    #[test]
    fn test_up_and_down_timelines_mirror() {
        let up = scale_events("C", Mode::Ionian, PlayStyle::Up).unwrap();
        let down = scale_events("C", Mode::Ionian, PlayStyle::Down).unwrap();
        assert_eq!(up.len(), 8);
        assert_eq!(up[0].note, 60);
        assert_eq!(up[7].note, 72);
        let reversed: Vec<u8> = down.iter().rev().map(|e| e.note).collect();
        let forward: Vec<u8> = up.iter().map(|e| e.note).collect();
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_c_ionian_walk_prompts() {
        let prompts = base_scale_prompts("C", Mode::Ionian);
        assert!(prompts.contains(&"C ionian scale".to_string()));
        assert!(prompts.contains(&"C scale starting at C".to_string()));
        assert!(prompts
            .contains(&"The scale going up with notes C D E F G A B C".to_string()));
        assert!(prompts
            .contains(&"The scale going down with notes C B A G F E D C".to_string()));
    }

    #[test]
    fn test_d_dorian_walks_the_c_major_scale() {
        let prompts = base_scale_prompts("D", Mode::Dorian);
        assert!(prompts.contains(&"C scale starting at D".to_string()));
        assert!(prompts
            .contains(&"The scale going up with notes D E F G A B C D".to_string()));
    }

    #[test]
    fn test_alteration_prompts_follow_the_mode() {
        let prompts = base_scale_prompts("E", Mode::Mixolydian);
        assert!(prompts.contains(&"E major scale with flat 7".to_string()));
        assert!(prompts.contains(&"E minor scale with sharp 3 and sharp 6".to_string()));
    }

    #[test]
    fn test_sharp_tonics_fall_back_to_enharmonic_parents() {
        // D# ionian's parent scale is spelled Eb major, which contains
        // no "D#" degree, so the walk prompts are skipped entirely.
        let prompts = base_scale_prompts("D#", Mode::Ionian);
        assert!(!prompts.iter().any(|p| p.contains("scale starting at")));
        assert_eq!(prompts.len(), 5);

        // D# aeolian walks the F# major scale, which spells D# itself.
        let walked = base_scale_prompts("D#", Mode::Aeolian);
        assert!(walked.contains(&"F# scale starting at D#".to_string()));
    }

    #[test]
    fn test_enharmonic_tonics_duplicate_the_prompts() {
        let plain = base_scale_prompts("A#", Mode::Ionian).len();
        let with_enharmonic = scale_prompts("A#", Mode::Ionian).len();
        let flat_side = base_scale_prompts("Bb", Mode::Ionian).len();
        assert_eq!(with_enharmonic, plain + flat_side);
    }

    #[test]
    fn test_prompt_fan_out_matches_emitted_records() {
        for row in prompt_rows(all_scales()).take(21) {
            let records = ScalePromptProcessor
                .process(Path::new("unused"), &row)
                .unwrap();
            assert_eq!(records.len() as u64, row.fan_out);
        }
    }
}
