// Single-note dataset
// Every MIDI note from C0 through B8 on every tonal instrument, plus
// natural-language prompt variants for each note name and octave

use std::path::Path;

use serde::Serialize;

use super::{content_track_spec, silence_value, SynthContext};
use crate::dataset::{enumerate_rows, OutputRecord, Row, RowError, RowProcessor};
use crate::midi::instruments::Instrument;
use crate::midi::{melody_smf, save_smf, MelodyEvent};
use crate::theory::pitch;

/// The soundfont has no audio above C9, and the final octave would not
/// carry a full set of pitch classes anyway, so the range stops at B8.
pub fn all_midi_notes() -> Vec<u8> {
    (0..108).collect()
}

/// Octave boundaries of the low, mid, and high registers.
const REGISTER_BOUNDARIES: [u8; 3] = [3, 6, 9];

/// Register index (0-2) of a MIDI note: three octaves per register.
pub fn register(midi_note: u8) -> u8 {
    let octave = midi_note / 12;
    REGISTER_BOUNDARIES
        .iter()
        .filter(|boundary| octave >= **boundary)
        .count() as u8
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteParams {
    pub midi_note: u8,
    pub note_name: &'static str,
    pub register: u8,
    pub instrument: Instrument,
}

/// Content rows: note values crossed with instruments, notes slowest.
pub fn rows(
    midi_notes: Vec<u8>,
    instruments: Vec<Instrument>,
) -> impl Iterator<Item = Row<NoteParams>> {
    let settings = midi_notes.into_iter().flat_map(move |midi_note| {
        let note_name = pitch::note_name(midi_note % 12);
        let register = register(midi_note);
        instruments
            .clone()
            .into_iter()
            .map(move |instrument| NoteParams {
                midi_note,
                note_name,
                register,
                instrument,
            })
    });
    enumerate_rows(settings, |_| 1)
}

fn file_stem(params: &NoteParams) -> String {
    format!(
        "{}_{}_{}_{}_{}",
        params.midi_note,
        params.register,
        params.note_name,
        params.instrument.program,
        params.instrument.cleaned_name()
    )
}

/// Beat timeline for one sustained note played four times.
fn note_events(midi_note: u8) -> Vec<MelodyEvent> {
    let play_duration_beats = 2.0;
    (0..4)
        .map(|play| MelodyEvent {
            start_beat: play as f64 * play_duration_beats,
            end_beat: (play + 1) as f64 * play_duration_beats,
            note: midi_note,
        })
        .collect()
}

/// Renders one note per row and records paths plus the quality flag.
pub struct NoteAudioProcessor<'a> {
    pub synth: SynthContext<'a>,
}

impl RowProcessor for NoteAudioProcessor<'_> {
    type Params = NoteParams;

    fn process(
        &self,
        dataset_dir: &Path,
        row: &Row<NoteParams>,
    ) -> Result<Vec<OutputRecord>, RowError> {
        let params = &row.params;
        let stem = file_stem(params);
        let midi_path = dataset_dir.join(format!("{stem}.mid"));
        let wav_path = dataset_dir.join(format!("{stem}.wav"));

        let spec = content_track_spec(params.note_name, &params.instrument);
        let smf = melody_smf(&note_events(params.midi_note), &spec);
        save_smf(&smf, &midi_path)?;
        self.synth.renderer.render(&midi_path, &wav_path)?;
        let is_silent = self.synth.check_silence(&wav_path);

        let mut record = OutputRecord::new(row.index);
        record.set("root_note_name", params.note_name);
        record.set("root_note_pitch_class", params.midi_note % 12);
        record.set("octave", params.midi_note / 12);
        record.set(
            "root_note_is_accidental",
            pitch::is_accidental(params.note_name),
        );
        record.set("register", params.register);
        record.set("midi_note_val", params.midi_note);
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

/// The phrasings every note prompt cycles through.
const PROMPT_TEMPLATES: [&str; 20] = [
    "{note}{octave}",
    "Generate the note {note}{octave}",
    "Play the note {note} at octave {octave}",
    "Produce the note {note}{octave}",
    "{note}{octave} note",
    "The note {note} with octave {octave}",
    "Note of {note}{octave}",
    "Produce the tone {note}{octave}",
    "Generate a sound at the pitch {note} at the octave of {octave}",
    "Produce the musical note {note}{octave}",
    "Create the frequency of the note {note} at octave {octave}",
    "Generate the pitch corresponding to {note}{octave}",
    "Create the pitch {note}{octave}",
    "Generate the note represented by {note}{octave}",
    "Sing the note {note} at the octave {octave}",
    "Perform {note}{octave} as a note",
    "Generate the auditory frequency of {note}{octave}",
    "Perform a clear {note} with octave {octave}",
    "Sustain the note {note}{octave}",
    "Play a {note}{octave} on the piano",
];

fn render_templates(note_label: &str, octave_label: &str) -> Vec<String> {
    PROMPT_TEMPLATES
        .iter()
        .map(|template| {
            template
                .replace("{note}", note_label)
                .replace("{octave}", octave_label)
        })
        .collect()
}

/// The letter a sharp note's flat spelling is written on: the next
/// letter, wrapping G back to A.
pub(crate) fn flat_letter(sharp_letter: char) -> char {
    const LETTERS: [char; 7] = ['A', 'B', 'C', 'D', 'E', 'F', 'G'];
    let position = LETTERS.iter().position(|l| *l == sharp_letter).unwrap_or(0);
    LETTERS[(position + 1) % 7]
}

/// All prompt variants for a note: the templates on the canonical name,
/// then spelled-out sharp/flat or natural paraphrases. The paraphrase
/// variants space-pad the octave so "{note}{octave}" templates stay
/// readable ("C sharp 4", not "C sharp4").
pub fn note_prompts(note_name: &str, octave: u8) -> Vec<String> {
    let mut prompts = render_templates(note_name, &octave.to_string());
    let padded_octave = format!(" {octave}");

    if let Some(letter) = note_name.strip_suffix('#') {
        let letter_char = letter.chars().next().unwrap_or('C');
        prompts.extend(render_templates(&format!("{letter} sharp"), &padded_octave));
        prompts.extend(render_templates(&format!("{letter}-sharp"), &padded_octave));
        let flat = flat_letter(letter_char);
        prompts.extend(render_templates(&format!("{flat} flat"), &padded_octave));
        prompts.extend(render_templates(&format!("{flat}-flat"), &padded_octave));
    } else {
        prompts.extend(render_templates(
            &format!("{note_name} natural"),
            &padded_octave,
        ));
        prompts.extend(render_templates(
            &format!("{note_name}-natural"),
            &padded_octave,
        ));
    }
    prompts
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotePromptParams {
    pub midi_note: u8,
    pub note_name: &'static str,
    pub register: u8,
    pub prompts: Vec<String>,
}

/// Prompt rows: one row per note value, fanning out to one record per
/// prompt variant.
pub fn prompt_rows(midi_notes: Vec<u8>) -> impl Iterator<Item = Row<NotePromptParams>> {
    let settings = midi_notes.into_iter().map(|midi_note| {
        let note_name = pitch::note_name(midi_note % 12);
        NotePromptParams {
            midi_note,
            note_name,
            register: register(midi_note),
            prompts: note_prompts(note_name, midi_note / 12),
        }
    });
    enumerate_rows(settings, |params| params.prompts.len() as u64)
}

/// Emits one record per prompt, consuming the row's reserved block.
pub struct NotePromptProcessor;

impl RowProcessor for NotePromptProcessor {
    type Params = NotePromptParams;

    fn process(
        &self,
        _dataset_dir: &Path,
        row: &Row<NotePromptParams>,
    ) -> Result<Vec<OutputRecord>, RowError> {
        let params = &row.params;
        let mut records = Vec::with_capacity(params.prompts.len());
        for (offset, prompt) in params.prompts.iter().enumerate() {
            let mut record = OutputRecord::new(row.index + offset as u64);
            record.set("root_note_name", params.note_name);
            record.set("root_note_pitch_class", params.midi_note % 12);
            record.set("octave", params.midi_note / 12);
            record.set(
                "root_note_is_accidental",
                pitch::is_accidental(params.note_name),
            );
            record.set("register", params.register);
            record.set("midi_note_val", params.midi_note);
            record.set("prompt", prompt.as_str());
            records.push(record);
        }
        Ok(records)
    }
}
