// Chord dataset
// Every triad quality on every chromatic root, in all three inversions,
// with prompt variants and seeded counterfactual labels

use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use super::{content_track_spec, silence_value, SynthContext};
use crate::dataset::{enumerate_rows, OutputRecord, Row, RowError, RowProcessor};
use crate::midi::instruments::Instrument;
use crate::midi::{progression_smf, save_smf, ChordEvent};
use crate::theory::chord::{triad_with_quality, ChordQuality, Inversion};
use crate::theory::pitch;

/// The (root, quality) axis: 12 roots x 4 qualities, roots slowest.
pub fn all_chords() -> Vec<(u8, ChordQuality)> {
    let mut chords = Vec::new();
    for root in 0..12u8 {
        for quality in ChordQuality::ALL {
            chords.push((root, quality));
        }
    }
    chords
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChordParams {
    pub root_pitch_class: u8,
    pub note_name: &'static str,
    pub quality: ChordQuality,
    pub inversion: Inversion,
    pub instrument: Instrument,
}

/// Content rows: (root, quality) x inversion x instrument.
pub fn rows(
    chords: Vec<(u8, ChordQuality)>,
    instruments: Vec<Instrument>,
) -> impl Iterator<Item = Row<ChordParams>> {
    let settings = chords.into_iter().flat_map(move |(root, quality)| {
        let note_name = pitch::note_name(root);
        let instruments = instruments.clone();
        Inversion::ALL.into_iter().flat_map(move |inversion| {
            instruments
                .clone()
                .into_iter()
                .map(move |instrument| ChordParams {
                    root_pitch_class: root,
                    note_name,
                    quality,
                    inversion,
                    instrument,
                })
        })
    });
    enumerate_rows(settings, |_| 1)
}

fn file_stem(params: &ChordParams) -> String {
    format!(
        "{}_{}_{}_{}_{}",
        params.note_name,
        params.quality.label(),
        params.inversion.figure(),
        params.instrument.program,
        params.instrument.cleaned_name()
    )
}

/// The triad struck four times, two beats per strike.
fn chord_events(params: &ChordParams) -> Vec<ChordEvent> {
    let triad = triad_with_quality(params.root_pitch_class, params.quality, params.inversion);
    let play_duration_beats = 2.0;
    (0..4)
        .map(|play| ChordEvent {
            start_beat: play as f64 * play_duration_beats,
            end_beat: (play + 1) as f64 * play_duration_beats,
            notes: triad.midi_notes.to_vec(),
        })
        .collect()
}

/// Renders one triad per row.
pub struct ChordAudioProcessor<'a> {
    pub synth: SynthContext<'a>,
}

impl RowProcessor for ChordAudioProcessor<'_> {
    type Params = ChordParams;

    fn process(
        &self,
        dataset_dir: &Path,
        row: &Row<ChordParams>,
    ) -> Result<Vec<OutputRecord>, RowError> {
        let params = &row.params;
        let stem = file_stem(params);
        let midi_path = dataset_dir.join(format!("{stem}.mid"));
        let wav_path = dataset_dir.join(format!("{stem}.wav"));

        let spec = content_track_spec(params.note_name, &params.instrument);
        let smf = progression_smf(&chord_events(params), &spec);
        save_smf(&smf, &midi_path)?;
        self.synth.renderer.render(&midi_path, &wav_path)?;
        let is_silent = self.synth.check_silence(&wav_path);

        let mut record = OutputRecord::new(row.index);
        record.set("root_note_name", params.note_name);
        record.set("chord_type", params.quality.label());
        record.set("inversion", params.inversion.figure());
        record.set(
            "root_note_is_accidental",
            pitch::is_accidental(params.note_name),
        );
        record.set("root_note_pitch_class", params.root_pitch_class);
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

/// Inversion suffix used inside prompt sentences: " 6", " 64", or "".
fn inversion_suffix(inversion: Inversion) -> &'static str {
    match inversion {
        Inversion::Root => "",
        Inversion::First => " 6",
        Inversion::Second => " 64",
    }
}

/// The nine phrasing templates applied to every (root, quality) label
/// pair, followed by root-position or inversion-specific sentences.
fn phrasing_prompts(note_label: &str, quality_word: &str, inversion: Inversion) -> Vec<String> {
    let suffix = inversion_suffix(inversion);
    let mut prompts = vec![
        format!("{note_label} {quality_word}{suffix}"),
        format!("Generate a {note_label} {quality_word}{suffix} chord"),
        format!("The chord {note_label} {quality_word}{suffix}"),
        format!("Produce a {quality_word}{suffix} chord with root {note_label}"),
        format!("Output the triad {note_label} {quality_word}{suffix}"),
        format!("Invoke a{suffix} triad that is {quality_word} with {note_label} as the tonic"),
        format!("Build a {quality_word}{suffix} chord anchored on {note_label}"),
        format!("Express a{suffix} {quality_word} chord with {note_label} as the root"),
        format!("Perform a{suffix} chord rooted at {note_label} with quality {quality_word}"),
    ];

    match inversion.ordinal() {
        None => {
            prompts.push(format!("Root position {note_label} {quality_word} chord"));
            prompts.push(format!(
                "Sound a {note_label} {quality_word} triad in root position"
            ));
            prompts.push(format!(
                "The chord {note_label} {quality_word} in root position"
            ));
            prompts.push(format!(
                "Play a {quality_word} chord rooted at {note_label} in root position"
            ));
            prompts.push(format!(
                "Compose a {quality_word} root position chord with {note_label} as the root"
            ));
            prompts.push(format!(
                "A root position {quality_word} triad with bass {note_label}"
            ));
        }
        Some(ordinal) => {
            prompts.push(format!(
                "{note_label} {quality_word} in the{suffix} inversion"
            ));
            prompts.push(format!(
                "{ordinal} inversion {note_label} {quality_word} chord"
            ));
            prompts.push(format!(
                "Sound a {note_label} {quality_word} triad in {ordinal} inversion"
            ));
            prompts.push(format!(
                "The chord {note_label} {quality_word} in {ordinal} inversion"
            ));
            prompts.push(format!(
                "Play a {quality_word} chord rooted at {note_label} in the {ordinal} inversion"
            ));
            prompts.push(format!(
                "Compose a {quality_word} {ordinal} inversion chord with {note_label} as the root"
            ));
        }
    }
    prompts
}

/// Compact figure appended to abbreviated chord symbols: "", "6", "64".
fn figure_suffix(inversion: Inversion) -> &'static str {
    match inversion {
        Inversion::Root => "",
        Inversion::First => "6",
        Inversion::Second => "64",
    }
}

/// Every prompt variant for a chord: the phrasing templates on the
/// dataset label, a spelled-out or abbreviated quality synonym, compact
/// chord symbols, and sharp/flat/natural root paraphrases.
pub fn chord_prompts(note_name: &str, quality: ChordQuality, inversion: Inversion) -> Vec<String> {
    let mut prompts = phrasing_prompts(note_name, quality.label(), inversion);
    let figure = figure_suffix(inversion);

    match quality {
        ChordQuality::Diminished => {
            prompts.extend(phrasing_prompts(note_name, "diminished", inversion));
            prompts.push(format!("{note_name}dim{figure}"));
        }
        ChordQuality::Augmented => {
            prompts.extend(phrasing_prompts(note_name, "augmented", inversion));
            prompts.push(format!("{note_name}aug{figure}"));
        }
        ChordQuality::Major => {
            prompts.extend(phrasing_prompts(note_name, "maj", inversion));
            prompts.push(format!("{note_name}maj{figure}"));
        }
        ChordQuality::Minor => {
            prompts.extend(phrasing_prompts(note_name, "min", inversion));
            prompts.push(format!("{note_name}m{figure}"));
            prompts.push(format!("{note_name}min{}", inversion_suffix(inversion)));
        }
    }

    let synonym = match quality {
        ChordQuality::Diminished => Some("diminished"),
        ChordQuality::Augmented => Some("augmented"),
        _ => None,
    };
    let mut spelled_roots = Vec::new();
    if let Some(letter) = note_name.strip_suffix('#') {
        spelled_roots.push(format!("{letter}-sharp"));
        let flat = super::notes::flat_letter(letter.chars().next().unwrap_or('C'));
        spelled_roots.push(format!("{flat}-flat"));
    } else {
        spelled_roots.push(format!("{note_name}-natural"));
    }
    for root_label in spelled_roots {
        prompts.extend(phrasing_prompts(&root_label, quality.label(), inversion));
        if let Some(word) = synonym {
            prompts.extend(phrasing_prompts(&root_label, word, inversion));
        }
    }

    prompts
}

/// A deliberately wrong (root, quality, inversion) triple drawn with the
/// supplied rng; every component differs from the true labels.
pub fn counterfactual_labels(
    rng: &mut StdRng,
    note_name: &str,
    quality: ChordQuality,
    inversion: Inversion,
) -> (&'static str, ChordQuality, Inversion) {
    let cf_note = loop {
        let candidate = pitch::note_name(rng.random_range(0..12u8));
        if candidate != note_name {
            break candidate;
        }
    };
    let cf_quality = loop {
        let candidate = ChordQuality::ALL[rng.random_range(0..ChordQuality::ALL.len())];
        if candidate != quality {
            break candidate;
        }
    };
    let cf_inversion = loop {
        let candidate = Inversion::ALL[rng.random_range(0..Inversion::ALL.len())];
        if candidate != inversion {
            break candidate;
        }
    };
    (cf_note, cf_quality, cf_inversion)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChordPromptParams {
    pub root_pitch_class: u8,
    pub note_name: &'static str,
    pub quality: ChordQuality,
    pub inversion: Inversion,
    pub prompts: Vec<String>,
}

/// Prompt rows: one per (root, quality, inversion), fanning out per
/// prompt variant.
pub fn prompt_rows(
    chords: Vec<(u8, ChordQuality)>,
) -> impl Iterator<Item = Row<ChordPromptParams>> {
    let settings = chords.into_iter().flat_map(move |(root, quality)| {
        let note_name = pitch::note_name(root);
        Inversion::ALL
            .into_iter()
            .map(move |inversion| ChordPromptParams {
                root_pitch_class: root,
                note_name,
                quality,
                inversion,
                prompts: chord_prompts(note_name, quality, inversion),
            })
    });
    enumerate_rows(settings, |params| params.prompts.len() as u64)
}

/// Emits one record per prompt, each with a counterfactual label triple
/// seeded from the record's own index so reruns are identical.
pub struct ChordPromptProcessor;

impl RowProcessor for ChordPromptProcessor {
    type Params = ChordPromptParams;

    fn process(
        &self,
        _dataset_dir: &Path,
        row: &Row<ChordPromptParams>,
    ) -> Result<Vec<OutputRecord>, RowError> {
        let params = &row.params;
        let mut records = Vec::with_capacity(params.prompts.len());
        for (offset, prompt) in params.prompts.iter().enumerate() {
            let index = row.index + offset as u64;
            let mut rng = StdRng::seed_from_u64(index);
            let (cf_note, cf_quality, cf_inversion) =
                counterfactual_labels(&mut rng, params.note_name, params.quality, params.inversion);

            let mut record = OutputRecord::new(index);
            record.set("root_note_name", params.note_name);
            record.set("chord_type", params.quality.label());
            record.set("inversion", params.inversion.figure());
            record.set("cf_root_note_name", cf_note);
            record.set("cf_chord_type", cf_quality.label());
            record.set("cf_inversion", cf_inversion.figure());
            record.set("root_note_pitch_class", params.root_pitch_class);
            record.set("prompt", prompt.as_str());
            records.push(record);
        }
        Ok(records)
    }
}
