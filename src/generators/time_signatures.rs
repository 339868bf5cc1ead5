// Time-signature dataset
// Rendered metronome click tracks trimmed into randomly offset windows,
// plus meter-description prompts

use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::{silence_value, SynthContext, CONTENT_BPM};
use crate::audio::wav::{random_trim, trim};
use crate::dataset::{enumerate_rows, OutputRecord, Row, RowError, RowProcessor};
use crate::midi::click::{click_track_smf, ClickConfig};
use crate::midi::{save_smf, TimeSignature, TrackSpec};

/// The eight meters the dataset covers.
pub fn all_time_signatures() -> Vec<TimeSignature> {
    [(2, 2), (2, 4), (3, 4), (3, 8), (4, 4), (6, 8), (9, 8), (12, 8)]
        .into_iter()
        .map(|(beats, unit)| TimeSignature::new(beats, unit))
        .collect()
}

/// Duration every rendered click track is cut down to before the random
/// windows are taken.
const FULL_TRACK_SECS: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeSignatureParams {
    pub time_signature: TimeSignature,
    pub click: ClickConfig,
    pub reverb_level: u8,
    pub bpm: u32,

    /// Random windows cut per rendered track; the row's fan-out.
    pub num_random_offsets: u32,

    /// Length of each window in seconds.
    pub target_secs: f64,

    /// Base seed for the window offsets.
    pub seed: u64,
}

/// Content rows: signature x reverb level x click config, fanning out to
/// one record per random window.
pub fn rows(
    time_signatures: Vec<TimeSignature>,
    click_configs: Vec<ClickConfig>,
    num_reverb_levels: u8,
    num_random_offsets: u32,
    target_secs: f64,
    seed: u64,
) -> impl Iterator<Item = Row<TimeSignatureParams>> {
    let settings = time_signatures.into_iter().flat_map(move |time_signature| {
        let click_configs = click_configs.clone();
        (0..num_reverb_levels).flat_map(move |reverb_level| {
            click_configs
                .clone()
                .into_iter()
                .map(move |click| TimeSignatureParams {
                    time_signature,
                    click,
                    reverb_level,
                    bpm: CONTENT_BPM,
                    num_random_offsets,
                    target_secs,
                    seed,
                })
        })
    });
    enumerate_rows(settings, |params| params.num_random_offsets as u64)
}

fn file_stem(params: &TimeSignatureParams) -> String {
    format!(
        "{}_{}_bpm_{}_reverb_level_{}",
        params.time_signature.label(),
        params.bpm,
        params.click.name,
        params.reverb_level
    )
}

/// Clicks to render: a little over thirty seconds in the signature's
/// beat unit, leaving room for the random windows to move around in.
fn total_click_beats(params: &TimeSignatureParams) -> u32 {
    params.time_signature.unit as u32 * (params.bpm / 2) / 4
}

/// Renders one click track per row, then cuts `num_random_offsets`
/// seeded windows from it, each its own record in the reserved block.
pub struct TimeSignatureAudioProcessor<'a> {
    pub synth: SynthContext<'a>,
}

impl RowProcessor for TimeSignatureAudioProcessor<'_> {
    type Params = TimeSignatureParams;

    fn process(
        &self,
        dataset_dir: &Path,
        row: &Row<TimeSignatureParams>,
    ) -> Result<Vec<OutputRecord>, RowError> {
        let params = &row.params;
        let stem = file_stem(params);
        let midi_path = dataset_dir.join(format!("{stem}.mid"));
        let wav_path = dataset_dir.join(format!("{stem}.wav"));

        let spec = TrackSpec {
            bpm: params.bpm,
            time_signature: params.time_signature,
            key_root: "C".to_string(),
            track_name: params.click.name.to_string(),
            program: params.click.program,
            channel: 0,
        };
        let smf = click_track_smf(
            total_click_beats(params),
            params.time_signature,
            &params.click,
            params.reverb_level,
            &spec,
        );
        save_smf(&smf, &midi_path)?;
        self.synth.renderer.render(&midi_path, &wav_path)?;

        // Normalize the rendered track length, then window it.
        let full_path = dataset_dir.join(format!("{stem}_full.wav"));
        trim(&wav_path, &full_path, FULL_TRACK_SECS)?;
        std::fs::rename(&full_path, &wav_path)?;

        let mut records = Vec::with_capacity(params.num_random_offsets as usize);
        for i in 0..params.num_random_offsets as u64 {
            let index = row.index + i;
            let offset_path = dataset_dir.join(format!("{stem}_offset_{i}.wav"));
            let mut rng = StdRng::seed_from_u64(params.seed ^ index);
            let offset_secs = random_trim(&wav_path, &offset_path, params.target_secs, &mut rng)?;
            let is_silent = self.synth.check_silence(&offset_path);

            let mut record = OutputRecord::new(index);
            record.set("time_signature", params.time_signature.to_string());
            record.set("time_signature_beats", params.time_signature.beats);
            record.set("time_signature_subdivision", params.time_signature.unit);
            record.set("is_compound", params.time_signature.is_compound());
            record.set("bpm", params.bpm);
            record.set("click_config_name", params.click.name);
            record.set("midi_program_num", params.click.program);
            record.set("midi_file_path", format!("{stem}.mid"));
            record.set("synth_file_path", format!("{stem}.wav"));
            record.set("offset_file_path", format!("{stem}_offset_{i}.wav"));
            record.set("offset_time", offset_secs);
            record.set("synth_soundfont", self.synth.soundfont_name());
            record.set("reverb_level", params.reverb_level);
            record.set("is_silent", silence_value(is_silent));
            records.push(record);
        }
        Ok(records)
    }
}

fn number_word(n: u8) -> &'static str {
    match n {
        2 => "two",
        3 => "three",
        4 => "four",
        6 => "six",
        8 => "eight",
        9 => "nine",
        12 => "twelve",
        _ => "",
    }
}

fn note_length(unit: u8) -> &'static str {
    match unit {
        2 => "half",
        4 => "quarter",
        8 => "eighth",
        _ => "",
    }
}

fn note_length_british(unit: u8) -> &'static str {
    match unit {
        2 => "minim",
        4 => "crotchet",
        8 => "quaver",
        _ => "",
    }
}

/// Prompt variants for one meter.
pub fn time_signature_prompts(time_signature: TimeSignature) -> Vec<String> {
    let beats = time_signature.beats;
    let unit = time_signature.unit;
    let beats_word = number_word(beats);
    let unit_word = number_word(unit);
    let length = note_length(unit);
    let british = note_length_british(unit);

    let mut prompts = vec![
        format!("{beats}/{unit} time"),
        format!("{beats_word}-{unit_word} time"),
        format!("{beats} {length} notes per measure"),
        format!("{beats_word} {british}s per measure"),
        format!("{beats}/{unit} meter"),
        format!("{beats_word} beats per bar (beat = {length})"),
        format!("{beats} beats per bar (beat = {british})"),
        format!("{beats} clicks in each measure ({length} note as unit)"),
        format!("Time signature of {beats}/{unit}"),
        format!("{beats}/{unit} rhythm"),
        format!("Generate a song in {beats}/{unit}"),
        format!("Time with {beats_word} {length} notes per measure"),
        format!("Time with {beats} {british}s per bar"),
        format!("Generate a song with {beats}/{unit} time signature"),
        format!("Generate a song with {beats_word}-{unit_word} meter"),
        format!("{beats} beats per measure ({length} beats)"),
        format!("Time signature given by {beats_word} {length} notes"),
        format!("Time signature divided by {length} notes, {beats} of them per measure"),
        format!("Time signature divided by {beats} {british}s"),
        format!("Music in {beats}/{unit} time"),
    ];

    if beats == 4 && unit == 4 {
        prompts.push("Common time".to_string());
    } else if beats == 2 && unit == 2 {
        prompts.push("Cut time".to_string());
    } else if matches!(beats, 6 | 9 | 12) {
        // Compound meters also read as dotted groups: 6/8 is two dotted
        // quarters per measure.
        let groups = beats / 3;
        let groups_word = number_word(groups);
        let dotted = note_length(unit / 2);
        prompts.push(format!("{groups} dotted {dotted} notes per measure"));
        prompts.push(format!(
            "{groups_word} beats per bar (beat = dotted {dotted})"
        ));
        prompts.push(format!(
            "{groups} clicks in each measure (dotted {dotted} note as unit)"
        ));
        prompts.push(format!(
            "Time with {groups_word} dotted {dotted} notes per measure"
        ));
        prompts.push(format!("{groups} beats per measure (dotted {dotted} beats)"));
        prompts.push(format!(
            "Time signature given by {groups_word} dotted {dotted} notes"
        ));
        prompts.push(format!(
            "Time signature divided by {dotted} notes, {groups} of them per measure"
        ));
    }

    prompts
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignaturePromptParams {
    pub time_signature: TimeSignature,
    pub prompts: Vec<String>,
}

/// Prompt rows: one per meter, fanning out per variant.
pub fn prompt_rows(
    time_signatures: Vec<TimeSignature>,
) -> impl Iterator<Item = Row<TimeSignaturePromptParams>> {
    let settings = time_signatures
        .into_iter()
        .map(|time_signature| TimeSignaturePromptParams {
            time_signature,
            prompts: time_signature_prompts(time_signature),
        });
    enumerate_rows(settings, |params| params.prompts.len() as u64)
}

pub struct TimeSignaturePromptProcessor;

impl RowProcessor for TimeSignaturePromptProcessor {
    type Params = TimeSignaturePromptParams;

    fn process(
        &self,
        _dataset_dir: &Path,
        row: &Row<TimeSignaturePromptParams>,
    ) -> Result<Vec<OutputRecord>, RowError> {
        let params = &row.params;
        let mut records = Vec::with_capacity(params.prompts.len());
        for (offset, prompt) in params.prompts.iter().enumerate() {
            let mut record = OutputRecord::new(row.index + offset as u64);
            record.set("time_signature", params.time_signature.to_string());
            record.set("time_signature_beats", params.time_signature.beats);
            record.set("time_signature_subdivision", params.time_signature.unit);
            record.set("is_compound", params.time_signature.is_compound());
            record.set("prompt", prompt.as_str());
            records.push(record);
        }
        Ok(records)
    }
}
