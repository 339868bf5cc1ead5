// Dataset generators
// One module per dataset: axis constructors, row enumerations, and the
// content and prompt processors that realize them

pub mod chords;
pub mod intervals;
pub mod notes;
pub mod progressions;
pub mod scales;
pub mod time_signatures;

use serde_json::Value;

use crate::audio::{QualityChecker, Renderer};
use crate::midi::instruments::Instrument;
use crate::midi::{TimeSignature, TrackSpec};

/// Tempo all content is rendered at. It does not affect the labels, only
/// artifact duration.
pub const CONTENT_BPM: u32 = 120;

/// MIDI channel the content processors write on.
pub const CONTENT_CHANNEL: u8 = 2;

/// External collaborators shared by the content processors. Holds
/// references only, so one renderer serves every worker concurrently.
pub struct SynthContext<'a> {
    renderer: &'a dyn Renderer,
    quality_checker: &'a dyn QualityChecker,
    soundfont_name: String,
}

impl<'a> SynthContext<'a> {
    pub fn new(
        renderer: &'a dyn Renderer,
        quality_checker: &'a dyn QualityChecker,
        soundfont_name: impl Into<String>,
    ) -> Self {
        SynthContext {
            renderer,
            quality_checker,
            soundfont_name: soundfont_name.into(),
        }
    }

    pub fn soundfont_name(&self) -> &str {
        &self.soundfont_name
    }

    /// Run the silence check, degrading to an unknown flag on failure.
    /// A broken quality checker must not fail the row.
    fn check_silence(&self, wav_path: &std::path::Path) -> Option<bool> {
        match self.quality_checker.is_silent(wav_path) {
            Ok(is_silent) => Some(is_silent),
            Err(error) => {
                log::warn!(
                    "quality check failed for {}: {error}",
                    wav_path.display()
                );
                None
            }
        }
    }
}

/// Render a tri-state quality flag into a record value.
fn silence_value(is_silent: Option<bool>) -> Value {
    match is_silent {
        Some(flag) => Value::Bool(flag),
        None => Value::Null,
    }
}

/// Track metadata shared by all tonal content.
fn content_track_spec(key_root: &str, instrument: &Instrument) -> TrackSpec {
    TrackSpec {
        bpm: CONTENT_BPM,
        time_signature: TimeSignature::new(4, 4),
        key_root: key_root.to_string(),
        track_name: instrument.name.to_string(),
        program: instrument.program,
        channel: CONTENT_CHANNEL,
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::audio::{PeakAmplitudeChecker, RenderError};
    use crate::dataset::DatasetWriter;
    use crate::midi::instruments::{instruments, InstrumentFilter};

    /// Stands in for the external synthesizer: writes a short sine WAV
    /// wherever the real renderer would.
    struct SineRenderer;

    impl Renderer for SineRenderer {
        fn render(&self, _midi_path: &Path, wav_path: &Path) -> Result<(), RenderError> {
            let spec = hound::WavSpec {
                channels: 1,
                sample_rate: 8_000,
                bits_per_sample: 16,
                sample_format: hound::SampleFormat::Int,
            };
            let mut writer = hound::WavWriter::create(wav_path, spec)
                .map_err(|e| RenderError::Failed {
                    status: "wav".to_string(),
                    stderr: e.to_string(),
                })?;
            for i in 0..4_000 {
                let phase = i as f32 * 440.0 / 8_000.0;
                let value = (phase * std::f32::consts::TAU).sin() * 0.5;
                writer
                    .write_sample((value * i16::MAX as f32) as i16)
                    .map_err(|e| RenderError::Failed {
                        status: "wav".to_string(),
                        stderr: e.to_string(),
                    })?;
            }
            writer.finalize().map_err(|e| RenderError::Failed {
                status: "wav".to_string(),
                stderr: e.to_string(),
            })?;
            Ok(())
        }
    }

    #[test]
    fn test_content_pipeline_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = SineRenderer;
        let checker = PeakAmplitudeChecker::default();
        let processor = super::notes::NoteAudioProcessor {
            synth: SynthContext::new(&renderer, &checker, "TimGM6mb.sf2"),
        };

        // A small slice of the note axis with two instruments.
        let tonal = instruments(&InstrumentFilter::default());
        let writer = DatasetWriter::new("notes", dir.path());
        let summary = writer
            .create_dataset(
                super::notes::rows((60..64).collect(), tonal[..2].to_vec()),
                &processor,
            )
            .unwrap();

        assert_eq!(summary.total_rows, 8);
        assert_eq!(summary.failed_rows, 0);
        assert_eq!(summary.records_written, 8);
        assert_eq!(summary.silent_artifacts, 0);

        // Artifacts and both tables landed in the dataset directory.
        assert!(writer.table_path().exists());
        assert!(writer.failure_table_path().exists());
        let midi_count = std::fs::read_dir(writer.dataset_dir())
            .unwrap()
            .filter(|entry| {
                entry
                    .as_ref()
                    .unwrap()
                    .path()
                    .extension()
                    .is_some_and(|ext| ext == "mid")
            })
            .count();
        assert_eq!(midi_count, 8);
    }

    #[test]
    fn test_prompt_pipeline_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let writer = DatasetWriter::new("time_signatures", dir.path());
        let rows = super::time_signatures::prompt_rows(
            super::time_signatures::all_time_signatures(),
        );
        let summary = writer
            .create_dataset(rows, &super::time_signatures::TimeSignaturePromptProcessor)
            .unwrap();

        assert_eq!(summary.total_rows, 8);
        assert_eq!(summary.failed_rows, 0);
        // Every reserved index is used exactly once.
        let expected: u64 = super::time_signatures::all_time_signatures()
            .into_iter()
            .map(|ts| super::time_signatures::time_signature_prompts(ts).len() as u64)
            .sum();
        assert_eq!(summary.records_written, expected);
    }
}
