// FluidSynth renderer
// Realizes MIDI artifacts as WAV files through the fluidsynth CLI

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

use super::Renderer;

/// Errors from the external synthesis step. Caught at the row boundary:
/// the row fails, sibling rows are unaffected.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to launch fluidsynth: {0}")]
    Launch(#[from] std::io::Error),

    #[error("fluidsynth exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
}

/// Renders MIDI through the `fluidsynth` command with a SoundFont.
#[derive(Debug, Clone)]
pub struct FluidSynth {
    soundfont: PathBuf,
    sample_rate: u32,
}

impl FluidSynth {
    pub fn new(soundfont: impl Into<PathBuf>) -> Self {
        FluidSynth {
            soundfont: soundfont.into(),
            sample_rate: 44_100,
        }
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Base name of the SoundFont, recorded in dataset metadata.
    pub fn soundfont_name(&self) -> String {
        self.soundfont
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl Renderer for FluidSynth {
    fn render(&self, midi_path: &Path, wav_path: &Path) -> Result<(), RenderError> {
        let output = Command::new("fluidsynth")
            .arg("-ni")
            .arg("-F")
            .arg(wav_path)
            .arg("-r")
            .arg(self.sample_rate.to_string())
            .arg(&self.soundfont)
            .arg(midi_path)
            .output()?;

        if !output.status.success() {
            return Err(RenderError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        log::debug!("rendered {} -> {}", midi_path.display(), wav_path.display());
        Ok(())
    }
}
