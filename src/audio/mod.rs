// Audio collaborators
// The pipeline treats synthesis and quality checking as opaque seams:
// a Renderer turns a MIDI artifact into audio, a QualityChecker inspects
// the result. Rows depend only on these traits.

pub mod synth;
pub mod wav;

use std::path::Path;

pub use synth::{FluidSynth, RenderError};
pub use wav::{PeakAmplitudeChecker, QualityCheckError, TrimError};

/// Renders a MIDI file to an audio artifact at the given path.
pub trait Renderer: Sync {
    fn render(&self, midi_path: &Path, wav_path: &Path) -> Result<(), RenderError>;
}

/// Inspects a rendered artifact for silence. A failure here is non-fatal:
/// the row still succeeds with an unknown quality flag.
pub trait QualityChecker: Sync {
    fn is_silent(&self, wav_path: &Path) -> Result<bool, QualityCheckError>;
}
