// Music theory engine
// Pitch-class arithmetic, enharmonic spelling, scales, and chords

pub mod chord;
pub mod pitch;
pub mod scale;

pub use chord::{ChordQuality, Inversion, KeyQuality, Triad};
pub use pitch::{Direction, SpellingContext};
pub use scale::Mode;

use thiserror::Error;

/// Errors raised when a theory operation is asked for something outside
/// its supported domain. Caught at the row boundary: the offending row
/// fails, sibling rows are unaffected.
#[derive(Debug, Error)]
pub enum TheoryError {
    #[error("unknown note name: {0}")]
    UnknownNoteName(String),

    #[error("scale degree {0} out of range (expected 1-7)")]
    DegreeOutOfRange(u8),

    #[error("interval of {0} semitones out of range (expected 1-12)")]
    IntervalOutOfRange(u8),

    #[error("chord tones {0:?} do not form a supported triad")]
    UnsupportedTriadShape([u8; 3]),

    #[error("chord extensions are reserved and not yet supported")]
    ExtensionsUnsupported,
}
