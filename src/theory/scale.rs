// Scale engine
// Mode offset patterns plus the spelled-name tables used for labels.
// Pitch-class arithmetic and note-name spelling are kept as separate
// tables: pitch-class math alone cannot determine correct spelling.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The seven diatonic modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Ionian,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Aeolian,
    Locrian,
}

impl Mode {
    pub const ALL: [Mode; 7] = [
        Mode::Ionian,
        Mode::Dorian,
        Mode::Phrygian,
        Mode::Lydian,
        Mode::Mixolydian,
        Mode::Aeolian,
        Mode::Locrian,
    ];

    /// Semitone offsets from the tonic for degrees 1-7.
    pub fn offsets(self) -> [u8; 7] {
        match self {
            Mode::Ionian => [0, 2, 4, 5, 7, 9, 11],
            Mode::Dorian => [0, 2, 3, 5, 7, 9, 10],
            Mode::Phrygian => [0, 1, 3, 5, 7, 8, 10],
            Mode::Lydian => [0, 2, 4, 6, 7, 9, 11],
            Mode::Mixolydian => [0, 2, 4, 5, 7, 9, 10],
            Mode::Aeolian => [0, 2, 3, 5, 7, 8, 10],
            Mode::Locrian => [0, 1, 3, 5, 6, 8, 10],
        }
    }

    /// Position of this mode within the parent major scale (0-6).
    pub fn index(self) -> usize {
        match self {
            Mode::Ionian => 0,
            Mode::Dorian => 1,
            Mode::Phrygian => 2,
            Mode::Lydian => 3,
            Mode::Mixolydian => 4,
            Mode::Aeolian => 5,
            Mode::Locrian => 6,
        }
    }

    /// Semitones down from this mode's tonic to the parent major root.
    /// D dorian shares its notes with the C major scale a whole step below.
    pub fn relative_major_offset(self) -> u8 {
        match self {
            Mode::Ionian => 0,
            Mode::Dorian => 2,
            Mode::Phrygian => 4,
            Mode::Lydian => 5,
            Mode::Mixolydian => 7,
            Mode::Aeolian => 9,
            Mode::Locrian => 11,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Ionian => "ionian",
            Mode::Dorian => "dorian",
            Mode::Phrygian => "phrygian",
            Mode::Lydian => "lydian",
            Mode::Mixolydian => "mixolydian",
            Mode::Aeolian => "aeolian",
            Mode::Locrian => "locrian",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Semitone values of a mode's seven degrees from a tonic pitch class.
/// Values are unwrapped (the 7th degree of B ionian is 22, not 10) so the
/// sequence is ascending; reduce modulo 12 for pitch classes.
pub fn build_scale(tonic_pitch_class: u8, mode: Mode) -> Vec<u8> {
    mode.offsets()
        .iter()
        .map(|offset| tonic_pitch_class + offset)
        .collect()
}

/// Same as [`build_scale`] with the octave appended.
pub fn build_scale_with_octave(tonic_pitch_class: u8, mode: Mode) -> Vec<u8> {
    let mut scale = build_scale(tonic_pitch_class, mode);
    scale.push(tonic_pitch_class + 12);
    scale
}

/// Canonically spelled degree names of the major scale on each of the 14
/// common tonic spellings. Used only for label and prompt generation.
const MAJOR_SCALE_NAMES: [(&str, [&str; 7]); 14] = [
    ("C", ["C", "D", "E", "F", "G", "A", "B"]),
    ("C#", ["C#", "D#", "E#", "F#", "G#", "A#", "B#"]),
    ("Db", ["Db", "Eb", "F", "Gb", "Ab", "Bb", "C"]),
    ("D", ["D", "E", "F#", "G", "A", "B", "C#"]),
    ("Eb", ["Eb", "F", "G", "Ab", "Bb", "C", "D"]),
    ("E", ["E", "F#", "G#", "A", "B", "C#", "D#"]),
    ("F", ["F", "G", "A", "Bb", "C", "D", "E"]),
    ("F#", ["F#", "G#", "A#", "B", "C#", "D#", "E#"]),
    ("Gb", ["Gb", "Ab", "Bb", "Cb", "Db", "Eb", "F"]),
    ("G", ["G", "A", "B", "C", "D", "E", "F#"]),
    ("Ab", ["Ab", "Bb", "C", "Db", "Eb", "F", "G"]),
    ("A", ["A", "B", "C#", "D", "E", "F#", "G#"]),
    ("Bb", ["Bb", "C", "D", "Eb", "F", "G", "A"]),
    ("B", ["B", "C#", "D#", "E", "F#", "G#", "A#"]),
];

/// Spelled degree names of the major scale on a tonic name, if the tonic
/// is one of the 14 supported spellings.
pub fn major_scale_names(tonic_name: &str) -> Option<[&'static str; 7]> {
    MAJOR_SCALE_NAMES
        .iter()
        .find(|(name, _)| *name == tonic_name)
        .map(|(_, degrees)| *degrees)
}

/// Relative major root for each minor-key tonic spelling.
const RELATIVE_MAJOR: [(&str, &str); 14] = [
    ("F#", "A"),
    ("G", "Bb"),
    ("G#", "B"),
    ("A", "C"),
    ("A#", "C#"),
    ("Bb", "Db"),
    ("B", "D"),
    ("C", "Eb"),
    ("C#", "E"),
    ("D", "F"),
    ("D#", "F#"),
    ("Eb", "Gb"),
    ("E", "G"),
    ("F", "Ab"),
];

/// The relative major of a minor key, by tonic name.
pub fn relative_major_name(minor_tonic: &str) -> Option<&'static str> {
    RELATIVE_MAJOR
        .iter()
        .find(|(minor, _)| *minor == minor_tonic)
        .map(|(_, major)| *major)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theory::pitch;

    #[test]
    fn test_ionian_offsets() {
        assert_eq!(build_scale(0, Mode::Ionian), vec![0, 2, 4, 5, 7, 9, 11]);
        assert_eq!(
            build_scale_with_octave(0, Mode::Ionian),
            vec![0, 2, 4, 5, 7, 9, 11, 12]
        );
    }

    #[test]
    fn test_scales_are_tonic_rooted_and_ascending() {
        for mode in Mode::ALL {
            for tonic in 0..12u8 {
                let scale = build_scale(tonic, mode);
                assert_eq!(scale.len(), 7);
                assert_eq!(scale[0], tonic);
                assert!(scale.windows(2).all(|w| w[0] < w[1]));
            }
        }
    }

    #[test]
    fn test_mode_offsets_rotate_the_major_pattern() {
        // Each mode's offsets are the major pattern started at its index.
        let major = Mode::Ionian.offsets();
        for mode in Mode::ALL {
            let rotated: Vec<u8> = (0..7)
                .map(|degree| {
                    let i = (mode.index() + degree) % 7;
                    let base = major[i] + if mode.index() + degree >= 7 { 12 } else { 0 };
                    (base - major[mode.index()]) % 12
                })
                .collect();
            assert_eq!(rotated, mode.offsets().to_vec(), "{mode}");
        }
    }

    #[test]
    fn test_relative_major_offset_matches_mode_index() {
        for mode in Mode::ALL {
            assert_eq!(
                mode.relative_major_offset(),
                Mode::Ionian.offsets()[mode.index()]
            );
        }
    }

    #[test]
    fn test_named_scales_agree_with_pitch_arithmetic() {
        for (tonic, degrees) in MAJOR_SCALE_NAMES {
            let tonic_pc = pitch::pitch_class(tonic).unwrap();
            let scale = build_scale(tonic_pc, Mode::Ionian);
            for (value, name) in scale.iter().zip(degrees.iter()) {
                assert_eq!(
                    value % 12,
                    pitch::pitch_class(name).unwrap(),
                    "{tonic} major, degree {name}"
                );
            }
        }
    }

    #[test]
    fn test_relative_major_is_a_minor_third_up() {
        for (minor, major) in RELATIVE_MAJOR {
            let minor_pc = pitch::pitch_class(minor).unwrap();
            let major_pc = pitch::pitch_class(major).unwrap();
            assert_eq!((minor_pc + 3) % 12, major_pc, "{minor} -> {major}");
        }
    }
}
