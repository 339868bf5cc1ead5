// Chord engine
// Triads, inversions, and roman-numeral labels derived from scales

use serde::{Deserialize, Serialize};

use super::scale::Mode;
use super::{pitch, TheoryError};

/// MIDI value of the octave triads are voiced in (middle C).
const TRIAD_OCTAVE_BASE: u8 = 60;

/// Triad quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChordQuality {
    Major,
    Minor,
    Augmented,
    Diminished,
}

impl ChordQuality {
    pub const ALL: [ChordQuality; 4] = [
        ChordQuality::Major,
        ChordQuality::Minor,
        ChordQuality::Augmented,
        ChordQuality::Diminished,
    ];

    /// Semitone offsets of root, third, and fifth.
    pub fn intervals(self) -> [u8; 3] {
        match self {
            ChordQuality::Major => [0, 4, 7],
            ChordQuality::Minor => [0, 3, 7],
            ChordQuality::Augmented => [0, 4, 8],
            ChordQuality::Diminished => [0, 3, 6],
        }
    }

    /// Quality from a (third, fifth) interval pattern, for triads built
    /// by stacking scale degrees.
    fn from_intervals(third: u8, fifth: u8) -> Option<ChordQuality> {
        match (third, fifth) {
            (4, 7) => Some(ChordQuality::Major),
            (3, 7) => Some(ChordQuality::Minor),
            (4, 8) => Some(ChordQuality::Augmented),
            (3, 6) => Some(ChordQuality::Diminished),
            _ => None,
        }
    }

    /// The label the datasets carry ("major", "minor", "aug", "dim").
    pub fn label(self) -> &'static str {
        match self {
            ChordQuality::Major => "major",
            ChordQuality::Minor => "minor",
            ChordQuality::Augmented => "aug",
            ChordQuality::Diminished => "dim",
        }
    }

    /// The fully spelled-out quality word.
    pub fn full_name(self) -> &'static str {
        match self {
            ChordQuality::Major => "major",
            ChordQuality::Minor => "minor",
            ChordQuality::Augmented => "augmented",
            ChordQuality::Diminished => "diminished",
        }
    }
}

/// Triad inversion: which chord tone sounds lowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Inversion {
    Root,
    First,
    Second,
}

impl Inversion {
    pub const ALL: [Inversion; 3] = [Inversion::Root, Inversion::First, Inversion::Second];

    /// Figured-bass label: 5 for root position, 6 and 64 for inversions.
    pub fn figure(self) -> &'static str {
        match self {
            Inversion::Root => "5",
            Inversion::First => "6",
            Inversion::Second => "64",
        }
    }

    /// English ordinal name, None for root position.
    pub fn ordinal(self) -> Option<&'static str> {
        match self {
            Inversion::Root => None,
            Inversion::First => Some("1st"),
            Inversion::Second => Some("2nd"),
        }
    }
}

/// Whether a key takes the major or the minor roman-numeral table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyQuality {
    Major,
    Minor,
}

impl KeyQuality {
    /// Ionian keys read as major; every other mode labels as minor.
    pub fn from_mode(mode: Mode) -> KeyQuality {
        match mode {
            Mode::Ionian => KeyQuality::Major,
            _ => KeyQuality::Minor,
        }
    }
}

/// Roman numeral and chord-quality word for each degree of a major key.
const ROMAN_NUMERALS_MAJOR: [(&str, &str); 7] = [
    ("I", "major"),
    ("ii", "minor"),
    ("iii", "minor"),
    ("IV", "major"),
    ("V", "major"),
    ("vi", "minor"),
    ("vii dim", "diminished"),
];

/// Roman numeral and chord-quality word for each degree of a minor key.
const ROMAN_NUMERALS_MINOR: [(&str, &str); 7] = [
    ("i", "minor"),
    ("ii dim", "diminished"),
    ("III", "major"),
    ("iv", "minor"),
    ("v", "minor"),
    ("VI", "major"),
    ("VII", "major"),
];

/// Roman numeral and quality word for a 1-based scale degree in a key.
pub fn roman_numeral(
    degree: u8,
    key: KeyQuality,
) -> Result<(&'static str, &'static str), TheoryError> {
    if degree < 1 || degree > 7 {
        return Err(TheoryError::DegreeOutOfRange(degree));
    }
    let table = match key {
        KeyQuality::Major => &ROMAN_NUMERALS_MAJOR,
        KeyQuality::Minor => &ROMAN_NUMERALS_MINOR,
    };
    Ok(table[(degree - 1) as usize])
}

/// A three-note chord with its sounding voicing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triad {
    /// Pitch classes of root, third, and fifth, in that order.
    pub pitch_classes: [u8; 3],

    /// MIDI note values in sounding order, bass first.
    pub midi_notes: [u8; 3],

    pub quality: ChordQuality,
    pub inversion: Inversion,
}

impl Triad {
    /// Chord name like "C# minor".
    pub fn name(&self) -> String {
        format!(
            "{} {}",
            pitch::note_name(self.pitch_classes[0]),
            self.quality.full_name()
        )
    }

    /// The lowest sounding note.
    pub fn bass(&self) -> u8 {
        self.midi_notes[0]
    }
}

/// Re-voice root-position midi notes so the inversion's tone is the bass.
/// First inversion raises the root an octave; second raises root and third.
fn apply_inversion(notes: [u8; 3], inversion: Inversion) -> [u8; 3] {
    let [root, third, fifth] = notes;
    match inversion {
        Inversion::Root => [root, third, fifth],
        Inversion::First => [third, fifth, root + 12],
        Inversion::Second => [fifth, root + 12, third + 12],
    }
}

/// Build a triad of a given quality directly on a root pitch class.
pub fn triad_with_quality(
    root_pitch_class: u8,
    quality: ChordQuality,
    inversion: Inversion,
) -> Triad {
    let root = root_pitch_class % 12;
    let intervals = quality.intervals();
    let pitch_classes = [
        root,
        (root + intervals[1]) % 12,
        (root + intervals[2]) % 12,
    ];
    let voiced = [
        TRIAD_OCTAVE_BASE + root,
        TRIAD_OCTAVE_BASE + root + intervals[1],
        TRIAD_OCTAVE_BASE + root + intervals[2],
    ];
    Triad {
        pitch_classes,
        midi_notes: apply_inversion(voiced, inversion),
        quality,
        inversion,
    }
}

/// Triad built by stacking thirds on a scale degree, with its
/// roman-numeral label. `scale` is the 7-degree output of
/// [`super::scale::build_scale`]; `degree` is 1-based. The extension list
/// is reserved for future chord tones and must be empty.
pub fn triad_on_degree(
    scale: &[u8],
    mode: Mode,
    degree: u8,
    inversion: Inversion,
    extensions: &[u8],
) -> Result<(Triad, String), TheoryError> {
    if !extensions.is_empty() {
        return Err(TheoryError::ExtensionsUnsupported);
    }
    if degree < 1 || degree > 7 {
        return Err(TheoryError::DegreeOutOfRange(degree));
    }

    // Chord tones are the degree and the two thirds above it, wrapping
    // past the octave where needed.
    let tone = |step: usize| -> u8 {
        let position = (degree - 1) as usize + step;
        scale[position % 7] + 12 * (position / 7) as u8
    };
    let (root, third, fifth) = (tone(0), tone(2), tone(4));

    let quality = ChordQuality::from_intervals(third - root, fifth - root)
        .ok_or(TheoryError::UnsupportedTriadShape([root, third, fifth]))?;
    let voiced = [
        TRIAD_OCTAVE_BASE + root,
        TRIAD_OCTAVE_BASE + third,
        TRIAD_OCTAVE_BASE + fifth,
    ];
    let (numeral, _) = roman_numeral(degree, KeyQuality::from_mode(mode))?;

    let triad = Triad {
        pitch_classes: [root % 12, third % 12, fifth % 12],
        midi_notes: apply_inversion(voiced, inversion),
        quality,
        inversion,
    };
    Ok((triad, numeral.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theory::scale::build_scale;

    #[test]
    fn test_major_triad_root_position() {
        let triad = triad_with_quality(0, ChordQuality::Major, Inversion::Root);
        assert_eq!(triad.pitch_classes, [0, 4, 7]);
        assert_eq!(triad.midi_notes, [60, 64, 67]);
        assert_eq!(triad.name(), "C major");
    }

    #[test]
    fn test_inversions_move_the_bass() {
        let root = triad_with_quality(0, ChordQuality::Minor, Inversion::Root);
        let first = triad_with_quality(0, ChordQuality::Minor, Inversion::First);
        let second = triad_with_quality(0, ChordQuality::Minor, Inversion::Second);

        assert_eq!(root.bass(), 60); // C
        assert_eq!(first.bass(), 63); // Eb: the third
        assert_eq!(second.bass(), 67); // G: the fifth

        // Same pitch classes regardless of voicing.
        assert_eq!(root.pitch_classes, first.pitch_classes);
        assert_eq!(root.pitch_classes, second.pitch_classes);
    }

    #[test]
    fn test_augmented_and_diminished_shapes() {
        let aug = triad_with_quality(4, ChordQuality::Augmented, Inversion::Root);
        assert_eq!(aug.midi_notes, [64, 68, 72]);
        let dim = triad_with_quality(11, ChordQuality::Diminished, Inversion::Root);
        assert_eq!(dim.pitch_classes, [11, 2, 5]);
    }

    #[test]
    fn test_major_key_roman_numerals_per_degree() {
        let expected = [
            (1, "I", ChordQuality::Major),
            (2, "ii", ChordQuality::Minor),
            (3, "iii", ChordQuality::Minor),
            (4, "IV", ChordQuality::Major),
            (5, "V", ChordQuality::Major),
            (6, "vi", ChordQuality::Minor),
            (7, "vii dim", ChordQuality::Diminished),
        ];
        let scale = build_scale(0, Mode::Ionian);
        for (degree, numeral, quality) in expected {
            let (triad, label) =
                triad_on_degree(&scale, Mode::Ionian, degree, Inversion::Root, &[]).unwrap();
            assert_eq!(label, numeral, "degree {degree}");
            assert_eq!(triad.quality, quality, "degree {degree}");
        }
    }

    #[test]
    fn test_minor_key_roman_numerals_per_degree() {
        let expected = [
            (1, "i", ChordQuality::Minor),
            (2, "ii dim", ChordQuality::Diminished),
            (3, "III", ChordQuality::Major),
            (4, "iv", ChordQuality::Minor),
            (5, "v", ChordQuality::Minor),
            (6, "VI", ChordQuality::Major),
            (7, "VII", ChordQuality::Major),
        ];
        let scale = build_scale(9, Mode::Aeolian);
        for (degree, numeral, quality) in expected {
            let (triad, label) =
                triad_on_degree(&scale, Mode::Aeolian, degree, Inversion::Root, &[]).unwrap();
            assert_eq!(label, numeral, "degree {degree}");
            assert_eq!(triad.quality, quality, "degree {degree}");
        }
    }

    #[test]
    fn test_degree_bounds_and_extensions_are_rejected() {
        let scale = build_scale(0, Mode::Ionian);
        assert!(triad_on_degree(&scale, Mode::Ionian, 0, Inversion::Root, &[]).is_err());
        assert!(triad_on_degree(&scale, Mode::Ionian, 8, Inversion::Root, &[]).is_err());
        assert!(triad_on_degree(&scale, Mode::Ionian, 1, Inversion::Root, &[9]).is_err());
    }

    #[test]
    fn test_degree_triads_wrap_the_octave() {
        // Degree 6 of C major stacks A-C-E; C and E wrap past the octave.
        let scale = build_scale(0, Mode::Ionian);
        let (triad, _) =
            triad_on_degree(&scale, Mode::Ionian, 6, Inversion::Root, &[]).unwrap();
        assert_eq!(triad.midi_notes, [69, 72, 76]);
        assert_eq!(triad.quality, ChordQuality::Minor);
    }
}
