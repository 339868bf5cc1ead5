// Pitch classes and enharmonic spelling
// Sharp-side and flat-side name tables plus a declarative correction table
// for the contexts where neither canonical table is musically right

use serde::{Deserialize, Serialize};

use super::TheoryError;

/// Canonical sharp-side spelling, indexed by pitch class (0 = C).
pub const NOTE_NAMES_SHARP: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Flat-side spelling, indexed by pitch class (0 = C).
pub const NOTE_NAMES_FLAT: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Alternate spellings for the names that have one in common usage.
const ENHARMONIC_PAIRS: [(&str, &str); 9] = [
    ("A#", "Bb"),
    ("B", "Cb"),
    ("C", "B#"),
    ("C#", "Db"),
    ("D#", "Eb"),
    ("E", "Fb"),
    ("F", "E#"),
    ("F#", "Gb"),
    ("G#", "Ab"),
];

/// Canonical sharp-side name for a pitch class.
pub fn note_name(pitch_class: u8) -> &'static str {
    NOTE_NAMES_SHARP[(pitch_class % 12) as usize]
}

/// Flat-side name for a pitch class.
pub fn enharmonic_name(pitch_class: u8) -> &'static str {
    NOTE_NAMES_FLAT[(pitch_class % 12) as usize]
}

/// The alternate spelling of a note name, if it has one.
pub fn enharmonic_of(name: &str) -> Option<&'static str> {
    ENHARMONIC_PAIRS
        .iter()
        .find(|(from, _)| *from == name)
        .map(|(_, to)| *to)
}

/// Pitch class of a note name. Accepts sharp, flat, and the alternate
/// spellings from the enharmonic table (B#, Cb, E#, Fb).
pub fn pitch_class(name: &str) -> Result<u8, TheoryError> {
    if let Some(pc) = NOTE_NAMES_SHARP.iter().position(|n| *n == name) {
        return Ok(pc as u8);
    }
    if let Some(pc) = NOTE_NAMES_FLAT.iter().position(|n| *n == name) {
        return Ok(pc as u8);
    }
    match name {
        "B#" => Ok(0),
        "Cb" => Ok(11),
        "E#" => Ok(5),
        "Fb" => Ok(4),
        _ => Err(TheoryError::UnknownNoteName(name.to_string())),
    }
}

/// Whether a canonical name is an accidental (sharp) spelling.
pub fn is_accidental(name: &str) -> bool {
    name.ends_with('#')
}

/// Direction of the interval that produced the note being spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// Context for spelling a pitch class: which root it was reached from,
/// by how many semitones, and in which direction.
#[derive(Debug, Clone, Copy)]
pub struct SpellingContext<'a> {
    pub root: &'a str,
    pub semitones: u8,
    pub direction: Direction,
}

/// Which roots a spelling rule applies to.
#[derive(Debug, Clone, Copy)]
enum RootClass {
    /// Any natural (non-sharp) root.
    Natural,
    /// Natural roots except the listed ones.
    NaturalExcept(&'static [&'static str]),
    /// Any sharp root.
    Sharp,
    /// One specific root name.
    Exact(&'static str),
}

impl RootClass {
    fn matches(self, root: &str) -> bool {
        match self {
            RootClass::Natural => !is_accidental(root),
            RootClass::NaturalExcept(excluded) => {
                !is_accidental(root) && !excluded.contains(&root)
            }
            RootClass::Sharp => is_accidental(root),
            RootClass::Exact(name) => root == name,
        }
    }
}

/// Which resolved names a spelling rule rewrites.
#[derive(Debug, Clone, Copy)]
enum TargetClass {
    /// Any sharp-spelled result.
    AnySharp,
    /// One of the listed result names.
    OneOf(&'static [&'static str]),
}

impl TargetClass {
    fn matches(self, name: &str) -> bool {
        match self {
            TargetClass::AnySharp => is_accidental(name),
            TargetClass::OneOf(names) => names.contains(&name),
        }
    }
}

/// One row of the spelling-correction policy. When direction, interval,
/// root, and the provisional name all match, the name is replaced by its
/// enharmonic spelling. Rules are checked in order; the first match wins.
#[derive(Debug, Clone, Copy)]
struct SpellingRule {
    direction: Direction,
    intervals: &'static [u8],
    root: RootClass,
    target: TargetClass,
}

/// The spelling policy as data. Each entry captures one of the contexts
/// where the canonical sharp table is musically wrong:
/// minor intervals above natural roots spell flat, minor seconds spell
/// flat even when the sharp name exists, downward spellings from C and F
/// prefer flats, sharp roots respell C and F as B# and E#, and A# is
/// almost always written Bb.
const SPELLING_RULES: [SpellingRule; 9] = [
    // Minor 3rd, diminished 5th, minor 6th, minor 7th above a natural root.
    SpellingRule {
        direction: Direction::Up,
        intervals: &[3, 6, 8, 10],
        root: RootClass::Natural,
        target: TargetClass::AnySharp,
    },
    // Minor 2nd above a natural root: C + m2 is Db, never C#. E and B
    // reach a natural name and need no correction.
    SpellingRule {
        direction: Direction::Up,
        intervals: &[1],
        root: RootClass::NaturalExcept(&["E", "B"]),
        target: TargetClass::AnySharp,
    },
    // Major intervals downward from C land on flat-side names.
    SpellingRule {
        direction: Direction::Down,
        intervals: &[2, 4, 9, 11],
        root: RootClass::Exact("C"),
        target: TargetClass::AnySharp,
    },
    // Same from F, which also flattens its perfect 5th (Bb).
    SpellingRule {
        direction: Direction::Down,
        intervals: &[2, 4, 7, 9, 11],
        root: RootClass::Exact("F"),
        target: TargetClass::AnySharp,
    },
    // Sharp roots respell a resulting C or F as B# / E#.
    SpellingRule {
        direction: Direction::Up,
        intervals: &ALL_INTERVALS,
        root: RootClass::Sharp,
        target: TargetClass::OneOf(&["C", "F"]),
    },
    SpellingRule {
        direction: Direction::Down,
        intervals: &ALL_INTERVALS,
        root: RootClass::Sharp,
        target: TargetClass::OneOf(&["C", "F"]),
    },
    // A# is written Bb except relative to B, E, or a sharp root.
    SpellingRule {
        direction: Direction::Up,
        intervals: &ALL_INTERVALS,
        root: RootClass::NaturalExcept(&["B", "E"]),
        target: TargetClass::OneOf(&["A#"]),
    },
    SpellingRule {
        direction: Direction::Down,
        intervals: &ALL_INTERVALS,
        root: RootClass::NaturalExcept(&["B", "E"]),
        target: TargetClass::OneOf(&["A#"]),
    },
    // A major 7th below a natural root spells flat (C down to Db).
    SpellingRule {
        direction: Direction::Down,
        intervals: &[11],
        root: RootClass::Natural,
        target: TargetClass::AnySharp,
    },
];

const ALL_INTERVALS: [u8; 12] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];

/// Spell a pitch class in context. Starts from the canonical sharp name
/// and applies the first matching correction rule, if any. Total over all
/// pitch classes and deterministic for a given context.
pub fn resolve_spelling(pitch_class: u8, ctx: &SpellingContext) -> String {
    let provisional = note_name(pitch_class);
    for rule in &SPELLING_RULES {
        if rule.direction == ctx.direction
            && rule.intervals.contains(&ctx.semitones)
            && rule.root.matches(ctx.root)
            && rule.target.matches(provisional)
        {
            if let Some(corrected) = enharmonic_of(provisional) {
                return corrected.to_string();
            }
        }
    }
    provisional.to_string()
}

/// Spelled names of the notes `semitones` above and below a root.
pub fn interval_note_names(
    root: &str,
    semitones: u8,
) -> Result<(String, String), TheoryError> {
    if semitones == 0 || semitones > 12 {
        return Err(TheoryError::IntervalOutOfRange(semitones));
    }
    let root_pc = pitch_class(root)?;
    let up_pc = (root_pc + semitones) % 12;
    let down_pc = (root_pc + 12 - semitones % 12) % 12;
    let up = resolve_spelling(
        up_pc,
        &SpellingContext {
            root,
            semitones,
            direction: Direction::Up,
        },
    );
    let down = resolve_spelling(
        down_pc,
        &SpellingContext {
            root,
            semitones,
            direction: Direction::Down,
        },
    );
    Ok((up, down))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn up(root: &str, semitones: u8) -> String {
        resolve_spelling(
            (pitch_class(root).unwrap() + semitones) % 12,
            &SpellingContext {
                root,
                semitones,
                direction: Direction::Up,
            },
        )
    }

    fn down(root: &str, semitones: u8) -> String {
        resolve_spelling(
            (pitch_class(root).unwrap() + 12 - semitones % 12) % 12,
            &SpellingContext {
                root,
                semitones,
                direction: Direction::Down,
            },
        )
    }

    #[test]
    fn test_canonical_tables_agree_on_naturals() {
        for pc in [0u8, 2, 4, 5, 7, 9, 11] {
            assert_eq!(note_name(pc), enharmonic_name(pc));
        }
    }

    #[test]
    fn test_pitch_class_roundtrip() {
        for pc in 0..12u8 {
            assert_eq!(pitch_class(note_name(pc)).unwrap(), pc);
            assert_eq!(pitch_class(enharmonic_name(pc)).unwrap(), pc);
        }
        assert_eq!(pitch_class("B#").unwrap(), 0);
        assert_eq!(pitch_class("Cb").unwrap(), 11);
        assert!(pitch_class("H").is_err());
    }

    #[test]
    fn test_minor_second_spells_flat() {
        // The defining case: C up a minor 2nd is Db, not C#.
        assert_eq!(up("C", 1), "Db");
        assert_eq!(up("D", 1), "Eb");
        assert_eq!(up("G", 1), "Ab");
        // E and B reach natural names.
        assert_eq!(up("E", 1), "F");
        assert_eq!(up("B", 1), "C");
    }

    #[test]
    fn test_minor_intervals_spell_flat_above_naturals() {
        assert_eq!(up("C", 3), "Eb"); // m3
        assert_eq!(up("C", 8), "Ab"); // m6
        assert_eq!(up("C", 10), "Bb"); // m7
        assert_eq!(up("G", 6), "Db"); // d5
    }

    #[test]
    fn test_downward_from_c_and_f_prefer_flats() {
        assert_eq!(down("C", 2), "Bb");
        assert_eq!(down("C", 4), "Ab");
        assert_eq!(down("C", 9), "Eb");
        assert_eq!(down("F", 7), "Bb");
        assert_eq!(down("F", 9), "Ab");
    }

    #[test]
    fn test_sharp_roots_respell_c_and_f() {
        assert_eq!(up("C#", 11), "B#");
        assert_eq!(up("F#", 11), "E#");
        assert_eq!(down("C#", 1), "B#");
    }

    #[test]
    fn test_a_sharp_prefers_b_flat() {
        // F up a perfect 4th reaches pitch class 10: Bb, not A#.
        assert_eq!(up("F", 5), "Bb");
        assert_eq!(down("D", 4), "Bb");
    }

    #[test]
    fn test_downward_major_seventh_spells_flat() {
        assert_eq!(down("C", 11), "Db");
        assert_eq!(down("D", 11), "Eb");
    }

    #[test]
    fn test_spelling_is_total_and_deterministic() {
        for pc in 0..12u8 {
            for semitones in 1..=12u8 {
                for direction in [Direction::Up, Direction::Down] {
                    let ctx = SpellingContext {
                        root: "C",
                        semitones,
                        direction,
                    };
                    let first = resolve_spelling(pc, &ctx);
                    assert!(!first.is_empty());
                    assert_eq!(first, resolve_spelling(pc, &ctx));
                }
            }
        }
    }

    #[test]
    fn test_interval_note_names() {
        let (u, d) = interval_note_names("A", 2).unwrap();
        assert_eq!(u, "B");
        assert_eq!(d, "G");
        let (u, _) = interval_note_names("C", 1).unwrap();
        assert_eq!(u, "Db");
        assert!(interval_note_names("C", 0).is_err());
        assert!(interval_note_names("C", 13).is_err());
    }
}
