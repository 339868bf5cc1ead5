// General MIDI instrument table
// The 128 GM programs with their categories and the tonal-content filter
// used when enumerating dataset instruments

use serde::{Deserialize, Serialize};

/// One General MIDI program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Instrument {
    /// Program number (0-127).
    pub program: u8,
    pub name: &'static str,
    pub category: &'static str,
}

impl Instrument {
    /// Instrument name with spaces replaced, for filenames.
    pub fn cleaned_name(&self) -> String {
        self.name.replace(' ', "_")
    }

    /// Unpitched programs: percussion and sound effects.
    pub fn is_atonal(&self) -> bool {
        matches!(self.category, "Percussive" | "Sound Effects")
    }

    /// Programs that sound as multiple voices at once.
    pub fn is_polyphonic(&self) -> bool {
        self.category == "Ensemble"
    }

    /// Programs whose attack transients dominate sustained pitch.
    pub fn is_highly_articulate(&self) -> bool {
        HIGHLY_ARTICULATE.contains(&self.program)
    }
}

/// The sixteen GM categories, eight programs each.
const CATEGORIES: [&str; 16] = [
    "Piano",
    "Chromatic Percussion",
    "Organ",
    "Guitar",
    "Bass",
    "Strings",
    "Ensemble",
    "Brass",
    "Reed",
    "Pipe",
    "Synth Lead",
    "Synth Pad",
    "Synth Effects",
    "Ethnic",
    "Percussive",
    "Sound Effects",
];

/// Plucked, slapped, and heavily ornamented programs excluded by the
/// articulation filter.
const HIGHLY_ARTICULATE: [u8; 12] = [31, 36, 37, 45, 104, 105, 106, 107, 108, 109, 110, 111];

const GM_NAMES: [&str; 128] = [
    "Acoustic Grand Piano",
    "Bright Acoustic Piano",
    "Electric Grand Piano",
    "Honky-tonk Piano",
    "Electric Piano 1",
    "Electric Piano 2",
    "Harpsichord",
    "Clavinet",
    "Celesta",
    "Glockenspiel",
    "Music Box",
    "Vibraphone",
    "Marimba",
    "Xylophone",
    "Tubular Bells",
    "Dulcimer",
    "Drawbar Organ",
    "Percussive Organ",
    "Rock Organ",
    "Church Organ",
    "Reed Organ",
    "Accordion",
    "Harmonica",
    "Tango Accordion",
    "Acoustic Guitar (nylon)",
    "Acoustic Guitar (steel)",
    "Electric Guitar (jazz)",
    "Electric Guitar (clean)",
    "Electric Guitar (muted)",
    "Overdriven Guitar",
    "Distortion Guitar",
    "Guitar Harmonics",
    "Acoustic Bass",
    "Electric Bass (finger)",
    "Electric Bass (pick)",
    "Fretless Bass",
    "Slap Bass 1",
    "Slap Bass 2",
    "Synth Bass 1",
    "Synth Bass 2",
    "Violin",
    "Viola",
    "Cello",
    "Contrabass",
    "Tremolo Strings",
    "Pizzicato Strings",
    "Orchestral Harp",
    "Timpani",
    "String Ensemble 1",
    "String Ensemble 2",
    "Synth Strings 1",
    "Synth Strings 2",
    "Choir Aahs",
    "Voice Oohs",
    "Synth Voice",
    "Orchestra Hit",
    "Trumpet",
    "Trombone",
    "Tuba",
    "Muted Trumpet",
    "French Horn",
    "Brass Section",
    "Synth Brass 1",
    "Synth Brass 2",
    "Soprano Sax",
    "Alto Sax",
    "Tenor Sax",
    "Baritone Sax",
    "Oboe",
    "English Horn",
    "Bassoon",
    "Clarinet",
    "Piccolo",
    "Flute",
    "Recorder",
    "Pan Flute",
    "Blown Bottle",
    "Shakuhachi",
    "Whistle",
    "Ocarina",
    "Lead 1 (square)",
    "Lead 2 (sawtooth)",
    "Lead 3 (calliope)",
    "Lead 4 (chiff)",
    "Lead 5 (charang)",
    "Lead 6 (voice)",
    "Lead 7 (fifths)",
    "Lead 8 (bass + lead)",
    "Pad 1 (new age)",
    "Pad 2 (warm)",
    "Pad 3 (polysynth)",
    "Pad 4 (choir)",
    "Pad 5 (bowed)",
    "Pad 6 (metallic)",
    "Pad 7 (halo)",
    "Pad 8 (sweep)",
    "FX 1 (rain)",
    "FX 2 (soundtrack)",
    "FX 3 (crystal)",
    "FX 4 (atmosphere)",
    "FX 5 (brightness)",
    "FX 6 (goblins)",
    "FX 7 (echoes)",
    "FX 8 (sci-fi)",
    "Sitar",
    "Banjo",
    "Shamisen",
    "Koto",
    "Kalimba",
    "Bag pipe",
    "Fiddle",
    "Shanai",
    "Tinkle Bell",
    "Agogo",
    "Steel Drums",
    "Woodblock",
    "Taiko Drum",
    "Melodic Tom",
    "Synth Drum",
    "Reverse Cymbal",
    "Guitar Fret Noise",
    "Breath Noise",
    "Seashore",
    "Bird Tweet",
    "Telephone Ring",
    "Helicopter",
    "Applause",
    "Gunshot",
];

/// Which instruments an enumeration should include.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InstrumentFilter {
    pub ignore_atonal: bool,
    pub ignore_polyphonic: bool,
    pub ignore_highly_articulate: bool,

    /// Keep only the first surviving program of each category.
    pub take_only_first_category: bool,
}

impl Default for InstrumentFilter {
    fn default() -> Self {
        InstrumentFilter {
            ignore_atonal: true,
            ignore_polyphonic: true,
            ignore_highly_articulate: true,
            take_only_first_category: false,
        }
    }
}

/// The full GM table in program order.
pub fn all_instruments() -> Vec<Instrument> {
    (0..128u8)
        .map(|program| Instrument {
            program,
            name: GM_NAMES[program as usize],
            category: CATEGORIES[(program / 8) as usize],
        })
        .collect()
}

/// GM instruments surviving a filter, in program order.
pub fn instruments(filter: &InstrumentFilter) -> Vec<Instrument> {
    let mut kept = Vec::new();
    let mut seen_categories: Vec<&'static str> = Vec::new();
    for instrument in all_instruments() {
        if filter.ignore_atonal && instrument.is_atonal() {
            continue;
        }
        if filter.ignore_polyphonic && instrument.is_polyphonic() {
            continue;
        }
        if filter.ignore_highly_articulate && instrument.is_highly_articulate() {
            continue;
        }
        if filter.take_only_first_category {
            if seen_categories.contains(&instrument.category) {
                continue;
            }
            seen_categories.push(instrument.category);
        }
        kept.push(instrument);
    }
    kept
}
