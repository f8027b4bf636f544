//! Computer keyboard to pitch mapping.
//!
//! Three rows of seven keys, each row a diatonic scale. The home row is the
//! middle register with `h` on A4; the row above sits an octave higher and
//! the row below an octave lower. Holding shift plays the same note
//! staccato.

use piango::Articulation;

/// Concert pitch for A4.
pub const A4: f64 = 440.0;

/// Octave transposition range reachable with the arrow keys.
pub const OCTAVE_RANGE: std::ops::RangeInclusive<i32> = -2..=2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub key: char,
    pub name: &'static str,
    /// Semitones relative to A4
    pub semitones: i32,
}

impl Note {
    const fn new(key: char, name: &'static str, semitones: i32) -> Self {
        Self {
            key,
            name,
            semitones,
        }
    }

    /// Equal-tempered frequency, shifted by `octave` octaves.
    pub fn frequency(&self, octave: i32) -> f64 {
        A4 * 2f64.powf(self.semitones as f64 / 12.0 + octave as f64)
    }
}

pub struct Row {
    pub label: &'static str,
    pub notes: [Note; 7],
}

pub static ROWS: [Row; 3] = [
    Row {
        label: "High",
        notes: [
            Note::new('q', "Do", 3),
            Note::new('w', "Re", 5),
            Note::new('e', "Mi", 7),
            Note::new('r', "Fa", 8),
            Note::new('t', "Sol", 10),
            Note::new('y', "La", 12),
            Note::new('u', "Si", 14),
        ],
    },
    Row {
        label: "Mid",
        notes: [
            Note::new('a', "Do", -9),
            Note::new('s', "Re", -7),
            Note::new('d', "Mi", -5),
            Note::new('f', "Fa", -4),
            Note::new('g', "Sol", -2),
            Note::new('h', "La", 0),
            Note::new('j', "Si", 2),
        ],
    },
    Row {
        label: "Low",
        notes: [
            Note::new('z', "Do", -21),
            Note::new('x', "Re", -19),
            Note::new('c', "Mi", -17),
            Note::new('v', "Fa", -16),
            Note::new('b', "Sol", -14),
            Note::new('n', "La", -12),
            Note::new('m', "Si", -10),
        ],
    },
];

/// Resolve a typed character to its note and articulation.
///
/// Uppercase means shift was held, which selects staccato.
pub fn lookup(c: char) -> Option<(&'static Note, Articulation)> {
    let articulation = if c.is_uppercase() {
        Articulation::Staccato
    } else {
        Articulation::Sustained
    };
    let key = c.to_ascii_lowercase();
    ROWS.iter()
        .flat_map(|row| row.notes.iter())
        .find(|note| note.key == key)
        .map(|note| (note, articulation))
}
