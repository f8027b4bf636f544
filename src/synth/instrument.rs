use crate::dsp::Waveform;

/// A named waveform the player can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instrument {
    pub name: &'static str,
    pub waveform: Waveform,
}

impl Instrument {
    const fn new(name: &'static str, waveform: Waveform) -> Self {
        Self { name, waveform }
    }
}

/// The fixed instrument catalog, in selection order.
pub static INSTRUMENTS: &[Instrument] = &[
    Instrument::new("Electric Piano", Waveform::Piano),
    Instrument::new("8-Bit Square", Waveform::Square),
    Instrument::new("Synth Saw", Waveform::Saw),
    Instrument::new("Soft Flute", Waveform::Triangle),
    Instrument::new("Church Organ", Waveform::Organ),
    Instrument::new("Pure Sine", Waveform::Sine),
    Instrument::new("Gameboy Pulse", Waveform::Pulse),
    Instrument::new("Sci-Fi Noise", Waveform::Noise),
    Instrument::new("Glass Bell", Waveform::Bell),
    Instrument::new("Accordion", Waveform::Accordion),
    Instrument::new("FM Keys", Waveform::Fm),
    Instrument::new("Fuzz Lead", Waveform::Distortion),
    Instrument::new("Bit Crusher", Waveform::Crush),
    Instrument::new("Ring Mod", Waveform::RingMod),
    Instrument::new("Ghost Choir", Waveform::Ghost),
    Instrument::new("Wavefolder", Waveform::Wavefold),
    Instrument::new("Sub Bass", Waveform::SubBass),
    Instrument::new("PWM Strings", Waveform::Pwm),
];

/// Catalog plus the "current instrument" selection.
///
/// Selection only affects voices created afterwards; a voice binds its
/// waveform once, at creation.
#[derive(Debug, Clone)]
pub struct InstrumentBank {
    catalog: &'static [Instrument],
    current: usize,
}

impl InstrumentBank {
    /// Bank over the built-in catalog. Out-of-range indices wrap.
    pub fn new(initial: usize) -> Self {
        Self::with_catalog(INSTRUMENTS, initial)
    }

    /// Bank over a custom catalog. An empty catalog falls back to the built-in one.
    pub fn with_catalog(catalog: &'static [Instrument], initial: usize) -> Self {
        let catalog = if catalog.is_empty() { INSTRUMENTS } else { catalog };
        Self {
            catalog,
            current: initial % catalog.len(),
        }
    }

    pub fn current(&self) -> &'static Instrument {
        &self.catalog[self.current]
    }

    pub fn index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static Instrument> {
        self.catalog.iter()
    }

    /// Advance to the next instrument, wrapping at the end of the catalog.
    pub fn select_next(&mut self) -> &'static Instrument {
        self.current = (self.current + 1) % self.catalog.len();
        self.current()
    }

    /// Select by catalog position. Out-of-range indices wrap.
    pub fn select(&mut self, index: usize) -> &'static Instrument {
        self.current = index % self.catalog.len();
        self.current()
    }
}

impl Default for InstrumentBank {
    fn default() -> Self {
        Self::new(0)
    }
}
