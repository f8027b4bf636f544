//! Spectrum bars
//!
//! FFT of the most recent output window, folded into log-spaced bars between
//! 100 Hz and 4 kHz (the range the keyboard covers, with a few harmonics).
//! Bars jump up instantly and fall back with a fixed decay per frame, which
//! reads better than raw per-frame magnitudes.

use std::sync::Arc;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};

pub const BARS: usize = 42;
const MIN_FREQ: f64 = 100.0;
const MAX_FREQ: f64 = 4000.0;
/// Fraction of the bar kept per UI frame.
const DECAY: f64 = 0.82;
/// Magnitudes at or below this map to an empty bar.
const FLOOR_DB: f64 = -60.0;
/// Half height of the mirrored display, in rows.
const HALF_ROWS: i32 = 3;

pub struct SpectrumAnalyzer {
    window: Vec<f32>,
    /// FFT bin range feeding each bar
    ranges: Vec<(usize, usize)>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// Bar heights (0.0 - 1.0)
    bars: Vec<f64>,
}

impl SpectrumAnalyzer {
    pub fn new(buffer_len: usize, sample_rate: f32) -> Self {
        let buffer_len = buffer_len.max(16);
        let fft = FftPlanner::new().plan_fft_forward(buffer_len);

        // Hann window
        let denom = (buffer_len - 1) as f32;
        let window = (0..buffer_len)
            .map(|i| 0.5 * (1.0 - (std::f32::consts::TAU * i as f32 / denom).cos()))
            .collect();

        let half = buffer_len / 2;
        let max_freq = MAX_FREQ.min(sample_rate as f64 / 2.0);
        let to_bin = |freq: f64| {
            ((freq * buffer_len as f64 / sample_rate as f64).round() as usize).clamp(1, half - 1)
        };
        let ranges = (0..BARS)
            .map(|i| {
                let lo = log_freq(i as f64 / BARS as f64, max_freq);
                let hi = log_freq((i + 1) as f64 / BARS as f64, max_freq);
                let start = to_bin(lo);
                (start, to_bin(hi).max(start + 1))
            })
            .collect();

        Self {
            window,
            ranges,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); buffer_len],
            bars: vec![0.0; BARS],
        }
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    /// Analyse a full window of samples. Other lengths are ignored.
    pub fn update(&mut self, buffer: &[f32]) {
        if buffer.len() != self.window.len() {
            return;
        }

        for ((slot, sample), w) in self.scratch.iter_mut().zip(buffer).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        // Normalise so a full-scale sine lands near 0 dB
        let norm = 4.0 / (self.window.len() as f32 * self.window.len() as f32);
        for (bar, &(start, end)) in self.bars.iter_mut().zip(&self.ranges) {
            let power = self.scratch[start..end]
                .iter()
                .map(|c| c.norm_sqr() * norm)
                .fold(0.0f32, f32::max)
                .max(1e-12);
            let db = 10.0 * (power as f64).log10();
            let level = ((db - FLOOR_DB) / -FLOOR_DB).clamp(0.0, 1.0);
            *bar = level.max(*bar);
        }
    }

    /// Let every bar fall by one frame's decay.
    pub fn decay(&mut self) {
        for bar in &mut self.bars {
            *bar *= DECAY;
        }
    }

    pub fn bars(&self) -> &[f64] {
        &self.bars
    }
}

/// Frequency at position `t` (0.0 - 1.0) on a log axis.
fn log_freq(t: f64, max_freq: f64) -> f64 {
    MIN_FREQ * (max_freq / MIN_FREQ).powf(t)
}

/// Glyph for one cell of a mirrored bar display.
///
/// `row` counts outward from the centre line (0); positive rows are above.
fn cell(height: f64, row: i32) -> char {
    let h = height * HALF_ROWS as f64;
    let distance = row.abs() as f64;
    if row == 0 {
        return if h > 0.1 { '█' } else { '━' };
    }
    if h >= distance {
        '█'
    } else if h >= distance - 0.5 {
        if row > 0 {
            '▄'
        } else {
            '▀'
        }
    } else {
        ' '
    }
}

/// Render the bars mirrored around a centre line.
pub fn render_spectrum(frame: &mut Frame, area: Rect, bars: &[f64]) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);

    let lines: Vec<Line> = (-HALF_ROWS..=HALF_ROWS)
        .rev()
        .map(|row| {
            let text: String = bars
                .iter()
                .flat_map(|&height| [cell(height, row), ' '])
                .collect();
            Line::from(text)
        })
        .collect();

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().fg(Color::Cyan))
        .centered();
    frame.render_widget(paragraph, area);
}
