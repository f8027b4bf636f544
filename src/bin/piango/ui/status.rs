//! Status bar widget - shows instrument, octave, voice count, and audio stats

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

/// Audio statistics for display
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    /// Compute audio stats from a buffer
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self::default();
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

pub struct Status<'a> {
    pub instrument: &'a str,
    pub octave: i32,
    pub voices: usize,
    pub sample_rate: u32,
    pub stats: AudioStats,
}

pub fn render_status(frame: &mut Frame, area: Rect, status: &Status) {
    let block = Block::default()
        .title(" piango ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(0, 230, 195)));

    let line = Line::from(vec![
        Span::styled(
            format!(" Preset: {}  ", status.instrument),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("Octave: {:+}  ", status.octave),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("Voices: {}  ", status.voices),
            Style::default().fg(if status.voices > 0 {
                Color::Green
            } else {
                Color::DarkGray
            }),
        ),
        Span::styled(
            format!("{:.1}kHz  ", status.sample_rate as f32 / 1000.0),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}", status.stats.peak, status.stats.rms),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}
