//! On-screen keyboard: three rows of keys, lit while their voice sounds.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use piango::{Articulation, Snapshot};

use crate::keymap::{Note, ROWS};

const KEY_WIDTH: u16 = 7;
const LABEL_WIDTH: u16 = 6;
const ACCENT: Color = Color::Rgb(0, 230, 195);

/// Three rows of bordered keys, three lines each.
pub const HEIGHT: u16 = 9;

pub fn render_keyboard(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(ROWS.iter().map(|_| Constraint::Length(3)))
        .split(area);

    for (row, &row_area) in ROWS.iter().zip(rows.iter()) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(
                std::iter::once(Constraint::Length(LABEL_WIDTH))
                    .chain(row.notes.iter().map(|_| Constraint::Length(KEY_WIDTH)))
                    .chain(std::iter::once(Constraint::Min(0))),
            )
            .split(row_area);

        let label = Paragraph::new(vec![Line::raw(""), Line::raw(row.label)])
            .style(Style::default().fg(Color::Rgb(98, 114, 164)))
            .right_aligned();
        frame.render_widget(label, columns[0]);

        for (note, &key_area) in row.notes.iter().zip(&columns[1..]) {
            render_key(frame, key_area, note, key_state(snapshot, note));
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum KeyState {
    Idle,
    Held(Articulation),
    Releasing,
}

fn key_state(snapshot: &Snapshot, note: &Note) -> KeyState {
    let mut buf = [0u8; 4];
    let key: &str = note.key.encode_utf8(&mut buf);
    match snapshot.active.iter().find(|a| a.key.as_str() == key) {
        None => KeyState::Idle,
        Some(active) if active.releasing => KeyState::Releasing,
        Some(active) => KeyState::Held(active.articulation),
    }
}

fn render_key(frame: &mut Frame, area: Rect, note: &Note, state: KeyState) {
    let (border, body) = match state {
        KeyState::Idle => (
            Style::default().fg(Color::DarkGray),
            Style::default().fg(Color::Gray),
        ),
        KeyState::Held(Articulation::Sustained) => (
            Style::default().fg(ACCENT),
            Style::default()
                .fg(Color::Black)
                .bg(ACCENT)
                .add_modifier(Modifier::BOLD),
        ),
        KeyState::Held(Articulation::Staccato) => (
            Style::default().fg(Color::LightMagenta),
            Style::default()
                .fg(Color::Black)
                .bg(Color::LightMagenta)
                .add_modifier(Modifier::BOLD),
        ),
        KeyState::Releasing => (
            Style::default().fg(ACCENT),
            Style::default().fg(ACCENT),
        ),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border);
    let text = format!("{} {}", note.name, note.key.to_ascii_uppercase());
    let key = Paragraph::new(text).block(block).style(body).centered();
    frame.render_widget(key, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use piango::synth::ActiveKey;

    fn snapshot(active: Vec<ActiveKey>) -> Snapshot {
        Snapshot {
            active,
            instrument: "Electric Piano",
            voices: 0,
        }
    }

    fn active(key: &str, articulation: Articulation, releasing: bool) -> ActiveKey {
        ActiveKey {
            key: key.into(),
            frequency: 440.0,
            level: 0.5,
            articulation,
            releasing,
        }
    }

    #[test]
    fn states_follow_snapshot() {
        let h = &ROWS[1].notes[5];
        let a = &ROWS[1].notes[0];
        let z = &ROWS[2].notes[0];
        let snap = snapshot(vec![
            active("h", Articulation::Sustained, false),
            active("a", Articulation::Staccato, true),
        ]);

        assert_eq!(key_state(&snap, h), KeyState::Held(Articulation::Sustained));
        assert_eq!(key_state(&snap, a), KeyState::Releasing);
        assert_eq!(key_state(&snap, z), KeyState::Idle);
    }
}
