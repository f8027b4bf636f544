//! TUI module for piango
//!
//! Reads key activity, drives the engine's control tick, and draws the
//! keyboard, spectrum, and status bar.

mod keyboard;
mod spectrum;
mod status;

use std::time::{Duration, Instant};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::Consumer;
use tracing::debug;

use piango::{Articulation, Engine, Snapshot};

use crate::keymap::{self, OCTAVE_RANGE};
use keyboard::render_keyboard;
use spectrum::{render_spectrum, SpectrumAnalyzer};
use status::{render_status, AudioStats, Status};

/// Analysis window for the spectrum, in samples.
pub const SCOPE_LEN: usize = 1024;

const HELP: &str =
    " TAB: Instrument  •  SHIFT+KEY: Staccato  •  ↑/↓: Octave  •  SPACE: Silence  •  ESC: Quit";

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Action {
    Play {
        key: char,
        frequency: f64,
        articulation: Articulation,
    },
    NextInstrument,
    Silence,
    Octave(i32),
    Quit,
}

pub struct UiApp {
    engine: Engine,
    /// Mono tap from the audio callback
    scope_rx: Consumer<f32>,
    /// Most recent output samples, oldest first
    scope: Vec<f32>,
    analyzer: SpectrumAnalyzer,
    snapshot: Snapshot,
    octave: i32,
    sample_rate: u32,
    tick: Duration,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        engine: Engine,
        scope_rx: Consumer<f32>,
        sample_rate: u32,
        tick: Duration,
        octave: i32,
    ) -> Self {
        let analyzer = SpectrumAnalyzer::new(SCOPE_LEN, sample_rate as f32);
        let snapshot = engine.lock().snapshot();
        Self {
            engine,
            scope_rx,
            scope: Vec::with_capacity(SCOPE_LEN * 2),
            analyzer,
            snapshot,
            octave: octave.clamp(*OCTAVE_RANGE.start(), *OCTAVE_RANGE.end()),
            sample_rate,
            tick,
            should_quit: false,
        }
    }

    /// Run the UI event loop until the user quits.
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        let mut next_tick = Instant::now();

        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;

            let timeout = next_tick.saturating_duration_since(Instant::now());
            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    if let Some(action) = self.action_for(key) {
                        self.apply(action);
                    }
                }
            }

            let now = Instant::now();
            if now >= next_tick {
                self.on_tick();
                next_tick = now + self.tick;
            }
        }

        Ok(())
    }

    fn action_for(&self, key: KeyEvent) -> Option<Action> {
        // Auto-repeat is key activity too; only releases are ignored
        if key.kind == KeyEventKind::Release {
            return None;
        }

        match key.code {
            KeyCode::Esc => Some(Action::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::Quit)
            }
            KeyCode::Tab => Some(Action::NextInstrument),
            KeyCode::Char(' ') => Some(Action::Silence),
            KeyCode::Up => Some(Action::Octave(1)),
            KeyCode::Down => Some(Action::Octave(-1)),
            KeyCode::Char(c) => {
                let (note, mut articulation) = keymap::lookup(c)?;
                // Some terminals report shift as a modifier on a lowercase char
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    articulation = Articulation::Staccato;
                }
                Some(Action::Play {
                    key: note.key,
                    frequency: note.frequency(self.octave),
                    articulation,
                })
            }
            _ => None,
        }
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Play {
                key,
                frequency,
                articulation,
            } => {
                self.engine.trigger(key, frequency, articulation);
            }
            Action::NextInstrument => {
                self.engine.select_next_instrument();
                self.snapshot = self.engine.lock().snapshot();
            }
            Action::Silence => {
                self.engine.clear_all();
                self.snapshot = self.engine.lock().snapshot();
            }
            Action::Octave(step) => {
                self.octave =
                    (self.octave + step).clamp(*OCTAVE_RANGE.start(), *OCTAVE_RANGE.end());
                debug!(octave = self.octave, "octave changed");
            }
            Action::Quit => self.should_quit = true,
        }
    }

    fn on_tick(&mut self) {
        self.snapshot = self.engine.tick();

        self.poll_scope();
        self.analyzer.decay();
        if self.scope.len() == self.analyzer.window_len() {
            self.analyzer.update(&self.scope);
        }
    }

    /// Pull new samples from the ring, keeping the last window.
    fn poll_scope(&mut self) {
        while let Ok(sample) = self.scope_rx.pop() {
            self.scope.push(sample);
        }
        let window = self.analyzer.window_len();
        if self.scope.len() > window {
            let excess = self.scope.len() - window;
            self.scope.drain(..excess);
        }
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),                // Status bar
                Constraint::Length(9),                // Spectrum
                Constraint::Length(keyboard::HEIGHT), // Keys
                Constraint::Length(1),                // Help bar
                Constraint::Min(0),
            ])
            .split(frame.area());

        let status = Status {
            instrument: self.snapshot.instrument,
            octave: self.octave,
            voices: self.snapshot.voices,
            sample_rate: self.sample_rate,
            stats: AudioStats::from_buffer(&self.scope),
        };
        render_status(frame, chunks[0], &status);
        render_spectrum(frame, chunks[1], self.analyzer.bars());
        render_keyboard(frame, chunks[2], &self.snapshot);

        let help = Paragraph::new(HELP).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use piango::EngineConfig;
    use rtrb::RingBuffer;

    fn app() -> UiApp {
        let (_, rx) = RingBuffer::new(SCOPE_LEN);
        UiApp::new(
            Engine::new(EngineConfig::default()),
            rx,
            44_100,
            Duration::from_millis(30),
            0,
        )
    }

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn letters_map_to_notes() {
        let app = app();
        let action = app.action_for(press(KeyCode::Char('h'), KeyModifiers::NONE));
        assert_eq!(
            action,
            Some(Action::Play {
                key: 'h',
                frequency: 440.0,
                articulation: Articulation::Sustained,
            })
        );
        assert_eq!(
            app.action_for(press(KeyCode::Char('k'), KeyModifiers::NONE)),
            None
        );
    }

    #[test]
    fn shift_plays_staccato() {
        let app = app();
        for event in [
            press(KeyCode::Char('H'), KeyModifiers::NONE),
            press(KeyCode::Char('h'), KeyModifiers::SHIFT),
        ] {
            match app.action_for(event) {
                Some(Action::Play { key, articulation, .. }) => {
                    assert_eq!(key, 'h');
                    assert_eq!(articulation, Articulation::Staccato);
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn control_keys() {
        let app = app();
        let action = |code, modifiers| app.action_for(press(code, modifiers));
        assert_eq!(action(KeyCode::Esc, KeyModifiers::NONE), Some(Action::Quit));
        assert_eq!(
            action(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Some(Action::Quit)
        );
        assert_eq!(
            action(KeyCode::Tab, KeyModifiers::NONE),
            Some(Action::NextInstrument)
        );
        assert_eq!(
            action(KeyCode::Char(' '), KeyModifiers::NONE),
            Some(Action::Silence)
        );
    }

    #[test]
    fn octave_is_clamped() {
        let mut app = app();
        for _ in 0..5 {
            app.apply(Action::Octave(1));
        }
        assert_eq!(app.octave, 2);
        let action = app.action_for(press(KeyCode::Char('h'), KeyModifiers::NONE));
        assert!(matches!(action, Some(Action::Play { frequency, .. }) if frequency == 1760.0));
    }

    #[test]
    fn play_and_silence_reach_engine() {
        let mut app = app();
        app.apply(Action::Play {
            key: 'h',
            frequency: 440.0,
            articulation: Articulation::Sustained,
        });
        assert_eq!(app.engine.voice_count(), 1);

        app.on_tick();
        assert!(app.snapshot.is_active("h"));

        app.apply(Action::Silence);
        assert_eq!(app.engine.voice_count(), 0);
        assert!(app.snapshot.active.is_empty());
    }

    #[test]
    fn tab_cycles_instrument() {
        let mut app = app();
        let first = app.snapshot.instrument;
        app.apply(Action::NextInstrument);
        assert_ne!(app.snapshot.instrument, first);
    }
}
