//! TUI for clavier: status view plus the keyboard control surface.
//!
//! The event loop is also the input-capture thread: crossterm press/release
//! events keep the shared held-key state current while the audio thread
//! renders from block-level snapshots of it. The status pane is driven by
//! snapshots the audio callback pushes through an rtrb ring, so nothing
//! here ever touches the realtime path directly.

use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyEventState};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    DefaultTerminal, Frame,
};
use rtrb::Consumer;

use clavier::dsp::Waveform;
use clavier::keys::{key_for_char, note_names, KeyboardState};
use clavier::synth::{StatusSnapshot, SynthParams};

/// UI application state
pub struct UiApp {
    params: Arc<SynthParams>,
    keyboard: Arc<KeyboardState>,
    status_rx: Consumer<StatusSnapshot>,
    /// Latest snapshot received from the audio thread.
    current: StatusSnapshot,
    /// Whether the terminal reports key releases (kitty protocol). Without
    /// it, note keys toggle on press instead of sounding while held.
    release_supported: bool,
    sample_rate: f32,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        params: Arc<SynthParams>,
        keyboard: Arc<KeyboardState>,
        status_rx: Consumer<StatusSnapshot>,
        release_supported: bool,
        sample_rate: f32,
    ) -> Self {
        Self {
            params,
            keyboard,
            status_rx,
            current: StatusSnapshot::default(),
            release_supported,
            sample_rate,
            should_quit: false,
        }
    }

    /// Run the UI event loop until Esc.
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_status();

            terminal.draw(|frame| self.render(frame))?;

            // Non-blocking input poll, ~60fps refresh.
            if event::poll(Duration::from_millis(16))? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key),
                    // Releases never arrive for keys dropped on focus loss.
                    Event::FocusLost => self.keyboard.release_all(),
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Drain the status ring, keeping only the freshest snapshot.
    fn poll_status(&mut self) {
        while let Ok(status) = self.status_rx.pop() {
            self.current = status;
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let numpad = key.state.contains(KeyEventState::KEYPAD);
        match key.kind {
            KeyEventKind::Press => self.handle_press(key.code, numpad),
            KeyEventKind::Release => self.handle_release(key.code, numpad),
            // A repeat means the key is still down; the held set already
            // reflects that.
            KeyEventKind::Repeat => {}
        }
    }

    fn handle_press(&mut self, code: KeyCode, numpad: bool) {
        match code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Up => self.params.adjust_amplitude(0.05),
            KeyCode::Down => self.params.adjust_amplitude(-0.05),

            KeyCode::F(1) => self.params.set_waveform(Waveform::Sine),
            KeyCode::F(2) => self.params.set_waveform(Waveform::Square),
            KeyCode::F(3) => self.params.set_waveform(Waveform::Triangle),
            KeyCode::F(4) => self.params.set_waveform(Waveform::Sawtooth),
            KeyCode::F(5) => {
                self.params.toggle_reverb();
            }
            KeyCode::F(6) => {
                self.params.toggle_chorus();
            }
            KeyCode::F(7) => {
                self.params.toggle_delay();
            }

            KeyCode::Char(ch) if numpad => {
                if let Some(digit) = ch.to_digit(10) {
                    self.keyboard.press_numpad(digit as u8);
                    self.numpad_control(digit as u8);
                }
            }
            KeyCode::Char(ch) => self.note_down(ch),
            _ => {}
        }
    }

    fn handle_release(&mut self, code: KeyCode, numpad: bool) {
        match code {
            KeyCode::Char(ch) if numpad => {
                if let Some(digit) = ch.to_digit(10) {
                    self.keyboard.release_numpad(digit as u8);
                }
            }
            KeyCode::Char(ch) => {
                if self.release_supported {
                    self.keyboard.release_char(ch);
                }
            }
            _ => {}
        }
    }

    /// Numpad doubles as the control surface: 1-4 select the waveform,
    /// 5/6/7 toggle reverb/chorus/delay.
    fn numpad_control(&mut self, digit: u8) {
        match digit {
            1 => self.params.set_waveform(Waveform::Sine),
            2 => self.params.set_waveform(Waveform::Square),
            3 => self.params.set_waveform(Waveform::Triangle),
            4 => self.params.set_waveform(Waveform::Sawtooth),
            5 => {
                self.params.toggle_reverb();
            }
            6 => {
                self.params.toggle_chorus();
            }
            7 => {
                self.params.toggle_delay();
            }
            _ => {}
        }
    }

    fn note_down(&mut self, ch: char) {
        if self.release_supported {
            self.keyboard.press_char(ch);
        } else if let Some(idx) = key_for_char(ch) {
            // No release events: a second press of a held key releases it.
            if self.keyboard.snapshot().notes & (1 << idx) != 0 {
                self.keyboard.release_char(ch);
            } else {
                self.keyboard.press_char(ch);
            }
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(9), // keyboard layout / instructions
                Constraint::Length(3), // notes + peak
                Constraint::Length(3), // volume gauge
                Constraint::Length(3), // waveform + effects
                Constraint::Min(0),
                Constraint::Length(1), // help bar
            ])
            .split(area);

        self.render_instructions(frame, chunks[0]);
        self.render_notes(frame, chunks[1]);
        self.render_volume(frame, chunks[2]);
        self.render_synth_state(frame, chunks[3]);
        self.render_help(frame, chunks[5]);
    }

    fn render_instructions(&self, frame: &mut Frame, area: ratatui::layout::Rect) {
        let dim = Style::default().fg(Color::DarkGray);
        let text = vec![
            Line::from("  Lower octave (white): z x c v b n m"),
            Line::from("  Lower octave (black): s d g h j"),
            Line::from("  Upper octave (white): q w e r t y u i"),
            Line::from("  Upper octave (black): 2 3 5 6 7"),
            Line::from("  Volume: up/down arrows"),
            Line::from("  Wave: numpad 1-4 or F1-F4 (sine, square, triangle, saw)"),
            Line::from("  Effects: numpad 5/6/7 or F5/F6/F7 (reverb, chorus, delay)"),
        ];
        let block = Block::default()
            .title(format!(" clavier @ {:.1}kHz ", self.sample_rate / 1000.0))
            .borders(Borders::ALL);
        frame.render_widget(Paragraph::new(text).style(dim).block(block), area);
    }

    fn render_notes(&self, frame: &mut Frame, area: ratatui::layout::Rect) {
        let names: Vec<&str> = note_names(self.current.held).collect();
        let notes = if names.is_empty() {
            String::from("(none)")
        } else {
            names.join(", ")
        };
        let line = Line::from(vec![
            Span::styled("Notes: ", Style::default().fg(Color::White)),
            Span::styled(notes, Style::default().fg(Color::Green)),
            Span::styled(
                format!("  |  Peak: {:.2}", self.current.peak),
                Style::default().fg(Color::Magenta),
            ),
        ]);
        let block = Block::default().title(" Now playing ").borders(Borders::ALL);
        frame.render_widget(Paragraph::new(line).block(block), area);
    }

    fn render_volume(&self, frame: &mut Frame, area: ratatui::layout::Rect) {
        let amplitude = self.current.amplitude.clamp(0.0, 1.0);
        let gauge = Gauge::default()
            .block(Block::default().title(" Volume ").borders(Borders::ALL))
            .gauge_style(Style::default().fg(Color::Cyan))
            .ratio(f64::from(amplitude))
            .label(format!("{amplitude:.2}"));
        frame.render_widget(gauge, area);
    }

    fn render_synth_state(&self, frame: &mut Frame, area: ratatui::layout::Rect) {
        let on_off = |on: bool| {
            if on {
                Span::styled("ON", Style::default().fg(Color::Green))
            } else {
                Span::styled("off", Style::default().fg(Color::DarkGray))
            }
        };
        let line = Line::from(vec![
            Span::styled("Wave: ", Style::default().fg(Color::White)),
            Span::styled(
                self.current.waveform.name(),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw("   Reverb: "),
            on_off(self.current.reverb_on),
            Span::raw("   Chorus: "),
            on_off(self.current.chorus_on),
            Span::raw("   Delay: "),
            on_off(self.current.delay_on),
        ]);
        let block = Block::default().title(" Synth ").borders(Borders::ALL);
        frame.render_widget(Paragraph::new(line).block(block), area);
    }

    fn render_help(&self, frame: &mut Frame, area: ratatui::layout::Rect) {
        let help = if self.release_supported {
            " Hold keys to play. [Esc] Quit"
        } else {
            " No key-release events in this terminal: note keys toggle. [Esc] Quit"
        };
        frame.render_widget(
            Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
            area,
        );
    }
}
