//! Application wiring: command-line flags, audio stream setup, UI handoff.

use std::io::stdout;
use std::sync::Arc;

use color_eyre::eyre::{eyre, Result};
use cpal::traits::StreamTrait;
use crossterm::event::{
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;

use clavier::io::{devices, output};
use clavier::keys::{DigitRowPolicy, KeyboardState};
use clavier::synth::{Engine, EngineConfig, StatusSnapshot, SynthParams};

use super::ui::UiApp;

/// Snapshots buffered between the audio thread and the UI. The UI only ever
/// wants the freshest one; a small ring is plenty.
const STATUS_RING_CAPACITY: usize = 64;

/// Command-line flags. Few enough that a hand-rolled parse beats a
/// dependency.
#[derive(Debug, Default)]
pub struct Args {
    pub list_devices: bool,
    pub device: Option<usize>,
    /// Override the digit-row collision rule: sound the note from either
    /// source instead of letting the numpad suppress the digit row.
    pub merge_digits: bool,
}

impl Args {
    pub fn parse() -> Result<Self> {
        let mut args = Args::default();
        let mut iter = std::env::args().skip(1);
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--list-devices" => args.list_devices = true,
                "--device" => {
                    let value = iter
                        .next()
                        .ok_or_else(|| eyre!("--device requires an index"))?;
                    args.device = Some(
                        value
                            .parse()
                            .map_err(|_| eyre!("--device: '{value}' is not an index"))?,
                    );
                }
                "--merge-digits" => args.merge_digits = true,
                other => {
                    return Err(eyre!(
                        "unknown argument '{other}' \
                         (expected --list-devices, --device <index>, --merge-digits)"
                    ))
                }
            }
        }
        Ok(args)
    }
}

/// Main application: owns the stream and runs the UI loop until Esc.
pub struct Clavier {
    args: Args,
}

impl Clavier {
    pub fn new(args: Args) -> Self {
        Self { args }
    }

    pub fn run(self) -> Result<()> {
        // Audio setup first: a missing device is fatal before any terminal
        // state has been touched.
        let device = devices::select_output(self.args.device)?;
        let config = output::default_config(&device)?;
        let sample_rate = config.sample_rate().0 as f32;

        let params = Arc::new(SynthParams::new());
        let keyboard = Arc::new(KeyboardState::new());
        let (status_tx, status_rx) =
            rtrb::RingBuffer::<StatusSnapshot>::new(STATUS_RING_CAPACITY);

        let engine_config = EngineConfig {
            sample_rate,
            digit_policy: if self.args.merge_digits {
                DigitRowPolicy::Merge
            } else {
                DigitRowPolicy::NumpadSuppresses
            },
            ..EngineConfig::default()
        };
        let mut engine =
            Engine::new(engine_config, Arc::clone(&params), Arc::clone(&keyboard));
        engine.set_status_sink(status_tx);

        let stream = output::build_stream(&device, &config, engine)?;
        stream.play()?;

        // Key-release reporting needs the kitty keyboard protocol; without
        // it the UI falls back to press-to-toggle notes.
        let release_supported =
            crossterm::terminal::supports_keyboard_enhancement().unwrap_or(false);

        let mut terminal = ratatui::init();
        if release_supported {
            execute!(
                stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }

        let mut app = UiApp::new(
            Arc::clone(&params),
            Arc::clone(&keyboard),
            status_rx,
            release_supported,
            sample_rate,
        );
        let result = app.run(&mut terminal);

        if release_supported {
            let _ = execute!(stdout(), PopKeyboardEnhancementFlags);
        }
        ratatui::restore();

        // Shutdown order: silence input, stop the stream, then let the
        // engine drop with it.
        keyboard.release_all();
        let _ = stream.pause();
        drop(stream);

        result
    }
}
