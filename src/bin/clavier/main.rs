//! clavier - terminal polyphonic keyboard synthesizer
//!
//! Run with: cargo run
//!
//! Hold letter keys to play, arrow keys for volume, numpad (or F-keys) for
//! waveform and effects, Esc to quit. `--list-devices` prints the available
//! output devices; `--device <index>` picks one.

mod app;
mod ui;

use app::{Args, Clavier};
use clavier::io::devices;
use color_eyre::eyre::Result;

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse()?;
    if args.list_devices {
        let outputs = devices::list_outputs()?;
        if outputs.is_empty() {
            println!("No output devices found.");
        } else {
            println!("Available output devices:");
            for dev in outputs {
                println!(
                    "  {}: {} ({} ch, {} Hz)",
                    dev.index, dev.name, dev.channels, dev.sample_rate
                );
            }
        }
        return Ok(());
    }

    Clavier::new(args).run()
}
