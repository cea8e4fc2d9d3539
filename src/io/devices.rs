//! Output-device discovery.
//!
//! Thin wrapper over cpal's host/device enumeration so the binary can offer
//! `--list-devices` / `--device <index>`. Indices are positions in the
//! default host's output-device iteration, the same order `select_output`
//! resolves them in.

use color_eyre::eyre::{eyre, Result, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait};

/// One output-capable device, as shown by `--list-devices`.
pub struct OutputDevice {
    pub index: usize,
    pub name: String,
    pub channels: u16,
    pub sample_rate: u32,
}

/// Enumerate output-capable devices on the default host. Devices that fail
/// to report a default output config are skipped, not errors.
pub fn list_outputs() -> Result<Vec<OutputDevice>> {
    let host = cpal::default_host();
    let mut found = Vec::new();
    for (index, device) in host
        .output_devices()
        .wrap_err("failed to enumerate output devices")?
        .enumerate()
    {
        let name = device.name().unwrap_or_else(|_| String::from("<unknown>"));
        if let Ok(config) = device.default_output_config() {
            found.push(OutputDevice {
                index,
                name,
                channels: config.channels(),
                sample_rate: config.sample_rate().0,
            });
        }
    }
    Ok(found)
}

/// Resolve the output device to play on: an index from `--device`, or the
/// host default. A missing device is fatal at startup.
pub fn select_output(index: Option<usize>) -> Result<cpal::Device> {
    let host = cpal::default_host();
    match index {
        None => host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available")),
        Some(want) => host
            .output_devices()
            .wrap_err("failed to enumerate output devices")?
            .nth(want)
            .ok_or_else(|| eyre!("output device {want} not found (see --list-devices)")),
    }
}
