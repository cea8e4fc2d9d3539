//! Output stream construction.
//!
//! The backend hands the callback interleaved frames of whatever size it
//! likes; the callback chunks them through a `MAX_BLOCK_SIZE` scratch buffer,
//! renders mono blocks from the engine, and duplicates each sample to every
//! channel. Stream errors (underruns and the like) are reported and the
//! stream keeps running; there is nothing to retry in the realtime path.

use color_eyre::eyre::{eyre, Result, WrapErr};
use cpal::traits::DeviceTrait;
use cpal::{Device, SampleFormat, Stream, SupportedStreamConfig};

use crate::synth::Engine;
use crate::MAX_BLOCK_SIZE;

/// Fetch the device's default output config, the one the engine should be
/// constructed against.
pub fn default_config(device: &Device) -> Result<SupportedStreamConfig> {
    device
        .default_output_config()
        .wrap_err("failed to fetch default output config")
}

/// Build the output stream around `engine`. The engine moves into the
/// callback and is dropped with the stream.
pub fn build_stream(
    device: &Device,
    config: &SupportedStreamConfig,
    mut engine: Engine,
) -> Result<Stream> {
    if config.sample_format() != SampleFormat::F32 {
        return Err(eyre!(
            "unsupported output sample format {:?} (need f32)",
            config.sample_format()
        ));
    }
    let channels = config.channels() as usize;
    let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

    let stream = device
        .build_output_stream(
            &config.clone().into(),
            move |data: &mut [f32], _| {
                let total_frames = data.len() / channels;
                let mut written = 0;
                while written < total_frames {
                    let frames = (total_frames - written).min(MAX_BLOCK_SIZE);
                    let block = &mut render_buf[..frames];
                    engine.render_block(block);

                    // Mono to all channels.
                    let offset = written * channels;
                    for (i, &sample) in block.iter().enumerate() {
                        for ch in 0..channels {
                            data[offset + i * channels + ch] = sample;
                        }
                    }
                    written += frames;
                }
            },
            |err| eprintln!("audio stream error: {err}"),
            None,
        )
        .wrap_err("failed to build output stream")?;

    Ok(stream)
}
