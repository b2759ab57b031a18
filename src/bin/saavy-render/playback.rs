//! Live playback to the default output device (feature `playback`).

use std::{thread, time::Duration};

use color_eyre::eyre::Result;
use saavy_render::render::EventSender;

use crate::{bend_at, Band};

/// Post bends from a separate thread, the way a controller or UI would.
pub fn spawn_bend_thread(mut bends: EventSender) {
    thread::spawn(move || {
        let mut block = 0;
        while bends.is_connected() {
            if bends.send(bend_at(block)).is_err() {
                log::warn!("bend queue full, dropping bend");
            }
            block += 8;
            thread::sleep(Duration::from_millis(40));
        }
    });
}

#[cfg(feature = "playback")]
pub fn play<F>(make_band: F) -> Result<()>
where
    F: FnOnce(f32) -> Result<Band>,
{
    use color_eyre::eyre::{eyre, WrapErr};
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;
    println!("Sample rate: {sample_rate} Hz");
    println!("Channels: {channels}");

    let mut band = make_band(sample_rate)?;

    // Device callbacks ask for arbitrary lengths; serve them from whole blocks
    let mut fifo = vec![0.0f32; 2 * band.block_frames()];
    let mut read = fifo.len();

    let stream = device
        .build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                for frame in data.chunks_mut(channels) {
                    if read >= fifo.len() {
                        band.render_block(&mut fifo);
                        read = 0;
                    }
                    let (left, right) = (fifo[read], fifo[read + 1]);
                    read += 2;
                    for (ch, sample) in frame.iter_mut().enumerate() {
                        *sample = if ch % 2 == 0 { left } else { right };
                    }
                }
            },
            |err| log::error!("audio stream error: {err}"),
            None,
        )
        .wrap_err("failed to build output stream")?;

    stream.play().wrap_err("failed to start output stream")?;
    println!("Playing... Press Ctrl+C to stop");

    loop {
        thread::sleep(Duration::from_millis(100));
    }
}

#[cfg(not(feature = "playback"))]
pub fn play<F>(_make_band: F) -> Result<()>
where
    F: FnOnce(f32) -> Result<Band>,
{
    Err(color_eyre::eyre::eyre!(
        "built without audio output, rebuild with `--features playback`"
    ))
}
