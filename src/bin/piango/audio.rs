//! Audio output: opens the default device and drives the engine from the
//! device callback.

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    BufferSize, Device, Stream, StreamConfig,
};
use piango::{Engine, EngineConfig};
use rtrb::{Consumer, Producer, PushError, RingBuffer};
use tracing::{error, info, warn};

/// Capacity of the audio to UI ring, in analysis windows.
const SCOPE_RING_BLOCKS: usize = 8;

/// A running output stream plus the tap feeding the visualiser.
pub struct AudioOutput {
    // Dropping the stream stops playback
    _stream: Stream,
    pub sample_rate: u32,
    pub scope_rx: Consumer<f32>,
}

/// Pick the default output device and align the engine config with it.
pub fn open_device(config: &mut EngineConfig) -> EyreResult<(Device, StreamConfig)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let supported = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    config.sample_rate = supported.sample_rate().0;
    config
        .validate()
        .wrap_err("device sample rate is not usable")?;

    let mut stream_config: StreamConfig = supported.into();
    stream_config.buffer_size = BufferSize::Fixed(config.buffer_frames());
    Ok((device, stream_config))
}

/// Start rendering `engine` to `device`.
///
/// Tries the configured buffer length first and falls back to the device
/// default if the backend rejects it.
pub fn start(
    engine: Engine,
    device: &Device,
    stream_config: StreamConfig,
    scope_len: usize,
) -> EyreResult<AudioOutput> {
    let capacity = scope_len * SCOPE_RING_BLOCKS;
    let sample_rate = stream_config.sample_rate.0;
    let channels = stream_config.channels;

    let (scope_tx, scope_rx) = RingBuffer::<f32>::new(capacity);
    let (stream, scope_rx) = match build(device, &stream_config, engine.clone(), scope_tx) {
        Ok(stream) => (stream, scope_rx),
        Err(err) => {
            warn!(%err, "fixed buffer size rejected, using device default");
            let fallback = StreamConfig {
                buffer_size: BufferSize::Default,
                ..stream_config
            };
            let (scope_tx, scope_rx) = RingBuffer::<f32>::new(capacity);
            let stream = build(device, &fallback, engine, scope_tx)
                .wrap_err("failed to build output stream")?;
            (stream, scope_rx)
        }
    };

    stream.play().wrap_err("failed to start output stream")?;
    info!(sample_rate, channels, "audio stream started");

    Ok(AudioOutput {
        _stream: stream,
        sample_rate,
        scope_rx,
    })
}

fn build(
    device: &Device,
    stream_config: &StreamConfig,
    engine: Engine,
    mut scope_tx: Producer<f32>,
) -> Result<Stream, cpal::BuildStreamError> {
    let channels = stream_config.channels as usize;

    device.build_output_stream(
        stream_config,
        move |data: &mut [f32], _| {
            engine.render_interleaved(data, channels);

            // Mono tap for the visualiser, dropped on overflow
            for frame in data.chunks_exact(channels.max(1)) {
                let sample = match frame {
                    [mono] => *mono,
                    [left, right, ..] => (left + right) * 0.5,
                    [] => 0.0,
                };
                if let Err(PushError::Full(_)) = scope_tx.push(sample) {
                    break;
                }
            }
        },
        |err| error!(%err, "audio stream error"),
        None,
    )
}
