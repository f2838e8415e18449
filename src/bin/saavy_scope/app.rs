//! Audio device setup and session lifetime

use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    BufferSize, StreamConfig,
};
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};

use saavy_scope::{
    analysis::waveform_channel, synth::SoundDefinition, EngineConfig, RenderCallback,
    MAX_BLOCK_SIZE,
};

use crate::{
    assets,
    cli::Args,
    midi_input,
    ui::{SessionInfo, UiApp},
};

/// Frames of waveform history kept for drawing
const WAVEFORM_HISTORY: usize = 4096;
/// Block size assumed when the device does not report one
const DEFAULT_BLOCK_SIZE: usize = 512;

pub fn run(args: Args) -> EyreResult<()> {
    // Set up audio
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let supported = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = supported.sample_rate().0 as f64;
    let channels = supported.channels() as usize;

    let mut stream_config: StreamConfig = supported.into();
    let block_size = match args.block_size {
        Some(frames) => {
            stream_config.buffer_size = BufferSize::Fixed(frames);
            frames as usize
        }
        None => DEFAULT_BLOCK_SIZE,
    };

    let config = EngineConfig::default().with_stealing(args.stealing());
    let sample = assets::sampled_sound(args.sample.as_deref(), sample_rate)?;

    let (waveform_tap, waveform_view) =
        waveform_channel(config.waveform_ring_capacity, WAVEFORM_HISTORY);
    let (mut callback, handles) =
        RenderCallback::build(&config, sample_rate, SoundDefinition::Sine, waveform_tap)?;
    callback.prepare(block_size.min(MAX_BLOCK_SIZE), sample_rate, channels)?;

    let midi = args
        .midi_port
        .as_deref()
        .map(|port| midi_input::connect(port, handles.midi.clone()))
        .transpose()?;
    let (midi_connection, midi_port) = match midi {
        Some((connection, name)) => (Some(connection), Some(name)),
        None => (None, None),
    };

    let stream = device.build_output_stream(
        &stream_config,
        move |data: &mut [f32], _| callback.process_interleaved(data, channels),
        |err| log::error!("audio stream error: {err}"),
        None,
    )?;
    stream.play()?;
    log::info!("streaming at {sample_rate} Hz, {channels} channel(s)");

    let session = SessionInfo {
        sample_rate,
        channels,
        midi_port,
        stealing: config.stealing,
    };
    let mut app = UiApp::new(
        waveform_view,
        handles.spectrum,
        config.spectrum_refresh_hz,
        handles.sounds,
        sample,
        handles.midi,
        midi_connection,
        session,
    );

    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal);
    ratatui::restore();

    // Unregister the callback before the MIDI connection closes
    drop(stream);
    drop(app);
    log::info!("audio stopped");

    result
}
