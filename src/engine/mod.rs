//! Realtime render callback.
//!
//! [`RenderCallback`] is the one object the audio device drives. Each call
//! clears its scratch block, pulls the MIDI due in that window, renders the
//! synth, feeds channel 0 to the spectrum tap, hands a scaled copy to the
//! waveform sink and copies the block to the device channels.
//!
//! Device blocks larger than the prepared capacity are rendered in chunks.
//! Nothing here allocates, locks or panics once [`RenderCallback::prepare`]
//! has returned.

use crate::{
    analysis::{AnalyzerTap, DisplaySink, SpectralAnalyzer},
    config::EngineConfig,
    error::{Error, Result},
    io::{
        buffer::AudioBuffer,
        collector::{MidiEventCollector, MidiInputHandle},
    },
    synth::{PolySynth, SoundBank, SoundDefinition, SoundSwitch},
    MAX_BLOCK_SIZE,
};

/// Opaque per-call token from the device layer. The callback ignores it.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceContext;

/// Non-realtime ends of the pipeline, returned by [`RenderCallback::build`].
pub struct EngineHandles {
    pub midi: MidiInputHandle,
    pub spectrum: SpectralAnalyzer,
    pub sounds: SoundSwitch,
}

pub struct RenderCallback<D: DisplaySink> {
    synth: PolySynth,
    collector: MidiEventCollector,
    analyzer: AnalyzerTap,
    display: D,
    buffer: AudioBuffer,
    display_buffer: AudioBuffer,
    display_scale: f32,
    prepared: bool,
}

impl<D: DisplaySink> RenderCallback<D> {
    pub fn new(
        synth: PolySynth,
        collector: MidiEventCollector,
        analyzer: AnalyzerTap,
        display: D,
        display_scale: f32,
    ) -> Self {
        Self {
            synth,
            collector,
            analyzer,
            display,
            buffer: AudioBuffer::default(),
            display_buffer: AudioBuffer::default(),
            display_scale,
            prepared: false,
        }
    }

    /// Wire up synth, collector and analyzer from `config`.
    pub fn build(
        config: &EngineConfig,
        sample_rate: f64,
        initial_sound: SoundDefinition,
        display: D,
    ) -> Result<(Self, EngineHandles)> {
        if !(sample_rate > 0.0) {
            return Err(Error::InvalidSampleRate(sample_rate));
        }

        let (bank, sounds) = SoundBank::new(initial_sound);
        let synth = PolySynth::new(config, sample_rate, bank);
        let (collector, midi) = MidiEventCollector::new(config.midi_queue_capacity, sample_rate);
        let (spectrum, analyzer) = SpectralAnalyzer::new(config.fft_order, config.scope_size)?;

        let callback = Self::new(synth, collector, analyzer, display, config.display_scale);
        let handles = EngineHandles {
            midi,
            spectrum,
            sounds,
        };

        Ok((callback, handles))
    }

    /// Allocate block storage and set the render rate. Must be called before
    /// streaming starts and again whenever the device configuration changes.
    pub fn prepare(
        &mut self,
        expected_block_size: usize,
        sample_rate: f64,
        output_channels: usize,
    ) -> Result<()> {
        if expected_block_size == 0 {
            return Err(Error::EmptyBlock);
        }
        if !(sample_rate > 0.0) {
            return Err(Error::InvalidSampleRate(sample_rate));
        }
        if output_channels == 0 {
            return Err(Error::NoChannels);
        }

        let capacity = expected_block_size.min(MAX_BLOCK_SIZE);
        self.buffer = AudioBuffer::new(output_channels, capacity);
        self.display_buffer = AudioBuffer::new(output_channels, capacity);
        self.synth.set_sample_rate(sample_rate);
        self.collector.reset(sample_rate);
        self.prepared = true;

        log::info!(
            "render callback prepared: {sample_rate} Hz, {output_channels} channel(s), \
             {capacity}-frame blocks"
        );
        Ok(())
    }

    /// Hard teardown: cut every voice and return to the unprepared state.
    pub fn stop(&mut self) {
        self.synth.clear_voices();
        self.prepared = false;
        log::info!("render callback stopped");
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    pub fn synth(&self) -> &PolySynth {
        &self.synth
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Render one chunk of at most the prepared capacity into `self.buffer`.
    fn render_chunk(&mut self, frames: usize) {
        self.buffer.set_len(frames);
        self.buffer.clear();

        let events = self.collector.consume_block(frames);
        self.synth.render_next_block(&mut self.buffer, events, 0, frames);

        for &sample in self.buffer.channel(0) {
            self.analyzer.push_sample(sample);
        }

        self.display_buffer
            .copy_scaled_from(&self.buffer, self.display_scale);
        self.display.push_block(&self.display_buffer);
    }

    /// Planar device boundary. Inputs are accepted and ignored; absent
    /// outputs are skipped and channels past the prepared count are zeroed.
    pub fn process(
        &mut self,
        _inputs: &[Option<&[f32]>],
        outputs: &mut [Option<&mut [f32]>],
        num_frames: usize,
        _context: &DeviceContext,
    ) {
        if !self.prepared {
            for output in outputs.iter_mut().flatten() {
                let len = num_frames.min(output.len());
                output[..len].fill(0.0);
            }
            return;
        }

        let capacity = self.buffer.capacity();
        let mut written = 0;
        while written < num_frames {
            let frames = (num_frames - written).min(capacity);
            self.render_chunk(frames);

            for (ch, output) in outputs.iter_mut().enumerate() {
                let Some(output) = output else {
                    continue;
                };
                // Short outputs take the prefix that fits
                let fits = output.len().saturating_sub(written).min(frames);
                let dest = &mut output[written..written + fits];
                if ch < self.buffer.num_channels() {
                    dest.copy_from_slice(&self.buffer.channel(ch)[..fits]);
                } else {
                    dest.fill(0.0);
                }
            }

            written += frames;
        }
    }

    /// Interleaved device boundary, as delivered by `cpal`.
    pub fn process_interleaved(&mut self, data: &mut [f32], channels: usize) {
        if !self.prepared || channels == 0 {
            data.fill(0.0);
            return;
        }

        let total_frames = data.len() / channels;
        let capacity = self.buffer.capacity();
        let mut written = 0;

        while written < total_frames {
            let frames = (total_frames - written).min(capacity);
            self.render_chunk(frames);

            let out = &mut data[written * channels..(written + frames) * channels];
            for (i, frame) in out.chunks_exact_mut(channels).enumerate() {
                for (ch, slot) in frame.iter_mut().enumerate() {
                    *slot = self.buffer.channel(ch).get(i).copied().unwrap_or(0.0);
                }
            }

            written += frames;
        }

        // Trailing partial frame
        data[total_frames * channels..].fill(0.0);
    }
}
