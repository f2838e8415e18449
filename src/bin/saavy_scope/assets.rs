//! Sample loading for the sampled sound.

use std::{f64::consts::TAU, path::Path};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use saavy_scope::{
    io::converter::midi_note_to_freq,
    synth::{sound::DEFAULT_ROOT_NOTE, DecodedAudio, SampledSound},
};

/// Decode a WAV file into planar f32 channels.
pub fn load_wav(path: &Path) -> EyreResult<DecodedAudio> {
    let reader = hound::WavReader::open(path)
        .wrap_err_with(|| format!("failed to open {}", path.display()))?;
    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 {
        return Err(eyre!("{} has no channels", path.display()));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()
            .wrap_err("failed to decode float samples")?,
        hound::SampleFormat::Int => {
            let full_scale = (1i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|s| s as f32 / full_scale))
                .collect::<Result<_, _>>()
                .wrap_err("failed to decode integer samples")?
        }
    };

    let mut planar = vec![Vec::with_capacity(interleaved.len() / channels); channels];
    for frame in interleaved.chunks_exact(channels) {
        for (channel, &sample) in planar.iter_mut().zip(frame) {
            channel.push(sample);
        }
    }

    log::info!(
        "loaded {}: {} Hz, {} channel(s), {} frames",
        path.display(),
        spec.sample_rate,
        channels,
        planar[0].len()
    );

    Ok(DecodedAudio {
        sample_rate: spec.sample_rate as f64,
        channels: planar,
    })
}

/// A decaying bell-like tone pitched on the default root note, used when no
/// sample file is given.
pub fn demo_tone(sample_rate: f64) -> DecodedAudio {
    let freq = midi_note_to_freq(DEFAULT_ROOT_NOTE);
    let frames = (sample_rate * 2.0) as usize;
    let partials = [(1.0, 0.6), (2.0, 0.25), (3.01, 0.1), (4.2, 0.05)];

    let samples = (0..frames)
        .map(|i| {
            let t = i as f64 / sample_rate;
            let tone: f64 = partials
                .iter()
                .map(|&(ratio, gain)| gain * (TAU * freq * ratio * t).sin() * (-t * 2.5 * ratio).exp())
                .sum();
            tone as f32
        })
        .collect();

    DecodedAudio::mono(sample_rate, samples)
}

pub fn sampled_sound(path: Option<&Path>, sample_rate: f64) -> EyreResult<SampledSound> {
    let (name, audio) = match path {
        Some(path) => {
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "sample".to_owned());
            (name, load_wav(path)?)
        }
        None => ("bell".to_owned(), demo_tone(sample_rate)),
    };

    Ok(SampledSound::with_defaults(name, audio)?)
}
