use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use rtrb::{Consumer, Producer, RingBuffer};

use crate::io::buffer::AudioBuffer;

/// Receives a copy of every rendered block. Called on the audio thread.
pub trait DisplaySink: Send {
    fn push_block(&mut self, block: &AudioBuffer);
}

/// Sink that discards everything, for headless rendering.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDisplay;

impl DisplaySink for NullDisplay {
    fn push_block(&mut self, _block: &AudioBuffer) {}
}

/// Create a connected tap (audio side) and view (UI side).
///
/// `capacity` is how many samples may queue up between two UI polls;
/// `history` is how many the view keeps for drawing.
pub fn waveform_channel(capacity: usize, history: usize) -> (WaveformTap, WaveformView) {
    let (producer, consumer) = RingBuffer::new(capacity.max(1));
    let dropped = Arc::new(AtomicU64::new(0));

    let tap = WaveformTap {
        producer,
        dropped: Arc::clone(&dropped),
    };
    let view = WaveformView {
        consumer,
        history: vec![0.0; history.max(1)],
        write_pos: 0,
        dropped,
    };

    (tap, view)
}

/// Audio-thread half. Sums the channels of each frame into one sample.
pub struct WaveformTap {
    producer: Producer<f32>,
    dropped: Arc<AtomicU64>,
}

impl DisplaySink for WaveformTap {
    fn push_block(&mut self, block: &AudioBuffer) {
        let frames = block.len();
        let writable = frames.min(self.producer.slots());
        if writable < frames {
            self.dropped
                .fetch_add((frames - writable) as u64, Ordering::Relaxed);
        }
        if writable == 0 {
            return;
        }

        let Ok(chunk) = self.producer.write_chunk_uninit(writable) else {
            return;
        };
        chunk.fill_from_iter((0..writable).map(|i| {
            block
                .channels()
                .map(|samples| samples.get(i).copied().unwrap_or(0.0))
                .sum::<f32>()
        }));
    }
}

/// UI-thread half: a fixed-length scrolling history.
pub struct WaveformView {
    consumer: Consumer<f32>,
    history: Vec<f32>,
    write_pos: usize,
    dropped: Arc<AtomicU64>,
}

impl WaveformView {
    /// Move everything queued by the tap into the history. Returns the
    /// number of samples taken.
    pub fn poll(&mut self) -> usize {
        let available = self.consumer.slots();
        let Ok(chunk) = self.consumer.read_chunk(available) else {
            return 0;
        };

        let len = self.history.len();
        for sample in chunk {
            self.history[self.write_pos] = sample;
            self.write_pos = (self.write_pos + 1) % len;
        }
        available
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// History in time order, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = f32> + '_ {
        let (newer, older) = self.history.split_at(self.write_pos);
        older.iter().chain(newer).copied()
    }

    /// Reduce the history to `width` columns of (min, max).
    pub fn min_max_columns(&self, width: usize) -> Vec<(f32, f32)> {
        if width == 0 {
            return Vec::new();
        }

        let samples: Vec<f32> = self.samples().collect();
        let per_column = samples.len() as f64 / width as f64;

        (0..width)
            .map(|column| {
                let start = (column as f64 * per_column) as usize;
                let end = (((column + 1) as f64 * per_column) as usize)
                    .max(start + 1)
                    .min(samples.len());
                samples[start.min(end)..end]
                    .iter()
                    .fold((f32::MAX, f32::MIN), |(lo, hi), &s| (lo.min(s), hi.max(s)))
            })
            .map(|(lo, hi)| if lo > hi { (0.0, 0.0) } else { (lo, hi) })
            .collect()
    }

    /// Samples lost because the UI fell behind.
    pub fn dropped_samples(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
