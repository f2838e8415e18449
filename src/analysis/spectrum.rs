//! Windowed FFT spectrum for the display thread.
//!
//! Split in two halves connected by a single-frame mailbox:
//!
//! - [`AnalyzerTap`] lives on the audio thread. It fills a FIFO with one
//!   sample per frame and, each time the FIFO is full, hands the window
//!   over if the mailbox is empty. A full mailbox means the window is
//!   dropped.
//! - [`SpectralAnalyzer`] lives on the UI thread. It copies the pending
//!   window out, frees the mailbox, and turns the copy into `scope_size`
//!   display levels in `0.0..=1.0` on a warped log-frequency axis.
//!
//! The mailbox is an `rtrb` ring holding exactly one window. The producer
//! only writes when every slot is free and the consumer commits only after
//! copying, so a frame is never read while being written and neither side
//! waits on the other.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use rtrb::{Consumer, Producer, RingBuffer};
use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::{
    dsp::window::hann_normalised,
    error::{Error, Result},
};

/// Exponent of the frequency-axis warp applied to display bins.
const SKEW: f32 = 0.2;
const MIN_DB: f32 = -100.0;
const MAX_DB: f32 = 0.0;
const FFT_ORDER_RANGE: std::ops::RangeInclusive<u32> = 4..=16;

#[inline]
fn gain_to_db(gain: f32) -> f32 {
    if gain > 0.0 {
        (20.0 * gain.log10()).max(MIN_DB)
    } else {
        MIN_DB
    }
}

/// FFT bin shown at display position `bin` of `scope_size`.
#[inline]
fn warped_index(bin: usize, scope_size: usize, fft_size: usize) -> usize {
    let proportion = bin as f32 / scope_size as f32;
    let skewed = 1.0 - ((1.0 - proportion).ln() * SKEW).exp();
    ((skewed * fft_size as f32 * 0.5) as usize).min(fft_size / 2)
}

/// Audio-thread half: sample FIFO feeding the mailbox.
pub struct AnalyzerTap {
    fifo: Vec<f32>,
    index: usize,
    mailbox: Producer<f32>,
    dropped: Arc<AtomicU64>,
}

impl AnalyzerTap {
    /// Accumulate one sample. Never blocks or allocates.
    #[inline]
    pub fn push_sample(&mut self, sample: f32) {
        self.fifo[self.index] = sample;
        self.index += 1;

        if self.index == self.fifo.len() {
            self.publish();
            self.index = 0;
        }
    }

    fn publish(&mut self) {
        let size = self.fifo.len();
        // Mailbox is empty only when every slot is writable
        if self.mailbox.slots() < size {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        }

        match self.mailbox.write_chunk_uninit(size) {
            Ok(chunk) => {
                chunk.fill_from_iter(self.fifo.iter().copied());
            }
            Err(_) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fifo.len()
    }

    /// Windows discarded because the previous frame was still pending.
    pub fn frames_dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// UI-thread half: turns published windows into display frames.
pub struct SpectralAnalyzer {
    mailbox: Consumer<f32>,
    fft_size: usize,
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    bin_indices: Vec<usize>,
    scope: Vec<f32>,
    fft_size_db: f32,
    dropped: Arc<AtomicU64>,
}

impl SpectralAnalyzer {
    /// Build an analyzer with an FFT of `1 << fft_order` points reduced to
    /// `scope_size` display bins.
    pub fn new(fft_order: u32, scope_size: usize) -> Result<(Self, AnalyzerTap)> {
        if !FFT_ORDER_RANGE.contains(&fft_order) {
            return Err(Error::InvalidFftOrder(fft_order));
        }
        if scope_size == 0 {
            return Err(Error::EmptyScope);
        }

        let fft_size = 1usize << fft_order;
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        let (producer, consumer) = RingBuffer::new(fft_size);
        let dropped = Arc::new(AtomicU64::new(0));

        let bin_indices = (0..scope_size)
            .map(|bin| warped_index(bin, scope_size, fft_size))
            .collect();

        log::debug!("spectrum analyzer: {fft_size}-point fft, {scope_size} display bins");

        let analyzer = Self {
            mailbox: consumer,
            fft_size,
            window: hann_normalised(fft_size),
            fft,
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            scratch,
            bin_indices,
            scope: vec![0.0; scope_size],
            fft_size_db: gain_to_db(fft_size as f32),
            dropped: Arc::clone(&dropped),
        };
        let tap = AnalyzerTap {
            fifo: vec![0.0; fft_size],
            index: 0,
            mailbox: producer,
            dropped,
        };

        Ok((analyzer, tap))
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn scope_size(&self) -> usize {
        self.scope.len()
    }

    pub fn is_frame_ready(&self) -> bool {
        self.mailbox.slots() >= self.fft_size
    }

    /// Consume the pending window, if any, and return its display levels.
    pub fn produce_frame(&mut self) -> Option<&[f32]> {
        let chunk = self.mailbox.read_chunk(self.fft_size).ok()?;
        let (first, second) = chunk.as_slices();
        for ((slot, &sample), &w) in self
            .buffer
            .iter_mut()
            .zip(first.iter().chain(second))
            .zip(&self.window)
        {
            *slot = Complex::new(sample * w, 0.0);
        }
        chunk.commit_all();

        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        for (level, &index) in self.scope.iter_mut().zip(&self.bin_indices) {
            let db = (gain_to_db(self.buffer[index].norm()) - self.fft_size_db).clamp(MIN_DB, MAX_DB);
            *level = (db - MIN_DB) / (MAX_DB - MIN_DB);
        }

        Some(&self.scope)
    }

    /// Drain every ready frame, copying each one out.
    pub fn frames(&mut self) -> impl Iterator<Item = Vec<f32>> + '_ {
        std::iter::from_fn(move || self.produce_frame().map(<[f32]>::to_vec))
    }

    /// Centre frequency of display bin `bin`, for axis labels.
    pub fn bin_frequency(&self, bin: usize, sample_rate: f64) -> f64 {
        let index = self
            .bin_indices
            .get(bin)
            .copied()
            .unwrap_or(self.fft_size / 2);
        index as f64 * sample_rate / self.fft_size as f64
    }

    pub fn frames_dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
