use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use parking_lot::Mutex;
use rtrb::{Consumer, Producer, RingBuffer};

use crate::io::midi::{MidiEvent, MidiMessage};

/*
MIDI Event Collector
====================

MIDI arrives on threads we do not control: the driver callback, the
on-screen keyboard, a demo arpeggiator. The render thread needs those
messages as a sorted batch positioned inside the block it is about to
render.

  producers ──lock──► rtrb ring ──pop──► pending (sorted) ──► block batch
    (any thread)                         (audio thread only)

Timing: the collector keeps an absolute sample clock (`position`) that the
audio thread advances by the length of each consumed block. A producer
stamps every event with `position + offset`, where the offset is given in
the producer's own sample rate and rescaled to the render rate. On
consumption, anything due before the end of the block is emitted with its
offset re-based to the block start; anything later stays pending.

The audio side never takes the lock. Producers share a short critical
section because the ring is single-producer.
*/

#[derive(Debug, Clone, Copy)]
struct QueuedEvent {
    due: u64,
    sequence: u64,
    message: MidiMessage,
}

struct Shared {
    position: AtomicU64,
    sample_rate_bits: AtomicU64,
    sequence: AtomicU64,
    dropped: AtomicU64,
}

impl Shared {
    fn sample_rate(&self) -> f64 {
        f64::from_bits(self.sample_rate_bits.load(Ordering::Acquire))
    }
}

/// Producer side. Cheap to clone; every MIDI source gets its own handle.
#[derive(Clone)]
pub struct MidiInputHandle {
    tx: Arc<Mutex<Producer<QueuedEvent>>>,
    shared: Arc<Shared>,
}

impl MidiInputHandle {
    /// Queue events whose offsets are measured from now in
    /// `context_sample_rate` samples.
    pub fn push_events(&self, events: &[MidiEvent], context_sample_rate: f64) {
        let now = self.shared.position.load(Ordering::Acquire);
        let render_rate = self.shared.sample_rate();
        let scale = if context_sample_rate > 0.0 && render_rate > 0.0 {
            render_rate / context_sample_rate
        } else {
            1.0
        };

        let mut dropped = 0u64;
        {
            let mut tx = self.tx.lock();
            for event in events {
                let offset = (event.sample_offset as f64 * scale).round() as u64;
                let queued = QueuedEvent {
                    due: now.saturating_add(offset),
                    sequence: self.shared.sequence.fetch_add(1, Ordering::Relaxed),
                    message: event.message,
                };
                if tx.push(queued).is_err() {
                    dropped += 1;
                }
            }
        }

        if dropped > 0 {
            self.shared.dropped.fetch_add(dropped, Ordering::Relaxed);
            log::warn!("midi queue full, dropped {dropped} event(s)");
        }
    }

    /// Queue a single message for the next rendered block.
    pub fn push_message(&self, message: MidiMessage) {
        let rate = self.shared.sample_rate();
        self.push_events(&[MidiEvent::new(0, message)], rate);
    }

    /// Render sample rate the collector was last reset to.
    pub fn sample_rate(&self) -> f64 {
        self.shared.sample_rate()
    }

    pub fn dropped_events(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }
}

/// Consumer side, owned by the render callback.
pub struct MidiEventCollector {
    rx: Consumer<QueuedEvent>,
    shared: Arc<Shared>,
    pending: Vec<QueuedEvent>,
    block: Vec<MidiEvent>,
    capacity: usize,
    position: u64,
}

impl MidiEventCollector {
    pub fn new(capacity: usize, sample_rate: f64) -> (Self, MidiInputHandle) {
        let capacity = capacity.max(1);
        let (tx, rx) = RingBuffer::<QueuedEvent>::new(capacity);
        let shared = Arc::new(Shared {
            position: AtomicU64::new(0),
            sample_rate_bits: AtomicU64::new(sample_rate.to_bits()),
            sequence: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        });

        let collector = Self {
            rx,
            shared: Arc::clone(&shared),
            pending: Vec::with_capacity(capacity),
            block: Vec::with_capacity(capacity),
            capacity,
            position: 0,
        };
        let handle = MidiInputHandle {
            tx: Arc::new(Mutex::new(tx)),
            shared,
        };

        (collector, handle)
    }

    /// Forget everything queued and switch to a new render sample rate.
    ///
    /// Called from `prepare`, before streaming starts.
    pub fn reset(&mut self, sample_rate: f64) {
        self.shared
            .sample_rate_bits
            .store(sample_rate.to_bits(), Ordering::Release);
        while self.rx.pop().is_ok() {}
        self.pending.clear();
        self.block.clear();
        log::debug!("midi collector reset to {sample_rate} Hz");
    }

    /// Events due inside the next `max_samples` samples, sorted by offset.
    ///
    /// Advances the collector clock by `max_samples`.
    pub fn consume_block(&mut self, max_samples: usize) -> &[MidiEvent] {
        self.block.clear();

        while let Ok(event) = self.rx.pop() {
            self.retain(event);
        }

        let start = self.position;
        let end = start.saturating_add(max_samples as u64);

        // Unstable sort does not allocate; the sequence number keeps ties in arrival order
        self.pending
            .sort_unstable_by_key(|event| (event.due, event.sequence));
        let due_count = self
            .pending
            .iter()
            .take_while(|event| event.due < end)
            .count();

        for event in &self.pending[..due_count] {
            let offset = event.due.saturating_sub(start) as u32;
            self.block.push(MidiEvent::new(offset, event.message));
        }
        self.pending.drain(..due_count);

        self.position = end;
        self.shared.position.store(end, Ordering::Release);

        &self.block
    }

    // When full, the latest-due event is the one that gets dropped
    fn retain(&mut self, event: QueuedEvent) {
        if self.pending.len() < self.capacity {
            self.pending.push(event);
            return;
        }

        self.shared.dropped.fetch_add(1, Ordering::Relaxed);
        let latest = self
            .pending
            .iter()
            .enumerate()
            .max_by_key(|(_, queued)| (queued.due, queued.sequence))
            .map(|(index, queued)| (index, (queued.due, queued.sequence)));
        if let Some((index, key)) = latest {
            if (event.due, event.sequence) < key {
                self.pending[index] = event;
            }
        }
    }

    /// Events waiting for a later block.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn dropped_events(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }
}
