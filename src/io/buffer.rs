/// Planar multi-channel sample buffer.
///
/// Storage is allocated once for `capacity` frames per channel. `set_len`
/// only moves the logical end, so the audio thread can reuse one buffer for
/// blocks of any size up to the capacity.
#[derive(Debug, Clone, Default)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
    len: usize,
}

impl AudioBuffer {
    pub fn new(num_channels: usize, capacity: usize) -> Self {
        Self {
            channels: vec![vec![0.0; capacity]; num_channels],
            len: capacity,
        }
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn capacity(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Set the logical block length, clamped to the capacity.
    pub fn set_len(&mut self, len: usize) {
        self.len = len.min(self.capacity());
    }

    /// Zero every channel up to the logical length.
    pub fn clear(&mut self) {
        let len = self.len;
        for channel in &mut self.channels {
            channel[..len].fill(0.0);
        }
    }

    /// Accumulate into one sample. Out-of-range positions are ignored.
    #[inline]
    pub fn add_sample(&mut self, channel: usize, index: usize, value: f32) {
        if index >= self.len {
            return;
        }
        if let Some(samples) = self.channels.get_mut(channel) {
            samples[index] += value;
        }
    }

    pub fn channel(&self, channel: usize) -> &[f32] {
        self.channels
            .get(channel)
            .map_or(&[], |samples| &samples[..self.len])
    }

    pub fn channel_mut(&mut self, channel: usize) -> &mut [f32] {
        let len = self.len;
        match self.channels.get_mut(channel) {
            Some(samples) => &mut samples[..len],
            None => &mut [],
        }
    }

    pub fn channels(&self) -> impl Iterator<Item = &[f32]> {
        self.channels.iter().map(move |samples| &samples[..self.len])
    }

    /// Overwrite this buffer with `source * gain`, matching its length.
    ///
    /// Channels missing from `source` are zeroed.
    pub fn copy_scaled_from(&mut self, source: &AudioBuffer, gain: f32) {
        self.set_len(source.len());
        let len = self.len;
        for (ch, dest) in self.channels.iter_mut().enumerate() {
            let dest = &mut dest[..len];
            let src = source.channel(ch);
            if src.len() < len {
                dest.fill(0.0);
                continue;
            }
            for (d, &s) in dest.iter_mut().zip(src) {
                *d = s * gain;
            }
        }
    }
}
