//! Per-channel circular buffers and the hop scheduler.
//!
//! All channels share one set of [`Cursors`]. A block starts from a snapshot
//! taken by [`RingBank::begin_block`]; every channel walks its own copy from
//! that snapshot, and the last copy is written back with [`RingBank::commit`].

/// Read/write positions shared by every channel of a [`RingBank`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursors {
    /// Next input cell to write. Also the oldest sample of the analysis frame.
    pub input_write: usize,
    /// Start of the next overlap-add region in the output ring.
    pub output_write: usize,
    /// Next output cell to hand back to the host.
    pub output_read: usize,
    /// Samples seen since the last frame boundary.
    pub since_last_frame: usize,
}

impl Cursors {
    /// Count one sample. Returns `true` exactly when a frame is due.
    #[inline]
    pub fn tick(&mut self, hop_size: usize) -> bool {
        self.since_last_frame += 1;
        if self.since_last_frame >= hop_size {
            self.since_last_frame = 0;
            true
        } else {
            false
        }
    }

    /// Move the overlap-add position forward by one hop.
    #[inline]
    pub fn advance_output_write(&mut self, hop_size: usize, len: usize) {
        self.output_write = (self.output_write + hop_size) % len;
    }
}

#[inline]
fn step(pos: usize, len: usize) -> usize {
    let next = pos + 1;
    if next >= len {
        0
    } else {
        next
    }
}

/// Input and output ring of one channel.
#[derive(Debug, Clone, Default)]
pub struct ChannelRings {
    input: Vec<f32>,
    output: Vec<f32>,
}

impl ChannelRings {
    fn with_len(len: usize) -> Self {
        Self {
            input: vec![0.0; len],
            output: vec![0.0; len],
        }
    }

    /// Write `sample` at the input cursor and advance it.
    #[inline]
    pub fn push(&mut self, cursors: &mut Cursors, sample: f32) {
        self.input[cursors.input_write] = sample;
        cursors.input_write = step(cursors.input_write, self.input.len());
    }

    /// Take the sample under the output read cursor, clearing the cell for
    /// the next overlap-add pass.
    #[inline]
    pub fn pop(&mut self, cursors: &mut Cursors) -> f32 {
        let cell = &mut self.output[cursors.output_read];
        let sample = *cell;
        *cell = 0.0;
        cursors.output_read = step(cursors.output_read, self.output.len());
        sample
    }

    pub fn input(&self) -> &[f32] {
        &self.input
    }

    pub fn output(&self) -> &[f32] {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut [f32] {
        &mut self.output
    }

    fn clear(&mut self) {
        self.input.fill(0.0);
        self.output.fill(0.0);
    }
}

/// The rings of every channel plus their committed cursors.
#[derive(Debug, Clone, Default)]
pub struct RingBank {
    channels: Vec<ChannelRings>,
    cursors: Cursors,
    len: usize,
}

impl RingBank {
    pub fn new(channels: usize, len: usize) -> Self {
        let mut bank = Self::default();
        bank.resize(channels, len);
        bank
    }

    /// Reallocate to `channels` rings of `len` cells. Contents and cursors
    /// are discarded.
    pub fn resize(&mut self, channels: usize, len: usize) {
        self.channels = (0..channels).map(|_| ChannelRings::with_len(len)).collect();
        self.len = len;
        self.cursors = Cursors::default();
    }

    /// Zero every ring and reset the cursors without reallocating.
    pub fn clear(&mut self) {
        self.channels.iter_mut().for_each(ChannelRings::clear);
        self.cursors = Cursors::default();
    }

    /// Place the output write cursor. Used once after a reset.
    pub fn set_output_write(&mut self, pos: usize) {
        self.cursors.output_write = if self.len == 0 { 0 } else { pos % self.len };
    }

    /// Snapshot of the committed cursors for the start of a block.
    #[inline]
    pub fn begin_block(&self) -> Cursors {
        self.cursors
    }

    /// Store the cursors reached at the end of a block.
    #[inline]
    pub fn commit(&mut self, cursors: Cursors) {
        debug_assert!(cursors.input_write < self.len.max(1));
        debug_assert!(cursors.output_read < self.len.max(1));
        debug_assert!(cursors.output_write < self.len.max(1));
        self.cursors = cursors;
    }

    #[inline]
    pub fn push(&mut self, channel: usize, cursors: &mut Cursors, sample: f32) {
        self.channels[channel].push(cursors, sample);
    }

    #[inline]
    pub fn pop(&mut self, channel: usize, cursors: &mut Cursors) -> f32 {
        self.channels[channel].pop(cursors)
    }

    pub fn channel(&self, channel: usize) -> &ChannelRings {
        &self.channels[channel]
    }

    pub fn channel_mut(&mut self, channel: usize) -> &mut ChannelRings {
        &mut self.channels[channel]
    }

    pub fn cursors(&self) -> Cursors {
        self.cursors
    }

    pub fn channels(&self) -> usize {
        self.channels.len()
    }

    /// Cells per ring.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_wraps_at_len() {
        let mut bank = RingBank::new(1, 4);
        let mut cur = bank.begin_block();
        for i in 0..6 {
            bank.push(0, &mut cur, i as f32);
        }
        assert_eq!(cur.input_write, 2);
        assert_eq!(bank.channel(0).input(), &[4.0, 5.0, 2.0, 3.0]);
    }

    #[test]
    fn pop_clears_the_cell() {
        let mut bank = RingBank::new(1, 4);
        bank.channel_mut(0).output_mut().copy_from_slice(&[1.0, 2.0, 3.0, 4.0]);
        let mut cur = bank.begin_block();
        assert_eq!(bank.pop(0, &mut cur), 1.0);
        assert_eq!(bank.pop(0, &mut cur), 2.0);
        assert_eq!(bank.channel(0).output(), &[0.0, 0.0, 3.0, 4.0]);
        assert_eq!(cur.output_read, 2);
    }

    #[test]
    fn tick_fires_every_hop() {
        let mut cur = Cursors::default();
        let fired: Vec<bool> = (0..8).map(|_| cur.tick(3)).collect();
        assert_eq!(
            fired,
            [false, false, true, false, false, true, false, false]
        );
        assert_eq!(cur.since_last_frame, 2);
    }

    #[test]
    fn cursors_commit_only_on_request() {
        let mut bank = RingBank::new(2, 8);
        let mut cur = bank.begin_block();
        bank.push(0, &mut cur, 1.0);
        assert_eq!(bank.cursors().input_write, 0);
        bank.commit(cur);
        assert_eq!(bank.cursors().input_write, 1);
    }

    #[test]
    fn clear_keeps_allocation() {
        let mut bank = RingBank::new(2, 8);
        let mut cur = bank.begin_block();
        bank.push(1, &mut cur, 3.0);
        bank.commit(cur);
        bank.clear();
        assert_eq!(bank.len(), 8);
        assert_eq!(bank.channels(), 2);
        assert!(bank.channel(1).input().iter().all(|&x| x == 0.0));
        assert_eq!(bank.cursors(), Cursors::default());
    }
}
