//! Per-channel sample collector
//!
//! Turns the running stream of one channel's samples into fixed-length
//! blocks and hands completed blocks to a visualization thread through a
//! [`SampleQueue`]. The audio thread owns the collector; the consumer owns the
//! [`BlockReader`] taken from it.

use crate::error::{EqError, Result};
use crate::fifo::{AudioBlock, QueueConsumer, QueueProducer, SampleQueue, DEFAULT_FIFO_CAPACITY};
use tracing::debug;

/// Stereo channel selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Left,
    Right,
}

impl Channel {
    /// Channel index inside an interleaved or channel-major buffer
    pub fn index(self) -> usize {
        match self {
            Channel::Left => 0,
            Channel::Right => 1,
        }
    }
}

/// Accumulates one channel into fixed-size blocks (producer side)
///
/// # Real-Time Safety
/// [`update`](Self::update) copies samples into a buffer sized in
/// [`prepare`](Self::prepare) and pushes into a pre-sized queue. It never
/// allocates, locks or blocks. A full queue drops the block.
pub struct ChannelSampleCollector {
    channel: Channel,
    capacity: usize,
    producer: Option<QueueProducer>,
    reader: Option<BlockReader>,
    buffer: Vec<f32>,
    fill_position: usize,
    prepared: bool,
    dropped_blocks: usize,
}

impl ChannelSampleCollector {
    /// Collector with the default queue capacity
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            capacity: DEFAULT_FIFO_CAPACITY,
            producer: None,
            reader: None,
            buffer: Vec::new(),
            fill_position: 0,
            prepared: false,
            dropped_blocks: 0,
        }
    }

    /// Collector whose queue holds `capacity` blocks
    pub fn with_capacity(channel: Channel, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(EqError::InvalidCapacity(capacity));
        }

        Ok(Self {
            capacity,
            ..Self::new(channel)
        })
    }

    /// Size buffers for blocks of `block_length` samples
    ///
    /// Builds a fresh queue. A reader taken before this call keeps draining
    /// the old queue; take a new one with [`take_reader`](Self::take_reader).
    pub fn prepare(&mut self, block_length: usize) -> Result<()> {
        self.prepared = false;

        if block_length == 0 {
            return Err(EqError::InvalidBlockSize(block_length));
        }

        let (producer, consumer) = SampleQueue::new(self.capacity, block_length)?.split();

        self.buffer.clear();
        self.buffer.resize(block_length, 0.0);
        self.producer = Some(producer);
        self.reader = Some(BlockReader {
            consumer,
            channel: self.channel,
            block_length,
        });
        self.fill_position = 0;
        self.dropped_blocks = 0;
        self.prepared = true;

        debug!(
            "Prepared {:?} collector: {} samples per block, {} slots",
            self.channel, block_length, self.capacity
        );
        Ok(())
    }

    /// Append samples; every completed block is queued
    pub fn update(&mut self, samples: &[f32]) {
        debug_assert!(self.prepared, "collector updated before prepare");

        let Some(producer) = self.producer.as_mut() else {
            return;
        };

        let block_length = self.buffer.len();
        let mut remaining = samples;

        while !remaining.is_empty() {
            let take = (block_length - self.fill_position).min(remaining.len());
            self.buffer[self.fill_position..self.fill_position + take]
                .copy_from_slice(&remaining[..take]);
            self.fill_position += take;
            remaining = &remaining[take..];

            if self.fill_position == block_length {
                if !producer.push(&self.buffer) {
                    self.dropped_blocks += 1;
                }
                self.fill_position = 0;
            }
        }
    }

    /// Append this collector's channel of a multi-channel block
    pub fn update_from(&mut self, block: &AudioBlock) {
        debug_assert!(
            self.channel.index() < block.num_channels(),
            "block has no {:?} channel",
            self.channel
        );
        self.update(block.channel(self.channel.index()));
    }

    /// Completed blocks waiting to be pulled
    pub fn available_block_count(&self) -> usize {
        self.producer
            .as_ref()
            .map_or(0, |p| p.available_for_reading())
    }

    /// Pull the oldest completed block through the reader held by the collector
    ///
    /// Returns `false` when nothing is queued or the reader has been taken.
    pub fn pull(&mut self, out: &mut Vec<f32>) -> bool {
        self.reader.as_mut().is_some_and(|r| r.pull(out))
    }

    /// Hand the consumer end to another thread
    pub fn take_reader(&mut self) -> Option<BlockReader> {
        let reader = self.reader.take();
        if reader.is_some() {
            debug!("{:?} collector reader handed off", self.channel);
        }
        reader
    }

    pub fn is_ready(&self) -> bool {
        self.prepared
    }

    /// Block length configured by the last `prepare`
    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    /// Number of blocks the queue holds
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Samples accumulated towards the next block
    pub fn fill_position(&self) -> usize {
        self.fill_position
    }

    /// Blocks dropped because the queue was full since the last `prepare`
    pub fn dropped_block_count(&self) -> usize {
        self.dropped_blocks
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }
}

/// Consumer end of a [`ChannelSampleCollector`]
pub struct BlockReader {
    consumer: QueueConsumer,
    channel: Channel,
    block_length: usize,
}

impl BlockReader {
    /// Copy the oldest completed block into `out`
    ///
    /// `out` is resized to the block length if needed; pass a buffer from
    /// [`new_block`](Self::new_block) to avoid allocating.
    pub fn pull(&mut self, out: &mut Vec<f32>) -> bool {
        if out.len() != self.block_length {
            out.resize(self.block_length, 0.0);
        }
        self.consumer.pull(out)
    }

    pub fn available_block_count(&self) -> usize {
        self.consumer.available_for_reading()
    }

    /// Zeroed buffer of the right size for [`pull`](Self::pull)
    pub fn new_block(&self) -> Vec<f32> {
        vec![0.0; self.block_length]
    }

    pub fn block_length(&self) -> usize {
        self.block_length
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize, start: f32) -> Vec<f32> {
        (0..len).map(|i| start + i as f32).collect()
    }

    #[test]
    fn not_ready_until_prepared() {
        let mut collector = ChannelSampleCollector::new(Channel::Left);
        assert!(!collector.is_ready());
        collector.prepare(8).unwrap();
        assert!(collector.is_ready());
        assert_eq!(collector.size(), 8);
    }

    #[test]
    fn zero_block_length_is_rejected() {
        let mut collector = ChannelSampleCollector::new(Channel::Left);
        assert_eq!(collector.prepare(0), Err(EqError::InvalidBlockSize(0)));
        assert!(!collector.is_ready());
    }

    #[test]
    fn partial_block_is_not_queued() {
        let mut collector = ChannelSampleCollector::new(Channel::Left);
        collector.prepare(8).unwrap();

        collector.update(&ramp(5, 0.0));

        assert_eq!(collector.available_block_count(), 0);
        assert_eq!(collector.fill_position(), 5);
    }

    #[test]
    fn blocks_span_update_calls() {
        let mut collector = ChannelSampleCollector::new(Channel::Right);
        collector.prepare(4).unwrap();

        collector.update(&[1.0, 2.0, 3.0]);
        collector.update(&[4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);

        assert_eq!(collector.available_block_count(), 2);
        assert_eq!(collector.fill_position(), 1);

        let mut block = vec![0.0; 4];
        assert!(collector.pull(&mut block));
        assert_eq!(block, vec![1.0, 2.0, 3.0, 4.0]);
        assert!(collector.pull(&mut block));
        assert_eq!(block, vec![5.0, 6.0, 7.0, 8.0]);
        assert!(!collector.pull(&mut block));
    }

    #[test]
    fn full_queue_drops_blocks() {
        let mut collector = ChannelSampleCollector::with_capacity(Channel::Left, 2).unwrap();
        collector.prepare(2).unwrap();

        collector.update(&ramp(8, 0.0));

        assert_eq!(collector.available_block_count(), 2);
        assert_eq!(collector.dropped_block_count(), 2);

        // Oldest blocks survive, later ones were rejected
        let mut block = vec![0.0; 2];
        assert!(collector.pull(&mut block));
        assert_eq!(block, vec![0.0, 1.0]);
    }

    #[test]
    fn reader_moves_out_of_collector() {
        let mut collector = ChannelSampleCollector::new(Channel::Left);
        collector.prepare(2).unwrap();

        let mut reader = collector.take_reader().unwrap();
        assert!(collector.take_reader().is_none());

        collector.update(&[0.5, 0.25]);

        let mut block = reader.new_block();
        assert!(!collector.pull(&mut block));
        assert_eq!(reader.available_block_count(), 1);
        assert!(reader.pull(&mut block));
        assert_eq!(block, vec![0.5, 0.25]);
    }

    #[test]
    fn update_from_reads_own_channel() {
        let mut collector = ChannelSampleCollector::new(Channel::Right);
        collector.prepare(3).unwrap();

        let block = AudioBlock::from_channels(&[&[1.0, 1.0, 1.0], &[2.0, 3.0, 4.0]]);
        collector.update_from(&block);

        let mut out = vec![0.0; 3];
        assert!(collector.pull(&mut out));
        assert_eq!(out, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn reader_resizes_mismatched_buffer() {
        let mut collector = ChannelSampleCollector::new(Channel::Left);
        collector.prepare(3).unwrap();
        collector.update(&[0.1, 0.2, 0.3]);

        let mut reader = collector.take_reader().unwrap();
        let mut block = Vec::new();
        assert!(reader.pull(&mut block));
        assert_eq!(block, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn with_capacity_rejects_zero() {
        assert!(matches!(
            ChannelSampleCollector::with_capacity(Channel::Left, 0),
            Err(EqError::InvalidCapacity(0))
        ));
    }
}
