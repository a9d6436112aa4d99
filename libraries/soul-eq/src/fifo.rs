//! Lock-free single-producer/single-consumer block queue
//!
//! A thin block layer over an [`rtrb::RingBuffer`] of samples. The ring holds
//! `capacity * block_length` samples and every push or pull moves exactly one
//! block as a single chunk, so the queue always holds a whole number of
//! blocks. The producer (audio thread) and the consumer (visualization
//! thread) never wait for each other: a push into a full queue and a pull
//! from an empty one simply return `false`.
//!
//! The ring is allocated once in the constructor; pushing and pulling copy
//! samples in place and never allocate.

use crate::error::{EqError, Result};
use rtrb::{Consumer, Producer, RingBuffer};
use std::iter;

/// Number of blocks held when no capacity is configured
pub const DEFAULT_FIFO_CAPACITY: usize = 30;

/// Multi-channel block of samples, stored channel after channel
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AudioBlock {
    num_channels: usize,
    num_frames: usize,
    data: Vec<f32>,
}

impl AudioBlock {
    /// Zeroed block of `num_channels` × `num_frames` samples
    pub fn new(num_channels: usize, num_frames: usize) -> Self {
        Self {
            num_channels,
            num_frames,
            data: vec![0.0; num_channels * num_frames],
        }
    }

    /// Block built from channel slices
    ///
    /// The block is as long as the shortest channel; longer channels are
    /// truncated.
    pub fn from_channels(channels: &[&[f32]]) -> Self {
        let num_frames = channels.iter().map(|c| c.len()).min().unwrap_or(0);

        let mut block = Self::new(channels.len(), num_frames);
        for (index, samples) in channels.iter().enumerate() {
            block.channel_mut(index).copy_from_slice(&samples[..num_frames]);
        }
        block
    }

    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    pub fn channel(&self, index: usize) -> &[f32] {
        let start = index * self.num_frames;
        &self.data[start..start + self.num_frames]
    }

    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        let start = index * self.num_frames;
        &mut self.data[start..start + self.num_frames]
    }

    /// Two distinct channels borrowed mutably at once
    pub fn channel_pair_mut(&mut self, first: usize, second: usize) -> (&mut [f32], &mut [f32]) {
        assert!(first < second, "channels must be distinct and ordered");
        let frames = self.num_frames;
        let (head, tail) = self.data.split_at_mut(second * frames);
        (
            &mut head[first * frames..(first + 1) * frames],
            &mut tail[..frames],
        )
    }

    /// All samples, channel after channel
    pub fn samples(&self) -> &[f32] {
        &self.data
    }

    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Set every sample to zero
    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }
}

/// Copy one block into the ring; `false` if there is no room for it
///
/// Short input is zero-padded and long input truncated to `block_length`.
fn push_block(producer: &mut Producer<f32>, block: &[f32], block_length: usize) -> bool {
    debug_assert_eq!(block.len(), block_length, "pushed block has the wrong length");

    match producer.write_chunk_uninit(block_length) {
        Ok(chunk) => {
            let written = chunk.fill_from_iter(block.iter().copied().chain(iter::repeat(0.0)));
            debug_assert_eq!(written, block_length);
            true
        }
        Err(_) => false,
    }
}

/// Copy the oldest block out of the ring; `false` if none is complete
///
/// The whole block is consumed even when `out` is shorter than it.
fn pull_block(consumer: &mut Consumer<f32>, out: &mut [f32], block_length: usize) -> bool {
    debug_assert_eq!(out.len(), block_length, "pull buffer has the wrong length");

    let Ok(chunk) = consumer.read_chunk(block_length) else {
        return false;
    };

    let (first, second) = chunk.as_slices();
    for (dst, &src) in out.iter_mut().zip(first.iter().chain(second)) {
        *dst = src;
    }
    chunk.commit_all();
    true
}

/// Fixed-capacity SPSC queue of equally sized blocks
///
/// Used directly, every method takes `&mut self`, so a single owner can push
/// and pull (handy for tests and single-threaded hosts). For cross-thread use,
/// [`split`](Self::split) it into a producer and a consumer handle.
pub struct SampleQueue {
    producer: Producer<f32>,
    consumer: Consumer<f32>,
    capacity: usize,
    block_length: usize,
}

impl SampleQueue {
    /// Queue of `capacity` blocks of `block_length` samples each
    pub fn new(capacity: usize, block_length: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(EqError::InvalidCapacity(capacity));
        }
        if block_length == 0 {
            return Err(EqError::InvalidBlockSize(block_length));
        }
        let samples = capacity
            .checked_mul(block_length)
            .ok_or(EqError::InvalidCapacity(capacity))?;

        let (producer, consumer) = RingBuffer::new(samples);
        Ok(Self {
            producer,
            consumer,
            capacity,
            block_length,
        })
    }

    /// Queue of multi-channel blocks, stored flattened
    ///
    /// Push and pull them through [`AudioBlock::samples`] and
    /// [`AudioBlock::samples_mut`].
    pub fn with_audio_blocks(capacity: usize, num_channels: usize, num_frames: usize) -> Result<Self> {
        Self::new(capacity, num_channels * num_frames)
    }

    /// Store a copy of `block`; `false` if the queue is full
    pub fn push(&mut self, block: &[f32]) -> bool {
        push_block(&mut self.producer, block, self.block_length)
    }

    /// Copy the oldest block into `out`; `false` if the queue is empty
    pub fn pull(&mut self, out: &mut [f32]) -> bool {
        pull_block(&mut self.consumer, out, self.block_length)
    }

    pub fn available_for_reading(&self) -> usize {
        self.consumer.slots() / self.block_length
    }

    pub fn available_for_writing(&self) -> usize {
        self.producer.slots() / self.block_length
    }

    /// Number of blocks the queue holds
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn block_length(&self) -> usize {
        self.block_length
    }

    /// Separate producer and consumer ends for use on two threads
    pub fn split(self) -> (QueueProducer, QueueConsumer) {
        (
            QueueProducer {
                producer: self.producer,
                capacity: self.capacity,
                block_length: self.block_length,
            },
            QueueConsumer {
                consumer: self.consumer,
                capacity: self.capacity,
                block_length: self.block_length,
            },
        )
    }
}

/// Write end of a split [`SampleQueue`] (real-time side)
pub struct QueueProducer {
    producer: Producer<f32>,
    capacity: usize,
    block_length: usize,
}

impl QueueProducer {
    /// Store a copy of `block`; `false` (block dropped) if the queue is full
    pub fn push(&mut self, block: &[f32]) -> bool {
        push_block(&mut self.producer, block, self.block_length)
    }

    /// Blocks queued and not yet pulled
    pub fn available_for_reading(&self) -> usize {
        self.capacity - self.producer.slots() / self.block_length
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// `true` once the consumer end has been dropped
    pub fn is_abandoned(&self) -> bool {
        self.producer.is_abandoned()
    }
}

/// Read end of a split [`SampleQueue`] (consumer side)
pub struct QueueConsumer {
    consumer: Consumer<f32>,
    capacity: usize,
    block_length: usize,
}

impl QueueConsumer {
    /// Copy the oldest block into `out`; `false` if nothing is available
    pub fn pull(&mut self, out: &mut [f32]) -> bool {
        pull_block(&mut self.consumer, out, self.block_length)
    }

    pub fn available_for_reading(&self) -> usize {
        self.consumer.slots() / self.block_length
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn block_length(&self) -> usize {
        self.block_length
    }
}
