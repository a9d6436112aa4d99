//! Stereo EQ processor
//!
//! Owns one [`ChannelChain`] and one [`ChannelSampleCollector`] per channel.
//! The host calls [`prepare`](DualChannelProcessor::prepare) whenever the
//! stream format changes and [`process_block`](DualChannelProcessor::process_block)
//! for every audio callback.

use crate::collector::{BlockReader, Channel, ChannelSampleCollector};
use crate::error::{EqError, Result};
use crate::fifo::AudioBlock;
use crate::filters::ChannelChain;
use crate::params::EqParameters;
use std::sync::Arc;
use tracing::debug;

/// Two-channel low-cut / peak / high-cut processor
///
/// Parameters are shared through an [`Arc<EqParameters>`]: a control thread
/// writes them at any time, the audio thread takes one snapshot per block.
///
/// # Example
/// ```rust
/// use soul_eq::{DualChannelProcessor, EqParameters, Slope};
/// use std::sync::Arc;
///
/// let params = Arc::new(EqParameters::new());
/// params.set_low_cut_frequency(120.0);
/// params.set_low_cut_slope(Slope::Slope24);
///
/// let mut eq = DualChannelProcessor::new(Arc::clone(&params));
/// eq.prepare(48000.0, 256).unwrap();
///
/// let mut left = vec![0.0_f32; 256];
/// let mut right = vec![0.0_f32; 256];
/// eq.process_block(&mut left, &mut right);
/// ```
pub struct DualChannelProcessor {
    parameters: Arc<EqParameters>,
    left_chain: ChannelChain,
    right_chain: ChannelChain,
    left_collector: ChannelSampleCollector,
    right_collector: ChannelSampleCollector,
    sample_rate: f64,
    max_block_size: usize,
    prepared: bool,
}

impl DualChannelProcessor {
    /// Processor whose collectors use the default queue capacity
    pub fn new(parameters: Arc<EqParameters>) -> Self {
        Self {
            parameters,
            left_chain: ChannelChain::new(),
            right_chain: ChannelChain::new(),
            left_collector: ChannelSampleCollector::new(Channel::Left),
            right_collector: ChannelSampleCollector::new(Channel::Right),
            sample_rate: 0.0,
            max_block_size: 0,
            prepared: false,
        }
    }

    /// Processor whose collectors queue up to `capacity` blocks each
    pub fn with_fifo_capacity(parameters: Arc<EqParameters>, capacity: usize) -> Result<Self> {
        Ok(Self {
            left_collector: ChannelSampleCollector::with_capacity(Channel::Left, capacity)?,
            right_collector: ChannelSampleCollector::with_capacity(Channel::Right, capacity)?,
            ..Self::new(parameters)
        })
    }

    /// Configure for a stream format
    ///
    /// Clears filter state, installs coefficients for the current parameters
    /// and rebuilds both collectors with `max_block_size` samples per block.
    /// Readers taken before this call are stale afterwards.
    ///
    /// Not real-time safe (allocates).
    pub fn prepare(&mut self, sample_rate: f64, max_block_size: usize) -> Result<()> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(EqError::InvalidSampleRate(sample_rate));
        }
        if max_block_size == 0 {
            return Err(EqError::InvalidBlockSize(max_block_size));
        }

        self.prepared = false;
        self.sample_rate = sample_rate;
        self.max_block_size = max_block_size;

        let snapshot = self.parameters.snapshot();
        for chain in [&mut self.left_chain, &mut self.right_chain] {
            chain.reset();
            chain.update_from_snapshot(&snapshot, sample_rate);
        }

        self.left_collector.prepare(max_block_size)?;
        self.right_collector.prepare(max_block_size)?;
        self.prepared = true;

        debug!(
            "EQ prepared: {} Hz, max block {} samples, low-cut {} Hz / {}, peak {} Hz {:+.1} dB Q {:.2}, high-cut {} Hz / {}",
            sample_rate,
            max_block_size,
            snapshot.low_cut_frequency,
            snapshot.low_cut_slope,
            snapshot.peak_frequency,
            snapshot.peak_gain_db,
            snapshot.peak_quality,
            snapshot.high_cut_frequency,
            snapshot.high_cut_slope,
        );
        Ok(())
    }

    /// Filter one stereo block in place and feed the collectors
    ///
    /// # Real-Time Safety
    /// - No allocations, locks or logging
    /// - Parameters are read once, as atomic loads
    ///
    /// Both slices must have the same length, no longer than the prepared
    /// maximum. Debug builds assert this; release builds process the common
    /// prefix. Nothing happens before [`prepare`](Self::prepare).
    pub fn process_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        debug_assert!(self.prepared, "process_block called before prepare");
        debug_assert_eq!(left.len(), right.len(), "channel lengths differ");
        debug_assert!(
            left.len() <= self.max_block_size,
            "block of {} samples exceeds prepared maximum {}",
            left.len(),
            self.max_block_size
        );

        if !self.prepared {
            return;
        }

        let frames = left.len().min(right.len());
        let (left, right) = (&mut left[..frames], &mut right[..frames]);

        let snapshot = self.parameters.snapshot();
        self.left_chain.update_from_snapshot(&snapshot, self.sample_rate);
        self.right_chain.update_from_snapshot(&snapshot, self.sample_rate);

        self.left_chain.process(left);
        self.right_chain.process(right);

        self.left_collector.update(left);
        self.right_collector.update(right);
    }

    /// [`process_block`](Self::process_block) on the first two channels of a block
    pub fn process_audio_block(&mut self, block: &mut AudioBlock) {
        debug_assert!(block.num_channels() >= 2, "stereo block required");
        if block.num_channels() < 2 {
            return;
        }

        let (left, right) = block.channel_pair_mut(Channel::Left.index(), Channel::Right.index());
        self.process_block(left, right);
    }

    /// Hand both consumer ends to a visualization thread
    ///
    /// Returns `None` unless both readers are still parked in their collectors.
    pub fn take_readers(&mut self) -> Option<(BlockReader, BlockReader)> {
        match (self.left_collector.take_reader(), self.right_collector.take_reader()) {
            (Some(left), Some(right)) => Some((left, right)),
            _ => None,
        }
    }

    pub fn left_collector(&self) -> &ChannelSampleCollector {
        &self.left_collector
    }

    pub fn right_collector(&self) -> &ChannelSampleCollector {
        &self.right_collector
    }

    pub fn left_collector_mut(&mut self) -> &mut ChannelSampleCollector {
        &mut self.left_collector
    }

    pub fn right_collector_mut(&mut self) -> &mut ChannelSampleCollector {
        &mut self.right_collector
    }

    /// Filter chain of one channel
    pub fn chain(&self, channel: Channel) -> &ChannelChain {
        match channel {
            Channel::Left => &self.left_chain,
            Channel::Right => &self.right_chain,
        }
    }

    /// Shared parameter store
    pub fn parameters(&self) -> &Arc<EqParameters> {
        &self.parameters
    }

    /// Sample rate from the last successful `prepare` (0 before)
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// Queue capacity used by each collector
    pub fn fifo_capacity(&self) -> usize {
        self.left_collector.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Slope;

    const SR: f64 = 48000.0;

    fn processor() -> DualChannelProcessor {
        DualChannelProcessor::new(Arc::new(EqParameters::new()))
    }

    #[test]
    fn prepare_rejects_bad_formats() {
        let mut eq = processor();
        assert_eq!(eq.prepare(0.0, 512), Err(EqError::InvalidSampleRate(0.0)));
        assert!(matches!(
            eq.prepare(f64::NAN, 512),
            Err(EqError::InvalidSampleRate(_))
        ));
        assert_eq!(eq.prepare(SR, 0), Err(EqError::InvalidBlockSize(0)));
        assert!(!eq.is_prepared());
    }

    #[test]
    fn prepare_sizes_collectors() {
        let mut eq = processor();
        eq.prepare(SR, 256).unwrap();

        assert!(eq.is_prepared());
        assert_eq!(eq.sample_rate(), SR);
        assert_eq!(eq.max_block_size(), 256);
        assert_eq!(eq.left_collector().size(), 256);
        assert_eq!(eq.right_collector().size(), 256);
        assert!(eq.left_collector().is_ready());
    }

    #[test]
    fn parameter_changes_apply_on_next_block() {
        let params = Arc::new(EqParameters::new());
        let mut eq = DualChannelProcessor::new(Arc::clone(&params));
        eq.prepare(SR, 64).unwrap();

        let mut left = vec![0.0; 64];
        let mut right = vec![0.0; 64];
        eq.process_block(&mut left, &mut right);
        assert_eq!(eq.chain(Channel::Left).low_cut().active_stages(), 1);

        params.set_low_cut_slope(Slope::Slope36);
        eq.process_block(&mut left, &mut right);

        assert_eq!(eq.chain(Channel::Left).low_cut().active_stages(), 3);
        assert_eq!(eq.chain(Channel::Right).low_cut().active_stages(), 3);
    }

    #[test]
    fn channels_are_filtered_independently() {
        let mut eq = processor();
        eq.prepare(SR, 8).unwrap();

        let mut left = vec![0.0; 8];
        let mut right = vec![0.0; 8];
        left[0] = 1.0;
        eq.process_block(&mut left, &mut right);

        assert_ne!(left[0], 0.0);
        assert!(right.iter().all(|&s| s == 0.0));
        assert!(eq.chain(Channel::Right).low_cut().stage(0).unwrap().is_silent());
    }

    #[test]
    fn processed_audio_reaches_collectors() {
        let mut eq = processor();
        eq.prepare(SR, 16).unwrap();

        let mut left = vec![0.5; 16];
        let mut right = vec![-0.5; 16];
        eq.process_block(&mut left, &mut right);

        let (mut left_reader, mut right_reader) = eq.take_readers().unwrap();
        let mut block = left_reader.new_block();

        assert!(left_reader.pull(&mut block));
        assert_eq!(block, left);
        assert!(right_reader.pull(&mut block));
        assert_eq!(block, right);
        assert!(eq.take_readers().is_none());
    }

    #[test]
    fn audio_block_matches_slice_processing() {
        let params = Arc::new(EqParameters::new());
        params.set_peak_gain_db(9.0);

        let mut by_slices = DualChannelProcessor::new(Arc::clone(&params));
        let mut by_block = DualChannelProcessor::new(params);
        by_slices.prepare(SR, 32).unwrap();
        by_block.prepare(SR, 32).unwrap();

        let left: Vec<f32> = (0..32).map(|i| (i as f32 * 0.3).sin()).collect();
        let right: Vec<f32> = (0..32).map(|i| (i as f32 * 0.7).cos()).collect();

        let mut block = AudioBlock::from_channels(&[&left, &right]);
        by_block.process_audio_block(&mut block);

        let (mut l, mut r) = (left.clone(), right.clone());
        by_slices.process_block(&mut l, &mut r);

        assert_eq!(block.channel(0), l.as_slice());
        assert_eq!(block.channel(1), r.as_slice());
    }

    #[test]
    fn reprepare_clears_filter_state() {
        let mut eq = processor();
        eq.prepare(SR, 32).unwrap();

        let mut left = vec![1.0; 32];
        let mut right = vec![1.0; 32];
        eq.process_block(&mut left, &mut right);
        assert!(!eq.chain(Channel::Left).peak().is_silent());

        eq.prepare(44100.0, 64).unwrap();
        assert!(eq.chain(Channel::Left).peak().is_silent());
        assert_eq!(eq.left_collector().size(), 64);
    }
}
