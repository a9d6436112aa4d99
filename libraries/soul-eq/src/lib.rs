//! Soul Player EQ
//!
//! Real-time three-stage parametric equalizer for stereo audio.
//!
//! This crate provides:
//! - A per-channel filter chain: Butterworth low-cut (12-48 dB/oct), RBJ peak
//!   (bell) and Butterworth high-cut (12-48 dB/oct)
//! - A lock-free parameter store shared between a control thread and the
//!   audio thread
//! - Per-channel sample collectors that hand fixed-size blocks of processed
//!   audio to a visualization thread through a wait-free SPSC queue
//!
//! # Example
//!
//! ```rust
//! use soul_eq::{DualChannelProcessor, EqParameters, Slope};
//! use std::sync::Arc;
//!
//! # fn example() -> soul_eq::Result<()> {
//! let params = Arc::new(EqParameters::new());
//! let mut eq = DualChannelProcessor::new(Arc::clone(&params));
//! eq.prepare(48000.0, 512)?;
//!
//! // Hand the consumer ends to an analyzer thread
//! let (mut left_reader, _right_reader) = eq.take_readers().expect("readers parked after prepare");
//!
//! // Control thread: tweak parameters at any time
//! params.set_peak_gain_db(4.5);
//! params.set_high_cut_slope(Slope::Slope24);
//!
//! // Audio thread: one call per callback
//! let mut left = vec![0.0_f32; 512];
//! let mut right = vec![0.0_f32; 512];
//! eq.process_block(&mut left, &mut right);
//!
//! // Analyzer thread: drain completed blocks
//! let mut block = left_reader.new_block();
//! while left_reader.pull(&mut block) {
//!     // draw spectrum...
//! }
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

mod collector;
mod error;
mod fifo;
pub mod filters;
mod params;
mod processor;
mod settings;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use collector::{BlockReader, Channel, ChannelSampleCollector};
pub use error::{EqError, Result};
pub use fifo::{AudioBlock, QueueConsumer, QueueProducer, SampleQueue, DEFAULT_FIFO_CAPACITY};
pub use filters::{
    BiquadCoefficients, ChainPosition, ChannelChain, CutCascade, CutCoefficients, FilterStage,
    MAX_CUT_STAGES,
};
pub use params::{
    EqParameters, ParameterId, ParameterRange, ParameterSnapshot, Slope, MAX_FREQUENCY,
    MAX_GAIN_DB, MAX_QUALITY, MIN_FREQUENCY, MIN_GAIN_DB, MIN_QUALITY,
};
pub use processor::DualChannelProcessor;
pub use settings::EqSettings;
