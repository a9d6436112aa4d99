//! Serializable EQ settings
use crate::error::{EqError, Result};
use crate::fifo::DEFAULT_FIFO_CAPACITY;
use crate::params::{EqParameters, ParameterSnapshot};
use crate::processor::DualChannelProcessor;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EqSettings {
    /// Forces a processing rate; `None` uses the stream's own rate
    #[serde(default)]
    pub sample_rate: Option<f64>,

    #[serde(default = "default_block_size")]
    pub block_size: usize,

    #[serde(default = "default_fifo_capacity")]
    pub fifo_capacity: usize,

    #[serde(default)]
    pub parameters: ParameterSnapshot,
}

impl EqSettings {
    /// Validate settings
    pub fn validate(&self) -> Result<()> {
        if let Some(rate) = self.sample_rate {
            if !rate.is_finite() || rate <= 0.0 {
                warn!("Rejected sample rate override {}", rate);
                return Err(EqError::InvalidSampleRate(rate));
            }
        }

        if self.block_size == 0 {
            return Err(EqError::InvalidBlockSize(self.block_size));
        }

        if self.fifo_capacity == 0 {
            return Err(EqError::InvalidCapacity(self.fifo_capacity));
        }

        if let Err(e) = self.parameters.validate() {
            warn!("Rejected EQ parameters: {}", e);
            return Err(e);
        }

        Ok(())
    }

    /// Shared parameter store initialised from these settings
    pub fn create_parameters(&self) -> Arc<EqParameters> {
        Arc::new(EqParameters::from_snapshot(&self.parameters))
    }

    /// Validated processor prepared for `stream_sample_rate`
    ///
    /// A configured `sample_rate` takes precedence over the stream's.
    pub fn create_processor(&self, stream_sample_rate: f64) -> Result<DualChannelProcessor> {
        self.validate()?;

        let mut processor =
            DualChannelProcessor::with_fifo_capacity(self.create_parameters(), self.fifo_capacity)?;
        processor.prepare(self.sample_rate.unwrap_or(stream_sample_rate), self.block_size)?;
        Ok(processor)
    }
}

impl Default for EqSettings {
    fn default() -> Self {
        Self {
            sample_rate: None,
            block_size: default_block_size(),
            fifo_capacity: default_fifo_capacity(),
            parameters: ParameterSnapshot::default(),
        }
    }
}

// Default values
fn default_block_size() -> usize {
    512
}

fn default_fifo_capacity() -> usize {
    DEFAULT_FIFO_CAPACITY
}
