//! Per-channel filter chain
//!
//! Fixed pipeline: low-cut cascade → peak stage → high-cut cascade. One
//! chain processes one mono channel in place.
use super::cascade::CutCascade;
use super::coefficients::{high_cut_coefficients, low_cut_coefficients, peak_coefficients};
use super::stage::FilterStage;
use crate::params::ParameterSnapshot;

/// Position of a processor inside a [`ChannelChain`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainPosition {
    LowCut,
    Peak,
    HighCut,
}

/// Low-cut → peak → high-cut for a single channel
#[derive(Debug, Clone)]
pub struct ChannelChain {
    low_cut: CutCascade,
    peak: FilterStage,
    high_cut: CutCascade,
    low_cut_bypassed: bool,
    high_cut_bypassed: bool,
}

impl ChannelChain {
    pub fn new() -> Self {
        Self {
            low_cut: CutCascade::new(),
            peak: FilterStage::new(),
            high_cut: CutCascade::new(),
            low_cut_bypassed: false,
            high_cut_bypassed: false,
        }
    }

    /// Recompute and install every coefficient from `snapshot`
    ///
    /// Called once per block before the block is processed. Delay state is
    /// left alone.
    pub fn update_from_snapshot(&mut self, snapshot: &ParameterSnapshot, sample_rate: f64) {
        self.low_cut
            .set_slope(&low_cut_coefficients(snapshot, sample_rate), snapshot.low_cut_slope);

        self.peak.set_coefficients(peak_coefficients(snapshot, sample_rate));
        self.peak.set_bypassed(snapshot.peak_bypassed);

        self.high_cut
            .set_slope(&high_cut_coefficients(snapshot, sample_rate), snapshot.high_cut_slope);

        self.low_cut_bypassed = snapshot.low_cut_bypassed;
        self.high_cut_bypassed = snapshot.high_cut_bypassed;
    }

    /// Filter a mono block in place
    pub fn process(&mut self, samples: &mut [f32]) {
        if !self.low_cut_bypassed {
            self.low_cut.process(samples);
        }

        self.peak.process(samples);

        if !self.high_cut_bypassed {
            self.high_cut.process(samples);
        }
    }

    /// Clear the delay state of every stage
    pub fn reset(&mut self) {
        self.low_cut.reset();
        self.peak.reset();
        self.high_cut.reset();
    }

    pub fn is_bypassed(&self, position: ChainPosition) -> bool {
        match position {
            ChainPosition::LowCut => self.low_cut_bypassed,
            ChainPosition::Peak => self.peak.is_bypassed(),
            ChainPosition::HighCut => self.high_cut_bypassed,
        }
    }

    pub fn low_cut(&self) -> &CutCascade {
        &self.low_cut
    }

    pub fn peak(&self) -> &FilterStage {
        &self.peak
    }

    pub fn high_cut(&self) -> &CutCascade {
        &self.high_cut
    }

    /// Magnitude response of the whole chain, honouring bypass state
    pub fn magnitude_for_frequency(&self, frequency: f64, sample_rate: f64) -> f64 {
        let mut magnitude = 1.0;

        if !self.low_cut_bypassed {
            magnitude *= self.low_cut.magnitude_for_frequency(frequency, sample_rate);
        }
        if !self.peak.is_bypassed() {
            magnitude *= self
                .peak
                .coefficients()
                .magnitude_for_frequency(frequency, sample_rate);
        }
        if !self.high_cut_bypassed {
            magnitude *= self.high_cut.magnitude_for_frequency(frequency, sample_rate);
        }

        magnitude
    }
}

impl Default for ChannelChain {
    fn default() -> Self {
        Self::new()
    }
}
