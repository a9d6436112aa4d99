//! Cut filter cascade
//!
//! Up to four identical-type biquad stages run in series to build a steep
//! low-cut or high-cut. The requested slope decides how many leading stages
//! are active; the rest are bypassed.
use super::coefficients::{CutCoefficients, MAX_CUT_STAGES};
use super::stage::FilterStage;
use crate::params::Slope;

/// Fixed array of [`MAX_CUT_STAGES`] filter stages addressed by index
#[derive(Debug, Clone)]
pub struct CutCascade {
    stages: [FilterStage; MAX_CUT_STAGES],
}

impl CutCascade {
    /// Cascade with every stage bypassed
    pub fn new() -> Self {
        let mut stages: [FilterStage; MAX_CUT_STAGES] = Default::default();
        for stage in &mut stages {
            stage.set_bypassed(true);
        }
        Self { stages }
    }

    /// Install coefficients for `slope` and switch stages accordingly
    ///
    /// Stages `0..k` (k = `slope.active_stages()`) each receive their own
    /// coefficient set and are un-bypassed; stages `k..4` are bypassed. Every
    /// stage is handled on its own, so the result depends only on the
    /// arguments and never on the previous configuration.
    pub fn set_slope(&mut self, coefficients: &CutCoefficients, slope: Slope) {
        let active = slope.active_stages();

        for stage in &mut self.stages {
            stage.set_bypassed(true);
        }

        for (stage, coeffs) in self.stages.iter_mut().zip(coefficients).take(active) {
            stage.set_coefficients(*coeffs);
            stage.set_bypassed(false);
        }
    }

    /// Number of un-bypassed stages
    pub fn active_stages(&self) -> usize {
        self.stages.iter().filter(|s| !s.is_bypassed()).count()
    }

    /// Stage at `index` (0..4)
    pub fn stage(&self, index: usize) -> Option<&FilterStage> {
        self.stages.get(index)
    }

    /// Run the block through the active stages, slot 0 first
    pub fn process(&mut self, samples: &mut [f32]) {
        for stage in &mut self.stages {
            stage.process(samples);
        }
    }

    /// Clear the delay state of every stage
    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }

    /// Combined magnitude response of the active stages
    pub fn magnitude_for_frequency(&self, frequency: f64, sample_rate: f64) -> f64 {
        self.stages
            .iter()
            .filter(|s| !s.is_bypassed())
            .map(|s| s.coefficients().magnitude_for_frequency(frequency, sample_rate))
            .product()
    }
}

impl Default for CutCascade {
    fn default() -> Self {
        Self::new()
    }
}
