//! Single biquad filter stage
//!
//! Direct form I, mono. Coefficients are replaced wholesale (never
//! interpolated) and the delay registers survive every replacement, which
//! keeps block-rate coefficient updates free of clicks.
use super::coefficients::BiquadCoefficients;

/// Outputs below this magnitude are flushed to zero (denormal guard)
const DENORMAL_THRESHOLD: f32 = 1e-15;

/// One second-order IIR section with its own bypass switch
///
/// # Bypass
/// A bypassed stage leaves samples untouched and does not advance its delay
/// registers. When it is switched back on it resumes from the state it had
/// when it was bypassed (zero if it never ran).
#[derive(Debug, Clone)]
pub struct FilterStage {
    coefficients: BiquadCoefficients,
    bypassed: bool,

    // Delay registers
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl FilterStage {
    /// Pass-through stage with cleared state
    pub fn new() -> Self {
        Self {
            coefficients: BiquadCoefficients::IDENTITY,
            bypassed: false,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Install a new coefficient set
    ///
    /// The previous set is replaced as a whole; delay state is kept.
    pub fn set_coefficients(&mut self, coefficients: BiquadCoefficients) {
        self.coefficients = coefficients;
    }

    /// Currently installed coefficients
    pub fn coefficients(&self) -> &BiquadCoefficients {
        &self.coefficients
    }

    pub fn set_bypassed(&mut self, bypassed: bool) {
        self.bypassed = bypassed;
    }

    pub fn is_bypassed(&self) -> bool {
        self.bypassed
    }

    /// Filter one sample (ignores the bypass flag)
    #[inline]
    pub fn process_sample(&mut self, input: f32) -> f32 {
        let c = &self.coefficients;
        let mut output = c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2
            - c.a1 * self.y1
            - c.a2 * self.y2;

        if output.abs() < DENORMAL_THRESHOLD {
            output = 0.0;
        }

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    /// Filter a mono block in place
    ///
    /// # Real-Time Safety
    /// - No allocations
    /// - Bypassed stages return immediately
    pub fn process(&mut self, samples: &mut [f32]) {
        if self.bypassed {
            return;
        }

        for sample in samples.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }

    /// Clear delay registers (coefficients and bypass are kept)
    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }

    /// Whether all delay registers are zero
    pub fn is_silent(&self) -> bool {
        self.x1 == 0.0 && self.x2 == 0.0 && self.y1 == 0.0 && self.y2 == 0.0
    }
}

impl Default for FilterStage {
    fn default() -> Self {
        Self::new()
    }
}
