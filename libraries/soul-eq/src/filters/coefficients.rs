//! Filter coefficient design
//!
//! Pure functions that turn cutoff/gain/Q/slope parameters into normalized
//! biquad coefficients. Nothing here touches shared state or the heap, so all
//! of it is safe to call from the audio thread once per block.
//!
//! Design math runs in f64; the resulting coefficients are stored as f32
//! because that is what the per-sample filter uses.
use crate::params::{ParameterSnapshot, Slope};
use std::f64::consts::PI;

/// Number of second-order sections in a cut cascade (48 dB/oct)
pub const MAX_CUT_STAGES: usize = 4;

/// Highest design frequency as a fraction of the sample rate
const NYQUIST_LIMIT: f64 = 0.49;

/// Q of a single-section Butterworth filter
pub const BUTTERWORTH_Q: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// Normalized second-order section (a0 = 1)
///
/// Transfer function:
/// `H(z) = (b0 + b1 z^-1 + b2 z^-2) / (1 + a1 z^-1 + a2 z^-2)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl BiquadCoefficients {
    /// Pass-through section (H(z) = 1)
    pub const IDENTITY: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Normalize raw coefficients by a0
    fn from_raw(b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) -> Self {
        Self {
            b0: (b0 / a0) as f32,
            b1: (b1 / a0) as f32,
            b2: (b2 / a0) as f32,
            a1: (a1 / a0) as f32,
            a2: (a2 / a0) as f32,
        }
    }

    /// Magnitude of the frequency response at `frequency`
    pub fn magnitude_for_frequency(&self, frequency: f64, sample_rate: f64) -> f64 {
        let w = 2.0 * PI * frequency / sample_rate;
        let (cos1, sin1) = (w.cos(), w.sin());
        let (cos2, sin2) = ((2.0 * w).cos(), (2.0 * w).sin());

        // Evaluate numerator and denominator at z = e^{jw}
        let num_re = self.b0 as f64 + self.b1 as f64 * cos1 + self.b2 as f64 * cos2;
        let num_im = -(self.b1 as f64 * sin1 + self.b2 as f64 * sin2);
        let den_re = 1.0 + self.a1 as f64 * cos1 + self.a2 as f64 * cos2;
        let den_im = -(self.a1 as f64 * sin1 + self.a2 as f64 * sin2);

        let num = (num_re * num_re + num_im * num_im).sqrt();
        let den = (den_re * den_re + den_im * den_im).sqrt();

        if den > 0.0 {
            num / den
        } else {
            0.0
        }
    }
}

impl Default for BiquadCoefficients {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Coefficients for every slot of a cut cascade
///
/// All four slots are filled on every design. The first
/// `slope.active_stages()` sections hold the order `2 * active_stages`
/// Butterworth design (which has exactly that many sections); the remaining
/// slots hold pass-through sections, so a cascade can install any prefix
/// without reading stale coefficients.
pub type CutCoefficients = [BiquadCoefficients; MAX_CUT_STAGES];

#[inline]
fn omega(sample_rate: f64, frequency: f64) -> f64 {
    debug_assert!(sample_rate > 0.0, "sample rate must be positive");
    2.0 * PI * frequency / sample_rate
}

/// Bell (peaking) filter
///
/// `gain_linear` is the linear gain at the centre frequency,
/// i.e. `10^(gain_db / 20)`.
pub fn make_peak_filter(
    sample_rate: f64,
    frequency: f64,
    quality: f64,
    gain_linear: f64,
) -> BiquadCoefficients {
    let a = gain_linear.max(0.0).sqrt();
    let w = omega(sample_rate, frequency);
    let (sin_w, cos_w) = w.sin_cos();
    let alpha = sin_w / (2.0 * quality);

    BiquadCoefficients::from_raw(
        1.0 + alpha * a,
        -2.0 * cos_w,
        1.0 - alpha * a,
        1.0 + alpha / a,
        -2.0 * cos_w,
        1.0 - alpha / a,
    )
}

/// Second-order lowpass section
pub fn make_low_pass(sample_rate: f64, frequency: f64, q: f64) -> BiquadCoefficients {
    let w = omega(sample_rate, frequency);
    let (sin_w, cos_w) = w.sin_cos();
    let alpha = sin_w / (2.0 * q);

    BiquadCoefficients::from_raw(
        (1.0 - cos_w) / 2.0,
        1.0 - cos_w,
        (1.0 - cos_w) / 2.0,
        1.0 + alpha,
        -2.0 * cos_w,
        1.0 - alpha,
    )
}

/// Second-order highpass section
pub fn make_high_pass(sample_rate: f64, frequency: f64, q: f64) -> BiquadCoefficients {
    let w = omega(sample_rate, frequency);
    let (sin_w, cos_w) = w.sin_cos();
    let alpha = sin_w / (2.0 * q);

    BiquadCoefficients::from_raw(
        (1.0 + cos_w) / 2.0,
        -(1.0 + cos_w),
        (1.0 + cos_w) / 2.0,
        1.0 + alpha,
        -2.0 * cos_w,
        1.0 - alpha,
    )
}

/// Q of section `index` in an even-order Butterworth decomposition
///
/// Pole pairs sit at angles (2i + 1)π / (2N) from the imaginary axis.
pub fn butterworth_section_q(order: usize, index: usize) -> f64 {
    let angle = (2 * index + 1) as f64 * PI / (2 * order) as f64;
    1.0 / (2.0 * angle.cos())
}

fn design_cut(
    slope: Slope,
    section: impl Fn(f64) -> BiquadCoefficients,
) -> CutCoefficients {
    let order = slope.order();
    let active = slope.active_stages();

    let mut sections = [BiquadCoefficients::IDENTITY; MAX_CUT_STAGES];
    for (index, slot) in sections.iter_mut().enumerate().take(active) {
        *slot = section(butterworth_section_q(order, index));
    }
    sections
}

/// Butterworth highpass cascade (low-cut)
pub fn design_low_cut(sample_rate: f64, frequency: f64, slope: Slope) -> CutCoefficients {
    design_cut(slope, |q| make_high_pass(sample_rate, frequency, q))
}

/// Butterworth lowpass cascade (high-cut)
pub fn design_high_cut(sample_rate: f64, frequency: f64, slope: Slope) -> CutCoefficients {
    design_cut(slope, |q| make_low_pass(sample_rate, frequency, q))
}

/// Keep a design frequency below Nyquist so low sample rates stay stable
#[inline]
fn below_nyquist(frequency: f32, sample_rate: f64) -> f64 {
    (frequency as f64).min(sample_rate * NYQUIST_LIMIT)
}

/// Peak stage coefficients for a snapshot
pub fn peak_coefficients(snapshot: &ParameterSnapshot, sample_rate: f64) -> BiquadCoefficients {
    make_peak_filter(
        sample_rate,
        below_nyquist(snapshot.peak_frequency, sample_rate),
        snapshot.peak_quality as f64,
        10.0_f64.powf(snapshot.peak_gain_db as f64 / 20.0),
    )
}

/// Low-cut cascade coefficients for a snapshot
pub fn low_cut_coefficients(snapshot: &ParameterSnapshot, sample_rate: f64) -> CutCoefficients {
    design_low_cut(
        sample_rate,
        below_nyquist(snapshot.low_cut_frequency, sample_rate),
        snapshot.low_cut_slope,
    )
}

/// High-cut cascade coefficients for a snapshot
pub fn high_cut_coefficients(snapshot: &ParameterSnapshot, sample_rate: f64) -> CutCoefficients {
    design_high_cut(
        sample_rate,
        below_nyquist(snapshot.high_cut_frequency, sample_rate),
        snapshot.high_cut_slope,
    )
}
