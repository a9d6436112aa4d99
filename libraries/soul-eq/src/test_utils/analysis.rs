//! Audio analysis tools for verification
//!
//! Level, tone and continuity measurements used by the EQ quality tests.

/// Calculate RMS (Root Mean Square) level
pub fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Calculate peak level
///
/// Returns the absolute maximum sample value.
pub fn calculate_peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
}

/// Convert linear amplitude to dB
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        -100.0 // Silence
    } else {
        20.0 * linear.log10()
    }
}

/// Convert dB to linear amplitude
pub fn db_to_linear(db: f32) -> f32 {
    10.0f32.powf(db / 20.0)
}

/// Check if a signal is silent (below threshold)
pub fn is_silent(samples: &[f32], threshold_db: f32) -> bool {
    linear_to_db(calculate_peak(samples)) < threshold_db
}

/// Amplitude of one frequency component (single-bin DFT)
///
/// For a pure sine of amplitude `A` spanning a whole number of periods this
/// returns `A`.
pub fn tone_amplitude(samples: &[f32], frequency: f32, sample_rate: u32) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let w = 2.0 * std::f64::consts::PI * frequency as f64 / sample_rate as f64;
    let (re, im) = samples
        .iter()
        .enumerate()
        .fold((0.0f64, 0.0f64), |(re, im), (n, &s)| {
            let phase = w * n as f64;
            (re + s as f64 * phase.cos(), im - s as f64 * phase.sin())
        });

    (2.0 * (re * re + im * im).sqrt() / samples.len() as f64) as f32
}

/// Largest absolute difference between consecutive samples
pub fn max_sample_step(samples: &[f32]) -> f32 {
    samples
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).abs())
        .fold(0.0f32, f32::max)
}

/// Maximum absolute difference between two signals
pub fn calculate_signal_difference(signal_a: &[f32], signal_b: &[f32]) -> f32 {
    signal_a
        .iter()
        .zip(signal_b.iter())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0f32, f32::max)
}
