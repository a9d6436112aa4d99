//! Test signal generation
//!
//! All generators return mono samples, one `Vec<f32>` per channel, matching
//! the planar layout the processor works on:
//! - Sine waves (single frequency)
//! - Logarithmic sine sweeps
//! - White noise
//! - Impulses and DC steps

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::PI;

/// Number of whole samples in `duration` seconds
fn sample_count(sample_rate: u32, duration: f32) -> usize {
    (sample_rate as f32 * duration) as usize
}

/// Generate a sine wave
///
/// # Arguments
/// * `frequency` - Frequency in Hz
/// * `sample_rate` - Sample rate in Hz
/// * `duration` - Duration in seconds
/// * `amplitude` - Peak amplitude (0.0 to 1.0)
pub fn generate_sine_wave(frequency: f32, sample_rate: u32, duration: f32, amplitude: f32) -> Vec<f32> {
    (0..sample_count(sample_rate, duration))
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (2.0 * PI * frequency * t).sin() * amplitude
        })
        .collect()
}

/// Generate a logarithmic sine sweep (chirp)
///
/// Instantaneous frequency rises exponentially from `start_freq` to
/// `end_freq` over `duration`.
pub fn generate_sine_sweep(
    start_freq: f32,
    end_freq: f32,
    sample_rate: u32,
    duration: f32,
    amplitude: f32,
) -> Vec<f32> {
    let k = (end_freq / start_freq).ln() / duration;

    (0..sample_count(sample_rate, duration))
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            let phase = 2.0 * PI * start_freq * ((k * t).exp() - 1.0) / k;
            phase.sin() * amplitude
        })
        .collect()
}

/// Generate white noise from a fixed seed
///
/// The same seed always produces the same samples, so tests stay
/// reproducible.
pub fn generate_white_noise(sample_rate: u32, duration: f32, amplitude: f32, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..sample_count(sample_rate, duration))
        .map(|_| rng.gen_range(-1.0..=1.0_f32) * amplitude)
        .collect()
}

/// Single non-zero sample followed by silence
pub fn generate_impulse(length: usize, amplitude: f32) -> Vec<f32> {
    let mut samples = vec![0.0; length];
    if let Some(first) = samples.first_mut() {
        *first = amplitude;
    }
    samples
}

/// Silence for `silent` samples, then a constant level
pub fn generate_step(length: usize, silent: usize, level: f32) -> Vec<f32> {
    (0..length)
        .map(|i| if i < silent { 0.0 } else { level })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_has_expected_length_and_peak() {
        let sine = generate_sine_wave(1000.0, 48000, 0.1, 0.5);
        assert_eq!(sine.len(), 4800);
        let peak = sine.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!((peak - 0.5).abs() < 0.01);
    }

    #[test]
    fn noise_is_reproducible() {
        let a = generate_white_noise(48000, 0.01, 1.0, 7);
        let b = generate_white_noise(48000, 0.01, 1.0, 7);
        assert_eq!(a, b);
        assert!(a.iter().all(|s| s.abs() <= 1.0));
    }

    #[test]
    fn impulse_is_single_sample() {
        let impulse = generate_impulse(16, 1.0);
        assert_eq!(impulse[0], 1.0);
        assert!(impulse[1..].iter().all(|&s| s == 0.0));
    }
}
