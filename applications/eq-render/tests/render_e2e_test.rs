//! End-to-end render tests on temporary WAV files

use eq_render::{render_file, RenderConfig, RenderError};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use soul_eq::Slope;
use std::f32::consts::PI;
use std::path::Path;

const SAMPLE_RATE: u32 = 48000;

fn write_wav(path: &Path, spec: WavSpec, frames: usize, tone: impl Fn(usize, u16) -> f32) {
    let mut writer = WavWriter::create(path, spec).unwrap();
    for n in 0..frames {
        for channel in 0..spec.channels {
            let sample = tone(n, channel);
            match spec.sample_format {
                SampleFormat::Float => writer.write_sample(sample).unwrap(),
                SampleFormat::Int => writer
                    .write_sample((sample * 32767.0).round() as i16)
                    .unwrap(),
            }
        }
    }
    writer.finalize().unwrap();
}

fn sine(frequency: f32, n: usize) -> f32 {
    (2.0 * PI * frequency * n as f32 / SAMPLE_RATE as f32).sin() * 0.5
}

fn rms(samples: &[f32]) -> f32 {
    (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
}

#[test]
fn low_cut_removes_low_tone_from_stereo_float_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.wav");
    let output = dir.path().join("out.wav");

    let spec = WavSpec {
        channels: 2,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    // Left: 100 Hz, right: 5 kHz; 1.01 s so the last block is partial
    let frames = 48_480;
    write_wav(&input, spec, frames, |n, channel| {
        if channel == 0 {
            sine(100.0, n)
        } else {
            sine(5000.0, n)
        }
    });

    let mut config = RenderConfig::default();
    config.eq.block_size = 256;
    config.eq.parameters.low_cut_frequency = 1000.0;
    config.eq.parameters.low_cut_slope = Slope::Slope48;

    let summary = render_file(&input, &output, &config).unwrap();

    assert_eq!(summary.frames, frames);
    assert_eq!(summary.channels, 2);
    // Every full block is either analyzed or dropped
    for channel in 0..2 {
        assert_eq!(
            summary.analyzed_blocks[channel] + summary.dropped_blocks[channel],
            frames / 256
        );
    }

    let mut reader = WavReader::open(&output).unwrap();
    assert_eq!(reader.spec(), spec);
    let samples: Vec<f32> = reader.samples::<f32>().map(Result::unwrap).collect();
    assert_eq!(samples.len(), frames * 2);

    let left: Vec<f32> = samples.iter().step_by(2).copied().collect();
    let right: Vec<f32> = samples.iter().skip(1).step_by(2).copied().collect();

    let tail = frames / 2..;
    assert!(rms(&left[tail.clone()]) < 1e-3, "100 Hz leaked: {}", rms(&left[tail.clone()]));
    let right_rms = rms(&right[tail]);
    assert!((right_rms - 0.5 / 2f32.sqrt()).abs() < 0.01, "5 kHz level {}", right_rms);
}

#[test]
fn mono_int_file_stays_mono() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("mono.wav");
    let output = dir.path().join("mono_out.wav");

    let spec = WavSpec {
        channels: 1,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    write_wav(&input, spec, 10_000, |n, _| sine(440.0, n));

    let mut config = RenderConfig::default();
    config.analysis.enabled = false;

    let summary = render_file(&input, &output, &config).unwrap();
    assert_eq!(summary.frames, 10_000);
    assert_eq!(summary.analyzed_blocks, [0, 0]);

    let reader = WavReader::open(&output).unwrap();
    assert_eq!(reader.spec(), spec);
    assert_eq!(reader.len(), 10_000);
    // Default settings are nearly transparent at 440 Hz
    assert!((summary.output_peak - summary.input_peak).abs() < 0.01);
}

#[test]
fn invalid_config_is_rejected_before_reading() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = RenderConfig::default();
    config.eq.block_size = 0;

    let result = render_file(
        &dir.path().join("missing.wav"),
        &dir.path().join("out.wav"),
        &config,
    );
    assert!(matches!(result, Err(RenderError::Eq(_))));
}

#[test]
fn missing_input_is_a_wav_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = render_file(
        &dir.path().join("missing.wav"),
        &dir.path().join("out.wav"),
        &RenderConfig::default(),
    );
    assert!(matches!(result, Err(RenderError::Wav(_))));
}
