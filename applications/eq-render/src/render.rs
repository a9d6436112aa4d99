//! Offline rendering
//!
//! Plays the host role for the EQ core: the calling thread acts as the audio
//! thread and feeds WAV frames block by block, while an analyzer thread
//! drains the per-channel readers the way a spectrum display would.
use crate::config::{AnalysisSettings, RenderConfig};
use crate::error::{RenderError, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use soul_eq::{AudioBlock, BlockReader, Channel, DualChannelProcessor, EqSettings};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info};

/// Outcome of one render
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderSummary {
    pub sample_rate: u32,
    pub channels: u16,
    pub frames: usize,
    pub input_peak: f32,
    pub output_peak: f32,
    /// Blocks received by the analyzer, per channel (left, right)
    pub analyzed_blocks: [usize; 2],
    /// Blocks dropped because the analyzer fell behind, per channel
    pub dropped_blocks: [usize; 2],
}

#[derive(Debug, Default)]
struct AnalyzerStats {
    blocks: [usize; 2],
}

/// Render `input` through the EQ into `output`
///
/// Mono files are processed on both channels and written back as mono.
/// Integer files are written with their original bit depth.
pub fn render_file(input: &Path, output: &Path, config: &RenderConfig) -> Result<RenderSummary> {
    config.validate()?;

    let mut reader = WavReader::open(input)?;
    let spec = reader.spec();
    check_format(&spec)?;

    let mut processor = config.eq.create_processor(spec.sample_rate as f64)?;
    let block_size = config.eq.block_size;

    info!(
        "Rendering {} ({} Hz, {} ch, {:?} {}-bit) with block size {}",
        input.display(),
        spec.sample_rate,
        spec.channels,
        spec.sample_format,
        spec.bits_per_sample,
        block_size
    );

    let done = Arc::new(AtomicBool::new(false));
    let analyzer = if config.analysis.enabled {
        let readers = processor
            .take_readers()
            .ok_or_else(|| RenderError::Config("visualization readers unavailable".to_string()))?;
        let done = Arc::clone(&done);
        let settings = config.analysis.clone();
        Some(thread::spawn(move || analyze(readers, &settings, &done)))
    } else {
        None
    };

    let mut summary = RenderSummary {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        ..Default::default()
    };

    let result = stream_blocks(&mut reader, output, &mut processor, block_size, &mut summary);
    // Stop the analyzer even when streaming failed
    done.store(true, Ordering::Release);

    if let Some(handle) = analyzer {
        let stats = handle.join().map_err(|_| RenderError::Analyzer)?;
        summary.analyzed_blocks = stats.blocks;
    }
    result?;

    summary.dropped_blocks = [
        processor.left_collector().dropped_block_count(),
        processor.right_collector().dropped_block_count(),
    ];

    info!(
        "Rendered {} frames to {} (peak {:.3} -> {:.3}, analyzed {:?}, dropped {:?})",
        summary.frames,
        output.display(),
        summary.input_peak,
        summary.output_peak,
        summary.analyzed_blocks,
        summary.dropped_blocks
    );
    Ok(summary)
}

/// Feed every frame of `reader` through `processor` and write the result
fn stream_blocks<R: std::io::Read>(
    reader: &mut WavReader<R>,
    output: &Path,
    processor: &mut DualChannelProcessor,
    block_size: usize,
    summary: &mut RenderSummary,
) -> Result<()> {
    let spec = reader.spec();
    let channels = spec.channels as usize;
    let mut writer = WavWriter::create(output, spec)?;
    let mut block = AudioBlock::new(2, block_size);

    let mut frame = 0usize;
    let mut channel = 0usize;
    for sample in read_samples(reader) {
        let sample = sample?;
        summary.input_peak = summary.input_peak.max(sample.abs());

        block.channel_mut(channel)[frame] = sample;
        if channels == 1 {
            block.channel_mut(1)[frame] = sample;
        }

        channel += 1;
        if channel == channels {
            channel = 0;
            frame += 1;
            if frame == block_size {
                processor.process_audio_block(&mut block);
                let peak = write_frames(&mut writer, &block, frame, channels, &spec)?;
                summary.output_peak = summary.output_peak.max(peak);
                summary.frames += frame;
                frame = 0;
            }
        }
    }

    // Trailing partial block
    if frame > 0 {
        let (left, right) = block.channel_pair_mut(Channel::Left.index(), Channel::Right.index());
        processor.process_block(&mut left[..frame], &mut right[..frame]);
        let peak = write_frames(&mut writer, &block, frame, channels, &spec)?;
        summary.output_peak = summary.output_peak.max(peak);
        summary.frames += frame;
    }

    writer.finalize()?;
    Ok(())
}

/// Magnitude response of the configured chain in dB at `points` log-spaced
/// frequencies between 20 Hz and 20 kHz
pub fn magnitude_response(
    settings: &EqSettings,
    sample_rate: f64,
    points: usize,
) -> Result<Vec<(f64, f64)>> {
    let processor = settings.create_processor(sample_rate)?;
    let chain = processor.chain(Channel::Left);

    let (low, high) = (20.0_f64, 20000.0_f64);
    let steps = points.max(2) - 1;

    Ok((0..=steps)
        .map(|i| {
            let frequency = low * (high / low).powf(i as f64 / steps as f64);
            let magnitude = chain.magnitude_for_frequency(frequency, sample_rate);
            (frequency, 20.0 * magnitude.max(1e-12).log10())
        })
        .collect())
}

fn check_format(spec: &WavSpec) -> Result<()> {
    if !(1..=2).contains(&spec.channels) {
        return Err(RenderError::UnsupportedFormat(format!(
            "{} channels (mono or stereo only)",
            spec.channels
        )));
    }

    match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) | (SampleFormat::Int, 8 | 16 | 24 | 32) => Ok(()),
        (format, bits) => Err(RenderError::UnsupportedFormat(format!(
            "{:?} {}-bit",
            format, bits
        ))),
    }
}

/// Full-scale value of an integer format
fn int_scale(bits: u16) -> f32 {
    (1_i64 << (bits - 1)) as f32
}

fn read_samples<'a, R: std::io::Read + 'a>(
    reader: &'a mut WavReader<R>,
) -> Box<dyn Iterator<Item = std::result::Result<f32, hound::Error>> + 'a> {
    let spec = reader.spec();
    match spec.sample_format {
        SampleFormat::Float => Box::new(reader.samples::<f32>()),
        SampleFormat::Int => {
            let scale = int_scale(spec.bits_per_sample);
            Box::new(reader.samples::<i32>().map(move |s| s.map(|v| v as f32 / scale)))
        }
    }
}

/// Write the first `frames` frames of `block`; returns their peak level
fn write_frames<W: std::io::Write + std::io::Seek>(
    writer: &mut WavWriter<W>,
    block: &AudioBlock,
    frames: usize,
    channels: usize,
    spec: &WavSpec,
) -> Result<f32> {
    let mut peak = 0.0f32;
    let scale = int_scale(spec.bits_per_sample);

    for frame in 0..frames {
        for channel in 0..channels {
            let sample = block.channel(channel)[frame];
            peak = peak.max(sample.abs());

            match spec.sample_format {
                SampleFormat::Float => writer.write_sample(sample)?,
                SampleFormat::Int => {
                    let value = (sample * scale).round().clamp(-scale, scale - 1.0) as i32;
                    writer.write_sample(value)?;
                }
            }
        }
    }

    Ok(peak)
}

/// Analyzer thread: drain both readers until rendering is done
fn analyze(
    (mut left, mut right): (BlockReader, BlockReader),
    settings: &AnalysisSettings,
    done: &AtomicBool,
) -> AnalyzerStats {
    let mut stats = AnalyzerStats::default();
    let mut block = left.new_block();

    loop {
        // Check before draining so blocks pushed before `done` are not missed
        let finished = done.load(Ordering::Acquire);

        for (index, reader) in [&mut left, &mut right].into_iter().enumerate() {
            while reader.pull(&mut block) {
                stats.blocks[index] += 1;
                if stats.blocks[index] % settings.report_every == 0 {
                    let rms = (block.iter().map(|s| s * s).sum::<f32>() / block.len() as f32).sqrt();
                    debug!(
                        "{:?} block {}: rms {:.1} dBFS",
                        reader.channel(),
                        stats.blocks[index],
                        20.0 * rms.max(1e-10).log10()
                    );
                }
            }
        }

        if finished {
            return stats;
        }
        thread::yield_now();
    }
}
