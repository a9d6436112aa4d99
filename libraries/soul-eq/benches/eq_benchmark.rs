//! Performance benchmarks for the EQ processor
//!
//! Run with: cargo bench -p soul-eq --bench eq_benchmark --features test-utils

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use soul_eq::filters::coefficients::{high_cut_coefficients, low_cut_coefficients, peak_coefficients};
use soul_eq::test_utils::generate_white_noise;
use soul_eq::{DualChannelProcessor, EqParameters, ParameterSnapshot, SampleQueue, Slope};
use std::sync::Arc;

const SAMPLE_RATE: f64 = 48000.0;

fn steep_snapshot() -> ParameterSnapshot {
    ParameterSnapshot {
        low_cut_frequency: 80.0,
        low_cut_slope: Slope::Slope48,
        peak_frequency: 2500.0,
        peak_gain_db: 4.0,
        peak_quality: 1.4,
        high_cut_frequency: 16000.0,
        high_cut_slope: Slope::Slope48,
        ..Default::default()
    }
}

fn bench_block_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_block");

    for block_size in [64usize, 128, 256, 512, 1024, 2048] {
        let input = generate_white_noise(SAMPLE_RATE as u32, 0.1, 0.5, 1)[..block_size].to_vec();
        group.throughput(Throughput::Elements(block_size as u64));

        group.bench_with_input(BenchmarkId::new("48k_stereo", block_size), &input, |b, input| {
            let params = Arc::new(EqParameters::from_snapshot(&steep_snapshot()));
            let mut eq = DualChannelProcessor::new(params);
            eq.prepare(SAMPLE_RATE, block_size).unwrap();
            // Nobody drains the readers; full queues drop blocks like a stalled UI would
            let mut left = input.clone();
            let mut right = input.clone();

            b.iter(|| {
                left.copy_from_slice(input);
                right.copy_from_slice(input);
                eq.process_block(black_box(&mut left), black_box(&mut right));
            });
        });
    }

    group.finish();
}

fn bench_slopes(c: &mut Criterion) {
    let mut group = c.benchmark_group("slope");
    let input = generate_white_noise(SAMPLE_RATE as u32, 0.1, 0.5, 2)[..512].to_vec();
    group.throughput(Throughput::Elements(512));

    for slope in Slope::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(slope), &slope, |b, &slope| {
            let params = Arc::new(EqParameters::from_snapshot(&ParameterSnapshot {
                low_cut_slope: slope,
                high_cut_slope: slope,
                ..steep_snapshot()
            }));
            let mut eq = DualChannelProcessor::new(params);
            eq.prepare(SAMPLE_RATE, 512).unwrap();
            let mut left = input.clone();
            let mut right = input.clone();

            b.iter(|| {
                left.copy_from_slice(&input);
                right.copy_from_slice(&input);
                eq.process_block(black_box(&mut left), black_box(&mut right));
            });
        });
    }

    group.finish();
}

fn bench_coefficient_design(c: &mut Criterion) {
    let snapshot = steep_snapshot();

    c.bench_function("design_all_coefficients", |b| {
        b.iter(|| {
            let s = black_box(&snapshot);
            black_box((
                low_cut_coefficients(s, SAMPLE_RATE),
                peak_coefficients(s, SAMPLE_RATE),
                high_cut_coefficients(s, SAMPLE_RATE),
            ))
        });
    });
}

fn bench_queue(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample_queue");

    for block_length in [256usize, 2048] {
        group.bench_with_input(
            BenchmarkId::new("push_pull", block_length),
            &block_length,
            |b, &block_length| {
                let mut queue = SampleQueue::new(30, block_length).unwrap();
                let block = vec![0.5f32; block_length];
                let mut out = vec![0.0f32; block_length];

                b.iter(|| {
                    queue.push(black_box(&block));
                    queue.pull(black_box(&mut out));
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_block_sizes,
    bench_slopes,
    bench_coefficient_design,
    bench_queue,
);

criterion_main!(benches);
