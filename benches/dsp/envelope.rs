//! Benchmarks for the ADSR envelope.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use keyglow::dsp::{Envelope, EnvelopeShape};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");
    let shape = EnvelopeShape::default();

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack phase (exp() every sample)
        let mut env = Envelope::new(shape);
        env.note_on();
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer), SAMPLE_RATE);
            })
        });

        // Sustain phase (settled, constant)
        let mut env = Envelope::new(shape);
        env.note_on();
        for _ in 0..(SAMPLE_RATE as usize * 5) {
            env.next_sample(SAMPLE_RATE);
        }
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer), SAMPLE_RATE);
            })
        });

        // Release phase; a very long release so the bench never reaches disposal
        let mut env = Envelope::new(EnvelopeShape {
            release_time: 3_600.0,
            ..shape
        });
        env.note_on();
        for _ in 0..(SAMPLE_RATE as usize) {
            env.next_sample(SAMPLE_RATE);
        }
        env.note_off(SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer), SAMPLE_RATE);
            })
        });
    }

    group.finish();
}
