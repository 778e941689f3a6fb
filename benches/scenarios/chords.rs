//! Benchmarks for whole-keyboard rendering.
//!
//! A block costs roughly one oscillator and one envelope per sounding voice,
//! plus the gain glide. These pin that down from a single note up to every
//! key held at once.

use std::{collections::VecDeque, hint::black_box};

use criterion::{BatchSize, BenchmarkId, Criterion};
use keyglow::{
    dsp::Waveform,
    keys::FrequencyTable,
    synth::{KeyboardSynth, SynthMessage, SynthSession},
    SynthConfig,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

/// Held voice counts: a note, a triad, a big chord, every key.
const VOICE_COUNTS: &[usize] = &[1, 3, 8, 24];

pub fn bench_chords(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/chords");
    let table = FrequencyTable::standard();
    let config = SynthConfig::default();

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for &voices in VOICE_COUNTS {
            let mut session = SynthSession::new(SAMPLE_RATE, &config);
            for entry in table.entries().iter().take(voices) {
                session.start_voice(entry.key, entry.frequency);
            }
            group.bench_with_input(
                BenchmarkId::new(format!("{voices}_voices"), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        session.render_block(black_box(&mut buffer));
                    })
                },
            );
        }

        // Sawtooth, the branchiest waveform, with every key down
        let mut session = SynthSession::new(SAMPLE_RATE, &config);
        session.set_waveform(Waveform::Sawtooth);
        for entry in table.entries() {
            session.start_voice(entry.key, entry.frequency);
        }
        group.bench_with_input(BenchmarkId::new("24_voices_saw", size), &size, |b, _| {
            b.iter(|| {
                session.render_block(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}

/// Key mashing: a burst of presses, one block, a burst of releases.
///
/// Each iteration starts from a fresh synth so release tails from earlier
/// iterations do not pile up and skew later samples.
pub fn bench_input(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/input");
    let table = FrequencyTable::standard();
    let config = SynthConfig::default();

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        group.bench_with_input(BenchmarkId::new("press_release_burst", size), &size, |b, _| {
            b.iter_batched_ref(
                || KeyboardSynth::new(SAMPLE_RATE, &config, VecDeque::<SynthMessage>::new(), ()),
                |synth| {
                    for entry in table.entries().iter().step_by(3) {
                        synth.handle(SynthMessage::Press(entry.key));
                    }
                    synth.render_block(black_box(&mut buffer));
                    for entry in table.entries().iter().step_by(3) {
                        synth.handle(SynthMessage::Release(entry.key));
                    }
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}
