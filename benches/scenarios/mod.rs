mod chords;

pub use chords::{bench_chords, bench_input};
