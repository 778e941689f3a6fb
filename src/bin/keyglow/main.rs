//! keyglow - play the computer keyboard like a piano
//!
//! Run with: cargo run [sine|square|sawtooth|triangle]
//!
//! The terminal belongs to the UI, so logs go to `keyglow.log` in the
//! working directory. `RUST_LOG=debug` shows voice events.

use env_logger::{Builder, Env, Target};
use keyglow::{dsp::Waveform, runtime::KeyGlow};
use std::fs::File;

const LOG_FILE: &str = "keyglow.log";

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let log_file = File::create(LOG_FILE)?;
    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(log_file)))
        .init();

    let waveform = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<Waveform>()?,
        None => Waveform::default(),
    };

    KeyGlow::new().waveform(waveform).run()
}
