//! The keyboard's key space.
//!
//! A `KeyId` is the one identifier every input source is normalized into:
//! typed characters and pointer hits on drawn keys both end up here before
//! the synth sees them. The frequency table maps those identifiers to
//! pitches, and `freq_to_hue` gives each pitch its overlay color.

/// Frequency to overlay hue.
pub mod hue;
/// Key identifiers and the static key -> frequency table.
pub mod table;

pub use hue::{freq_to_hue, hsl_to_rgb};
pub use table::{FrequencyTable, KeyEntry, KeyId, ParseKeyIdError};
