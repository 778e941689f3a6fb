// Purpose: Voice management, normalization and input routing
// This layer sits above the DSP primitives and owns every sounding note

pub mod keyboard;
pub mod message;
pub mod normalize;
pub mod observer;
pub mod session;
pub mod voice;

pub use keyboard::KeyboardSynth;
pub use message::{MessageReceiver, MessageSender, SynthMessage};
pub use normalize::{normalization_scale, Normalizer};
pub use observer::{VisualEvent, VoiceObserver};
pub use session::SynthSession;
pub use voice::{Voice, VoiceHandle};
