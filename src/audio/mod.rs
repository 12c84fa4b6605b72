//! Audio capture, playback, and encoding
//!
//! Everything here deals in mono audio: f32 samples on the capture side,
//! 16-bit little-endian PCM on the synthesis side.

mod capture;
mod detector;
mod playback;
mod wav;

pub use capture::AudioCapture;
pub use detector::{DetectorState, UtteranceDetector};
pub use playback::AudioPlayback;
pub use wav::{pcm_to_wav, samples_to_wav};
