//! Utterance boundary detection
//!
//! Segments the microphone stream into utterances using RMS energy: speech
//! starts an utterance, sustained silence ends it. This is deliberately
//! simple — it gates the pipeline, it is not a voice-activity model.

/// Minimum audio energy threshold to consider speech
const ENERGY_THRESHOLD: f32 = 0.01;

/// State of the utterance detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    /// Waiting for speech
    Idle,
    /// Detected speech, accumulating the utterance
    Listening,
}

/// Detects utterance boundaries in a mono audio stream
pub struct UtteranceDetector {
    state: DetectorState,
    speech_buffer: Vec<f32>,
    silence_counter: usize,
    /// Minimum utterance length in samples (0.3 s)
    min_speech_samples: usize,
    /// Silence run that ends an utterance, in samples (1 s)
    silence_samples: usize,
}

impl UtteranceDetector {
    /// Create a detector for the given capture sample rate
    #[must_use]
    pub fn new(sample_rate: u32) -> Self {
        let rate = sample_rate as usize;
        Self {
            state: DetectorState::Idle,
            speech_buffer: Vec::new(),
            silence_counter: 0,
            min_speech_samples: rate * 3 / 10,
            silence_samples: rate,
        }
    }

    /// Process audio samples
    ///
    /// Returns true when a complete utterance has been accumulated; the
    /// caller then takes the buffer with [`Self::take_utterance`].
    pub fn process(&mut self, samples: &[f32]) -> bool {
        let energy = calculate_energy(samples);
        let is_speech = energy > ENERGY_THRESHOLD;

        match self.state {
            DetectorState::Idle => {
                if is_speech {
                    self.state = DetectorState::Listening;
                    self.speech_buffer.clear();
                    self.speech_buffer.extend_from_slice(samples);
                    self.silence_counter = 0;
                    tracing::trace!(energy, "speech detected, listening");
                }
            }
            DetectorState::Listening => {
                self.speech_buffer.extend_from_slice(samples);

                if is_speech {
                    self.silence_counter = 0;
                } else {
                    self.silence_counter += samples.len();
                }

                if self.silence_counter > self.silence_samples {
                    // The trailing silence run is in the buffer too; only
                    // what precedes it counts as speech
                    let speech_len = self
                        .speech_buffer
                        .len()
                        .saturating_sub(self.silence_counter);

                    if speech_len > self.min_speech_samples {
                        tracing::debug!(
                            samples = self.speech_buffer.len(),
                            "utterance complete"
                        );
                        return true;
                    }

                    // Timeout: too much silence without enough speech
                    if self.silence_counter > self.silence_samples * 2 {
                        tracing::trace!("timeout - resetting");
                        self.reset();
                    }
                }
            }
        }

        false
    }

    /// Take the accumulated utterance, returning the detector to idle
    pub fn take_utterance(&mut self) -> Vec<f32> {
        let utterance = std::mem::take(&mut self.speech_buffer);
        self.reset();
        utterance
    }

    /// Reset detector to idle state
    pub fn reset(&mut self) {
        self.state = DetectorState::Idle;
        self.speech_buffer.clear();
        self.silence_counter = 0;
    }

    /// Get current state
    #[must_use]
    pub const fn state(&self) -> DetectorState {
        self.state
    }

    /// Length of the accumulated speech buffer in samples
    #[must_use]
    pub fn buffered_samples(&self) -> usize {
        self.speech_buffer.len()
    }
}

/// Calculate RMS energy of audio samples
#[allow(clippy::cast_precision_loss)]
fn calculate_energy(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}
