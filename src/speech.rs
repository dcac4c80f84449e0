//! Speech collaborator contracts
//!
//! Transcription and synthesis/playback are external services; the core
//! consumes them through these traits. A timeout or unintelligible
//! input is `Ok(None)` — "no input this turn", never an error.

mod console;
mod murf;

pub use console::ConsoleVoice;
pub use murf::MurfSpeech;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech transport failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("speech service rejected the request: HTTP {status}: {body}")]
    Service { status: u16, body: String },
    #[error("audio io failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Speech-to-text service
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Wait up to `timeout` for an utterance. `silence_threshold` is how
    /// long the service samples ambient noise before listening;
    /// implementations without a microphone ignore it. `Ok(None)` means
    /// nothing intelligible arrived in time.
    async fn listen(
        &self,
        timeout: Duration,
        silence_threshold: Duration,
    ) -> Result<Option<String>, SpeechError>;
}

/// Text-to-speech plus playback service
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    async fn speak(&self, text: &str, voice_id: &str) -> Result<(), SpeechError>;
}
