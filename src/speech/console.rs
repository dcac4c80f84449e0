//! Console stand-in for the microphone and speaker
//!
//! Reads utterances from stdin and prints replies. Used whenever no TTS
//! credentials are configured, and by the speech-input side always
//! (microphone capture stays outside this repository).

use super::{SpeechError, SpeechToText, TextToSpeech};
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Default)]
pub struct ConsoleVoice;

#[async_trait]
impl SpeechToText for ConsoleVoice {
    async fn listen(
        &self,
        timeout: Duration,
        _silence_threshold: Duration,
    ) -> Result<Option<String>, SpeechError> {
        println!("\nListening... (type your reply)");
        let mut line = String::new();
        let mut reader = BufReader::new(tokio::io::stdin());
        match tokio::time::timeout(timeout, reader.read_line(&mut line)).await {
            Err(_) => Ok(None),              // timed out
            Ok(Ok(0)) => Ok(None),           // EOF
            Ok(Ok(_)) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(trimmed.to_string()))
                }
            }
            Ok(Err(e)) => Err(SpeechError::Io(e)),
        }
    }
}

#[async_trait]
impl TextToSpeech for ConsoleVoice {
    async fn speak(&self, text: &str, voice_id: &str) -> Result<(), SpeechError> {
        println!("[{voice_id}] {text}");
        Ok(())
    }
}
