//! Murf text-to-speech client
//!
//! Generates speech through the Murf HTTP API and fetches the rendered
//! audio to a local file; playback is handled outside this repository.

use super::{SpeechError, TextToSpeech};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_URL: &str = "https://api.murf.ai/v1/speech/generate";

pub struct MurfSpeech {
    client: Client,
    api_key: String,
    url: String,
    /// Where the rendered audio lands for the external player
    out_path: PathBuf,
}

impl MurfSpeech {
    pub fn new(api_key: String, out_path: PathBuf) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            api_key,
            url: DEFAULT_URL.to_string(),
            out_path,
        }
    }

    #[cfg(test)]
    fn payload(&self, text: &str, voice_id: &str) -> GenerateRequest {
        build_payload(text, voice_id)
    }
}

fn build_payload(text: &str, voice_id: &str) -> GenerateRequest {
    GenerateRequest {
        voice_id: voice_id.to_string(),
        text: text.to_string(),
        model_version: "GEN2".to_string(),
        format: "MP3".to_string(),
    }
}

#[async_trait]
impl TextToSpeech for MurfSpeech {
    async fn speak(&self, text: &str, voice_id: &str) -> Result<(), SpeechError> {
        // Mirror the spoken line on the console, audio or not
        println!("[{voice_id}] {text}");

        let response = self
            .client
            .post(&self.url)
            .header("api-key", &self.api_key)
            .json(&build_payload(text, voice_id))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let generated: GenerateResponse = response.json().await?;
        let audio = self
            .client
            .get(&generated.audio_file)
            .send()
            .await?
            .bytes()
            .await?;
        std::fs::write(&self.out_path, &audio)?;
        tracing::debug!(path = %self.out_path.display(), bytes = audio.len(), "audio rendered");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    #[serde(rename = "voiceId")]
    voice_id: String,
    text: String,
    #[serde(rename = "modelVersion")]
    model_version: String,
    format: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(rename = "audioFile")]
    audio_file: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_uses_murf_field_names() {
        let murf = MurfSpeech::new("key".into(), PathBuf::from("/tmp/response.mp3"));
        let payload = murf.payload("Hello!", "en-US-natalie");
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["voiceId"], "en-US-natalie");
        assert_eq!(value["modelVersion"], "GEN2");
        assert_eq!(value["format"], "MP3");
        assert_eq!(value["text"], "Hello!");
    }

    #[test]
    fn audio_url_parses_from_response() {
        let parsed: GenerateResponse =
            serde_json::from_str(r#"{"audioFile": "https://cdn.example/audio.mp3"}"#).unwrap();
        assert_eq!(parsed.audio_file, "https://cdn.example/audio.mp3");
    }
}
