/// Module `google_tts` - narration synthesis via Google Cloud TTS.
///
/// Fallback vendor when no ElevenLabs key is configured. The REST
/// `text:synthesize` endpoint returns base64 audio in a JSON envelope
/// rather than raw bytes.
use crate::ApiError;
use base64::engine::general_purpose;
use base64::Engine;
use bytes::Bytes;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug, Clone)]
pub struct Request {
    pub input: Input,
    pub voice: Voice,
    #[serde(rename = "audioConfig")]
    pub audio_config: AudioConfig,
}

#[derive(Serialize, Debug, Clone)]
pub struct Input {
    pub text: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct Voice {
    #[serde(rename = "languageCode")]
    pub language_code: String,
    pub name: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct AudioConfig {
    #[serde(rename = "audioEncoding")]
    pub audio_encoding: String,
    pub pitch: f32,
    #[serde(rename = "speakingRate")]
    pub speaking_rate: f32,
}

#[derive(Deserialize, Debug)]
struct Response {
    #[serde(rename = "audioContent")]
    audio_content: String,
}

impl Request {
    pub fn new(text: &str, language_code: &str, voice: &str, pitch: f32, speaking_rate: f32) -> Self {
        Request {
            input: Input {
                text: text.to_string(),
            },
            voice: Voice {
                language_code: language_code.to_string(),
                name: voice.to_string(),
            },
            audio_config: AudioConfig {
                audio_encoding: "MP3".to_string(),
                pitch,
                speaking_rate,
            },
        }
    }
}

/// Synthesize speech and return the decoded MP3 bytes.
pub async fn tts(
    client: &Client,
    host: &str,
    token: &str,
    request: Request,
) -> Result<Bytes, ApiError> {
    let url = format!("{}/v1/text:synthesize", host);
    debug!("TTS request to {} ({} chars)", url, request.input.text.len());

    let response = client
        .post(&url)
        .bearer_auth(token)
        .json(&request)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Error(format!(
            "Google TTS returned {}: {}",
            status, body
        )));
    }

    let parsed: Response = response.json().await?;
    let audio = general_purpose::STANDARD
        .decode(parsed.audio_content.as_bytes())
        .map_err(|e| ApiError::Error(format!("Google TTS audio did not decode: {}", e)))?;

    Ok(Bytes::from(audio))
}
