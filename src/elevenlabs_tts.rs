/// Module `elevenlabs_tts` - narration synthesis via the ElevenLabs API.
///
/// # Overview
/// Converts a clipped backstory into MP3 audio through the hosted
/// text-to-speech endpoint. The response body is the raw audio.
///
/// # Structures
/// `Request`: the TTS request with the speech model, input text and
/// voice settings.
use crate::ApiError;
use bytes::Bytes;
use log::debug;
use reqwest::Client;
use serde::Serialize;

#[derive(Serialize, Debug, Clone)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
}

#[derive(Serialize, Debug, Clone)]
pub struct Request<'a> {
    pub model_id: &'a str,
    pub text: &'a str,
    pub voice_settings: VoiceSettings,
}

impl<'a> Request<'a> {
    pub fn new(text: &'a str) -> Self {
        Request {
            model_id: "eleven_multilingual_v2",
            text,
            voice_settings: VoiceSettings {
                stability: 0.5,
                similarity_boost: 0.75,
            },
        }
    }
}

/// Synthesize speech and return the MP3 bytes.
pub async fn tts(
    client: &Client,
    host: &str,
    api_key: &str,
    voice_id: &str,
    request: Request<'_>,
) -> Result<Bytes, ApiError> {
    let url = format!("{}/v1/text-to-speech/{}", host, voice_id);
    debug!("TTS request to {} ({} chars)", url, request.text.len());

    let response = client
        .post(&url)
        .header("xi-api-key", api_key)
        .json(&request)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Error(format!(
            "ElevenLabs TTS returned {}: {}",
            status, body
        )));
    }

    Ok(response.bytes().await?)
}
