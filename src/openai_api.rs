/*
Chat completion client for any LLM following the OpenAI API.
*/

use crate::ApiError;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Message {
    pub role: String,
    pub content: String,
}

#[derive(Serialize, Debug)]
pub struct OpenAIRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Deserialize, Debug)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Send a chat completion request and return the response text.
/// An empty or missing completion is an error, never published.
pub async fn completion(
    client: &Client,
    host: &str,
    api_key: &str,
    request: OpenAIRequest<'_>,
) -> Result<String, ApiError> {
    let url = format!("{}/v1/chat/completions", host);
    debug!("LLM request to {} with model {}", url, request.model);

    let response = client
        .post(&url)
        .bearer_auth(api_key)
        .json(&request)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Error(format!(
            "LLM endpoint returned {}: {}",
            status, body
        )));
    }

    let parsed: OpenAIResponse = response.json().await?;
    let text = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|c| c.trim().to_string())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(ApiError::Error("LLM returned an empty completion".to_string()));
    }

    Ok(text)
}
