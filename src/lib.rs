/*
 * lib.rs
 * ------
 * npcforge - scheduled fantasy NPC generator and publishing bot.
 *
 * This file contains the shared error type and text helpers for the
 * service clients and the content pipeline.
*/

pub mod archive;
pub mod args;
pub mod character;
pub mod elevenlabs_tts;
pub mod facebook;
pub mod gdrive;
pub mod google_tts;
pub mod openai_api;
pub mod openai_image;
pub mod pipeline;
pub mod scheduler;
pub mod server;
pub mod status;
pub mod video;
pub mod webhook;

use reqwest::Client;
use std::time::Duration;

#[derive(Debug)]
pub enum ApiError {
    Error(String),
    RequestError(reqwest::Error),
}

impl From<reqwest::Error> for ApiError {
    fn from(value: reqwest::Error) -> Self {
        ApiError::RequestError(value)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ApiError::Error(msg) => write!(f, "{}", msg),
            ApiError::RequestError(e) => write!(f, "Request error: {}", e),
        }
    }
}

/// Build the HTTP client shared by all service calls in one cycle.
/// Every outbound request inherits the bounded timeout; hosted
/// generation APIs are known to stall.
pub fn http_client(timeout_secs: u64) -> Result<Client, ApiError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(ApiError::from)
}

/// Clip text to at most `max_words` whitespace-separated words.
/// Used to bound narration length before text-to-speech synthesis.
pub fn clip_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        words.join(" ")
    } else {
        words[..max_words].join(" ")
    }
}
