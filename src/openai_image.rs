/*
Portrait generation through an OpenAI-style image endpoint.
The endpoint returns a URL; the content is fetched separately and
validated as a decodable image before anything downstream touches it.
*/

use crate::ApiError;
use log::{debug, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::time::Duration;

/// Retries for the idempotent image download. Generation calls are
/// never retried here, they have cost and side effects.
const DOWNLOAD_RETRIES: u32 = 2;

#[derive(Serialize, Debug)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
}

#[derive(Deserialize, Debug)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize, Debug)]
struct ImageData {
    url: Option<String>,
}

/// Request one generated image and return its URL.
pub async fn generate(
    client: &Client,
    host: &str,
    api_key: &str,
    model: &str,
    prompt: &str,
    size: &str,
) -> Result<String, ApiError> {
    let url = format!("{}/v1/images/generations", host);
    debug!("Image request to {} with prompt: {}", url, prompt);

    let request = ImageRequest {
        model,
        prompt,
        n: 1,
        size,
    };

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
            "Image endpoint returned {}: {}",
            status, body
        )));
    }

    let parsed: ImageResponse = response.json().await?;
    parsed
        .data
        .into_iter()
        .next()
        .and_then(|d| d.url)
        .ok_or_else(|| ApiError::Error("Image endpoint returned no URL".to_string()))
}

/// Fetch the generated image URL to disk with a small bounded retry.
/// The bytes must decode as an image; CDNs sometimes serve an error
/// page with a 200 status.
pub async fn download(client: &Client, url: &str, dest: &Path) -> Result<(), ApiError> {
    let mut attempt = 0u32;
    loop {
        match fetch_once(client, url).await {
            Ok(bytes) => {
                tokio::fs::write(dest, &bytes)
                    .await
                    .map_err(|e| ApiError::Error(format!("writing {}: {}", dest.display(), e)))?;
                debug!("Image saved to {}", dest.display());
                return Ok(());
            }
            Err(e) if attempt < DOWNLOAD_RETRIES => {
                attempt += 1;
                let backoff = Duration::from_millis(500 * 2u64.pow(attempt));
                warn!(
                    "Image download attempt {} failed, retrying in {:?}: {}",
                    attempt, backoff, e
                );
                tokio::time::sleep(backoff).await;
            }
            Err(e) => return Err(e),
        }
    }
}

async fn fetch_once(client: &Client, url: &str) -> Result<Vec<u8>, ApiError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Error(format!(
            "Image download returned {}",
            status
        )));
    }
    let bytes = response.bytes().await?;
    image::load_from_memory(&bytes)
        .map_err(|e| ApiError::Error(format!("Downloaded image does not decode: {}", e)))?;
    Ok(bytes.to_vec())
}
