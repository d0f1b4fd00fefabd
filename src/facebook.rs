/*
Facebook Graph API publishing: photo posts with a caption, text-only
feed posts and follow-up comments. Each call returns the remote
identifier from the JSON body.
*/

use crate::ApiError;
use log::debug;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;

const GRAPH_VERSION: &str = "v19.0";

#[derive(Deserialize, Debug)]
struct PostResponse {
    id: Option<String>,
    post_id: Option<String>,
}

/// Post a photo with a caption to a page, returning the post ID.
pub async fn post_photo(
    client: &Client,
    host: &str,
    page_id: &str,
    token: &str,
    caption: &str,
    image_path: &Path,
) -> Result<String, ApiError> {
    let url = format!("{}/{}/{}/photos", host, GRAPH_VERSION, page_id);
    debug!("Posting photo to {}", url);

    let image_bytes = tokio::fs::read(image_path)
        .await
        .map_err(|e| ApiError::Error(format!("reading {}: {}", image_path.display(), e)))?;

    let source = Part::bytes(image_bytes)
        .file_name("portrait.png")
        .mime_str("image/png")?;
    let form = Form::new()
        .text("caption", caption.to_string())
        .text("access_token", token.to_string())
        .part("source", source);

    let response = client.post(&url).multipart(form).send().await?;
    parse_post_response(response, "photo post").await
}

/// Post a text-only message to a page feed, returning the post ID.
pub async fn post_feed(
    client: &Client,
    host: &str,
    page_id: &str,
    token: &str,
    message: &str,
) -> Result<String, ApiError> {
    let url = format!("{}/{}/{}/feed", host, GRAPH_VERSION, page_id);
    debug!("Posting message to {}", url);

    let form = [("message", message), ("access_token", token)];
    let response = client.post(&url).form(&form).send().await?;
    parse_post_response(response, "feed post").await
}

/// Post a follow-up comment on an existing post, returning the
/// comment ID.
pub async fn post_comment(
    client: &Client,
    host: &str,
    post_id: &str,
    token: &str,
    message: &str,
) -> Result<String, ApiError> {
    let url = format!("{}/{}/{}/comments", host, GRAPH_VERSION, post_id);
    debug!("Posting comment to {}", url);

    let form = [("message", message), ("access_token", token)];
    let response = client.post(&url).form(&form).send().await?;
    parse_post_response(response, "comment").await
}

async fn parse_post_response(
    response: reqwest::Response,
    what: &str,
) -> Result<String, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Error(format!(
            "Facebook {} returned {}: {}",
            what, status, body
        )));
    }

    let parsed: PostResponse = response.json().await?;
    parsed
        .post_id
        .or(parsed.id)
        .ok_or_else(|| ApiError::Error(format!("Facebook {} response had no id", what)))
}
