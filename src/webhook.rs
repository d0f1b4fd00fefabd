/*
Outbound automation webhook. One JSON POST hands the finished caption
and media reference to an external automation that owns its own
publishing credentials.
*/

use crate::ApiError;
use log::debug;
use reqwest::Client;
use serde::Serialize;

#[derive(Serialize, Debug, Clone)]
pub struct Payload<'a> {
    pub caption: &'a str,
    pub image_url: Option<&'a str>,
}

pub async fn send(client: &Client, url: &str, payload: &Payload<'_>) -> Result<(), ApiError> {
    debug!("Forwarding payload to webhook {}", url);

    let response = client.post(url).json(payload).send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Error(format!(
            "Webhook returned {}: {}",
            status, body
        )));
    }
    Ok(())
}
