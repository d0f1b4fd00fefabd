/*
Google Drive artifact upload. One multipart call carries the file
metadata (name + parent folder) and the bytes; the response includes
the shareable webViewLink. Token acquisition is outside this bot, the
bearer token arrives through configuration.
*/

use crate::ApiError;
use log::debug;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Serialize, Debug)]
struct FileMetadata<'a> {
    name: &'a str,
    parents: [&'a str; 1],
}

#[derive(Deserialize, Debug, Clone)]
pub struct DriveFile {
    pub id: String,
    #[serde(rename = "webViewLink")]
    pub web_view_link: Option<String>,
}

impl DriveFile {
    /// Shareable link, synthesized from the file ID when the response
    /// omits webViewLink.
    pub fn link(&self) -> String {
        match &self.web_view_link {
            Some(link) => link.clone(),
            None => format!("https://drive.google.com/file/d/{}/view", self.id),
        }
    }
}

/// Upload a local file into the destination folder.
pub async fn upload(
    client: &Client,
    host: &str,
    token: &str,
    folder_id: &str,
    path: &Path,
    mime_type: &str,
) -> Result<DriveFile, ApiError> {
    let url = format!(
        "{}/upload/drive/v3/files?uploadType=multipart&fields=id,webViewLink",
        host
    );

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "artifact".to_string());
    debug!("Uploading {} to Drive folder {}", name, folder_id);

    let metadata = FileMetadata {
        name: &name,
        parents: [folder_id],
    };
    let metadata_json = serde_json::to_string(&metadata)
        .map_err(|e| ApiError::Error(format!("encoding Drive metadata: {}", e)))?;

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ApiError::Error(format!("reading {}: {}", path.display(), e)))?;

    let form = Form::new()
        .part(
            "metadata",
            Part::text(metadata_json).mime_str("application/json")?,
        )
        .part(
            "file",
            Part::bytes(bytes).file_name(name).mime_str(mime_type)?,
        );

    let response = client
        .post(&url)
        .bearer_auth(token)
        .multipart(form)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Error(format!(
            "Drive upload returned {}: {}",
            status, body
        )));
    }

    Ok(response.json().await?)
}
