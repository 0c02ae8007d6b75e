use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::core::articles::{
    Article, ArtifactStore, FolderRef, PipelineError, StoreError, StoredArtifact,
};
use crate::infra::google::auth::ServiceAccountAuth;

const UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";
const FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const MULTIPART_BOUNDARY: &str = "article_automator_upload";

/// Google Drive client that persists generated articles as JSON files.
pub struct DriveStore {
    client: Client,
    auth: Arc<ServiceAccountAuth>,
}

#[derive(Debug, Deserialize)]
struct CreatedFile {
    id: String,
}

impl DriveStore {
    pub fn new(auth: Arc<ServiceAccountAuth>) -> Self {
        Self {
            client: Client::new(),
            auth,
        }
    }

    /// Extracts the folder ID from a Google Drive folder URL, or accepts a
    /// bare ID.
    pub fn extract_folder_id(url_or_id: &str) -> Result<FolderRef, PipelineError> {
        if let Some(start) = url_or_id.find("/folders/") {
            let after = &url_or_id[start + 9..];
            let end = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
                .unwrap_or(after.len());
            let id = &after[..end];
            if !id.is_empty() {
                return Ok(FolderRef(id.to_string()));
            }
        } else if !url_or_id.is_empty()
            && !url_or_id.contains('/')
            && !url_or_id.contains(' ')
        {
            return Ok(FolderRef(url_or_id.to_string()));
        }

        Err(PipelineError::InvalidReference {
            kind: "folder",
            value: url_or_id.to_string(),
        })
    }

    /// Grants anyone-with-the-link write access to the target folder so the
    /// produced links are usable without per-file sharing.
    pub async fn make_folder_editable(&self, folder: &FolderRef) -> Result<(), StoreError> {
        let token = self.bearer_token().await?;
        let url = format!("{}/{}/permissions?fields=id", FILES_URL, folder.0);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .json(&json!({ "type": "anyone", "role": "writer" }))
            .send()
            .await
            .map_err(|e| StoreError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(StoreError(format!(
                "Drive permissions API returned {}: {}",
                status, text
            )));
        }

        tracing::info!(folder = %folder.0, "Drive folder made link-editable");
        Ok(())
    }

    /// File name the article lands under in the folder.
    fn file_name(article: &Article) -> String {
        format!("{}_article.json", article.title)
    }

    /// Drive expects multipart/related for a combined metadata + media
    /// upload, which reqwest's form support does not produce, so the body is
    /// assembled by hand.
    fn multipart_body(metadata: &str, media: &str) -> String {
        format!(
            "--{b}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n\
             --{b}\r\nContent-Type: application/json\r\n\r\n{media}\r\n--{b}--",
            b = MULTIPART_BOUNDARY,
        )
    }

    async fn bearer_token(&self) -> Result<String, StoreError> {
        self.auth
            .get_access_token()
            .await
            .map_err(|e| StoreError(e.to_string()))
    }
}

#[async_trait]
impl ArtifactStore for DriveStore {
    async fn store(
        &self,
        folder: &FolderRef,
        article: &Article,
    ) -> Result<StoredArtifact, StoreError> {
        let token = self.bearer_token().await?;

        let metadata = json!({
            "name": Self::file_name(article),
            "parents": [folder.0],
            "mimeType": "application/json",
        })
        .to_string();
        let media = serde_json::to_string(article).map_err(|e| StoreError(e.to_string()))?;
        let body = Self::multipart_body(&metadata, &media);

        let url = format!("{}?uploadType=multipart&fields=id", UPLOAD_URL);

        tracing::debug!(title = %article.title, folder = %folder.0, "Uploading article to Drive");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .header(
                "Content-Type",
                format!("multipart/related; boundary={}", MULTIPART_BOUNDARY),
            )
            .body(body)
            .send()
            .await
            .map_err(|e| StoreError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(StoreError(format!(
                "Drive upload API returned {}: {}",
                status, text
            )));
        }

        let created: CreatedFile = response
            .json()
            .await
            .map_err(|e| StoreError(e.to_string()))?;

        Ok(StoredArtifact {
            link: format!("https://drive.google.com/file/d/{}/view", created.id),
            file_id: created.id,
        })
    }
}
