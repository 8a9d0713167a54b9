use crate::{
    error::{Result, VertexError},
    storage::traits::ObjectStorage,
};
use async_trait::async_trait;
use reqwest::Client;

/// Cloud Storage backend using the JSON API media upload.
pub struct GcsObjectStorage {
    client: Client,
    bucket: String,
    access_token: String,
}

impl GcsObjectStorage {
    pub fn new(bucket: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            bucket: bucket.into(),
            access_token: access_token.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn object_name(folder: &str, file_name: &str) -> String {
        let folder = folder.trim_matches('/');
        if folder.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{}", folder, file_name)
        }
    }

    fn location_uri(&self, object_name: &str) -> String {
        format!("gs://{}/{}", self.bucket, object_name)
    }
}

#[async_trait]
impl ObjectStorage for GcsObjectStorage {
    async fn upload(
        &self,
        folder: &str,
        file_name: &str,
        mime_type: &str,
        contents: &[u8],
    ) -> Result<String> {
        let object_name = Self::object_name(folder, file_name);
        let url = format!(
            "https://storage.googleapis.com/upload/storage/v1/b/{}/o",
            self.bucket
        );

        log::debug!(
            "uploading {} bytes to gs://{}/{}",
            contents.len(),
            self.bucket,
            object_name
        );

        let response = self
            .client
            .post(&url)
            .query(&[("uploadType", "media"), ("name", object_name.as_str())])
            .bearer_auth(&self.access_token)
            .header(reqwest::header::CONTENT_TYPE, mime_type)
            .body(contents.to_vec())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(VertexError::StorageError(format!(
                "upload of {} failed: {} - {}",
                object_name,
                status.as_u16(),
                text
            )));
        }

        Ok(self.location_uri(&object_name))
    }
}
