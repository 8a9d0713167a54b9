use crate::error::Result;
use async_trait::async_trait;

/// Destination for generated artifacts.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Uploads raw bytes under `folder/file_name` and returns the
    /// location identifier of the stored object.
    async fn upload(
        &self,
        folder: &str,
        file_name: &str,
        mime_type: &str,
        contents: &[u8],
    ) -> Result<String>;
}
