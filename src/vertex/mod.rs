pub mod imagen_client;
pub mod recontext_client;

use crate::{
    config::Config,
    error::{Result, VertexError},
    models::{
        AspectRatio, ImageEditRequest, ImageGenerationRequest, ProductRecontextRequest,
    },
    storage::{GcsObjectStorage, ObjectStorage},
};
use reqwest::Client;
use std::sync::Arc;

pub use imagen_client::ImagenClient;
pub use recontext_client::RecontextClient;

/// REST `:predict` endpoint of a published model.
pub(crate) fn model_endpoint(project_id: &str, location: &str, model_id: &str) -> String {
    format!(
        "https://{location}-aiplatform.googleapis.com/v1/projects/{project_id}/locations/{location}/publishers/google/models/{model_id}:predict"
    )
}

/// Facade over the Vertex AI Imagen capabilities: generation, editing,
/// and product recontextualization, with optional storage output.
#[derive(Clone)]
pub struct VertexClient {
    imagen_client: ImagenClient,
    recontext_client: RecontextClient,
    storage: Option<Arc<dyn ObjectStorage>>,
    config: Config,
}

impl VertexClient {
    /// Builds the client. Fails with a config error if the project,
    /// location, or access token is absent.
    pub fn new(config: Config) -> Result<Self> {
        let project_id = config.vertex.project_id.clone().ok_or_else(|| {
            VertexError::ConfigError("project id is required (GOOGLE_CLOUD_PROJECT)".into())
        })?;
        let location = config.vertex.location.clone().ok_or_else(|| {
            VertexError::ConfigError("location is required (GOOGLE_CLOUD_LOCATION)".into())
        })?;
        let access_token = config.vertex.access_token.clone().ok_or_else(|| {
            VertexError::ConfigError("access token is required (VERTEX_ACCESS_TOKEN)".into())
        })?;

        log::info!(
            "initializing Vertex client for {} in {}",
            project_id,
            location
        );

        let http = Client::new();

        Ok(Self {
            imagen_client: ImagenClient::new(
                http.clone(),
                project_id.clone(),
                location.clone(),
                access_token.clone(),
                config.models.clone(),
                config.storage.clone(),
            ),
            recontext_client: RecontextClient::new(
                http,
                project_id,
                location,
                access_token,
                config.models.product_recontext.clone(),
                config.storage.recontext_subfolder.clone(),
            ),
            storage: None,
            config,
        })
    }

    /// Builds the client with a Cloud Storage collaborator attached.
    /// Requires a bucket in the storage config.
    pub fn with_storage(config: Config) -> Result<Self> {
        let bucket = config.storage.bucket.clone().ok_or_else(|| {
            VertexError::ConfigError("storage bucket is required (IMAGE_BUCKET)".into())
        })?;
        let access_token = config.vertex.access_token.clone().ok_or_else(|| {
            VertexError::ConfigError("access token is required (VERTEX_ACCESS_TOKEN)".into())
        })?;

        let mut client = Self::new(config)?;
        client.storage = Some(Arc::new(GcsObjectStorage::new(bucket, access_token)));
        Ok(client)
    }

    pub fn imagen(&self) -> &ImagenClient {
        &self.imagen_client
    }

    pub fn recontext(&self) -> &RecontextClient {
        &self.recontext_client
    }

    pub fn storage(&self) -> Option<&Arc<dyn ObjectStorage>> {
        self.storage.as_ref()
    }

    /// Generates images from a prompt plus a modifier segment, returning
    /// output URIs of the successful slots.
    pub async fn generate_from_prompt(
        &self,
        prompt: &str,
        prompt_modifiers: &str,
        model_id: Option<&str>,
        image_count: u32,
        negative_prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<Vec<String>> {
        let full_prompt = join_prompt(prompt, prompt_modifiers);

        let mut request = ImageGenerationRequest::new(full_prompt)
            .with_count(image_count)
            .with_aspect_ratio(aspect_ratio);
        if let Some(model_id) = model_id {
            request = request.with_model(model_id);
        }
        if !negative_prompt.is_empty() {
            request = request.with_negative_prompt(negative_prompt);
        }

        self.imagen_client.generate(&request).await
    }

    /// Generates square virtual-model images with the fast model.
    pub async fn generate_virtual_models(
        &self,
        prompt: &str,
        image_count: u32,
    ) -> Result<Vec<String>> {
        let request = ImageGenerationRequest::new(prompt)
            .with_model(self.config.models.generation_fast.clone())
            .with_count(image_count)
            .with_aspect_ratio(AspectRatio::Square);

        self.imagen_client.generate(&request).await
    }

    /// Generates a single square image with the fast model and returns
    /// its raw bytes.
    pub async fn generate_single_image(&self, prompt: &str) -> Result<Vec<u8>> {
        let request = ImageGenerationRequest::new(prompt)
            .with_model(self.config.models.generation_fast.clone())
            .with_aspect_ratio(AspectRatio::Square);

        self.imagen_client.generate_one(&request).await
    }

    /// Recontextualizes product images into a generated scene and stores
    /// the results. Requires the storage collaborator.
    pub async fn recontextualize_product(
        &self,
        request: &ProductRecontextRequest,
    ) -> Result<Vec<String>> {
        let storage = self.storage.as_ref().ok_or_else(|| {
            VertexError::ConfigError("no storage backend configured".into())
        })?;
        self.recontext_client.recontextualize(request, storage).await
    }

    /// Edits an image, returning output URIs of the successful slots.
    pub async fn edit_image(&self, request: &ImageEditRequest) -> Result<Vec<String>> {
        self.imagen_client.edit(request).await
    }
}

fn join_prompt(prompt: &str, modifiers: &str) -> String {
    if modifiers.trim().is_empty() {
        prompt.to_string()
    } else {
        format!("{}, {}", prompt, modifiers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VertexConfig;

    #[test]
    fn test_model_endpoint_format() {
        assert_eq!(
            model_endpoint("my-project", "us-central1", "imagen-4.0-generate-001"),
            "https://us-central1-aiplatform.googleapis.com/v1/projects/my-project/locations/us-central1/publishers/google/models/imagen-4.0-generate-001:predict"
        );
    }

    #[test]
    fn test_client_requires_all_identifiers() {
        let complete = Config::new().with_vertex(
            VertexConfig::new()
                .with_project("my-project")
                .with_location("us-central1")
                .with_access_token("token"),
        );
        assert!(VertexClient::new(complete).is_ok());

        let missing_project = Config::new().with_vertex(
            VertexConfig::new()
                .with_location("us-central1")
                .with_access_token("token"),
        );
        assert!(matches!(
            VertexClient::new(missing_project),
            Err(VertexError::ConfigError(_))
        ));

        let missing_token = Config::new().with_vertex(
            VertexConfig::new()
                .with_project("my-project")
                .with_location("us-central1"),
        );
        assert!(matches!(
            VertexClient::new(missing_token),
            Err(VertexError::ConfigError(_))
        ));
    }

    #[test]
    fn test_with_storage_requires_bucket() {
        let config = Config::new().with_vertex(
            VertexConfig::new()
                .with_project("my-project")
                .with_location("us-central1")
                .with_access_token("token"),
        );
        assert!(matches!(
            VertexClient::with_storage(config),
            Err(VertexError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn test_recontext_without_storage_is_config_error() {
        let config = Config::new().with_vertex(
            VertexConfig::new()
                .with_project("my-project")
                .with_location("us-central1")
                .with_access_token("token"),
        );
        let client = VertexClient::new(config).unwrap();
        let request = ProductRecontextRequest::new(vec!["gs://bucket/p.png".to_string()]);
        assert!(matches!(
            client.recontextualize_product(&request).await,
            Err(VertexError::ConfigError(_))
        ));
    }

    #[test]
    fn test_join_prompt() {
        assert_eq!(
            join_prompt("a bicycle", "studio lighting, 4k"),
            "a bicycle, studio lighting, 4k"
        );
        assert_eq!(join_prompt("a bicycle", ""), "a bicycle");
        assert_eq!(join_prompt("a bicycle", "   "), "a bicycle");
    }
}
