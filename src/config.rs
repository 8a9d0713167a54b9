use std::env;

/// Connection settings for Vertex AI.
#[derive(Debug, Clone, Default)]
pub struct VertexConfig {
    pub project_id: Option<String>,
    pub location: Option<String>,
    pub access_token: Option<String>,
}

impl VertexConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let project_id = env::var("GOOGLE_CLOUD_PROJECT").ok();
        let location = env::var("GOOGLE_CLOUD_LOCATION").ok();
        let access_token = env::var("VERTEX_ACCESS_TOKEN")
            .or_else(|_| env::var("GOOGLE_ACCESS_TOKEN"))
            .ok();

        VertexConfig {
            project_id,
            location,
            access_token,
        }
    }

    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }
}

/// Cloud Storage bucket and output prefixes for generated artifacts.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub bucket: Option<String>,
    pub generated_subfolder: String,
    pub edited_subfolder: String,
    pub recontext_subfolder: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            bucket: None,
            generated_subfolder: "generated_images".to_string(),
            edited_subfolder: "edited_images".to_string(),
            recontext_subfolder: "recontext_results".to_string(),
        }
    }
}

impl StorageConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.bucket = env::var("IMAGE_BUCKET").ok();
        if let Ok(subfolder) = env::var("IMAGEN_GENERATED_SUBFOLDER") {
            config.generated_subfolder = subfolder;
        }
        if let Ok(subfolder) = env::var("IMAGEN_EDITED_SUBFOLDER") {
            config.edited_subfolder = subfolder;
        }
        config
    }

    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    /// `gs://` prefix the API writes generated images under.
    pub fn generated_output_uri(&self) -> Option<String> {
        self.bucket
            .as_ref()
            .map(|b| format!("gs://{}/{}", b, self.generated_subfolder))
    }

    /// `gs://` prefix the API writes edited images under.
    pub fn edited_output_uri(&self) -> Option<String> {
        self.bucket
            .as_ref()
            .map(|b| format!("gs://{}/{}", b, self.edited_subfolder))
    }
}

/// Model identifiers for each Imagen capability.
#[derive(Debug, Clone)]
pub struct ImagenModels {
    pub generation: String,
    pub generation_fast: String,
    pub capability: String,
    pub product_recontext: String,
}

impl Default for ImagenModels {
    fn default() -> Self {
        ImagenModels {
            generation: "imagen-4.0-generate-001".to_string(),
            generation_fast: "imagen-4.0-fast-generate-001".to_string(),
            capability: "imagen-3.0-capability-001".to_string(),
            product_recontext: "imagen-product-recontext-preview-06-30".to_string(),
        }
    }
}

impl ImagenModels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let mut models = Self::default();
        if let Ok(model) = env::var("MODEL_IMAGEN") {
            models.generation = model;
        }
        if let Ok(model) = env::var("MODEL_IMAGEN_FAST") {
            models.generation_fast = model;
        }
        if let Ok(model) = env::var("MODEL_IMAGEN_CAPABILITY") {
            models.capability = model;
        }
        if let Ok(model) = env::var("MODEL_IMAGEN_PRODUCT_RECONTEXT") {
            models.product_recontext = model;
        }
        models
    }
}

/// Top-level configuration for [`crate::VertexClient`].
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub vertex: VertexConfig,
    pub storage: StorageConfig,
    pub models: ImagenModels,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Config {
            vertex: VertexConfig::from_env(),
            storage: StorageConfig::from_env(),
            models: ImagenModels::from_env(),
        }
    }

    pub fn with_vertex(mut self, vertex: VertexConfig) -> Self {
        self.vertex = vertex;
        self
    }

    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_models(mut self, models: ImagenModels) -> Self {
        self.models = models;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_identifiers() {
        let config = VertexConfig::new()
            .with_project("my-project")
            .with_location("us-central1")
            .with_access_token("token");
        assert_eq!(config.project_id.as_deref(), Some("my-project"));
        assert_eq!(config.location.as_deref(), Some("us-central1"));
        assert_eq!(config.access_token.as_deref(), Some("token"));
    }

    #[test]
    fn test_storage_output_uris() {
        let storage = StorageConfig::new().with_bucket("my-bucket");
        assert_eq!(
            storage.generated_output_uri().as_deref(),
            Some("gs://my-bucket/generated_images")
        );
        assert_eq!(
            storage.edited_output_uri().as_deref(),
            Some("gs://my-bucket/edited_images")
        );

        assert!(StorageConfig::new().generated_output_uri().is_none());
    }

    #[test]
    fn test_default_models() {
        let models = ImagenModels::default();
        assert_eq!(models.generation_fast, "imagen-4.0-fast-generate-001");
        assert_eq!(
            models.product_recontext,
            "imagen-product-recontext-preview-06-30"
        );
    }
}
