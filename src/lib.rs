pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod retry;
pub mod storage;
pub mod vertex;

pub use config::{Config, ImagenModels, StorageConfig, VertexConfig};
pub use error::{Result, VertexError};
pub use models::{
    AspectRatio, EditMode, ImageEditRequest, ImageGenerationRequest, ImagenPredictResponse,
    ImagenPrediction, MaskMode, ProductRecontextRequest,
};
pub use retry::{retry_with_backoff, RetryPolicy};
pub use storage::{GcsObjectStorage, ObjectStorage};
pub use vertex::{ImagenClient, RecontextClient, VertexClient};
