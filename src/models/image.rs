//! Request and wire types for Imagen generation and editing.

use crate::error::{Result, VertexError};
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Aspect ratios accepted by the Imagen API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "4:3")]
    Standard,
    #[serde(rename = "3:4")]
    StandardPortrait,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
            Self::Standard => "4:3",
            Self::StandardPortrait => "3:4",
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Edit modes of the Imagen capability model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    #[default]
    InpaintInsertion,
    InpaintRemoval,
    Outpaint,
    BackgroundSwap,
}

impl EditMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InpaintInsertion => "EDIT_MODE_INPAINT_INSERTION",
            Self::InpaintRemoval => "EDIT_MODE_INPAINT_REMOVAL",
            Self::Outpaint => "EDIT_MODE_OUTPAINT",
            Self::BackgroundSwap => "EDIT_MODE_BGSWAP",
        }
    }
}

/// Mask derivation modes for edit requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaskMode {
    #[default]
    Background,
    Foreground,
    Semantic,
    UserProvided,
}

impl MaskMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Background => "MASK_MODE_BACKGROUND",
            Self::Foreground => "MASK_MODE_FOREGROUND",
            Self::Semantic => "MASK_MODE_SEMANTIC",
            Self::UserProvided => "MASK_MODE_USER_PROVIDED",
        }
    }
}

/// A request to generate images from a text prompt.
#[derive(Debug, Clone)]
pub struct ImageGenerationRequest {
    pub prompt: String,
    pub model_id: Option<String>,
    pub number_of_images: u32,
    pub aspect_ratio: AspectRatio,
    pub negative_prompt: Option<String>,
}

impl ImageGenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model_id: None,
            number_of_images: 1,
            aspect_ratio: AspectRatio::default(),
            negative_prompt: None,
        }
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn with_count(mut self, number_of_images: u32) -> Self {
        self.number_of_images = number_of_images;
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn with_negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        self.negative_prompt = Some(negative_prompt.into());
        self
    }
}

/// A request to edit an existing image with a prompt and auto-derived mask.
#[derive(Debug, Clone)]
pub struct ImageEditRequest {
    pub prompt: String,
    pub model_id: Option<String>,
    pub edit_mode: EditMode,
    pub mask_mode: MaskMode,
    pub reference_image: Vec<u8>,
    pub number_of_images: u32,
}

impl ImageEditRequest {
    pub fn new(prompt: impl Into<String>, reference_image: Vec<u8>) -> Self {
        Self {
            prompt: prompt.into(),
            model_id: None,
            edit_mode: EditMode::default(),
            mask_mode: MaskMode::default(),
            reference_image,
            number_of_images: 1,
        }
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn with_edit_mode(mut self, edit_mode: EditMode) -> Self {
        self.edit_mode = edit_mode;
        self
    }

    pub fn with_mask_mode(mut self, mask_mode: MaskMode) -> Self {
        self.mask_mode = mask_mode;
        self
    }

    pub fn with_count(mut self, number_of_images: u32) -> Self {
        self.number_of_images = number_of_images;
        self
    }
}

// Wire types for the `:predict` endpoint.

#[derive(Debug, Serialize)]
pub struct GeneratePredictRequest {
    pub instances: Vec<GenerateInstance>,
    pub parameters: GenerateParameters,
}

#[derive(Debug, Serialize)]
pub struct GenerateInstance {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateParameters {
    pub sample_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_uri: Option<String>,
    pub include_rai_reason: bool,
}

#[derive(Debug, Serialize)]
pub struct EditPredictRequest {
    pub instances: Vec<EditInstance>,
    pub parameters: EditParameters,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditInstance {
    pub prompt: String,
    pub reference_images: Vec<ReferenceImage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceImage {
    pub reference_type: String,
    pub reference_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_image: Option<InlineImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask_image_config: Option<MaskImageConfig>,
}

impl ReferenceImage {
    /// Raw reference image carrying the pixels to edit.
    pub fn raw(reference_id: u32, image_bytes: &[u8]) -> Self {
        Self {
            reference_type: "REFERENCE_TYPE_RAW".to_string(),
            reference_id,
            reference_image: Some(InlineImage {
                bytes_base64_encoded: base64::engine::general_purpose::STANDARD
                    .encode(image_bytes),
            }),
            mask_image_config: None,
        }
    }

    /// Mask reference telling the model which region to edit.
    pub fn mask(reference_id: u32, mask_mode: MaskMode) -> Self {
        Self {
            reference_type: "REFERENCE_TYPE_MASK".to_string(),
            reference_id,
            reference_image: None,
            mask_image_config: Some(MaskImageConfig {
                mask_mode: mask_mode.as_str().to_string(),
                dilation: 0.0,
            }),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineImage {
    pub bytes_base64_encoded: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaskImageConfig {
    pub mask_mode: String,
    pub dilation: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditParameters {
    pub edit_mode: String,
    pub sample_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_uri: Option<String>,
    pub include_rai_reason: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_options: Option<OutputOptions>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputOptions {
    pub mime_type: String,
}

/// One result slot from a `:predict` response. Successful entries carry a
/// `gcsUri` and/or inline bytes; filtered entries carry `raiFilteredReason`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagenPrediction {
    #[serde(default)]
    pub gcs_uri: Option<String>,
    #[serde(default)]
    pub bytes_base64_encoded: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub rai_filtered_reason: Option<String>,
}

impl ImagenPrediction {
    pub fn is_filtered(&self) -> bool {
        self.rai_filtered_reason.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImagenPredictResponse {
    #[serde(default)]
    pub predictions: Vec<ImagenPrediction>,
}

impl ImagenPredictResponse {
    /// Output URIs of successful predictions, in response order. Filtered
    /// entries and entries without a URI are dropped, never an error.
    pub fn uris(&self) -> Vec<String> {
        self.predictions
            .iter()
            .filter(|p| !p.is_filtered())
            .filter_map(|p| p.gcs_uri.clone())
            .collect()
    }

    /// Decoded inline bytes of successful predictions, in response order.
    /// Filtered entries and entries without inline data are dropped;
    /// malformed base64 in a carried entry is an error.
    pub fn inline_bytes(&self) -> Result<Vec<Vec<u8>>> {
        self.predictions
            .iter()
            .filter(|p| !p.is_filtered())
            .filter_map(|p| p.bytes_base64_encoded.as_deref())
            .map(|encoded| {
                base64::engine::general_purpose::STANDARD
                    .decode(encoded)
                    .map_err(|e| VertexError::DecodeError(e.to_string()))
            })
            .collect()
    }

    /// Diagnostic logging of the response shape.
    pub fn log_shape(&self, operation: &str) {
        if self.predictions.is_empty() {
            log::warn!("{}: response has no predictions", operation);
            return;
        }
        log::info!(
            "{}: received {} predictions",
            operation,
            self.predictions.len()
        );
        for (i, prediction) in self.predictions.iter().enumerate() {
            if let Some(reason) = &prediction.rai_filtered_reason {
                log::warn!("{}: prediction {} was filtered: {}", operation, i, reason);
            } else {
                log::debug!(
                    "{}: prediction {} gcs_uri={:?} inline_bytes={}",
                    operation,
                    i,
                    prediction.gcs_uri,
                    prediction.bytes_base64_encoded.is_some()
                );
            }
        }
    }
}
