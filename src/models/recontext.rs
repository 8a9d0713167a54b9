//! Request types for Imagen product recontextualization.

use serde::Serialize;

/// A request to place product images into a newly generated scene.
#[derive(Debug, Clone)]
pub struct ProductRecontextRequest {
    pub product_image_uris: Vec<String>,
    pub prompt: Option<String>,
    pub sample_count: u32,
}

impl ProductRecontextRequest {
    pub fn new(product_image_uris: Vec<String>) -> Self {
        Self {
            product_image_uris,
            prompt: None,
            sample_count: 1,
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_sample_count(mut self, sample_count: u32) -> Self {
        self.sample_count = sample_count;
        self
    }
}

// Wire types for the recontext `:predict` endpoint. Predictions come back
// in the same shape as generation, so the response types live in `image`.

#[derive(Debug, Serialize)]
pub struct RecontextPredictRequest {
    pub instances: Vec<RecontextInstance>,
    pub parameters: RecontextParameters,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecontextInstance {
    pub product_images: Vec<ProductImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductImage {
    pub image: GcsImageRef,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GcsImageRef {
    pub gcs_uri: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecontextParameters {
    pub sample_count: u32,
}

impl RecontextPredictRequest {
    pub fn from_request(request: &ProductRecontextRequest) -> Self {
        let product_images = request
            .product_image_uris
            .iter()
            .map(|uri| ProductImage {
                image: GcsImageRef {
                    gcs_uri: uri.clone(),
                },
            })
            .collect();

        Self {
            instances: vec![RecontextInstance {
                product_images,
                prompt: request.prompt.clone(),
            }],
            parameters: RecontextParameters {
                sample_count: request.sample_count,
            },
        }
    }
}
