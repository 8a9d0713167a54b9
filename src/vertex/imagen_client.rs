use crate::{
    config::{ImagenModels, StorageConfig},
    error::{Result, VertexError},
    models::{
        EditInstance, EditParameters, EditPredictRequest, GenerateInstance, GenerateParameters,
        GeneratePredictRequest, ImageEditRequest, ImageGenerationRequest, ImagenPredictResponse,
        OutputOptions, ReferenceImage,
    },
    retry::{retry_with_backoff, RetryPolicy},
    vertex::model_endpoint,
};
use reqwest::Client;
use serde::Serialize;

/// Client for the Imagen generation and editing models.
#[derive(Clone)]
pub struct ImagenClient {
    http: Client,
    project_id: String,
    location: String,
    access_token: String,
    models: ImagenModels,
    storage: StorageConfig,
    retry: RetryPolicy,
}

impl ImagenClient {
    pub fn new(
        http: Client,
        project_id: String,
        location: String,
        access_token: String,
        models: ImagenModels,
        storage: StorageConfig,
    ) -> Self {
        Self {
            http,
            project_id,
            location,
            access_token,
            models,
            storage,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Generates images and returns the output URIs of the successful
    /// slots, in response order. Filtered slots are dropped.
    pub async fn generate(&self, request: &ImageGenerationRequest) -> Result<Vec<String>> {
        let model_id = request
            .model_id
            .as_deref()
            .unwrap_or(&self.models.generation);
        let storage_uri = self.storage.generated_output_uri();

        log::info!(
            "imagen.generate: requesting {} images from {} (output: {:?})",
            request.number_of_images,
            model_id,
            storage_uri
        );

        let body = Self::build_generate_request(request, storage_uri);
        let response = self.predict("imagen.generate", model_id, &body).await?;
        Ok(response.uris())
    }

    /// Generates exactly one image with inline output and returns its raw
    /// bytes. A successful call that yields no image data is a
    /// generation error, never an empty success.
    pub async fn generate_one(&self, request: &ImageGenerationRequest) -> Result<Vec<u8>> {
        let model_id = request
            .model_id
            .as_deref()
            .unwrap_or(&self.models.generation_fast);

        let mut single = request.clone();
        single.number_of_images = 1;
        // No storage prefix: the API returns the image inline.
        let body = Self::build_generate_request(&single, None);
        let response = self.predict("imagen.generate_one", model_id, &body).await?;
        Self::first_image_bytes(&response)
    }

    fn first_image_bytes(response: &ImagenPredictResponse) -> Result<Vec<u8>> {
        response.inline_bytes()?.into_iter().next().ok_or_else(|| {
            VertexError::GenerationError("image generation failed or returned no data".into())
        })
    }

    /// Edits an image with a raw reference and an auto-derived mask,
    /// returning output URIs of the successful slots.
    pub async fn edit(&self, request: &ImageEditRequest) -> Result<Vec<String>> {
        let model_id = request
            .model_id
            .as_deref()
            .unwrap_or(&self.models.capability);
        let storage_uri = self.storage.edited_output_uri();

        log::info!(
            "imagen.edit: requesting {} edited images from {} (output: {:?})",
            request.number_of_images,
            model_id,
            storage_uri
        );

        let body = Self::build_edit_request(request, storage_uri);
        let response = self.predict("imagen.edit", model_id, &body).await?;
        Ok(response.uris())
    }

    fn build_generate_request(
        request: &ImageGenerationRequest,
        storage_uri: Option<String>,
    ) -> GeneratePredictRequest {
        GeneratePredictRequest {
            instances: vec![GenerateInstance {
                prompt: request.prompt.clone(),
            }],
            parameters: GenerateParameters {
                sample_count: request.number_of_images,
                aspect_ratio: Some(request.aspect_ratio.as_str().to_string()),
                negative_prompt: request.negative_prompt.clone(),
                storage_uri,
                include_rai_reason: true,
            },
        }
    }

    fn build_edit_request(
        request: &ImageEditRequest,
        storage_uri: Option<String>,
    ) -> EditPredictRequest {
        EditPredictRequest {
            instances: vec![EditInstance {
                prompt: request.prompt.clone(),
                reference_images: vec![
                    ReferenceImage::raw(1, &request.reference_image),
                    ReferenceImage::mask(2, request.mask_mode),
                ],
            }],
            parameters: EditParameters {
                edit_mode: request.edit_mode.as_str().to_string(),
                sample_count: request.number_of_images,
                storage_uri,
                include_rai_reason: true,
                output_options: Some(OutputOptions {
                    mime_type: "image/jpeg".to_string(),
                }),
            },
        }
    }

    async fn predict<B: Serialize>(
        &self,
        operation: &str,
        model_id: &str,
        body: &B,
    ) -> Result<ImagenPredictResponse> {
        let url = model_endpoint(&self.project_id, &self.location, model_id);
        retry_with_backoff(&self.retry, operation, || {
            self.predict_once(operation, &url, body)
        })
        .await
    }

    async fn predict_once<B: Serialize>(
        &self,
        operation: &str,
        url: &str,
        body: &B,
    ) -> Result<ImagenPredictResponse> {
        let _timer = crate::logger::timer(operation);
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(VertexError::AuthError(text));
            }
            return Err(VertexError::ApiError {
                status: status.as_u16(),
                message: text,
            });
        }

        let parsed: ImagenPredictResponse = response
            .json()
            .await
            .map_err(|e| VertexError::ResponseError(e.to_string()))?;
        parsed.log_shape(operation);
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AspectRatio;

    #[test]
    fn test_generate_request_carries_storage_uri() {
        let request = ImageGenerationRequest::new("a lighthouse")
            .with_count(4)
            .with_aspect_ratio(AspectRatio::Landscape)
            .with_negative_prompt("fog");
        let body = ImagenClient::build_generate_request(
            &request,
            Some("gs://bucket/generated_images".to_string()),
        );

        assert_eq!(body.instances.len(), 1);
        assert_eq!(body.instances[0].prompt, "a lighthouse");
        assert_eq!(body.parameters.sample_count, 4);
        assert_eq!(body.parameters.aspect_ratio.as_deref(), Some("16:9"));
        assert_eq!(body.parameters.negative_prompt.as_deref(), Some("fog"));
        assert_eq!(
            body.parameters.storage_uri.as_deref(),
            Some("gs://bucket/generated_images")
        );
        assert!(body.parameters.include_rai_reason);
    }

    #[test]
    fn test_edit_request_has_raw_then_mask_reference() {
        let request = ImageEditRequest::new("replace the sky", vec![1, 2, 3]).with_count(2);
        let body = ImagenClient::build_edit_request(&request, None);

        let references = &body.instances[0].reference_images;
        assert_eq!(references.len(), 2);
        assert_eq!(references[0].reference_type, "REFERENCE_TYPE_RAW");
        assert_eq!(references[0].reference_id, 1);
        assert_eq!(references[1].reference_type, "REFERENCE_TYPE_MASK");
        assert_eq!(references[1].reference_id, 2);
        assert_eq!(body.parameters.edit_mode, "EDIT_MODE_INPAINT_INSERTION");
        assert_eq!(
            body.parameters.output_options.as_ref().unwrap().mime_type,
            "image/jpeg"
        );
    }

    #[test]
    fn test_first_image_bytes_errors_when_nothing_carried() {
        let all_filtered: ImagenPredictResponse = serde_json::from_str(
            r#"{ "predictions": [ { "raiFilteredReason": "safety" } ] }"#,
        )
        .unwrap();
        match ImagenClient::first_image_bytes(&all_filtered) {
            Err(VertexError::GenerationError(message)) => {
                assert!(!message.is_empty());
                assert_eq!(message, "image generation failed or returned no data");
            }
            other => panic!("expected GenerationError, got {:?}", other),
        }

        let empty: ImagenPredictResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            ImagenClient::first_image_bytes(&empty),
            Err(VertexError::GenerationError(_))
        ));
    }

    #[test]
    fn test_first_image_bytes_returns_first_carried_entry() {
        let response: ImagenPredictResponse = serde_json::from_str(
            r#"{ "predictions": [ { "bytesBase64Encoded": "aGVsbG8=" } ] }"#,
        )
        .unwrap();
        assert_eq!(
            ImagenClient::first_image_bytes(&response).unwrap(),
            b"hello".to_vec()
        );
    }
}
