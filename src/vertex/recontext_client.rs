use crate::{
    error::{Result, VertexError},
    models::{ImagenPredictResponse, ProductRecontextRequest, RecontextPredictRequest},
    storage::ObjectStorage,
    vertex::model_endpoint,
};
use reqwest::Client;
use std::sync::Arc;
use uuid::Uuid;

/// Client for the Imagen product recontextualization model.
///
/// Unlike generation and editing, this endpoint returns images inline;
/// results are re-uploaded through the storage collaborator.
#[derive(Clone)]
pub struct RecontextClient {
    http: Client,
    project_id: String,
    location: String,
    access_token: String,
    model_id: String,
    output_folder: String,
}

impl RecontextClient {
    pub fn new(
        http: Client,
        project_id: String,
        location: String,
        access_token: String,
        model_id: String,
        output_folder: String,
    ) -> Self {
        Self {
            http,
            project_id,
            location,
            access_token,
            model_id,
            output_folder,
        }
    }

    /// Recontextualizes product images into a generated scene. Each
    /// successful prediction is decoded and uploaded; the returned URIs
    /// preserve prediction order.
    pub async fn recontextualize(
        &self,
        request: &ProductRecontextRequest,
        storage: &Arc<dyn ObjectStorage>,
    ) -> Result<Vec<String>> {
        log::info!(
            "recontext: requesting {} samples for {} product images",
            request.sample_count,
            request.product_image_uris.len()
        );

        let body = RecontextPredictRequest::from_request(request);
        let response = self.predict(&body).await?;
        response.log_shape("recontext");

        let mut uris = Vec::new();
        for image_bytes in response.inline_bytes()? {
            let file_name = format!("recontext_result_{}.png", Uuid::new_v4());
            let uri = storage
                .upload(&self.output_folder, &file_name, "image/png", &image_bytes)
                .await?;
            uris.push(uri);
        }
        Ok(uris)
    }

    async fn predict(&self, body: &RecontextPredictRequest) -> Result<ImagenPredictResponse> {
        let url = model_endpoint(&self.project_id, &self.location, &self.model_id);
        let response = self
            .http
            .post(&url)
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

        response
            .json()
            .await
            .map_err(|e| VertexError::ResponseError(e.to_string()))
    }
}
