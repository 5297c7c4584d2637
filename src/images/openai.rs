//! Vendor image API: text-to-image generation and photo editing

use super::{GeneratedImage, ImageError, ImageModel};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const PROVIDER: &str = "image api";

/// Client for the vendor's image endpoints.
pub struct OpenAiImages {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    data: Vec<ImagePayload>,
}

#[derive(Debug, Deserialize)]
struct ImagePayload {
    b64_json: Option<String>,
}

impl OpenAiImages {
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            api_key,
            base_url: base_url.unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Edit an uploaded photo into the prompted scene. `image_data` is a
    /// base64 payload, with or without a `data:` URL prefix.
    pub async fn edit(&self, image_data: &str, prompt: &str) -> Result<GeneratedImage, ImageError> {
        let bytes = decode_image_data(image_data)?;

        let form = Form::new()
            .text("model", "dall-e-2")
            .text("prompt", prompt.to_string())
            .text("response_format", "b64_json")
            .text("size", "1024x1024")
            .part(
                "image",
                Part::bytes(bytes)
                    .file_name("image.png")
                    .mime_str("image/png")
                    .map_err(|e| ImageError::InvalidInput(e.to_string()))?,
            );

        let response = self
            .client
            .post(self.url("/images/edits"))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|source| ImageError::Network { provider: PROVIDER, source })?;

        Self::into_image(response).await
    }

    async fn into_image(response: reqwest::Response) -> Result<GeneratedImage, ImageError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ImageError::Upstream { provider: PROVIDER, status, body });
        }

        let parsed: ImagesResponse = response
            .json()
            .await
            .map_err(|source| ImageError::Network { provider: PROVIDER, source })?;

        parsed
            .data
            .into_iter()
            .next()
            .and_then(|payload| payload.b64_json)
            .map(|b64| GeneratedImage { url: format!("data:image/png;base64,{b64}") })
            .ok_or(ImageError::MissingPayload { provider: PROVIDER })
    }
}

#[async_trait]
impl ImageModel for OpenAiImages {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, ImageError> {
        let body = json!({
            "model": "dall-e-3",
            "prompt": prompt,
            "n": 1,
            "size": "1024x1024",
            "quality": "standard",
            "response_format": "b64_json",
        });

        let response = self
            .client
            .post(self.url("/images/generations"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|source| ImageError::Network { provider: PROVIDER, source })?;

        Self::into_image(response).await
    }
}

/// Strip an optional `data:image/...;base64,` prefix and decode.
fn decode_image_data(image_data: &str) -> Result<Vec<u8>, ImageError> {
    let b64 = match image_data.split_once(";base64,") {
        Some((_, rest)) => rest,
        None => image_data,
    };
    BASE64
        .decode(b64.trim())
        .map_err(|e| ImageError::InvalidInput(format!("base64 decode failed: {e}")))
}
