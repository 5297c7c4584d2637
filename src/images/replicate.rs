//! Face-aging provider
//!
//! Runs the SAM age-transformation model through the prediction API's
//! blocking-wait mode, so one tool call stays one upstream request.

use super::{GeneratedImage, ImageError};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

const PROVIDER: &str = "face aging";

const SAM_MODEL_VERSION: &str =
    "9222a21c181b707209ef12b5e0d7e94c994b58f01c7b2fec075d2e892362f13c";

/// Client for the face-aging model host.
pub struct ReplicateFaces {
    client: Client,
    token: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    #[serde(default)]
    status: String,
    #[serde(default)]
    output: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

impl ReplicateFaces {
    pub fn new(token: String, base_url: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            token,
            base_url: base_url.unwrap_or_else(|| "https://api.replicate.com/v1".to_string()),
        }
    }

    /// Age the person in `image_data` (base64, `data:` prefix optional) to
    /// `target_age`. Returns a hosted image URL.
    pub async fn age(&self, image_data: &str, target_age: u32) -> Result<GeneratedImage, ImageError> {
        let image = if image_data.starts_with("data:") {
            image_data.to_string()
        } else {
            format!("data:image/jpeg;base64,{image_data}")
        };

        let url = format!("{}/predictions", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header("Prefer", "wait")
            .json(&json!({
                "version": SAM_MODEL_VERSION,
                "input": {
                    "image": image,
                    "target_age": target_age.to_string(),
                }
            }))
            .send()
            .await
            .map_err(|source| ImageError::Network { provider: PROVIDER, source })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ImageError::Upstream { provider: PROVIDER, status, body });
        }

        let prediction: Prediction = response
            .json()
            .await
            .map_err(|source| ImageError::Network { provider: PROVIDER, source })?;

        if let Some(error) = prediction.error.filter(|e| !e.is_null()) {
            return Err(ImageError::Upstream {
                provider: PROVIDER,
                status,
                body: format!("prediction {}: {error}", prediction.status),
            });
        }

        extract_output_url(prediction.output.as_ref())
            .map(|url| GeneratedImage { url })
            .ok_or(ImageError::MissingPayload { provider: PROVIDER })
    }
}

/// The model returns either a bare URL string or a one-element list of URLs.
fn extract_output_url(output: Option<&Value>) -> Option<String> {
    match output? {
        Value::String(url) if url.starts_with("http") => Some(url.clone()),
        Value::Array(items) => items
            .iter()
            .find_map(|item| item.as_str().filter(|s| s.starts_with("http")))
            .map(str::to_string),
        _ => None,
    }
}
