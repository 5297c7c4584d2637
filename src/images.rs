//! Image-generation providers
//!
//! Two upstreams: the assistant vendor's image API (text-to-image and photo
//! edit) and a face-aging model host. Every operation is a single upstream
//! request; callers decide what a failure means.

mod openai;
pub mod prompts;
mod replicate;

pub use openai::OpenAiImages;
pub use replicate::ReplicateFaces;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

/// Image provider error with the upstream detail preserved.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("{provider} request failed: {source}")]
    Network {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned {status}: {body}")]
    Upstream {
        provider: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("{provider} response carried no image payload")]
    MissingPayload { provider: &'static str },

    #[error("invalid image payload: {0}")]
    InvalidInput(String),
}

/// A produced image, as either an `https:` or a `data:` URL.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub url: String,
}

/// Text-to-image capability, the seam the tool handlers depend on.
#[async_trait]
pub trait ImageModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, ImageError>;
}
