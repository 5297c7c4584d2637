//! Environment configuration
//!
//! Provider secrets are read here and consumed only by the backend layer;
//! they never reach the chat page. Missing keys warn rather than crash so
//! the server can still come up (requests against the unconfigured provider
//! fail upstream).

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub openai_api_key: String,
    pub assistant_id: String,
    pub replicate_token: Option<String>,
    pub openai_base_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let openai_api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
        if openai_api_key.is_empty() {
            tracing::warn!("OPENAI_API_KEY not set; assistant and image calls will fail");
        }

        let assistant_id = std::env::var("ASSISTANT_ID").unwrap_or_default();
        if assistant_id.is_empty() {
            tracing::warn!("ASSISTANT_ID not set; run creation will fail");
        }

        let replicate_token = std::env::var("REPLICATE_API_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());
        if replicate_token.is_none() {
            tracing::warn!("REPLICATE_API_TOKEN not set; face aging disabled");
        }

        let port = std::env::var("COMPASS_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let openai_base_url = std::env::var("OPENAI_BASE_URL").ok().filter(|u| !u.is_empty());

        Self {
            port,
            openai_api_key,
            assistant_id,
            replicate_token,
            openai_base_url,
        }
    }
}
