//! # Image Client
//!
//! Thin typed client for the image-generation API. Produces a hosted hero
//! image URL for the generated page; callers decide what to do on failure
//! (the pipeline substitutes [`FALLBACK_IMAGE_URL`]).

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::{require_env, GeneratorConfig};
use crate::error::{Result, SiteCraftError};

/// Stock hero used when image generation fails or is disabled.
pub const FALLBACK_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1507525428034-b723cf961d3e";

pub struct ImageClient {
    client: Client,
    config: GeneratorConfig,
}

#[derive(Deserialize)]
struct ImageData {
    url: String,
}

#[derive(Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

impl ImageClient {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Generate one 1024x1024 hero image and return its hosted URL.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let api_key = require_env("OPENAI_API_KEY")?;
        let url = format!("{}/v1/images/generations", self.config.api_root());
        let body = json!({
            "model": self.config.image_model,
            "prompt": prompt,
            "n": 1,
            "size": "1024x1024",
            "quality": "standard",
            "response_format": "url"
        });

        tracing::debug!(model = %self.config.image_model, "calling image API");
        let resp = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(SiteCraftError::Image { status, body: text });
        }

        let parsed: ImageResponse = serde_json::from_str(&text)?;
        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.url)
            .ok_or_else(|| SiteCraftError::MalformedReply("image response had no data".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_image_response() {
        let parsed: ImageResponse =
            serde_json::from_str(r#"{"created": 1, "data": [{"url": "https://img/x.png"}]}"#)
                .unwrap();
        assert_eq!(parsed.data[0].url, "https://img/x.png");
    }
}
