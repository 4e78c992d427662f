//! # Generation Pipeline
//!
//! Sequential orchestration of the external calls: template selection,
//! optional hero image, completion, rendering. Image failures degrade to the
//! stock hero URL; completion failures are real errors for the caller to
//! surface.

use crate::completion::CompletionClient;
use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::image::{ImageClient, FALLBACK_IMAGE_URL};
use crate::models::GeneratedSite;
use crate::templates::{self, TemplateKind};

pub struct SiteGenerator {
    completion: CompletionClient,
    image: ImageClient,
    model: String,
}

impl SiteGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            model: config.model.clone(),
            completion: CompletionClient::new(config.clone()),
            image: ImageClient::new(config),
        }
    }

    /// Structured pipeline: outline from the completion API, HTML rendered
    /// deterministically by the selected template.
    #[tracing::instrument(skip(self), fields(prompt_preview = %preview(prompt)))]
    pub async fn generate(
        &self,
        prompt: &str,
        template: Option<TemplateKind>,
        with_image: bool,
    ) -> Result<GeneratedSite> {
        let template = template.unwrap_or_else(|| TemplateKind::detect(prompt));
        tracing::info!(template = template.slug(), "generating site outline");

        let outline = self.completion.generate_outline(template, prompt).await?;
        let image_url = if with_image {
            Some(self.hero_image(prompt).await)
        } else {
            None
        };
        let html = templates::render(&outline, image_url.as_deref(), template);

        Ok(GeneratedSite {
            html,
            image_url,
            template,
            model: self.model.clone(),
        })
    }

    /// One-shot pipeline: image first, then a single completion that returns
    /// the whole HTML document with the hero URL baked in.
    #[tracing::instrument(skip(self), fields(prompt_preview = %preview(prompt)))]
    pub async fn generate_pure(&self, prompt: &str) -> Result<GeneratedSite> {
        let template = TemplateKind::detect(prompt);
        let image_url = self.hero_image(prompt).await;
        let html = self
            .completion
            .generate_html(template, prompt, &image_url)
            .await?;

        Ok(GeneratedSite {
            html,
            image_url: Some(image_url),
            template,
            model: self.model.clone(),
        })
    }

    /// Hero image URL, degrading to the stock photo on any failure.
    async fn hero_image(&self, prompt: &str) -> String {
        match self.image.generate(prompt).await {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("image generation failed, using fallback: {e}");
                FALLBACK_IMAGE_URL.to_string()
            }
        }
    }
}

fn preview(prompt: &str) -> String {
    prompt.chars().take(50).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SiteCraftError;

    #[tokio::test]
    async fn missing_api_key_is_a_typed_error() {
        std::env::remove_var("OPENAI_API_KEY");
        let generator = SiteGenerator::new(GeneratorConfig::default());
        let err = generator
            .generate("a surf school", Some(TemplateKind::Landing), false)
            .await
            .unwrap_err();
        assert!(matches!(err, SiteCraftError::MissingEnv("OPENAI_API_KEY")));
    }
}
