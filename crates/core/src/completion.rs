//! # Completion Client
//!
//! Thin typed client for the chat-completions API. Two operations: a
//! structured outline request (JSON mode, deserialized with serde) and the
//! legacy one-shot full-HTML request. All provider plumbing lives here so the
//! pipeline and the server never touch raw HTTP.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::{require_env, GeneratorConfig};
use crate::error::{Result, SiteCraftError};
use crate::models::SiteOutline;
use crate::outline::{looks_like_html, parse_free_text, strip_code_fences};
use crate::templates::TemplateKind;

pub struct CompletionClient {
    client: Client,
    config: GeneratorConfig,
}

// Minimal structs for the parts of the chat response we read.
#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

impl CompletionClient {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Ask for a structured site outline as a JSON object.
    ///
    /// Fallback chain for models that ignore the instruction: strict serde
    /// parse, then the first balanced JSON object embedded in the reply, then
    /// the free-text parser.
    pub async fn generate_outline(
        &self,
        template: TemplateKind,
        prompt: &str,
    ) -> Result<SiteOutline> {
        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": template.system_prompt() },
                { "role": "user", "content": template.outline_prompt(prompt) }
            ],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
            "response_format": { "type": "json_object" }
        });
        let content = self.chat(body).await?;

        if let Ok(outline) = serde_json::from_str::<SiteOutline>(&content) {
            if outline.is_usable() {
                return Ok(outline);
            }
        }
        if let Some(object) = extract_first_json_object(&content) {
            if let Ok(outline) = serde_json::from_str::<SiteOutline>(&object) {
                if outline.is_usable() {
                    return Ok(outline);
                }
            }
        }
        tracing::warn!("outline reply was not valid JSON, falling back to free-text parse");
        parse_free_text(&content)
            .filter(SiteOutline::is_usable)
            .ok_or_else(|| SiteCraftError::MalformedReply(preview(&content)))
    }

    /// Ask for a complete HTML document in one shot (the `generate-pure` path).
    pub async fn generate_html(
        &self,
        template: TemplateKind,
        prompt: &str,
        image_url: &str,
    ) -> Result<String> {
        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": "You are an expert web designer and HTML developer." },
                { "role": "user", "content": template.page_prompt(prompt, image_url) }
            ],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens
        });
        let content = self.chat(body).await?;
        let html = strip_code_fences(&content);
        if !looks_like_html(html) {
            return Err(SiteCraftError::MalformedReply(preview(&content)));
        }
        Ok(html.to_string())
    }

    /// POST one chat-completions request, returning the first choice's text.
    async fn chat(&self, body: serde_json::Value) -> Result<String> {
        let api_key = require_env("OPENAI_API_KEY")?;
        let url = format!("{}/v1/chat/completions", self.config.api_root());

        tracing::debug!(model = %self.config.model, "calling completion API");
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
            return Err(SiteCraftError::Completion { status, body: text });
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| SiteCraftError::MalformedReply(format!("{e}: {}", preview(&text))))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| SiteCraftError::MalformedReply("empty choices".to_string()))
    }
}

/// Extracts the first top-level JSON object substring from a string.
/// Handles nested braces; returns None if not found.
fn extract_first_json_object(s: &str) -> Option<String> {
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if in_string {
            match c {
                '\\' if !escaped => escaped = true,
                '"' if !escaped => in_string = false,
                _ => escaped = false,
            }
            if c != '\\' {
                escaped = false;
            }
            continue;
        }
        match c {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if start.is_none() {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' => {
                if depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        return Some(s[start?..=i].to_string());
                    }
                }
            }
            _ => {}
        }
    }
    None
}

/// First 200 chars of a reply, for error messages.
fn preview(text: &str) -> String {
    text.chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_embedded_json_object() {
        let reply = "Here you go:\n{\"title\": \"X\", \"sections\": []}\nEnjoy!";
        let object = extract_first_json_object(reply).unwrap();
        assert_eq!(object, "{\"title\": \"X\", \"sections\": []}");
    }

    #[test]
    fn extraction_handles_nesting_and_strings() {
        let reply = r#"{"a": {"b": "has } brace"}, "c": 1} trailing"#;
        let object = extract_first_json_object(reply).unwrap();
        assert_eq!(object, r#"{"a": {"b": "has } brace"}, "c": 1}"#);
    }

    #[test]
    fn extraction_fails_on_plain_text() {
        assert!(extract_first_json_object("no objects here").is_none());
        assert!(extract_first_json_object("{unterminated").is_none());
    }

    #[test]
    fn outline_deserializes_with_defaults() {
        let outline: SiteOutline = serde_json::from_str(r#"{"title": "Solo"}"#).unwrap();
        assert_eq!(outline.title, "Solo");
        assert!(outline.tagline.is_empty());
        assert!(outline.sections.is_empty());
        assert!(outline.is_usable());
    }
}
