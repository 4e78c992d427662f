//! # Client Configuration
//!
//! Settings for the completion/image clients and for publishing. Credentials
//! are always taken from the environment, never from request bodies.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SiteCraftError};

/// Configuration for the completion and image clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Completion model (e.g. "gpt-4o").
    pub model: String,
    /// Image model (e.g. "dall-e-3").
    pub image_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Optional base URL override for OpenAI-compatible APIs.
    pub base_url: Option<String>,
    /// Per-request timeout for the upstream calls.
    pub timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            image_model: "dall-e-3".to_string(),
            temperature: 0.7,
            max_tokens: 1800,
            base_url: None,
            timeout_secs: 120,
        }
    }
}

impl GeneratorConfig {
    /// Root of the completion/image API, honoring the base URL override.
    pub fn api_root(&self) -> &str {
        self.base_url.as_deref().unwrap_or("https://api.openai.com")
    }
}

/// Where published pages go: a GitHub repository plus an optional deploy hook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    /// Default repository path for the generated page.
    pub path: String,
    /// Vercel deploy-hook URL; `None` skips the redeploy trigger.
    pub deploy_hook_url: Option<String>,
}

impl PublishConfig {
    /// Build from `GITHUB_REPO` (`owner/name`) and `VERCEL_DEPLOY_HOOK_URL`.
    pub fn from_env() -> Result<Self> {
        let repo_spec = require_env("GITHUB_REPO")?;
        let (owner, repo) = parse_repo_spec(&repo_spec)?;
        Ok(Self {
            owner,
            repo,
            branch: "main".to_string(),
            path: "index.html".to_string(),
            deploy_hook_url: std::env::var("VERCEL_DEPLOY_HOOK_URL").ok(),
        })
    }
}

/// Split an `owner/name` repository spec.
pub fn parse_repo_spec(spec: &str) -> Result<(String, String)> {
    match spec.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(SiteCraftError::InvalidConfig(format!(
            "GITHUB_REPO must be 'owner/name', got '{spec}'"
        ))),
    }
}

/// Read a required env var, mapping absence to a typed error.
pub(crate) fn require_env(name: &'static str) -> Result<String> {
    std::env::var(name).map_err(|_| SiteCraftError::MissingEnv(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_owner_and_repo() {
        let (owner, repo) = parse_repo_spec("acme/sitecraft-pages").unwrap();
        assert_eq!(owner, "acme");
        assert_eq!(repo, "sitecraft-pages");
    }

    #[test]
    fn rejects_malformed_repo_specs() {
        assert!(parse_repo_spec("acme").is_err());
        assert!(parse_repo_spec("acme/").is_err());
        assert!(parse_repo_spec("/pages").is_err());
        assert!(parse_repo_spec("acme/pages/extra").is_err());
    }

    #[test]
    fn default_config_targets_openai() {
        let config = GeneratorConfig::default();
        assert_eq!(config.api_root(), "https://api.openai.com");
        assert_eq!(config.image_model, "dall-e-3");
    }

    #[test]
    fn base_url_override_wins() {
        let config = GeneratorConfig {
            base_url: Some("http://localhost:11434".to_string()),
            ..Default::default()
        };
        assert_eq!(config.api_root(), "http://localhost:11434");
    }
}
