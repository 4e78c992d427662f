//! # Publish Clients
//!
//! Committing generated HTML through the GitHub contents API and triggering a
//! Vercel redeploy through its deploy-hook webhook. Upsert flow: GET the
//! existing file to recover its blob `sha` (404 means create), then PUT the
//! new content base64-encoded.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::{require_env, PublishConfig};
use crate::error::{Result, SiteCraftError};
use crate::models::PublishReceipt;

const GITHUB_API: &str = "https://api.github.com";
// GitHub rejects requests without a User-Agent.
const USER_AGENT: &str = concat!("sitecraft/", env!("CARGO_PKG_VERSION"));

pub struct PublishClient {
    client: Client,
    config: PublishConfig,
}

#[derive(Deserialize)]
struct ExistingFile {
    sha: String,
}

#[derive(Deserialize)]
struct CommitInfo {
    sha: Option<String>,
}

#[derive(Deserialize)]
struct ContentInfo {
    html_url: Option<String>,
}

#[derive(Deserialize)]
struct UpsertResponse {
    commit: Option<CommitInfo>,
    content: Option<ContentInfo>,
}

impl PublishClient {
    pub fn new(config: PublishConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Commit `html` to the repository at `path` (defaults to the configured
    /// path), then trigger the deploy hook if one is configured.
    pub async fn publish(
        &self,
        html: &str,
        path: Option<&str>,
        message: Option<&str>,
    ) -> Result<PublishReceipt> {
        let path = path.unwrap_or(&self.config.path);
        let message = message.unwrap_or("Update generated site");
        let token = require_env("GITHUB_TOKEN")?;

        let sha = self.existing_sha(&token, path).await?;
        tracing::info!(path, updating = sha.is_some(), "committing generated page");

        let body = build_upsert_body(html, message, &self.config.branch, sha.as_deref());
        let resp = self
            .client
            .put(self.contents_url(path))
            .bearer_auth(&token)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .timeout(Duration::from_secs(30))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(SiteCraftError::Publish { status, body: text });
        }
        let parsed: UpsertResponse = serde_json::from_str(&text)?;

        let deploy_triggered = self.trigger_deploy_hook().await;

        Ok(PublishReceipt {
            path: path.to_string(),
            commit_sha: parsed.commit.and_then(|c| c.sha),
            content_url: parsed.content.and_then(|c| c.html_url),
            deploy_triggered,
            published_at: Utc::now(),
        })
    }

    /// Blob sha of the file at `path`, or `None` when it does not exist yet.
    async fn existing_sha(&self, token: &str, path: &str) -> Result<Option<String>> {
        let resp = self
            .client
            .get(self.contents_url(path))
            .bearer_auth(token)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .query(&[("ref", self.config.branch.as_str())])
            .timeout(Duration::from_secs(30))
            .send()
            .await?;

        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let file: ExistingFile = resp.json().await?;
                Ok(Some(file.sha))
            }
            status => Err(SiteCraftError::Publish {
                status,
                body: resp.text().await.unwrap_or_default(),
            }),
        }
    }

    /// POST to the deploy hook. Failures are logged and reported in the
    /// receipt; they never fail a publish.
    async fn trigger_deploy_hook(&self) -> bool {
        let Some(hook) = self.config.deploy_hook_url.as_deref() else {
            return false;
        };
        let result = self
            .client
            .post(hook)
            .timeout(Duration::from_secs(30))
            .send()
            .await;
        match result {
            Ok(resp) if resp.status().is_success() => {
                tracing::info!("deploy hook triggered");
                true
            }
            Ok(resp) => {
                tracing::warn!(status = %resp.status(), "deploy hook rejected");
                false
            }
            Err(e) => {
                tracing::warn!("deploy hook unreachable: {e}");
                false
            }
        }
    }

    fn contents_url(&self, path: &str) -> String {
        let encoded: Vec<String> = path
            .split('/')
            .map(|seg| urlencoding::encode(seg).into_owned())
            .collect();
        format!(
            "{GITHUB_API}/repos/{}/{}/contents/{}",
            self.config.owner,
            self.config.repo,
            encoded.join("/")
        )
    }
}

/// Request body for the contents-API PUT; `sha` only when updating.
fn build_upsert_body(html: &str, message: &str, branch: &str, sha: Option<&str>) -> Value {
    let mut body = json!({
        "message": message,
        "content": BASE64.encode(html),
        "branch": branch,
    });
    if let Some(sha) = sha {
        body["sha"] = json!(sha);
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> PublishClient {
        PublishClient::new(PublishConfig {
            owner: "acme".to_string(),
            repo: "pages".to_string(),
            branch: "main".to_string(),
            path: "index.html".to_string(),
            deploy_hook_url: None,
        })
    }

    #[test]
    fn contents_url_encodes_path_segments() {
        let url = client().contents_url("sites/my page.html");
        assert_eq!(
            url,
            "https://api.github.com/repos/acme/pages/contents/sites/my%20page.html"
        );
    }

    #[test]
    fn upsert_body_encodes_content_and_omits_sha_on_create() {
        let body = build_upsert_body("<html></html>", "first commit", "main", None);
        assert_eq!(body["message"], "first commit");
        assert_eq!(body["branch"], "main");
        assert_eq!(body["content"], BASE64.encode("<html></html>"));
        assert!(body.get("sha").is_none());
    }

    #[test]
    fn upsert_body_carries_sha_on_update() {
        let body = build_upsert_body("<html></html>", "update", "main", Some("abc123"));
        assert_eq!(body["sha"], "abc123");
    }

    #[test]
    fn upsert_response_tolerates_missing_fields() {
        let parsed: UpsertResponse = serde_json::from_str(r#"{"commit": {}}"#).unwrap();
        assert!(parsed.commit.unwrap().sha.is_none());
        assert!(parsed.content.is_none());
    }
}
