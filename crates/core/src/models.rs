//! # SiteCraft Models
//!
//! Shared types passed between the generation pipeline, the publish clients
//! and the HTTP server. The outline types double as the structured-output
//! schema requested from the completion API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::templates::TemplateKind;

/// One content section of a generated site (About, Services, Contact, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SectionOutline {
    pub heading: String,
    pub body: String,
}

/// Structured plan for a one-page site.
///
/// This is what the completion API is asked to return as a JSON object;
/// the deterministic renderer in [`crate::templates`] turns it into HTML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiteOutline {
    /// Bold, catchy H1 title.
    pub title: String,
    /// Professional tagline shown under the title.
    #[serde(default)]
    pub tagline: String,
    /// Distinct content sections, hero excluded.
    #[serde(default)]
    pub sections: Vec<SectionOutline>,
}

impl SiteOutline {
    /// True when there is enough material to render a page.
    pub fn is_usable(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

/// A finished generation run.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedSite {
    /// Complete HTML document with embedded CSS.
    pub html: String,
    /// Hero image URL, if an image was requested.
    pub image_url: Option<String>,
    /// Template the page was built with.
    pub template: TemplateKind,
    /// Completion model that produced the content.
    pub model: String,
}

/// Result of committing a generated page and poking the deploy hook.
#[derive(Debug, Clone, Serialize)]
pub struct PublishReceipt {
    /// Repository path the HTML was written to.
    pub path: String,
    /// Commit that the contents API created.
    pub commit_sha: Option<String>,
    /// Browser URL of the committed file.
    pub content_url: Option<String>,
    /// Whether the deploy hook accepted the trigger.
    pub deploy_triggered: bool,
    pub published_at: DateTime<Utc>,
}
