//! # Error Types
//!
//! Typed failures for the external SaaS calls so callers (the HTTP server,
//! the CLI) can map them to sensible exit codes and status codes.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SiteCraftError {
    /// A required credential or setting is missing from the environment.
    #[error("{0} env var is not set")]
    MissingEnv(&'static str),

    /// The completion API answered with a non-success status.
    #[error("completion API error ({status}): {body}")]
    Completion {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The image API answered with a non-success status.
    #[error("image API error ({status}): {body}")]
    Image {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The source-hosting content API rejected the upsert.
    #[error("publish failed ({status}): {body}")]
    Publish {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The model replied, but not in a shape we could use.
    #[error("model reply was not usable: {0}")]
    MalformedReply(String),

    /// Bad configuration value (e.g. a repo spec that is not `owner/name`).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SiteCraftError>;
