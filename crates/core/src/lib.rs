//! # SiteCraft Core
//!
//! Business logic for SiteCraft: typed clients for the three external SaaS
//! collaborators (completion API, image API, source-hosting contents API plus
//! deploy hook) and the generation pipeline that strings them together.
//!
//! ## Architecture
//!
//! - `completion` / `image` / `publish` - thin typed clients over HTTP
//! - `templates` - template selection, prompt construction, HTML rendering
//! - `outline` - reply cleanup and the free-text fallback parser
//! - `generator` - the request pipeline
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sitecraft_core::{GeneratorConfig, SiteGenerator};
//!
//! let generator = SiteGenerator::new(GeneratorConfig::default());
//! let site = generator.generate("a surf school in Hawaii", None, true).await?;
//! ```

pub mod completion;
pub mod config;
pub mod error;
pub mod generator;
pub mod image;
pub mod models;
pub mod outline;
pub mod publish;
pub mod templates;

pub use config::{GeneratorConfig, PublishConfig};
pub use error::SiteCraftError;
pub use generator::SiteGenerator;
pub use models::{GeneratedSite, PublishReceipt, SiteOutline};
pub use publish::PublishClient;
pub use templates::TemplateKind;
