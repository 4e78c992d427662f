//! SiteCraft Server
//!
//! Axum server exposing the site-generation and publish endpoints over a
//! thin JSON API, wired to the typed clients in `sitecraft_core`.

use axum::{
    extract::State,
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use sitecraft_core::{
    GeneratedSite, GeneratorConfig, PublishClient, PublishConfig, SiteCraftError, SiteGenerator,
    TemplateKind,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::{OpenApi, ToSchema};

/// Application state
struct AppState {
    config: RwLock<PersistedConfig>,
}

type SharedState = Arc<AppState>;

// === API Types ===

#[derive(Deserialize, ToSchema)]
struct GenerateRequest {
    /// Short description of the site to build.
    prompt: String,
    /// Template slug; omitted means keyword detection.
    template: Option<String>,
    /// Generate a hero image (default true).
    #[serde(default = "default_true")]
    with_image: bool,
}

#[derive(Deserialize, ToSchema)]
struct PureGenerateRequest {
    prompt: String,
}

#[derive(Deserialize, ToSchema)]
struct PublishRequest {
    prompt: String,
    template: Option<String>,
    #[serde(default = "default_true")]
    with_image: bool,
    /// Repository path override (default from config, usually index.html).
    path: Option<String>,
    /// Commit message override.
    message: Option<String>,
}

#[derive(Serialize, ToSchema)]
struct SiteResponse {
    html: String,
    image_url: Option<String>,
    template: String,
    model: String,
}

impl From<GeneratedSite> for SiteResponse {
    fn from(site: GeneratedSite) -> Self {
        Self {
            html: site.html,
            image_url: site.image_url,
            template: site.template.slug().to_string(),
            model: site.model,
        }
    }
}

#[derive(Serialize, ToSchema)]
struct PublishResponse {
    path: String,
    commit_sha: Option<String>,
    content_url: Option<String>,
    deploy_triggered: bool,
    template: String,
}

#[derive(Serialize, ToSchema)]
struct StatusResponse {
    service: &'static str,
    version: &'static str,
    model: String,
    image_model: String,
}

#[derive(Serialize, ToSchema)]
struct TemplateInfo {
    slug: String,
    keywords: Vec<String>,
}

#[derive(Serialize, ToSchema)]
struct TemplateListResponse {
    templates: Vec<TemplateInfo>,
}

#[derive(Serialize, ToSchema)]
struct ErrorBody {
    error: String,
}

// === Config API Types ===

/// Persisted runtime configuration, stored at `.sitecraft/config.json`.
///
/// The knobs the duplicate upstream variants hardcoded per file: model
/// choice, CORS origin list, publish target.
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema)]
struct PersistedConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    /// Allowed CORS origins; empty means permissive (local dev).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    allowed_origins: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    publish_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    publish_path: Option<String>,
}

impl PersistedConfig {
    async fn load() -> Self {
        let path = std::path::PathBuf::from(".sitecraft/config.json");
        if path.exists() {
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
                Err(_) => Self::default(),
            }
        } else {
            Self::default()
        }
    }

    async fn save(&self) -> Result<(), std::io::Error> {
        let path = std::path::PathBuf::from(".sitecraft/config.json");
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        tokio::fs::write(&path, content).await
    }

    fn merge(&mut self, other: PersistedConfig) {
        if other.model.is_some() {
            self.model = other.model;
        }
        if other.image_model.is_some() {
            self.image_model = other.image_model;
        }
        if other.temperature.is_some() {
            self.temperature = other.temperature;
        }
        if other.max_tokens.is_some() {
            self.max_tokens = other.max_tokens;
        }
        if !other.allowed_origins.is_empty() {
            self.allowed_origins = other.allowed_origins;
        }
        if other.publish_branch.is_some() {
            self.publish_branch = other.publish_branch;
        }
        if other.publish_path.is_some() {
            self.publish_path = other.publish_path;
        }
    }

    /// Generator settings with the persisted overrides applied.
    fn effective(&self) -> GeneratorConfig {
        let mut config = GeneratorConfig::default();
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(image_model) = &self.image_model {
            config.image_model = image_model.clone();
        }
        if let Some(temperature) = self.temperature {
            config.temperature = temperature;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.max_tokens = max_tokens;
        }
        config
    }
}

#[derive(Debug, Serialize, ToSchema)]
struct ConfigResponse {
    config: PersistedConfig,
    defaults: ConfigDefaults,
}

#[derive(Debug, Serialize, ToSchema)]
struct ConfigDefaults {
    model: &'static str,
    image_model: &'static str,
    temperature: f32,
    max_tokens: u32,
    publish_branch: &'static str,
    publish_path: &'static str,
}

impl Default for ConfigDefaults {
    fn default() -> Self {
        Self {
            model: "gpt-4o",
            image_model: "dall-e-3",
            temperature: 0.7,
            max_tokens: 1800,
            publish_branch: "main",
            publish_path: "index.html",
        }
    }
}

fn default_true() -> bool {
    true
}

// === Error Mapping ===

/// JSON error response with the right status for each failure class.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn unprocessable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: message.into(),
        }
    }
}

impl From<SiteCraftError> for ApiError {
    fn from(err: SiteCraftError) -> Self {
        let status = match err {
            SiteCraftError::MissingEnv(_) | SiteCraftError::InvalidConfig(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            SiteCraftError::Completion { .. }
            | SiteCraftError::Image { .. }
            | SiteCraftError::Publish { .. }
            | SiteCraftError::MalformedReply(_)
            | SiteCraftError::Http(_)
            | SiteCraftError::Json(_) => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::warn!(status = %self.status, "request failed: {}", self.message);
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

// === CLI ===

#[derive(Parser, Clone)]
#[command(author, version, about = "SiteCraft - prompt-to-website generation service")]
struct Args {
    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Clone)]
enum CliCommand {
    /// Start the SiteCraft server (default)
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },
    /// Generate a site once and write it to a file (no server)
    Generate {
        /// The site to build
        prompt: String,
        /// Template slug (landing, portfolio, restaurant, store, blog)
        #[arg(short, long)]
        template: Option<String>,
        /// Output file
        #[arg(short, long, default_value = "site.html")]
        out: String,
        /// Ask the model for the whole HTML document instead of an outline
        #[arg(long)]
        pure: bool,
        /// Skip hero image generation
        #[arg(long)]
        no_image: bool,
    },
}

// === OpenAPI Definition ===

#[derive(OpenApi)]
#[openapi(
    info(
        title = "SiteCraft API",
        version = "1.0.0",
        description = "Prompt-to-website generation and publishing"
    ),
    paths(
        get_status,
        list_templates,
        generate_site,
        generate_pure,
        publish_site,
        get_config,
        update_config
    ),
    components(schemas(
        GenerateRequest,
        PureGenerateRequest,
        PublishRequest,
        SiteResponse,
        PublishResponse,
        StatusResponse,
        TemplateInfo,
        TemplateListResponse,
        ErrorBody,
        PersistedConfig,
        ConfigResponse,
        ConfigDefaults
    )),
    tags(
        (name = "sites", description = "Site generation and publishing"),
        (name = "config", description = "Runtime configuration"),
        (name = "meta", description = "Service metadata")
    )
)]
struct ApiDoc;

// === Validation ===

const MAX_PROMPT_CHARS: usize = 2000;

fn validate_prompt(prompt: &str) -> Result<(), ApiError> {
    if prompt.trim().is_empty() {
        return Err(ApiError::unprocessable("prompt must not be empty"));
    }
    if prompt.chars().count() > MAX_PROMPT_CHARS {
        return Err(ApiError::unprocessable(format!(
            "prompt must be at most {MAX_PROMPT_CHARS} characters"
        )));
    }
    Ok(())
}

fn resolve_template(slug: Option<&str>) -> Result<Option<TemplateKind>, ApiError> {
    match slug {
        None => Ok(None),
        Some(slug) => TemplateKind::from_slug(slug)
            .map(Some)
            .ok_or_else(|| ApiError::unprocessable(format!("unknown template '{slug}'"))),
    }
}

// === API Handlers ===

/// Service status
#[utoipa::path(
    get,
    path = "/api/v1/status",
    tag = "meta",
    responses(
        (status = 200, description = "Service metadata", body = StatusResponse)
    )
)]
async fn get_status(State(state): State<SharedState>) -> Json<StatusResponse> {
    let config = state.config.read().await.effective();
    Json(StatusResponse {
        service: "sitecraft",
        version: env!("CARGO_PKG_VERSION"),
        model: config.model,
        image_model: config.image_model,
    })
}

/// List available templates and their selection keywords
#[utoipa::path(
    get,
    path = "/api/v1/templates",
    tag = "meta",
    responses(
        (status = 200, description = "Template list", body = TemplateListResponse)
    )
)]
async fn list_templates() -> Json<TemplateListResponse> {
    let templates = TemplateKind::all()
        .into_iter()
        .map(|kind| TemplateInfo {
            slug: kind.slug().to_string(),
            keywords: kind.keywords().iter().map(|k| k.to_string()).collect(),
        })
        .collect();
    Json(TemplateListResponse { templates })
}

/// Generate a site from a structured outline
#[utoipa::path(
    post,
    path = "/api/v1/sites/generate",
    tag = "sites",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Generated site", body = SiteResponse),
        (status = 422, description = "Invalid request", body = ErrorBody),
        (status = 502, description = "Upstream API failure", body = ErrorBody)
    )
)]
async fn generate_site(
    State(state): State<SharedState>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<SiteResponse>, ApiError> {
    validate_prompt(&req.prompt)?;
    let template = resolve_template(req.template.as_deref())?;

    let generator = SiteGenerator::new(state.config.read().await.effective());
    let site = generator
        .generate(&req.prompt, template, req.with_image)
        .await?;
    Ok(Json(site.into()))
}

/// Generate a site as one model-authored HTML document
#[utoipa::path(
    post,
    path = "/api/v1/sites/generate-pure",
    tag = "sites",
    request_body = PureGenerateRequest,
    responses(
        (status = 200, description = "Generated site", body = SiteResponse),
        (status = 422, description = "Invalid request", body = ErrorBody),
        (status = 502, description = "Upstream API failure", body = ErrorBody)
    )
)]
async fn generate_pure(
    State(state): State<SharedState>,
    Json(req): Json<PureGenerateRequest>,
) -> Result<Json<SiteResponse>, ApiError> {
    validate_prompt(&req.prompt)?;

    let generator = SiteGenerator::new(state.config.read().await.effective());
    let site = generator.generate_pure(&req.prompt).await?;
    Ok(Json(site.into()))
}

/// Generate a site, commit it to the configured repository and redeploy
#[utoipa::path(
    post,
    path = "/api/v1/sites/publish",
    tag = "sites",
    request_body = PublishRequest,
    responses(
        (status = 200, description = "Publish receipt", body = PublishResponse),
        (status = 422, description = "Invalid request", body = ErrorBody),
        (status = 500, description = "Missing publish credentials", body = ErrorBody),
        (status = 502, description = "Upstream API failure", body = ErrorBody)
    )
)]
async fn publish_site(
    State(state): State<SharedState>,
    Json(req): Json<PublishRequest>,
) -> Result<Json<PublishResponse>, ApiError> {
    validate_prompt(&req.prompt)?;
    let template = resolve_template(req.template.as_deref())?;

    let (generator_config, publish_config) = {
        let config = state.config.read().await;
        let mut publish_config = PublishConfig::from_env()?;
        if let Some(branch) = &config.publish_branch {
            publish_config.branch = branch.clone();
        }
        if let Some(path) = &config.publish_path {
            publish_config.path = path.clone();
        }
        (config.effective(), publish_config)
    };

    let generator = SiteGenerator::new(generator_config);
    let site = generator
        .generate(&req.prompt, template, req.with_image)
        .await?;

    let publisher = PublishClient::new(publish_config);
    let receipt = publisher
        .publish(&site.html, req.path.as_deref(), req.message.as_deref())
        .await?;

    Ok(Json(PublishResponse {
        path: receipt.path,
        commit_sha: receipt.commit_sha,
        content_url: receipt.content_url,
        deploy_triggered: receipt.deploy_triggered,
        template: site.template.slug().to_string(),
    }))
}

/// Get runtime configuration
#[utoipa::path(
    get,
    path = "/api/v1/config",
    tag = "config",
    responses(
        (status = 200, description = "Current configuration", body = ConfigResponse)
    )
)]
async fn get_config(State(state): State<SharedState>) -> Json<ConfigResponse> {
    let config = state.config.read().await.clone();
    Json(ConfigResponse {
        config,
        defaults: ConfigDefaults::default(),
    })
}

/// Patch runtime configuration (persisted across restarts)
#[utoipa::path(
    patch,
    path = "/api/v1/config",
    tag = "config",
    request_body = PersistedConfig,
    responses(
        (status = 200, description = "Updated configuration", body = ConfigResponse)
    )
)]
async fn update_config(
    State(state): State<SharedState>,
    Json(patch): Json<PersistedConfig>,
) -> Json<ConfigResponse> {
    let mut config = state.config.write().await;
    config.merge(patch);
    if let Err(e) = config.save().await {
        tracing::warn!("failed to persist config: {e}");
    }
    Json(ConfigResponse {
        config: config.clone(),
        defaults: ConfigDefaults::default(),
    })
}

async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

// === CORS ===

/// Restrict to the configured origins; an empty list is permissive (dev).
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::PATCH])
            .allow_headers(Any)
    }
}

// === Server Entry ===

async fn run_server(port: u16) -> anyhow::Result<()> {
    let config = PersistedConfig::load().await;
    let cors = cors_layer(&config.allowed_origins);

    let state: SharedState = Arc::new(AppState {
        config: RwLock::new(config),
    });

    let site_routes = Router::new()
        .route("/generate", post(generate_site))
        .route("/generate-pure", post(generate_pure))
        .route("/publish", post(publish_site));

    let app = Router::new()
        .nest("/api/v1/sites", site_routes)
        .route("/api/v1/status", get(get_status))
        .route("/api/v1/templates", get(list_templates))
        .route("/api/v1/config", get(get_config).patch(update_config))
        .route("/api/v1/openapi.json", get(serve_openapi))
        .layer(cors)
        .with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("🚀 SiteCraft Server running at http://{}", addr);
    println!("   API v1 Routes:");
    println!("   Sites:     /api/v1/sites/generate, /generate-pure, /publish");
    println!("   Meta:      /api/v1/status, /api/v1/templates");
    println!("   Config:    /api/v1/config (GET, PATCH)");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn run_generate(
    prompt: &str,
    template: Option<String>,
    out: &str,
    pure: bool,
    no_image: bool,
) -> anyhow::Result<()> {
    let template = match template.as_deref() {
        Some(slug) => Some(
            TemplateKind::from_slug(slug)
                .ok_or_else(|| anyhow::anyhow!("unknown template '{slug}'"))?,
        ),
        None => None,
    };

    let config = PersistedConfig::load().await.effective();
    let generator = SiteGenerator::new(config);
    let site = if pure {
        generator.generate_pure(prompt).await?
    } else {
        generator.generate(prompt, template, !no_image).await?
    };

    tokio::fs::write(out, &site.html).await?;
    println!("✅ Wrote {} ({} template, model {})", out, site.template.slug(), site.model);
    if let Some(url) = &site.image_url {
        println!("   Hero image: {url}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match args.command {
        Some(CliCommand::Generate {
            prompt,
            template,
            out,
            pure,
            no_image,
        }) => run_generate(&prompt, template, &out, pure, no_image).await,
        Some(CliCommand::Serve { port }) => run_server(port).await,
        None => run_server(8080).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_merge_keeps_unset_fields() {
        let mut config = PersistedConfig {
            model: Some("gpt-4o".to_string()),
            allowed_origins: vec!["https://sitecraft-frontend.onrender.com".to_string()],
            ..Default::default()
        };
        config.merge(PersistedConfig {
            temperature: Some(0.2),
            ..Default::default()
        });
        assert_eq!(config.model.as_deref(), Some("gpt-4o"));
        assert_eq!(config.temperature, Some(0.2));
        assert_eq!(config.allowed_origins.len(), 1);
    }

    #[test]
    fn effective_config_applies_overrides() {
        let config = PersistedConfig {
            model: Some("gpt-4o-mini".to_string()),
            max_tokens: Some(900),
            ..Default::default()
        };
        let effective = config.effective();
        assert_eq!(effective.model, "gpt-4o-mini");
        assert_eq!(effective.max_tokens, 900);
        // Untouched knobs keep their defaults.
        assert_eq!(effective.image_model, "dall-e-3");
    }

    #[test]
    fn generate_request_defaults_to_image() {
        let req: GenerateRequest =
            serde_json::from_str(r#"{"prompt": "a surf school"}"#).unwrap();
        assert!(req.with_image);
        assert!(req.template.is_none());
    }

    #[test]
    fn prompt_validation_rejects_empty_and_overlong() {
        assert!(validate_prompt("a bakery site").is_ok());
        assert!(validate_prompt("   ").is_err());
        assert!(validate_prompt(&"x".repeat(MAX_PROMPT_CHARS + 1)).is_err());
    }

    #[test]
    fn unknown_template_slug_is_rejected() {
        assert!(resolve_template(Some("brochure")).is_err());
        assert_eq!(
            resolve_template(Some("portfolio")).unwrap(),
            Some(TemplateKind::Portfolio)
        );
        assert_eq!(resolve_template(None).unwrap(), None);
    }

    #[test]
    fn upstream_failures_map_to_bad_gateway() {
        let err: ApiError = SiteCraftError::MalformedReply("nonsense".to_string()).into();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        let err: ApiError = SiteCraftError::MissingEnv("OPENAI_API_KEY").into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
