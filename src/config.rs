use anyhow::{Context, Result};
use clap::Parser;
use std::env;

const DEFAULT_API_BASE: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-3-opus-20240229";
const DEFAULT_MAX_TOKENS: u32 = 4000;
const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage_dir: String,
    pub database_url: String,
    pub api_base: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Server-side generation credential. Optional; callers may supply a
    /// per-request key instead.
    pub api_key: Option<String>,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Product listing assistant API")]
pub struct Args {
    /// Host to bind to (overrides LISTING_ASSISTANT_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides LISTING_ASSISTANT_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory where image payloads are stored (overrides LISTING_ASSISTANT_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<String>,

    /// Database URL (overrides LISTING_ASSISTANT_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Generation endpoint base URL (overrides LISTING_ASSISTANT_API_BASE)
    #[arg(long)]
    pub api_base: Option<String>,

    /// Generation model identifier (overrides LISTING_ASSISTANT_MODEL)
    #[arg(long)]
    pub model: Option<String>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        // Parse CLI once
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("LISTING_ASSISTANT_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("LISTING_ASSISTANT_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing LISTING_ASSISTANT_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading LISTING_ASSISTANT_PORT"),
        };
        let env_storage =
            env::var("LISTING_ASSISTANT_STORAGE_DIR").unwrap_or_else(|_| "./data/images".into());
        let env_db = env::var("LISTING_ASSISTANT_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/meta/listing_assistant.db".into());
        let env_api_base =
            env::var("LISTING_ASSISTANT_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.into());
        let env_model =
            env::var("LISTING_ASSISTANT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        let max_tokens = match env::var("LISTING_ASSISTANT_MAX_TOKENS") {
            Ok(value) => value
                .parse::<u32>()
                .with_context(|| format!("parsing LISTING_ASSISTANT_MAX_TOKENS value `{}`", value))?,
            Err(_) => DEFAULT_MAX_TOKENS,
        };
        let temperature = match env::var("LISTING_ASSISTANT_TEMPERATURE") {
            Ok(value) => value.parse::<f32>().with_context(|| {
                format!("parsing LISTING_ASSISTANT_TEMPERATURE value `{}`", value)
            })?,
            Err(_) => DEFAULT_TEMPERATURE,
        };
        // The credential stays out of argv; environment only.
        let api_key = env::var("LISTING_ASSISTANT_API_KEY")
            .or_else(|_| env::var("ANTHROPIC_API_KEY"))
            .ok()
            .filter(|key| !key.is_empty());

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            storage_dir: args.storage_dir.unwrap_or(env_storage),
            database_url: args.database_url.unwrap_or(env_db),
            api_base: args.api_base.unwrap_or(env_api_base),
            model: args.model.unwrap_or(env_model),
            max_tokens,
            temperature,
            api_key,
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
