//! Process configuration read from the environment

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo-instruct";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QaProvider {
    OpenAi,
    Gemini,
}

impl QaProvider {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(QaProvider::OpenAi),
            "gemini" => Ok(QaProvider::Gemini),
            other => Err(Error::Config(format!("Unknown QA_PROVIDER '{}'", other))),
        }
    }

    pub fn key_var(&self) -> &'static str {
        match self {
            QaProvider::OpenAi => "OPENAI_API_KEY",
            QaProvider::Gemini => "GEMINI_API_KEY",
        }
    }
}

#[derive(Clone)]
pub struct QaConfig {
    pub provider: QaProvider,
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

// Keep the key out of debug output and logs.
impl std::fmt::Debug for QaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QaConfig")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub database_path: PathBuf,
    pub upload_folder: PathBuf,
    pub max_upload_bytes: usize,
    pub qa: QaConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let provider = match var("QA_PROVIDER") {
            Some(value) => QaProvider::parse(&value)?,
            None => QaProvider::OpenAi,
        };

        let api_key = var(provider.key_var()).ok_or_else(|| {
            Error::Config(format!("{} environment variable not set", provider.key_var()))
        })?;

        let (base_url, model) = match provider {
            QaProvider::OpenAi => (
                var("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
                var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            ),
            QaProvider::Gemini => (
                var("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
                var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            ),
        };

        let timeout_secs: u64 = parse_number(var("QA_TIMEOUT_SECS"), "QA_TIMEOUT_SECS", 60)?;
        let max_upload_bytes: usize =
            parse_number(var("MAX_UPLOAD_BYTES"), "MAX_UPLOAD_BYTES", 25 * 1024 * 1024)?;

        Ok(Self {
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8000".to_string()),
            database_path: PathBuf::from(
                var("DATABASE_PATH").unwrap_or_else(|| "./test.db".to_string()),
            ),
            upload_folder: PathBuf::from(
                var("UPLOAD_FOLDER").unwrap_or_else(|| "./uploads".to_string()),
            ),
            max_upload_bytes,
            qa: QaConfig {
                provider,
                api_key,
                base_url: base_url.trim_end_matches('/').to_string(),
                model,
                timeout: Duration::from_secs(timeout_secs),
            },
        })
    }
}

fn parse_number<T: std::str::FromStr>(value: Option<String>, name: &str, default: T) -> Result<T> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} must be a number, got '{}'", name, raw))),
        None => Ok(default),
    }
}
