use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

/// Runtime settings, read once at startup. A `.env` file is honored when
/// present (see main).
#[derive(Clone, Debug)]
pub struct Settings {
    pub bind_addr: String,
    pub database_path: PathBuf,
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub input_max_chars: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bind_addr: env_or("WELLO_ADDR", "0.0.0.0:8080"),
            database_path: PathBuf::from(env_or("WELLO_DB_PATH", "data/wello.sqlite")),
            api_key: std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY is not set")?,
            api_url: env_or("OPENAI_API_URL", "https://api.openai.com/v1"),
            model: env_or("GENERATION_MODEL_ID", "gpt-4o-mini"),
            temperature: env_parsed("GENERATION_TEMPERATURE", 0.2)?,
            max_tokens: env_parsed("GENERATION_MAX_TOKENS", 1024)?,
            input_max_chars: env_parsed("INPUT_MAX_CHARACTERS", 4000)?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parsed<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("Invalid value for {}: {}", key, raw)),
        Err(_) => Ok(default),
    }
}
