use std::env;

use serde::Deserialize;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub recs: RecsConfig,
    pub rewrite: RewriteConfig,
    pub weather: WeatherConfig,
    pub state_dir: String,
}

/// Recommendation API (chat + business search) configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RecsConfig {
    pub api_key: Option<String>,
    pub chat_base_url: String,
    pub search_base_url: String,
    pub max_retries: u32,
    pub backoff_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriteProviderKind {
    OpenAi,
    Local,
}

/// Text-generation configuration for the persona voice rewriter.
#[derive(Debug, Clone, Deserialize)]
pub struct RewriteConfig {
    /// `provider/model` syntax, e.g. `openai/gpt-4o-mini` or `ollama/llama3`.
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// Selects which path is attempted first; the local path is probed and
    /// falls through to the remote path when unavailable.
    pub provider: RewriteProviderKind,
    pub local_base_url: String,
    pub timeout_ms: u64,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recs: RecsConfig {
                api_key: env::var("RECS_API_KEY").ok(),
                chat_base_url: env::var("RECS_CHAT_BASE_URL")
                    .unwrap_or_else(|_| "https://api.yelp.com/ai".to_string()),
                search_base_url: env::var("RECS_SEARCH_BASE_URL")
                    .unwrap_or_else(|_| "https://api.yelp.com/v3".to_string()),
                max_retries: parse_env_or("RECS_MAX_RETRIES", 2),
                backoff_ms: parse_env_or("RECS_BACKOFF_MS", 600),
            },
            rewrite: RewriteConfig {
                model: env::var("REWRITE_MODEL")
                    .unwrap_or_else(|_| "openai/gpt-4o-mini".to_string()),
                api_key: env::var("REWRITE_API_KEY").ok(),
                base_url: env::var("REWRITE_BASE_URL").ok(),
                provider: match env::var("REWRITE_PROVIDER").as_deref() {
                    Ok("local") => RewriteProviderKind::Local,
                    _ => RewriteProviderKind::OpenAi,
                },
                local_base_url: env::var("REWRITE_LOCAL_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:11434/v1".to_string()),
                timeout_ms: parse_env_or("REWRITE_TIMEOUT_MS", 4500),
                max_tokens: parse_env_or("REWRITE_MAX_TOKENS", 120),
            },
            weather: WeatherConfig {
                api_key: env::var("WEATHER_API_KEY").ok(),
                base_url: env::var("WEATHER_BASE_URL").unwrap_or_else(|_| {
                    "https://api.openweathermap.org/data/2.5/weather".to_string()
                }),
            },
            state_dir: env::var("CICERONE_STATE_DIR").unwrap_or_else(|_| ".cicerone".to_string()),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// Known rewrite providers that use OpenAI-compatible APIs.
pub const KNOWN_REWRITE_PROVIDERS: &[&str] = &["openai", "openrouter", "ollama", "lmstudio"];

/// Parse a rewrite model name into a (provider, model) tuple.
pub fn parse_rewrite_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_REWRITE_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    // No recognized prefix: treat the whole string as an OpenAI model name
    ("openai", model)
}

pub fn default_rewrite_base_url(provider: &str) -> &'static str {
    match provider.to_lowercase().as_str() {
        "openai" => "https://api.openai.com/v1",
        "openrouter" => "https://openrouter.ai/api/v1",
        "ollama" => "http://localhost:11434/v1",
        "lmstudio" => "http://localhost:1234/v1",
        _ => "https://api.openai.com/v1",
    }
}

/// Whether an OpenAI-compatible provider requires an API key.
pub fn provider_needs_api_key(provider: &str) -> bool {
    !matches!(provider.to_lowercase().as_str(), "ollama" | "lmstudio")
}
