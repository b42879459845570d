//! Engine and text-generator configuration
//!
//! Both structs have `Default` values suitable for local use and a
//! `from_env()` constructor that overrides them from `CITYPULSE_*` variables.

use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

/// Default minimum model confidence for accepting an AI classification
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.7;

/// Classification engine settings
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Model answers below this confidence go to the keyword fallback
    pub min_confidence_threshold: f64,
    /// Upper bound on a single text-generation call
    pub generation_timeout: Duration,
    /// Overall deadline per `classify` call; `None` waits for the tiers to finish
    pub request_timeout: Option<Duration>,
    /// Maximum number of results from `suggest`
    pub suggestion_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_confidence_threshold: DEFAULT_MIN_CONFIDENCE,
            generation_timeout: Duration::from_secs(10),
            request_timeout: None,
            suggestion_limit: 10,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by:
    /// - `CITYPULSE_MIN_CONFIDENCE`
    /// - `CITYPULSE_AI_TIMEOUT_MS`
    /// - `CITYPULSE_REQUEST_TIMEOUT_MS`
    /// - `CITYPULSE_SUGGESTION_LIMIT`
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(threshold) = env_parse::<f64>("CITYPULSE_MIN_CONFIDENCE")? {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(Error::Config(format!(
                    "CITYPULSE_MIN_CONFIDENCE must be within [0, 1], got {}",
                    threshold
                )));
            }
            config.min_confidence_threshold = threshold;
        }
        if let Some(ms) = env_parse::<u64>("CITYPULSE_AI_TIMEOUT_MS")? {
            config.generation_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = env_parse::<u64>("CITYPULSE_REQUEST_TIMEOUT_MS")? {
            config.request_timeout = Some(Duration::from_millis(ms));
        }
        if let Some(limit) = env_parse::<usize>("CITYPULSE_SUGGESTION_LIMIT")? {
            config.suggestion_limit = limit;
        }
        Ok(config)
    }
}

/// Settings of the HTTP text generator
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Base URL of the generative language API
    pub endpoint: String,
    pub model: String,
    /// `None` disables AI classification
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".into(),
            model: "gemini-1.5-flash".into(),
            api_key: None,
            temperature: 0.2,
            max_output_tokens: 512,
        }
    }
}

impl GeneratorConfig {
    /// Defaults overridden by `GEMINI_API_KEY`, `CITYPULSE_GEMINI_MODEL`,
    /// `CITYPULSE_GEMINI_ENDPOINT` and `CITYPULSE_GEMINI_TEMPERATURE`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self {
            api_key: env_string("GEMINI_API_KEY"),
            ..Self::default()
        };
        if let Some(model) = env_string("CITYPULSE_GEMINI_MODEL") {
            config.model = model;
        }
        if let Some(endpoint) = env_string("CITYPULSE_GEMINI_ENDPOINT") {
            config.endpoint = endpoint.trim_end_matches('/').to_string();
        }
        if let Some(temperature) = env_parse::<f32>("CITYPULSE_GEMINI_TEMPERATURE")? {
            config.temperature = temperature;
        }
        Ok(config)
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_string(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| Error::Config(format!("{}='{}': {}", key, raw, e)))
        })
        .transpose()
}
