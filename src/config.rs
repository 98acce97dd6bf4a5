//! Runtime configuration.
//!
//! Defaults match the production pacing: batches of 5, one second apart.
//! [`SimulationConfig::from_env`] overlays environment variables.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default number of participants produced concurrently.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Default pause between batches, in milliseconds.
pub const DEFAULT_BATCH_DELAY_MS: u64 = 1000;

/// Settings for the external generation capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Credential. `None` marks the capability unavailable.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retries on 429 / 5xx inside a single generation call.
    #[serde(default)]
    pub max_retries: u32,
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}
fn default_model() -> String {
    "openai/gpt-4o-mini".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            max_retries: 0,
        }
    }
}

impl GeneratorConfig {
    /// Whether a non-blank credential is configured.
    pub fn has_credential(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
    /// Seed for every random draw. `None` seeds from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    /// JSON persona catalog replacing the built-in one.
    #[serde(default)]
    pub personas_path: Option<PathBuf>,
    #[serde(default)]
    pub generator: GeneratorConfig,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}
fn default_batch_delay_ms() -> u64 {
    DEFAULT_BATCH_DELAY_MS
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay_ms: DEFAULT_BATCH_DELAY_MS,
            seed: None,
            personas_path: None,
            generator: GeneratorConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overlaid with values from `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(v) = get("AGENTSPHERE_BATCH_SIZE") {
            config.batch_size = parse_env("AGENTSPHERE_BATCH_SIZE", &v)?;
        }
        if let Some(v) = get("AGENTSPHERE_BATCH_DELAY_MS") {
            config.batch_delay_ms = parse_env("AGENTSPHERE_BATCH_DELAY_MS", &v)?;
        }
        if let Some(v) = get("AGENTSPHERE_SEED") {
            config.seed = Some(parse_env("AGENTSPHERE_SEED", &v)?);
        }
        if let Some(v) = get("AGENTSPHERE_PERSONAS") {
            config.personas_path = Some(PathBuf::from(v));
        }
        config.generator.api_key = get("OPENROUTER_API_KEY");
        if let Some(v) = get("OPENROUTER_BASE_URL") {
            config.generator.base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = get("AGENTSPHERE_MODEL") {
            config.generator.model = v;
        }
        if let Some(v) = get("AGENTSPHERE_TIMEOUT_SECS") {
            config.generator.timeout_secs = parse_env("AGENTSPHERE_TIMEOUT_SECS", &v)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        Ok(())
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

fn parse_env<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnv {
            name,
            value: value.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SimulationConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.batch_size, 5);
        assert_eq!(config.batch_delay(), Duration::from_secs(1));
        assert!(config.seed.is_none());
        assert!(!config.generator.has_credential());
        assert_eq!(config.generator.base_url, "https://openrouter.ai/api/v1");
    }

    #[test]
    fn test_env_overrides() {
        let config = SimulationConfig::from_lookup(lookup(&[
            ("AGENTSPHERE_BATCH_SIZE", "8"),
            ("AGENTSPHERE_BATCH_DELAY_MS", "250"),
            ("AGENTSPHERE_SEED", "42"),
            ("OPENROUTER_API_KEY", "sk-test"),
            ("OPENROUTER_BASE_URL", "http://localhost:9999/v1/"),
            ("AGENTSPHERE_MODEL", "meta-llama/llama-3-8b-instruct"),
        ]))
        .unwrap();
        assert_eq!(config.batch_size, 8);
        assert_eq!(config.batch_delay_ms, 250);
        assert_eq!(config.seed, Some(42));
        assert!(config.generator.has_credential());
        assert_eq!(config.generator.base_url, "http://localhost:9999/v1");
        assert_eq!(config.generator.model, "meta-llama/llama-3-8b-instruct");
    }

    #[test]
    fn test_blank_key_is_unavailable() {
        let config = SimulationConfig::from_lookup(lookup(&[("OPENROUTER_API_KEY", "  ")])).unwrap();
        assert!(!config.generator.has_credential());
    }

    #[test]
    fn test_invalid_number_is_error() {
        let err = SimulationConfig::from_lookup(lookup(&[("AGENTSPHERE_BATCH_SIZE", "five")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnv { name: "AGENTSPHERE_BATCH_SIZE", .. }
        ));
    }

    #[test]
    fn test_zero_batch_rejected() {
        let err =
            SimulationConfig::from_lookup(lookup(&[("AGENTSPHERE_BATCH_SIZE", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroBatchSize));
    }

    #[test]
    fn test_api_key_not_serialized() {
        let mut config = SimulationConfig::default();
        config.generator.api_key = Some("secret".into());
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
