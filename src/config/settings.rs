use super::{ConfigError, StatePaths};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL_ID: &str = "amazon.nova-lite-v1:0";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_API_KEY_ENV: &str = "AWS_BEARER_TOKEN_BEDROCK";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default = "default_model_id")]
    pub model_id: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript_path: Option<PathBuf>,
    #[serde(default)]
    pub inference: InferenceSettings,
}

/// Generation parameters sent with every request, plus the client-side bound
/// on how long one request may take.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InferenceSettings {
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_id: default_model_id(),
            region: default_region(),
            endpoint: None,
            api_key_env: default_api_key_env(),
            transcript_path: None,
            inference: InferenceSettings::default(),
        }
    }
}

fn default_model_id() -> String {
    DEFAULT_MODEL_ID.to_string()
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_max_tokens() -> u32 {
    400
}

fn default_temperature() -> f64 {
    0.6
}

fn default_timeout_secs() -> u64 {
    60
}

impl Settings {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model_id.trim().is_empty() {
            return Err(ConfigError::Settings("`model_id` must be non-empty".to_string()));
        }
        if self.region.trim().is_empty() {
            return Err(ConfigError::Settings("`region` must be non-empty".to_string()));
        }
        if self.api_key_env.trim().is_empty() {
            return Err(ConfigError::Settings(
                "`api_key_env` must name an environment variable".to_string(),
            ));
        }
        if let Some(endpoint) = &self.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(ConfigError::Settings(format!(
                    "`endpoint` must be an http(s) url, got `{endpoint}`"
                )));
            }
        }
        if let Some(path) = &self.transcript_path {
            if !path.is_absolute() {
                return Err(ConfigError::Settings(
                    "`transcript_path` must be an absolute path".to_string(),
                ));
            }
        }
        if self.inference.max_tokens == 0 {
            return Err(ConfigError::Settings(
                "`inference.max_tokens` must be >= 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.inference.temperature) {
            return Err(ConfigError::Settings(format!(
                "`inference.temperature` must be within 0.0..=1.0, got {}",
                self.inference.temperature
            )));
        }
        if self.inference.timeout_secs == 0 {
            return Err(ConfigError::Settings(
                "`inference.timeout_secs` must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn resolve_transcript_path(&self, paths: &StatePaths) -> PathBuf {
        self.transcript_path
            .clone()
            .unwrap_or_else(|| paths.default_transcript_path())
    }

    /// Base url of the runtime endpoint, without the `/model/...` suffix.
    pub fn endpoint_base(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://bedrock-runtime.{}.amazonaws.com", self.region.trim()),
        }
    }
}
