//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars.
//! Every key is optional; [`Settings`] carries the defaults. Paths expand `~`
//! and `${VAR}`.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::{Error, Result};

pub const DEFAULT_MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";
pub const DEFAULT_MAX_LEN: usize = 256;

/// Typed view over the merged configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Hugging Face repository id of the sentence encoder.
    pub model_id: String,
    pub revision: String,
    /// Directory holding `config.json`, `tokenizer.json` and the weights.
    pub model_dir: Option<String>,
    /// Where downloaded models are kept. Defaults to the platform cache dir.
    pub cache_dir: Option<String>,
    /// Maximum number of word pieces fed to the encoder.
    pub max_len: usize,
    #[serde(deserialize_with = "figment::util::bool_from_str_or_int")]
    pub offline: bool,
    #[serde(deserialize_with = "figment::util::bool_from_str_or_int")]
    pub use_fake_embeddings: bool,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            revision: "main".to_string(),
            model_dir: None,
            cache_dir: None,
            max_len: DEFAULT_MAX_LEN,
            offline: false,
            use_fake_embeddings: false,
            log_level: "warn".to_string(),
        }
    }
}

impl Settings {
    pub fn model_dir_path(&self) -> Option<PathBuf> {
        self.model_dir.as_deref().map(expand_path)
    }

    pub fn cache_dir_path(&self) -> PathBuf {
        match self.cache_dir.as_deref() {
            Some(dir) => expand_path(dir),
            None => dirs::cache_dir()
                .unwrap_or_else(env::temp_dir)
                .join("matchscore")
                .join("models"),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.max_len == 0 {
            return Err(Error::InvalidConfig("max_len must be greater than zero".into()));
        }
        if self.model_id.trim().is_empty() {
            return Err(Error::InvalidConfig("model_id must not be empty".into()));
        }
        Ok(())
    }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_"));

        let config = Self::from_figment(figment);
        config.validate_for_env(&env_name)?;
        Ok(config)
    }

    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{}': {}", key, e)))
    }

    pub fn settings(&self) -> Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        tracing::debug!(model_id = %settings.model_id, max_len = settings.max_len, "configuration loaded");
        Ok(settings)
    }

    fn validate_for_env(&self, env: &str) -> Result<()> {
        match env {
            "prod" | "production" => {
                if self.settings()?.use_fake_embeddings {
                    return Err(Error::InvalidConfig(
                        "use_fake_embeddings is not allowed in production".into(),
                    ));
                }
            }
            "dev" | "development" | "test" | "testing" => {}
            _ => {}
        }
        Ok(())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
