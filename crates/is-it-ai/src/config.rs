//! Layered configuration loading using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`IS_IT_AI_*` prefix, `__` as separator)
//! 2. An explicit TOML file passed to [`DetectorConfig::load_with_file`]
//! 3. Project-level `is-it-ai.toml`
//! 4. User-level `<config dir>/is-it-ai/config.toml`
//! 5. Built-in defaults
//!
//! `IS_IT_AI_MODEL__DIR` maps to `model.dir`, `IS_IT_AI_MODEL__INTRA_THREADS`
//! to `model.intra_threads`, and so on.
//!
//! The verdict thresholds are fixed and deliberately not configurable.

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

/// Configuration loading failure.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

/// Where the model lives and how the runtime session is built.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory holding the ONNX export, tokenizer and model config.
    pub dir: PathBuf,
    pub onnx_file: String,
    pub tokenizer_file: String,
    /// Hugging Face `config.json`, read for its `id2label` table.
    pub label_config_file: String,
    /// Native token limit of the model.
    pub max_sequence_length: usize,
    /// ONNX runtime intra-op threads.
    pub intra_threads: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("models/roberta-base-openai-detector"),
            onnx_file: "model.onnx".to_owned(),
            tokenizer_file: "tokenizer.json".to_owned(),
            label_config_file: "config.json".to_owned(),
            max_sequence_length: 512,
            intra_threads: 4,
        }
    }
}

impl ModelConfig {
    #[must_use]
    pub fn onnx_path(&self) -> PathBuf {
        self.dir.join(&self.onnx_file)
    }

    #[must_use]
    pub fn tokenizer_path(&self) -> PathBuf {
        self.dir.join(&self.tokenizer_file)
    }

    #[must_use]
    pub fn label_config_path(&self) -> PathBuf {
        self.dir.join(&self.label_config_file)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_sequence_length == 0 {
            return Err(ConfigError::Invalid(
                "model.max_sequence_length must be positive".to_owned(),
            ));
        }
        if self.intra_threads == 0 {
            return Err(ConfigError::Invalid(
                "model.intra_threads must be positive".to_owned(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DetectorConfig {
    #[serde(default)]
    pub model: ModelConfig,
}

impl DetectorConfig {
    /// Load configuration from the default TOML files and the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source cannot be parsed or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::extract(Self::figment())
    }

    /// Like [`Self::load`], with `path` layered above the default files.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `path` or another source cannot be parsed.
    pub fn load_with_file(path: &Path) -> Result<Self, ConfigError> {
        Self::extract(Self::figment_with_file(Some(path)))
    }

    /// Build the figment provider chain.
    pub fn figment() -> Figment {
        Self::figment_with_file(None)
    }

    fn figment_with_file(explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from("is-it-ai.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Explicit file. A missing file is an error, not a silent skip.
        if let Some(path) = explicit {
            figment = figment.merge(Toml::file_exact(path));
        }

        // Layer 4: Environment variables (highest priority)
        figment.merge(Env::prefixed("IS_IT_AI_").split("__"))
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.model.validate()?;
        Ok(config)
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("is-it-ai").join("config.toml"))
    }
}
