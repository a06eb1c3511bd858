//! Pipeline configuration: resource and artifact paths plus the manual
//! stopword add/exclude lists, loaded from TOML.

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

// --- env defaults & names ---
pub const DEFAULT_CONFIG_PATH: &str = "config/pipeline.toml";
pub const ENV_CONFIG_PATH: &str = "SENTIMENT_CONFIG_PATH";

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    pub lexicon: LexiconConfig,
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub stemmer: StemmerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LexiconConfig {
    /// Primary slang dictionary (two-column CSV: informal, formal).
    pub slang: PathBuf,
    /// Optional supplementary dictionary; wins on key collision.
    #[serde(default)]
    pub additional_slang: Option<PathBuf>,
    /// Custom stopword list (single-column CSV).
    pub stopwords: PathBuf,
    /// Manual additions on top of the built-in and custom lists.
    #[serde(default)]
    pub additional_stopwords: Vec<String>,
    /// Words excluded from the final set no matter which source added them.
    #[serde(default)]
    pub excluded_stopwords: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsConfig {
    /// Either one combined bundle...
    #[serde(default)]
    pub bundle: Option<PathBuf>,
    /// ...or the three artifacts side by side.
    #[serde(default)]
    pub vectorizer: Option<PathBuf>,
    #[serde(default)]
    pub reducer: Option<PathBuf>,
    #[serde(default)]
    pub model: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StemmerConfig {
    #[serde(default)]
    pub mode: StemmerMode,
    /// Extra root words appended to the bundled dictionary.
    #[serde(default)]
    pub extra_roots: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StemmerMode {
    #[default]
    Indonesian,
    /// No-op stemming; changes normalization outcomes, test-gated.
    Identity,
}

impl PipelineConfig {
    /// Load from `SENTIMENT_CONFIG_PATH` or the repo-relative default.
    pub fn from_env() -> anyhow::Result<Self> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::from_path(&path)
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading pipeline config at {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let cfg: PipelineConfig = toml::from_str(toml_str)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let a = &self.artifacts;
        let split_complete = a.vectorizer.is_some() && a.reducer.is_some() && a.model.is_some();
        if a.bundle.is_none() && !split_complete {
            anyhow::bail!(
                "artifacts must name either a bundle or all of vectorizer/reducer/model"
            );
        }
        Ok(())
    }
}
