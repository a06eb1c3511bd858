// src/bootstrap.rs
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::classify::{LinearModel, LinearModelArtifact, SentimentModel};
use crate::config::{PipelineConfig, StemmerMode};
use crate::engine::{self, Row};
use crate::error::{PipelineError, ResourceError};
use crate::features::{
    FeaturePipeline, PcaProjection, ProjectionArtifact, TfidfArtifact, TfidfVectorizer,
};
use crate::lexicon::{build_slang_map, build_stopword_set, Lexicon};
use crate::stem::{IdentityStemmer, IndonesianStemmer, Stemmer};

/// Alternative packaging: the three pretrained artifacts in one JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactBundle {
    pub vectorizer: TfidfArtifact,
    pub reducer: ProjectionArtifact,
    pub model: LinearModelArtifact,
}

/// Everything a classification batch needs, loaded once at startup and
/// read-only afterwards. Safe to share across concurrent callers.
pub struct PipelineRuntime {
    pub lexicon: Lexicon,
    stemmer: Box<dyn Stemmer>,
    features: FeaturePipeline,
    model: Box<dyn SentimentModel>,
}

impl std::fmt::Debug for PipelineRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineRuntime")
            .field("lexicon", &self.lexicon)
            .finish_non_exhaustive()
    }
}

impl PipelineRuntime {
    /// Load config from `SENTIMENT_CONFIG_PATH` (or the default path) and
    /// build the runtime.
    pub fn from_env() -> anyhow::Result<Self> {
        let cfg = PipelineConfig::from_env()?;
        Self::from_config(&cfg)
    }

    pub fn from_config(cfg: &PipelineConfig) -> anyhow::Result<Self> {
        let slang = build_slang_map(
            &cfg.lexicon.slang,
            cfg.lexicon.additional_slang.as_deref(),
        )
        .context("loading slang dictionary")?;
        let stopwords = build_stopword_set(
            &cfg.lexicon.stopwords,
            &cfg.lexicon.additional_stopwords,
            &cfg.lexicon.excluded_stopwords,
        )
        .context("loading stopword set")?;

        let stemmer: Box<dyn Stemmer> = match cfg.stemmer.mode {
            StemmerMode::Indonesian => Box::new(
                IndonesianStemmer::new().with_root_words(cfg.stemmer.extra_roots.iter()),
            ),
            StemmerMode::Identity => Box::new(IdentityStemmer),
        };

        let (features, model) = match &cfg.artifacts.bundle {
            Some(bundle) => load_bundle(bundle).context("loading artifact bundle")?,
            None => {
                // validate() guarantees all three paths are present; the
                // ok_or_else guards keep that invariant local.
                let vectorizer_path = cfg
                    .artifacts
                    .vectorizer
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("missing vectorizer path"))?;
                let reducer_path = cfg
                    .artifacts
                    .reducer
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("missing reducer path"))?;
                let model_path = cfg
                    .artifacts
                    .model
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("missing model path"))?;
                let vectorizer = TfidfVectorizer::load(vectorizer_path)
                    .context("loading vectorizer artifact")?;
                let reducer =
                    PcaProjection::load(reducer_path).context("loading reducer artifact")?;
                let model =
                    LinearModel::load(model_path).context("loading classifier artifact")?;
                let features = FeaturePipeline::new(Box::new(vectorizer), Box::new(reducer))
                    .context("composing feature pipeline")?;
                (features, Box::new(model) as Box<dyn SentimentModel>)
            }
        };

        // Safe diagnostics: counts and dimensions only, never contents.
        info!(
            slang_entries = slang.len(),
            stopwords = stopwords.len(),
            feature_dim = features.output_dim(),
            "pipeline runtime loaded"
        );

        Ok(Self {
            lexicon: Lexicon { slang, stopwords },
            stemmer,
            features,
            model,
        })
    }

    /// Classify a batch of rows; see [`engine::classify_comments`].
    pub fn classify_comments(&self, rows: Vec<Row>) -> Result<Vec<Row>, PipelineError> {
        engine::classify_comments(
            rows,
            &self.lexicon,
            self.stemmer.as_ref(),
            &self.features,
            self.model.as_ref(),
        )
    }

    /// One-off smoke test of the loaded pipeline. Won't panic on failure;
    /// it just logs the outcome.
    pub fn quick_probe(&self) {
        let mut row = Row::new();
        row.insert(
            "comment".to_string(),
            serde_json::Value::from("seru banget acaranya, ga nyesel nonton"),
        );
        match self.classify_comments(vec![row]) {
            Ok(out) => info!(label = ?out[0].get(engine::LABEL_COLUMN), "quick probe finished"),
            Err(e) => tracing::warn!(error = ?e, "quick probe failed"),
        }
    }
}

fn load_bundle(path: &Path) -> anyhow::Result<(FeaturePipeline, Box<dyn SentimentModel>)> {
    let bundle: ArtifactBundle = read_bundle(path)?;
    let vectorizer = TfidfVectorizer::from_artifact(bundle.vectorizer, path)?;
    let reducer = PcaProjection::from_artifact(bundle.reducer, path)?;
    let model = LinearModel::from_artifact(bundle.model, path)?;
    let features = FeaturePipeline::new(Box::new(vectorizer), Box::new(reducer))?;
    Ok((features, Box::new(model) as Box<dyn SentimentModel>))
}

fn read_bundle(path: &Path) -> Result<ArtifactBundle, ResourceError> {
    crate::features::read_json(path)
}
