// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod lexicon;
pub mod normalize;
pub mod stem;

pub mod bootstrap;

// ---- Re-exports for stable public API ----
pub use crate::bootstrap::{ArtifactBundle, PipelineRuntime};
pub use crate::classify::{LinearModel, SentimentLabel, SentimentModel};
pub use crate::engine::{classify_comments, find_comment_column, Row};
pub use crate::error::{
    ClassificationError, FeatureError, PipelineError, ResourceError, SchemaError,
};
pub use crate::features::{FeaturePipeline, FeatureVector, PcaProjection, TfidfVectorizer};
pub use crate::lexicon::{build_slang_map, build_stopword_set, Lexicon, SlangMap, StopwordSet};
pub use crate::normalize::normalize;
pub use crate::stem::{IdentityStemmer, IndonesianStemmer, Stemmer};

use tracing::info;

/// Call this from your host entrypoint (after tracing init) to perform a
/// one-off smoke test of the loaded pipeline. It won't panic on bad input;
/// it just logs the result.
///
/// Example usage inside your host's main function:
/// ```ignore
/// if let Err(e) = komentar_sentiment_analyzer::run_quick_probe() {
///     tracing::warn!(error = ?e, "pipeline quick probe didn't run");
/// }
/// ```
pub fn run_quick_probe() -> anyhow::Result<()> {
    let runtime = PipelineRuntime::from_env()?;
    runtime.quick_probe();
    info!("pipeline quick probe finished");
    Ok(())
}
