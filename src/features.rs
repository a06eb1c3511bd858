//! # Feature Pipeline
//!
//! Turns normalized comment text into fixed-width numeric feature vectors
//! using pretrained, read-only artifacts:
//!
//! - a TF-IDF vectorizer with a frozen vocabulary and per-term IDF weights,
//! - a linear projection (PCA-style) into a lower-dimensional dense space.
//!
//! Both sit behind trait boundaries (`TermVectorizer`, `Reducer`) so
//! alternative artifact formats can be substituted without touching the
//! normalizer or the orchestrator. Term weighting was fit offline; nothing
//! here learns at request time. Unknown terms contribute zero and are not
//! an error.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{FeatureError, ResourceError};

/// Fixed-width dense feature row, order-aligned with the input batch.
pub type FeatureVector = Vec<f32>;

pub trait TermVectorizer: Send + Sync {
    /// Map a corpus of normalized strings to one numeric row per input.
    /// Must never reorder, drop, or deduplicate rows.
    fn transform(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, FeatureError>;
    fn output_dim(&self) -> usize;
}

pub trait Reducer: Send + Sync {
    fn transform(&self, rows: Vec<Vec<f32>>) -> Result<Vec<FeatureVector>, FeatureError>;
    fn input_dim(&self) -> usize;
    fn output_dim(&self) -> usize;
}

/// Serialized form of the pretrained TF-IDF vectorizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfArtifact {
    /// term → column index; indices must cover 0..len contiguously.
    pub vocabulary: HashMap<String, usize>,
    /// One IDF weight per vocabulary column.
    pub idf: Vec<f32>,
}

/// Pretrained TF-IDF vectorizer: raw term counts weighted by frozen IDF
/// values, then L2-normalized per row.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
}

impl TfidfVectorizer {
    pub fn from_artifact(artifact: TfidfArtifact, origin: &Path) -> Result<Self, ResourceError> {
        let n = artifact.vocabulary.len();
        if artifact.idf.len() != n {
            return Err(ResourceError::Inconsistent {
                path: origin.to_path_buf(),
                details: format!(
                    "vocabulary has {} terms but idf has {} weights",
                    n,
                    artifact.idf.len()
                ),
            });
        }
        let mut seen = vec![false; n];
        for (term, &idx) in &artifact.vocabulary {
            if idx >= n || seen[idx] {
                return Err(ResourceError::Inconsistent {
                    path: origin.to_path_buf(),
                    details: format!("term '{term}' maps to invalid or duplicate column {idx}"),
                });
            }
            seen[idx] = true;
        }
        Ok(Self {
            vocabulary: artifact.vocabulary,
            idf: artifact.idf,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ResourceError> {
        let artifact: TfidfArtifact = read_json(path)?;
        Self::from_artifact(artifact, path)
    }
}

impl TermVectorizer for TfidfVectorizer {
    fn transform(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, FeatureError> {
        let dim = self.idf.len();
        let mut rows = Vec::with_capacity(texts.len());

        for text in texts {
            let mut row = vec![0.0f32; dim];
            for term in text.split_whitespace() {
                // Unknown terms are silently ignored (zero contribution).
                if let Some(&idx) = self.vocabulary.get(term) {
                    row[idx] += 1.0;
                }
            }
            for (x, w) in row.iter_mut().zip(&self.idf) {
                *x *= w;
            }
            l2_normalize(&mut row);
            rows.push(row);
        }
        Ok(rows)
    }

    fn output_dim(&self) -> usize {
        self.idf.len()
    }
}

/// Serialized form of the pretrained projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionArtifact {
    /// Per-column mean subtracted before projecting.
    pub mean: Vec<f32>,
    /// `output_dim` rows of `input_dim` weights each.
    pub components: Vec<Vec<f32>>,
}

/// Fixed linear projection into a lower-dimensional dense space:
/// `y = (x − mean) · Wᵀ`.
#[derive(Debug, Clone)]
pub struct PcaProjection {
    mean: Vec<f32>,
    components: Vec<Vec<f32>>,
}

impl PcaProjection {
    pub fn from_artifact(
        artifact: ProjectionArtifact,
        origin: &Path,
    ) -> Result<Self, ResourceError> {
        let input_dim = artifact.mean.len();
        for (i, row) in artifact.components.iter().enumerate() {
            if row.len() != input_dim {
                return Err(ResourceError::Inconsistent {
                    path: origin.to_path_buf(),
                    details: format!(
                        "component {i} has {} weights, expected {input_dim}",
                        row.len()
                    ),
                });
            }
        }
        Ok(Self {
            mean: artifact.mean,
            components: artifact.components,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ResourceError> {
        let artifact: ProjectionArtifact = read_json(path)?;
        Self::from_artifact(artifact, path)
    }
}

impl Reducer for PcaProjection {
    fn transform(&self, rows: Vec<Vec<f32>>) -> Result<Vec<FeatureVector>, FeatureError> {
        let expected = self.input_dim();
        let mut out = Vec::with_capacity(rows.len());

        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != expected {
                return Err(FeatureError::RowWidth {
                    row: i,
                    got: row.len(),
                    expected,
                });
            }
            let centered: Vec<f32> = row
                .iter()
                .zip(&self.mean)
                .map(|(x, m)| x - m)
                .collect();
            let projected: Vec<f32> = self
                .components
                .iter()
                .map(|comp| comp.iter().zip(&centered).map(|(w, x)| w * x).sum())
                .collect();
            out.push(projected);
        }
        Ok(out)
    }

    fn input_dim(&self) -> usize {
        self.mean.len()
    }

    fn output_dim(&self) -> usize {
        self.components.len()
    }
}

/// Vectorizer + reducer composed with a width check at construction.
pub struct FeaturePipeline {
    vectorizer: Box<dyn TermVectorizer>,
    reducer: Box<dyn Reducer>,
}

impl std::fmt::Debug for FeaturePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeaturePipeline").finish_non_exhaustive()
    }
}

impl FeaturePipeline {
    pub fn new(
        vectorizer: Box<dyn TermVectorizer>,
        reducer: Box<dyn Reducer>,
    ) -> Result<Self, FeatureError> {
        if vectorizer.output_dim() != reducer.input_dim() {
            return Err(FeatureError::DimensionMismatch {
                vectorizer_dim: vectorizer.output_dim(),
                reducer_dim: reducer.input_dim(),
            });
        }
        Ok(Self {
            vectorizer,
            reducer,
        })
    }

    /// Row `i` of the output corresponds to row `i` of the input, including
    /// empty-string and duplicate inputs.
    pub fn transform(&self, texts: &[String]) -> Result<Vec<FeatureVector>, FeatureError> {
        let sparse = self.vectorizer.transform(texts)?;
        self.reducer.transform(sparse)
    }

    pub fn output_dim(&self) -> usize {
        self.reducer.output_dim()
    }
}

fn l2_normalize(row: &mut [f32]) {
    let norm: f32 = row.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in row.iter_mut() {
            *x /= norm;
        }
    }
}

pub(crate) fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ResourceError> {
    let data = fs::read_to_string(path).map_err(|source| ResourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| ResourceError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
