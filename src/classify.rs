//! # Classifier Adapter
//!
//! Applies a pretrained classification model to feature vectors. The model
//! is an opaque, versioned, read-only artifact behind the `SentimentModel`
//! trait; the bundled implementation is a linear one-vs-rest classifier
//! (per-class coefficients + intercepts, argmax decision).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{ClassificationError, ResourceError};
use crate::features::FeatureVector;

/// Sentiment classes, integer-valued on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SentimentLabel {
    Negative,
    Neutral,
    Positive,
}

impl SentimentLabel {
    pub const COUNT: usize = 3;

    pub fn as_int(self) -> i64 {
        match self {
            SentimentLabel::Negative => 0,
            SentimentLabel::Neutral => 1,
            SentimentLabel::Positive => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(SentimentLabel::Negative),
            1 => Some(SentimentLabel::Neutral),
            2 => Some(SentimentLabel::Positive),
            _ => None,
        }
    }

    /// Display mapping. The orchestrator never writes this; it is for hosts
    /// that want a human-readable column.
    pub fn text(self) -> &'static str {
        match self {
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Positive => "Positive",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

pub trait SentimentModel: Send + Sync {
    fn input_width(&self) -> usize;

    /// One label per feature row, order-preserving. Pure given a fixed
    /// pretrained model; no online adaptation.
    fn predict(&self, features: &[FeatureVector])
        -> Result<Vec<SentimentLabel>, ClassificationError>;
}

/// Serialized form of the pretrained linear classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModelArtifact {
    /// One coefficient row per class, in label order (negative, neutral,
    /// positive).
    pub coefficients: Vec<Vec<f32>>,
    /// One intercept per class.
    pub intercepts: Vec<f32>,
}

#[derive(Debug, Clone)]
pub struct LinearModel {
    coefficients: Vec<Vec<f32>>,
    intercepts: Vec<f32>,
}

impl LinearModel {
    pub fn from_artifact(
        artifact: LinearModelArtifact,
        origin: &Path,
    ) -> Result<Self, ResourceError> {
        if artifact.coefficients.len() != SentimentLabel::COUNT
            || artifact.intercepts.len() != SentimentLabel::COUNT
        {
            return Err(ResourceError::Inconsistent {
                path: origin.to_path_buf(),
                details: format!(
                    "expected {} classes, got {} coefficient rows and {} intercepts",
                    SentimentLabel::COUNT,
                    artifact.coefficients.len(),
                    artifact.intercepts.len()
                ),
            });
        }
        let width = artifact.coefficients[0].len();
        if artifact.coefficients.iter().any(|row| row.len() != width) {
            return Err(ResourceError::Inconsistent {
                path: origin.to_path_buf(),
                details: "coefficient rows have unequal widths".to_string(),
            });
        }
        Ok(Self {
            coefficients: artifact.coefficients,
            intercepts: artifact.intercepts,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ResourceError> {
        let artifact: LinearModelArtifact = crate::features::read_json(path)?;
        Self::from_artifact(artifact, path)
    }
}

impl SentimentModel for LinearModel {
    fn input_width(&self) -> usize {
        self.coefficients[0].len()
    }

    fn predict(
        &self,
        features: &[FeatureVector],
    ) -> Result<Vec<SentimentLabel>, ClassificationError> {
        let expected = self.input_width();
        let mut labels = Vec::with_capacity(features.len());

        for (i, row) in features.iter().enumerate() {
            if row.len() != expected {
                return Err(ClassificationError::WidthMismatch {
                    row: i,
                    got: row.len(),
                    expected,
                });
            }

            let mut best = 0usize;
            let mut best_score = f32::NEG_INFINITY;
            for (class, (coef, b)) in self
                .coefficients
                .iter()
                .zip(&self.intercepts)
                .enumerate()
            {
                let score: f32 = coef.iter().zip(row).map(|(w, x)| w * x).sum::<f32>() + b;
                // Strict comparison: ties resolve to the lowest class index.
                if score > best_score {
                    best_score = score;
                    best = class;
                }
            }
            labels.push(SentimentLabel::from_index(best).unwrap_or(SentimentLabel::Neutral));
        }
        Ok(labels)
    }
}
