use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Load-time failure of a required lexicon or model artifact.
/// Fatal to startup; callers must not swallow it.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("failed to read resource at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed resource {path} (line {line}): {details}")]
    Malformed {
        path: PathBuf,
        line: usize,
        details: String,
    },
    #[error("inconsistent artifact {path}: {details}")]
    Inconsistent { path: PathBuf, details: String },
    #[error("failed to parse artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Batch input shape problem, reported before any processing begins.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("no column matching 'comment' (case-insensitive); found: [{}]", columns.join(", "))]
    MissingCommentColumn { columns: Vec<String> },
}

/// Dimensionality or wiring mismatch inside the feature pipeline.
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("vectorizer produces {vectorizer_dim} columns but reducer expects {reducer_dim}")]
    DimensionMismatch {
        vectorizer_dim: usize,
        reducer_dim: usize,
    },
    #[error("feature row {row} has width {got}, expected {expected}")]
    RowWidth {
        row: usize,
        got: usize,
        expected: usize,
    },
}

/// Mismatch between feature vectors and the pretrained classifier.
#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("feature row {row} has width {got} but the model expects {expected}")]
    WidthMismatch {
        row: usize,
        got: usize,
        expected: usize,
    },
}

/// Umbrella for the batch path. A failure at any stage aborts the whole
/// batch; there are no partial results.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Feature(#[from] FeatureError),
    #[error(transparent)]
    Classification(#[from] ClassificationError),
}
