//! # Batch Orchestrator
//! Pure, testable logic that maps a row collection → the same rows
//! augmented with `cleaned_comment` and `predicted_label`. No I/O beyond
//! telemetry; suitable for unit tests and offline evaluation.
//!
//! Composition is strict: normalize every row → feature pipeline over the
//! full batch → classifier over the full batch → labels attached back by
//! positional index. A fatal error at any stage surfaces as a single error
//! for the whole batch; there are never partial results.

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use serde_json::Value;
use tracing::{debug, info};

use crate::classify::SentimentModel;
use crate::error::{PipelineError, SchemaError};
use crate::features::FeaturePipeline;
use crate::lexicon::Lexicon;
use crate::normalize::{coerce_to_text, normalize};
use crate::stem::Stemmer;

/// One tabular record. Insertion order is preserved so arbitrary extra
/// columns pass through untouched.
pub type Row = serde_json::Map<String, Value>;

pub const CLEANED_COLUMN: &str = "cleaned_comment";
pub const LABEL_COLUMN: &str = "predicted_label";

/// One-time metrics registration (so series show up on the host exporter).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("classify_batches_total", "Comment batches classified.");
        describe_counter!("classify_rows_total", "Comment rows classified.");
        describe_counter!(
            "classify_empty_cleaned_total",
            "Rows whose comment normalized to an empty string."
        );
    });
}

/// Find the comment column by case-insensitive name match.
/// Fails before any processing when no column qualifies.
pub fn find_comment_column(row: &Row) -> Result<String, SchemaError> {
    row.keys()
        .find(|k| k.eq_ignore_ascii_case("comment"))
        .cloned()
        .ok_or_else(|| SchemaError::MissingCommentColumn {
            columns: row.keys().cloned().collect(),
        })
}

/// Classify a batch of comment rows. Output row count equals input row
/// count, order preserved; row `i`'s label corresponds to row `i`'s
/// original comment.
pub fn classify_comments(
    rows: Vec<Row>,
    lexicon: &Lexicon,
    stemmer: &dyn Stemmer,
    features: &FeaturePipeline,
    model: &dyn SentimentModel,
) -> Result<Vec<Row>, PipelineError> {
    ensure_metrics_described();

    if rows.is_empty() {
        return Ok(rows);
    }

    // Fail fast on schema before touching any row content. The column name
    // is resolved once from the first row; rows missing the cell entirely
    // coerce like a null value.
    let column = find_comment_column(&rows[0])?;

    let cleaned: Vec<String> = rows
        .iter()
        .map(|row| {
            let raw = row.get(&column).map(coerce_to_text).unwrap_or_default();
            normalize(&raw, &lexicon.slang, &lexicon.stopwords, stemmer)
        })
        .collect();

    let empty_cleaned = cleaned.iter().filter(|c| c.is_empty()).count();
    let vectors = features.transform(&cleaned)?;
    let labels = model.predict(&vectors)?;

    let mut out = rows;
    for ((row, text), label) in out.iter_mut().zip(cleaned).zip(&labels) {
        if dev_logging_enabled() {
            // Never log raw comment text; only a hashed id and the outcome.
            debug!(
                target: "classify",
                id = %anon_hash(&text),
                label = label.as_int(),
                "row classified"
            );
        }
        row.insert(CLEANED_COLUMN.to_string(), Value::String(text));
        row.insert(LABEL_COLUMN.to_string(), Value::from(label.as_int()));
    }

    counter!("classify_batches_total").increment(1);
    counter!("classify_rows_total").increment(out.len() as u64);
    counter!("classify_empty_cleaned_total").increment(empty_cleaned as u64);
    info!(rows = out.len(), empty_cleaned, "comment batch classified");

    Ok(out)
}

// Dev logging gate: SENTIMENT_DEV_LOG=1 AND dev build.
pub(crate) fn dev_logging_enabled() -> bool {
    std::env::var("SENTIMENT_DEV_LOG").ok().as_deref() == Some("1") && cfg!(debug_assertions)
}

/// Short anonymized id for a text, safe to log.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
