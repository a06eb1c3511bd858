// tests/classify_e2e.rs
// Builds the whole runtime from on-disk resources in a temp directory and
// drives classification batches through it.

use komentar_sentiment_analyzer::config::{
    ArtifactsConfig, LexiconConfig, PipelineConfig, StemmerConfig, StemmerMode,
};
use komentar_sentiment_analyzer::engine::{CLEANED_COLUMN, LABEL_COLUMN};
use komentar_sentiment_analyzer::{PipelineError, PipelineRuntime, Row};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Lay out lexicon CSVs and pretrained artifacts:
/// vocabulary {tidak, suka, seru, bagus, jelek}, identity projection, and a
/// linear model where "tidak"/"jelek" pull Negative, "suka"/"seru"/"bagus"
/// pull Positive, and empty rows land on Neutral.
fn write_resources(dir: &Path) -> PipelineConfig {
    fs::write(dir.join("kamus.csv"), "ga,tidak\nbgt,banget\nbgs,bagus\n").unwrap();
    fs::write(dir.join("kamus_tambahan.csv"), "mantul,mantap\n").unwrap();
    fs::write(dir.join("stopwords.csv"), "nih\ndeh\n").unwrap();

    let vectorizer = json!({
        "vocabulary": {"tidak": 0, "suka": 1, "seru": 2, "bagus": 3, "jelek": 4},
        "idf": [1.0, 1.0, 1.0, 1.0, 1.0],
    });
    let identity: Vec<Vec<f32>> = (0..5)
        .map(|i| (0..5).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();
    let reducer = json!({"mean": vec![0.0f32; 5], "components": identity});
    let model = json!({
        "coefficients": [
            [2.0, -1.0, -1.0, -1.0, 2.0],
            [0.0, 0.0, 0.0, 0.0, 0.0],
            [-2.0, 1.0, 1.0, 1.0, -2.0],
        ],
        "intercepts": [0.0, 0.05, 0.0],
    });
    fs::write(dir.join("tfidf.json"), vectorizer.to_string()).unwrap();
    fs::write(dir.join("projection.json"), reducer.to_string()).unwrap();
    fs::write(dir.join("model.json"), model.to_string()).unwrap();

    PipelineConfig {
        lexicon: LexiconConfig {
            slang: dir.join("kamus.csv"),
            additional_slang: Some(dir.join("kamus_tambahan.csv")),
            stopwords: dir.join("stopwords.csv"),
            additional_stopwords: vec!["banget".to_string()],
            excluded_stopwords: vec!["tidak".to_string()],
        },
        artifacts: ArtifactsConfig {
            bundle: None,
            vectorizer: Some(dir.join("tfidf.json")),
            reducer: Some(dir.join("projection.json")),
            model: Some(dir.join("model.json")),
        },
        stemmer: StemmerConfig {
            mode: StemmerMode::Identity,
            extra_roots: Vec::new(),
        },
    }
}

fn comment_row(column: &str, value: Value) -> Row {
    let mut row = Row::new();
    row.insert("username".to_string(), Value::from("tester"));
    row.insert(column.to_string(), value);
    row
}

#[test]
fn classifies_a_batch_end_to_end() {
    let dir = TempDir::new().unwrap();
    let cfg = write_resources(dir.path());
    let runtime = PipelineRuntime::from_config(&cfg).unwrap();

    let rows = vec![
        comment_row("Comment", Value::from("ga suka bgt nih!!")),
        comment_row("Comment", Value::from("Serunyaaa, bagus & seru http://yt.be/x")),
        comment_row("Comment", Value::from("nih deh")),
    ];
    let out = runtime.classify_comments(rows).unwrap();

    assert_eq!(out.len(), 3);
    // Row 0: "ga"→"tidak", "bgt"→"banget" (then dropped as stopword),
    // "nih" dropped; "tidak" is excluded from the stopword set so it stays.
    assert_eq!(out[0][CLEANED_COLUMN], Value::from("tidak suka"));
    assert_eq!(out[0][LABEL_COLUMN], Value::from(0));
    // Row 1: URL stripped, "serunyaaa" collapses to "serunya" (unknown to
    // the vocabulary), "bagus"/"seru" dominate.
    assert_eq!(out[1][LABEL_COLUMN], Value::from(2));
    // Row 2: everything was a stopword.
    assert_eq!(out[2][CLEANED_COLUMN], Value::from(""));
    assert_eq!(out[2][LABEL_COLUMN], Value::from(1));
    // Pass-through columns survive in place.
    assert_eq!(out[0]["username"], Value::from("tester"));
}

#[test]
fn row_order_and_count_are_preserved() {
    let dir = TempDir::new().unwrap();
    let cfg = write_resources(dir.path());
    let runtime = PipelineRuntime::from_config(&cfg).unwrap();

    let texts = ["suka", "", "suka", "jelek", ""];
    let rows: Vec<Row> = texts
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let mut r = comment_row("comment", Value::from(*t));
            r.insert("idx".to_string(), Value::from(i as i64));
            r
        })
        .collect();

    let out = runtime.classify_comments(rows).unwrap();
    assert_eq!(out.len(), texts.len());
    for (i, row) in out.iter().enumerate() {
        assert_eq!(row["idx"], Value::from(i as i64));
    }
    // Duplicates are classified independently but identically.
    assert_eq!(out[0][LABEL_COLUMN], out[2][LABEL_COLUMN]);
    assert_eq!(out[1][LABEL_COLUMN], out[4][LABEL_COLUMN]);
}

#[test]
fn missing_comment_column_fails_fast() {
    let dir = TempDir::new().unwrap();
    let cfg = write_resources(dir.path());
    let runtime = PipelineRuntime::from_config(&cfg).unwrap();

    let mut row = Row::new();
    row.insert("username".to_string(), Value::from("x"));
    row.insert("text".to_string(), Value::from("bagus"));

    let err = runtime.classify_comments(vec![row]).unwrap_err();
    assert!(matches!(err, PipelineError::Schema(_)));
}

#[test]
fn null_and_numeric_comments_are_coerced() {
    let dir = TempDir::new().unwrap();
    let cfg = write_resources(dir.path());
    let runtime = PipelineRuntime::from_config(&cfg).unwrap();

    let rows = vec![
        comment_row("comment", Value::Null),
        comment_row("comment", Value::from(42)),
    ];
    let out = runtime.classify_comments(rows).unwrap();
    assert_eq!(out[0][CLEANED_COLUMN], Value::from("null"));
    assert_eq!(out[1][CLEANED_COLUMN], Value::from("42"));
    // Both are out of vocabulary, so they land on the empty-row class.
    assert_eq!(out[0][LABEL_COLUMN], Value::from(1));
    assert_eq!(out[1][LABEL_COLUMN], Value::from(1));
}

#[test]
fn bundle_packaging_is_equivalent() {
    let dir = TempDir::new().unwrap();
    let cfg = write_resources(dir.path());

    // Repackage the three artifacts into one bundle file.
    let bundle = json!({
        "vectorizer": serde_json::from_str::<Value>(
            &fs::read_to_string(dir.path().join("tfidf.json")).unwrap()).unwrap(),
        "reducer": serde_json::from_str::<Value>(
            &fs::read_to_string(dir.path().join("projection.json")).unwrap()).unwrap(),
        "model": serde_json::from_str::<Value>(
            &fs::read_to_string(dir.path().join("model.json")).unwrap()).unwrap(),
    });
    fs::write(dir.path().join("bundle.json"), bundle.to_string()).unwrap();

    let mut bundled = cfg.clone();
    bundled.artifacts = ArtifactsConfig {
        bundle: Some(dir.path().join("bundle.json")),
        vectorizer: None,
        reducer: None,
        model: None,
    };

    let split_runtime = PipelineRuntime::from_config(&cfg).unwrap();
    let bundle_runtime = PipelineRuntime::from_config(&bundled).unwrap();

    let rows = vec![comment_row("comment", Value::from("bagus seru"))];
    let a = split_runtime.classify_comments(rows.clone()).unwrap();
    let b = bundle_runtime.classify_comments(rows).unwrap();
    assert_eq!(a[0][LABEL_COLUMN], b[0][LABEL_COLUMN]);
    assert_eq!(a[0][CLEANED_COLUMN], b[0][CLEANED_COLUMN]);
}

#[test]
fn missing_artifact_fails_at_startup() {
    let dir = TempDir::new().unwrap();
    let mut cfg = write_resources(dir.path());
    cfg.artifacts.model = Some(dir.path().join("no_such_model.json"));

    let err = PipelineRuntime::from_config(&cfg).unwrap_err();
    assert!(err.to_string().contains("classifier artifact"));
}

#[serial_test::serial]
#[test]
fn config_path_env_override_is_honored() {
    let dir = TempDir::new().unwrap();
    let cfg = write_resources(dir.path());

    // Serialize an equivalent TOML config next to the resources.
    let toml = format!(
        r#"
[lexicon]
slang = "{slang}"
additional_slang = "{extra}"
stopwords = "{stops}"
additional_stopwords = ["banget"]
excluded_stopwords = ["tidak"]

[artifacts]
vectorizer = "{vec}"
reducer = "{red}"
model = "{model}"

[stemmer]
mode = "identity"
"#,
        slang = cfg.lexicon.slang.display(),
        extra = cfg.lexicon.additional_slang.as_ref().unwrap().display(),
        stops = cfg.lexicon.stopwords.display(),
        vec = cfg.artifacts.vectorizer.as_ref().unwrap().display(),
        red = cfg.artifacts.reducer.as_ref().unwrap().display(),
        model = cfg.artifacts.model.as_ref().unwrap().display(),
    );
    let cfg_path = dir.path().join("pipeline.toml");
    fs::write(&cfg_path, toml).unwrap();

    std::env::set_var("SENTIMENT_CONFIG_PATH", &cfg_path);
    let runtime = PipelineRuntime::from_env().unwrap();
    std::env::remove_var("SENTIMENT_CONFIG_PATH");

    let out = runtime
        .classify_comments(vec![comment_row("comment", Value::from("ga suka"))])
        .unwrap();
    assert_eq!(out[0][LABEL_COLUMN], Value::from(0));
}
