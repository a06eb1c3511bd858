//! # Normalizer
//!
//! Pure function from a raw comment string to a cleaned, normalized token
//! string. Stage order is a correctness invariant; later stages rely on the
//! guarantees of earlier ones (slang lookup assumes lowercase alphanumeric
//! tokens, stopword removal assumes stemmed lowercase tokens):
//!
//! 1. casefold → 2. cleansing (URLs, tags, mentions, entities, residual
//! punctuation) → 3. slang substitution → 4. repetition collapsing →
//! 5. tokenize → 6. stem → 7. stopword removal → 8. rejoin.
//!
//! Value coercion for non-string comment cells lives in [`coerce_to_text`];
//! the orchestrator applies it before calling [`normalize`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::lexicon::{SlangMap, StopwordSet};
use crate::stem::Stemmer;

static RE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:http\S+|www\S+)").expect("url regex"));
static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag regex"));
static RE_MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"@\w+").expect("mention regex"));
// Named entities become a space; the numeric apostrophe vanishes entirely so
// contractions like "don&#39;t" collapse to a single token.
static RE_ENTITY_SPACED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(?:quot|gt|lt|amp);").expect("entity regex"));
static RE_APOS_ENTITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"&#39;").expect("apos regex"));
static RE_NON_ALNUM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9a-z\s]").expect("non-alnum regex"));

/// Coerce a tabular cell to comment text. Missing and non-string values are
/// not errors: they become their textual representation and are normalized
/// like any other comment.
pub fn coerce_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Normalize a raw comment into a space-joined sequence of canonical tokens.
/// Pure function of its inputs; an empty result is valid (e.g. the comment
/// consisted entirely of stopwords).
pub fn normalize(
    raw: &str,
    slang: &SlangMap,
    stopwords: &StopwordSet,
    stemmer: &dyn Stemmer,
) -> String {
    let cleansed = cleanse(raw);
    let substituted = apply_slang(&cleansed, slang);
    let collapsed = collapse_repeats(&substituted);

    let tokens = collapsed
        .split_whitespace()
        .map(|t| stemmer.stem(t))
        .filter(|t| !stopwords.contains(t));

    tokens.collect::<Vec<_>>().join(" ")
}

/// Casefold + pattern cleansing. Everything that is not a lowercase
/// alphanumeric token survives only as whitespace.
pub fn cleanse(raw: &str) -> String {
    let lower = raw.to_lowercase();

    let s = RE_URL.replace_all(&lower, " ");
    let s = RE_TAG.replace_all(&s, " ");
    let s = RE_MENTION.replace_all(&s, " ");
    let s = RE_ENTITY_SPACED.replace_all(&s, " ");
    let s = RE_APOS_ENTITY.replace_all(&s, "");
    let s = RE_NON_ALNUM.replace_all(&s, " ");

    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Replace each whitespace-separated token via the slang map, passing
/// unknown tokens through unchanged.
fn apply_slang(text: &str, slang: &SlangMap) -> String {
    text.split_whitespace()
        .map(|t| slang.canonicalize(t))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collapse any run of three or more identical characters to a single
/// occurrence ("bagussss" → "bagus"). Applies to any character, not just
/// word characters. The regex crate has no backreferences, so this is a
/// linear scan.
pub fn collapse_repeats(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run_char: Option<char> = None;
    let mut run_len = 0usize;

    for ch in text.chars() {
        if run_char == Some(ch) {
            run_len += 1;
        } else {
            flush_run(&mut out, run_char, run_len);
            run_char = Some(ch);
            run_len = 1;
        }
    }
    flush_run(&mut out, run_char, run_len);
    out
}

fn flush_run(out: &mut String, ch: Option<char>, len: usize) {
    if let Some(c) = ch {
        // Runs of one or two survive; three or more collapse to one.
        let keep = if len >= 3 { 1 } else { len };
        for _ in 0..keep {
            out.push(c);
        }
    }
}
