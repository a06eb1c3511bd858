//! # Lexicon Store
//!
//! Loads and merges the slang ("alay") dictionary and the stopword set from
//! external CSV resources, with deterministic override rules:
//!
//! - Slang: supplementary entries overwrite primary entries on key collision.
//! - Stopwords: (built-in list ∪ custom rows ∪ additional words) − excluded
//!   words; exclusion always wins, whichever source contributed the word.
//!
//! Both structures are built once at startup and treated as read-only shared
//! state for the lifetime of all normalization calls. Rebuilding is
//! idempotent and side-effect-free, so tests construct them freely.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::error::ResourceError;

/// Built-in Indonesian stopword list, bundled at compile time.
static DEFAULT_STOPWORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    include_str!("../default_stopwords_id.txt")
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect()
});

/// Mapping from informal token to its canonical formal form.
/// Keys are stored lowercase; lookups are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct SlangMap {
    entries: HashMap<String, String>,
}

impl SlangMap {
    /// Build directly from (informal, formal) pairs. Later pairs overwrite
    /// earlier ones, matching the merge rule of [`build_slang_map`].
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut entries = HashMap::new();
        for (k, v) in pairs {
            entries.insert(k.as_ref().to_lowercase(), v.as_ref().to_string());
        }
        Self { entries }
    }

    /// Canonical form for `token`, or `None` when the token is not slang.
    pub fn lookup(&self, token: &str) -> Option<&str> {
        self.entries.get(&token.to_lowercase()).map(String::as_str)
    }

    /// Canonical form for `token`, passing unknown tokens through unchanged.
    pub fn canonicalize<'a>(&'a self, token: &'a str) -> &'a str {
        self.lookup(token).unwrap_or(token)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Deduplicated stopword set. Matching is exact; the normalizer only feeds
/// it already-lowercased tokens.
#[derive(Debug, Clone, Default)]
pub struct StopwordSet {
    words: HashSet<String>,
}

impl StopwordSet {
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words.into_iter().map(|w| w.as_ref().to_string()).collect(),
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Convenience bundle handed to the orchestrator.
#[derive(Debug, Clone)]
pub struct Lexicon {
    pub slang: SlangMap,
    pub stopwords: StopwordSet,
}

/// Build the slang map from a primary two-column CSV resource and an
/// optional supplementary one. Supplementary entries win on collision.
pub fn build_slang_map(
    primary: &Path,
    additional: Option<&Path>,
) -> Result<SlangMap, ResourceError> {
    let mut entries = HashMap::new();
    merge_slang_source(primary, &mut entries)?;
    if let Some(extra) = additional {
        merge_slang_source(extra, &mut entries)?;
    }
    Ok(SlangMap { entries })
}

/// Build the stopword set: (built-in ∪ custom CSV rows ∪ `additional_words`)
/// − `excluded_words`. Output is a set, so the result is deterministic
/// regardless of input ordering.
pub fn build_stopword_set(
    custom: &Path,
    additional_words: &[String],
    excluded_words: &[String],
) -> Result<StopwordSet, ResourceError> {
    let mut words: HashSet<String> =
        DEFAULT_STOPWORDS.iter().map(|w| w.to_string()).collect();

    for (line_no, record) in read_rows(custom)?.into_iter().enumerate() {
        if record.len() != 1 {
            return Err(ResourceError::Malformed {
                path: custom.to_path_buf(),
                line: line_no + 1,
                details: format!("expected 1 column, got {}", record.len()),
            });
        }
        words.insert(record[0].trim().to_string());
    }

    words.extend(additional_words.iter().cloned());
    for w in excluded_words {
        words.remove(w);
    }

    Ok(StopwordSet { words })
}

fn merge_slang_source(
    path: &Path,
    entries: &mut HashMap<String, String>,
) -> Result<(), ResourceError> {
    for (line_no, record) in read_rows(path)?.into_iter().enumerate() {
        if record.len() != 2 {
            return Err(ResourceError::Malformed {
                path: path.to_path_buf(),
                line: line_no + 1,
                details: format!("expected 2 columns, got {}", record.len()),
            });
        }
        entries.insert(
            record[0].trim().to_lowercase(),
            record[1].trim().to_string(),
        );
    }
    Ok(())
}

/// Read a headerless CSV resource into string rows, tolerating legacy
/// single-byte extended encodings.
fn read_rows(path: &Path) -> Result<Vec<Vec<String>>, ResourceError> {
    let bytes = fs::read(path).map_err(|source| ResourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let text = decode_lossy_latin1(&bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for (line_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| ResourceError::Malformed {
            path: path.to_path_buf(),
            line: line_no + 1,
            details: e.to_string(),
        })?;
        rows.push(record.iter().map(|f| f.to_string()).collect());
    }
    Ok(rows)
}

/// UTF-8 when valid, otherwise byte-wise Latin-1. Legacy slang dictionaries
/// carry single-byte extended characters; every byte maps to the Unicode
/// code point of the same value, so the fallback is total.
fn decode_lossy_latin1(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(content: &[u8]) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content).unwrap();
        f
    }

    #[test]
    fn slang_lookup_is_case_insensitive() {
        let m = SlangMap::from_pairs([("GA", "tidak")]);
        assert_eq!(m.lookup("ga"), Some("tidak"));
        assert_eq!(m.lookup("Ga"), Some("tidak"));
        assert_eq!(m.canonicalize("suka"), "suka");
    }

    #[test]
    fn supplementary_dictionary_wins_on_collision() {
        let primary = csv_file(b"ga,tidak\nbgt,banget\n");
        let extra = csv_file(b"ga,nggak\n");
        let m = build_slang_map(primary.path(), Some(extra.path())).unwrap();
        assert_eq!(m.lookup("ga"), Some("nggak"));
        assert_eq!(m.lookup("bgt"), Some("banget"));
    }

    #[test]
    fn malformed_slang_row_is_rejected() {
        let bad = csv_file(b"ga,tidak\nsolo-column\n");
        let err = build_slang_map(bad.path(), None).unwrap_err();
        assert!(matches!(err, ResourceError::Malformed { line: 2, .. }));
    }

    #[test]
    fn missing_source_is_a_read_error() {
        let err = build_slang_map(Path::new("no/such/file.csv"), None).unwrap_err();
        assert!(matches!(err, ResourceError::Read { .. }));
    }

    #[test]
    fn latin1_bytes_decode() {
        // 0xE9 is 'é' in ISO-8859-1 and invalid on its own in UTF-8.
        let f = csv_file(b"ok\xe9,oke\n");
        let m = build_slang_map(f.path(), None).unwrap();
        assert_eq!(m.lookup("ok\u{e9}"), Some("oke"));
    }

    #[test]
    fn exclusion_wins_over_every_source() {
        let custom = csv_file(b"tidak\nkeren\n");
        let set = build_stopword_set(
            custom.path(),
            &["tidak".into(), "lah".into()],
            &["tidak".into(), "yang".into()],
        )
        .unwrap();
        // "tidak" came from the custom file AND the additional list; "yang"
        // comes from the built-in list. Both must be absent.
        assert!(!set.contains("tidak"));
        assert!(!set.contains("yang"));
        assert!(set.contains("keren"));
        assert!(set.contains("lah"));
    }

    #[test]
    fn builtin_list_is_included() {
        let custom = csv_file(b"coc\n");
        let set = build_stopword_set(custom.path(), &[], &[]).unwrap();
        assert!(set.contains("yang"));
        assert!(set.contains("dan"));
        assert!(set.contains("coc"));
    }

    #[test]
    fn rebuild_is_deterministic() {
        let custom = csv_file(b"aaa\nbbb\n");
        let a = build_stopword_set(custom.path(), &["ccc".into()], &["aaa".into()]).unwrap();
        let b = build_stopword_set(custom.path(), &["ccc".into()], &["aaa".into()]).unwrap();
        assert_eq!(a.len(), b.len());
        assert!(b.contains("bbb") && b.contains("ccc") && !b.contains("aaa"));
    }
}
