//! # Indonesian stemming
//!
//! Morphological affix stripping to a root form, behind a capability trait
//! so the normalizer stays polymorphic over "stem(token) -> token".
//!
//! `IndonesianStemmer` follows the Nazief–Adriani order: dictionary check,
//! inflectional suffixes (particles, then possessives), derivational
//! suffixes, then derivational prefixes with nasal recoding. Every removal
//! is gated on a root-word dictionary; when no step reaches a known root
//! the original token is returned unchanged. That keeps the stemmer
//! conservative on names, typos, and foreign words.
//!
//! `IdentityStemmer` substitutes a no-op when morphological stemming is
//! unwanted. It changes normalization outcomes, so tests that depend on
//! stemmed forms are written against one stemmer explicitly.

use once_cell::sync::Lazy;
use std::collections::HashSet;

static DEFAULT_ROOTS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    include_str!("../root_words_id.txt")
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect()
});

const INFLECTIONAL_PARTICLES: [&str; 4] = ["lah", "kah", "tah", "pun"];
const POSSESSIVES: [&str; 3] = ["ku", "mu", "nya"];
const DERIVATIONAL_SUFFIXES: [&str; 3] = ["kan", "an", "i"];

/// Shortest stem we are willing to produce by stripping.
const MIN_STEM_LEN: usize = 3;

/// Maximum number of stacked derivational prefixes (e.g. "mempelajari").
const MAX_PREFIX_DEPTH: usize = 3;

pub trait Stemmer: Send + Sync {
    fn stem(&self, word: &str) -> String;
}

/// No-op stemmer for tests and degraded operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityStemmer;

impl Stemmer for IdentityStemmer {
    fn stem(&self, word: &str) -> String {
        word.to_string()
    }
}

/// Dictionary-gated affix-stripping stemmer for formal written Indonesian.
#[derive(Debug, Clone)]
pub struct IndonesianStemmer {
    extra_roots: HashSet<String>,
}

impl IndonesianStemmer {
    pub fn new() -> Self {
        Self {
            extra_roots: HashSet::new(),
        }
    }

    /// Extend the bundled root dictionary, e.g. with domain vocabulary.
    pub fn with_root_words<I, S>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extra_roots
            .extend(roots.into_iter().map(|r| r.as_ref().to_lowercase()));
        self
    }

    fn is_root(&self, word: &str) -> bool {
        DEFAULT_ROOTS.contains(word) || self.extra_roots.contains(word)
    }

    /// Strip one particle then one possessive, without dictionary gating;
    /// both are purely inflectional and never part of a root.
    fn strip_inflectional<'a>(&self, word: &'a str) -> &'a str {
        let mut w = word;
        for suf in INFLECTIONAL_PARTICLES {
            if let Some(s) = w.strip_suffix(suf) {
                if s.len() >= MIN_STEM_LEN {
                    w = s;
                }
                break;
            }
        }
        for suf in POSSESSIVES {
            if let Some(s) = w.strip_suffix(suf) {
                if s.len() >= MIN_STEM_LEN {
                    w = s;
                }
                break;
            }
        }
        w
    }

    /// Candidate roots after removing `prefix` from `word`, including nasal
    /// recodings (e.g. "menonton" → "onton" and "tonton").
    fn prefix_candidates(word: &str) -> Vec<String> {
        // Ordered longest-first so "meng" wins over "me", "bel" over "be".
        const TABLE: [(&str, Option<char>); 20] = [
            ("meng", Some('k')),
            ("meny", Some('s')),
            ("mem", Some('p')),
            ("men", Some('t')),
            ("me", None),
            ("peng", Some('k')),
            ("peny", Some('s')),
            ("pem", Some('p')),
            ("pen", Some('t')),
            ("pel", None),
            ("per", None),
            ("pe", None),
            ("bel", None),
            ("ber", None),
            ("be", None),
            ("ter", None),
            ("te", None),
            ("di", None),
            ("ke", None),
            ("se", None),
        ];

        let mut out = Vec::new();
        for (pre, recode) in TABLE {
            if let Some(rest) = word.strip_prefix(pre) {
                if rest.len() >= MIN_STEM_LEN {
                    out.push(rest.to_string());
                    if let Some(c) = recode {
                        out.push(format!("{c}{rest}"));
                    }
                }
                break;
            }
        }
        out
    }

    fn resolve_prefixes(&self, word: &str, depth: usize) -> Option<String> {
        if depth == 0 {
            return None;
        }
        let candidates = Self::prefix_candidates(word);
        for cand in &candidates {
            if self.is_root(cand) {
                return Some(cand.clone());
            }
        }
        for cand in &candidates {
            if let Some(root) = self.resolve_prefixes(cand, depth - 1) {
                return Some(root);
            }
        }
        None
    }

    fn resolve_suffixes_then_prefixes(&self, word: &str) -> Option<String> {
        for suf in DERIVATIONAL_SUFFIXES {
            if let Some(s) = word.strip_suffix(suf) {
                if s.len() < MIN_STEM_LEN {
                    continue;
                }
                if self.is_root(s) {
                    return Some(s.to_string());
                }
                if let Some(root) = self.resolve_prefixes(s, MAX_PREFIX_DEPTH) {
                    return Some(root);
                }
            }
        }
        None
    }
}

impl Default for IndonesianStemmer {
    fn default() -> Self {
        Self::new()
    }
}

impl Stemmer for IndonesianStemmer {
    fn stem(&self, word: &str) -> String {
        if word.len() < MIN_STEM_LEN || self.is_root(word) {
            return word.to_string();
        }

        let base = self.strip_inflectional(word);
        if self.is_root(base) {
            return base.to_string();
        }

        if let Some(root) = self.resolve_suffixes_then_prefixes(base) {
            return root;
        }
        if let Some(root) = self.resolve_prefixes(base, MAX_PREFIX_DEPTH) {
            return root;
        }

        // No confirmed root; leave the token alone.
        word.to_string()
    }
}
