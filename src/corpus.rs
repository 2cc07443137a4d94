// Corpus loading — turns raw input files into token-list documents.
//
// The sampler only sees tokens. This module owns everything before that:
// reading plain-text or JSON-lines files, lowercasing, splitting into word
// tokens and dropping English stop words.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use regex_lite::Regex;
use serde::Deserialize;
use stop_words::{get, LANGUAGE};
use tracing::info;

/// Splits raw text into lowercase word tokens.
pub struct Tokenizer {
    pattern: Regex,
    stop_words: HashSet<String>,
    /// Tokens shorter than this (in characters) are dropped
    pub min_token_len: usize,
}

impl Tokenizer {
    /// Build a tokenizer, optionally removing English stop words.
    pub fn new(remove_stop_words: bool) -> Self {
        let stop_words = if remove_stop_words {
            get(LANGUAGE::English).into_iter().collect()
        } else {
            HashSet::new()
        };

        Self {
            // regex-lite has no Unicode classes; input is lowercased first
            pattern: Regex::new(r"[a-z0-9][a-z0-9']*").expect("token pattern is valid"),
            stop_words,
            min_token_len: 2,
        }
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        self.pattern
            .find_iter(&lower)
            .map(|m| m.as_str().trim_end_matches('\''))
            .filter(|tok| tok.chars().count() >= self.min_token_len)
            .filter(|tok| !self.stop_words.contains(*tok))
            .map(str::to_string)
            .collect()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(true)
    }
}

/// One input line in a `.jsonl` corpus.
///
/// Pre-tokenized `tokens` win over `text` when both are present.
#[derive(Debug, Deserialize)]
struct RawDocument {
    id: Option<String>,
    text: Option<String>,
    tokens: Option<Vec<String>>,
}

/// Token-list documents plus the raw text they came from.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    /// Caller-supplied identifiers (line number when absent)
    pub ids: Vec<String>,
    /// Original text, for previews in reports
    pub texts: Vec<String>,
    pub documents: Vec<Vec<String>>,
}

impl Corpus {
    /// One document per non-blank line.
    pub fn from_lines(input: &str, tokenizer: &Tokenizer) -> Self {
        let mut corpus = Corpus::default();
        for (i, line) in input.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            corpus.push((i + 1).to_string(), line.to_string(), tokenizer.tokenize(line));
        }
        corpus
    }

    /// One JSON object per non-blank line, with `text` or `tokens`.
    pub fn from_jsonl(input: &str, tokenizer: &Tokenizer) -> Result<Self> {
        let mut corpus = Corpus::default();
        for (i, line) in input.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let raw: RawDocument = serde_json::from_str(line)
                .with_context(|| format!("Line {} is not a valid JSON document", i + 1))?;
            let id = raw.id.unwrap_or_else(|| (i + 1).to_string());

            let (text, tokens) = match (raw.tokens, raw.text) {
                (Some(tokens), text) => (text.unwrap_or_else(|| tokens.join(" ")), tokens),
                (None, Some(text)) => {
                    let tokens = tokenizer.tokenize(&text);
                    (text, tokens)
                }
                (None, None) => {
                    anyhow::bail!("Line {} has neither a \"text\" nor a \"tokens\" field", i + 1)
                }
            };
            corpus.push(id, text, tokens);
        }
        Ok(corpus)
    }

    /// Load a corpus file. `.jsonl`/`.json` files are parsed as JSON lines,
    /// anything else as one document per line.
    pub fn load(path: &Path, tokenizer: &Tokenizer) -> Result<Self> {
        let input = fs::read_to_string(path)
            .with_context(|| format!("Failed to read corpus from {}", path.display()))?;

        let is_json = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("jsonl") | Some("json")
        );
        let corpus = if is_json {
            Self::from_jsonl(&input, tokenizer)?
        } else {
            Self::from_lines(&input, tokenizer)
        };

        if corpus.is_empty() {
            anyhow::bail!("No documents found in {}", path.display());
        }

        info!(
            path = %path.display(),
            documents = corpus.len(),
            vocabulary = corpus.vocabulary_size(),
            "Loaded corpus"
        );
        Ok(corpus)
    }

    fn push(&mut self, id: String, text: String, tokens: Vec<String>) {
        self.ids.push(id);
        self.texts.push(text);
        self.documents.push(tokens);
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Number of distinct tokens across all documents.
    pub fn vocabulary_size(&self) -> usize {
        self.documents
            .iter()
            .flatten()
            .map(String::as_str)
            .collect::<HashSet<&str>>()
            .len()
    }
}
