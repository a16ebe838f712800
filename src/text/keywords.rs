// Text Cleaning - Keyword Correction
//
// User-registered domain terms get two uses: as a recognition hint passed to
// the transcription capability, and as a post-hoc correction pass that
// rewrites every case-insensitive occurrence to the registered spelling.

use log::warn;
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

/// A user-registered domain term.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Keyword {
    pub id: i64,
    pub word: String,
}

/// Ordered keyword collection, unique by case-insensitive word.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeywordSet {
    keywords: Vec<Keyword>,
    #[serde(skip)]
    next_id: i64,
}

impl KeywordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_keywords(keywords: Vec<Keyword>) -> Self {
        let next_id = keywords.iter().map(|k| k.id).max().unwrap_or(0) + 1;
        Self { keywords, next_id }
    }

    /// Register a keyword. Returns None when an equivalent word (ignoring
    /// case) is already present or the word is blank.
    pub fn add(&mut self, word: &str) -> Option<&Keyword> {
        let word = word.trim();
        if word.is_empty() {
            return None;
        }
        let lower = word.to_lowercase();
        if self.keywords.iter().any(|k| k.word.to_lowercase() == lower) {
            return None;
        }

        self.next_id = self.next_id.max(1);
        let keyword = Keyword {
            id: self.next_id,
            word: word.to_string(),
        };
        self.next_id += 1;
        self.keywords.push(keyword);
        self.keywords.last()
    }

    pub fn remove(&mut self, id: i64) -> bool {
        let before = self.keywords.len();
        self.keywords.retain(|k| k.id != id);
        self.keywords.len() != before
    }

    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Free-text hint handed to the transcription capability.
    pub fn prompt(&self) -> Option<String> {
        if self.keywords.is_empty() {
            return None;
        }
        Some(
            self.keywords
                .iter()
                .map(|k| k.word.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}

/// Rewrite every case-insensitive occurrence of each keyword to its
/// registered casing, in registration order.
///
/// Keywords are literal strings (regex metacharacters escaped) and may match
/// inside a larger word. Later keywords can re-touch text already rewritten
/// by earlier ones; registration order is the only precedence rule.
pub fn apply_keywords(text: &str, keywords: &KeywordSet) -> String {
    let mut result = text.to_string();
    for keyword in keywords.keywords() {
        let pattern = regex::escape(&keyword.word);
        let re = match RegexBuilder::new(&pattern).case_insensitive(true).build() {
            Ok(re) => re,
            Err(e) => {
                warn!("Skipping keyword '{}': {}", keyword.word, e);
                continue;
            }
        };
        result = re
            .replace_all(&result, regex::NoExpand(&keyword.word))
            .into_owned();
    }
    result
}
