// Text Cleaning - Hallucination Filter
//
// Speech models fed silence or noise produce fluent garbage: looped phrases,
// subtitle boilerplate, filler sounds. No single heuristic separates a
// legitimate short utterance from hallucinated filler, so this filter chains
// cheap structural checks in a fixed order; any stage may reject the whole
// text by returning an empty string.
//
// Repetition detection is done with explicit window scans and counters, not
// backreference regexes. The pipeline is a pure function of its input.

use std::collections::HashMap;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::PipelineConfig;

/// Sentence-terminal punctuation, fullwidth and halfwidth.
const TERMINATORS: [char; 7] = ['。', '．', '.', '!', '！', '?', '？'];

/// Runs of >=4 digit/dot characters are spurious numeric noise.
static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\d.]{4,}").unwrap());

/// Runs of >=2 whitespace characters collapse to one space.
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());

/// 1-2 character filler sounds ("あー", "んー").
static FILLER_SOUND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ぁ-んァ-ンー]{1,2}$").unwrap());

/// Bracketed annotations such as "(laughs)" or "【音楽】".
static BRACKETED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[(\[（【〔].*[)\]）】〕]$").unwrap());

/// Nothing but punctuation, symbols and whitespace.
static PUNCT_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\p{P}\p{S}\s]+$").unwrap());

fn is_terminator(c: char) -> bool {
    TERMINATORS.contains(&c)
}

/// Multi-stage sanitizer for raw model output.
#[derive(Debug, Clone)]
pub struct TranscriptCleaner {
    blacklist: Vec<String>,
    backchannels: Vec<String>,
    min_chars: usize,
}

impl Default for TranscriptCleaner {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

impl TranscriptCleaner {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            blacklist: config
                .blacklist_phrases
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
            backchannels: config
                .backchannel_words
                .iter()
                .map(|w| w.to_lowercase())
                .collect(),
            min_chars: config.min_text_chars,
        }
    }

    /// Run the full pipeline. Empty string means the text was rejected.
    pub fn clean(&self, raw_text: &str) -> String {
        let text = raw_text.trim();
        if text.is_empty() {
            return String::new();
        }

        // Stage 1: whole-text loop rejection.
        if has_dominant_loop(text) || has_dominant_word(text) {
            debug!("Rejecting looped transcript: '{}'", text);
            return String::new();
        }

        // Stage 2: literal noise collapsing.
        let text = collapse_noise(text);

        // Stage 3: blacklist phrase removal.
        let text = self.strip_blacklisted_sentences(&text);
        if self.matches_blacklist_alone(&text) {
            debug!("Rejecting bare boilerplate transcript: '{}'", text);
            return String::new();
        }

        // Stage 4: mild repetition squashing.
        let text = squash_repeated_substrings(&text);
        let text = squash_repeated_tokens(&text);

        // Stage 5: short-noise pattern rejection.
        if self.is_short_noise(text.trim()) {
            debug!("Rejecting short-noise transcript: '{}'", text);
            return String::new();
        }

        // Stage 6: final trim and length floor.
        self.finalize(&text)
    }

    /// Drop every sentence containing a blacklisted phrase, keeping each
    /// surviving sentence's terminator.
    fn strip_blacklisted_sentences(&self, text: &str) -> String {
        let lower = text.to_lowercase();
        if !self.blacklist.iter().any(|p| lower.contains(p)) {
            return text.to_string();
        }

        let mut result = String::new();
        for sentence in split_sentences(text) {
            let sentence_lower = sentence.to_lowercase();
            if self.blacklist.iter().any(|p| sentence_lower.contains(p)) {
                debug!("Dropping blacklisted sentence: '{}'", sentence.trim());
                continue;
            }
            result.push_str(&sentence);
        }

        result
            .trim_matches(|c: char| c.is_whitespace())
            .trim_start_matches(is_terminator)
            .to_string()
    }

    /// Whole remaining text equal to a blacklist phrase alone, ignoring case
    /// and trailing punctuation/whitespace.
    fn matches_blacklist_alone(&self, text: &str) -> bool {
        let normalized = text
            .trim()
            .trim_end_matches(|c: char| c.is_whitespace() || unicode_punct(c))
            .to_lowercase();
        if normalized.is_empty() {
            return false;
        }
        self.blacklist.iter().any(|p| *p == normalized)
    }

    fn is_short_noise(&self, text: &str) -> bool {
        if text.is_empty() {
            return true;
        }
        if FILLER_SOUND.is_match(text) || BRACKETED.is_match(text) || PUNCT_ONLY.is_match(text) {
            return true;
        }

        let normalized = text
            .trim_end_matches(|c: char| c.is_whitespace() || unicode_punct(c))
            .to_lowercase();
        self.backchannels.iter().any(|w| *w == normalized)
    }

    /// Strip leading punctuation/whitespace and trailing whitespace and
    /// non-terminal punctuation; reject below the length floor. Sentence
    /// terminators are kept on output, but do not count toward the floor.
    fn finalize(&self, text: &str) -> String {
        let text = text
            .trim_start_matches(|c: char| c.is_whitespace() || unicode_punct(c))
            .trim_end_matches(|c: char| {
                c.is_whitespace() || (unicode_punct(c) && !is_terminator(c))
            });

        let core_len = text.chars().filter(|&c| !is_terminator(c)).count();
        if core_len < self.min_chars {
            return String::new();
        }
        text.to_string()
    }
}

/// Split text into sentences, each carrying its trailing terminator.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        current.push(c);
        if is_terminator(c) {
            sentences.push(std::mem::take(&mut current));
        }
    }
    if !current.trim().is_empty() {
        sentences.push(current);
    }
    sentences
}

/// A contiguous substring of 3-20 characters repeated >=3 times consecutively
/// whose matched span covers more than half the text.
fn has_dominant_loop(text: &str) -> bool {
    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();
    if total < 9 {
        return false;
    }

    for pat_len in 3..=20usize.min(total / 3) {
        for start in 0..=(total - pat_len * 3) {
            let mut reps = 1;
            while start + (reps + 1) * pat_len <= total
                && chars[start + reps * pat_len..start + (reps + 1) * pat_len]
                    == chars[start..start + pat_len]
            {
                reps += 1;
            }
            if reps >= 3 && reps * pat_len * 2 > total {
                return true;
            }
        }
    }
    false
}

/// A single word occurring >=3 times and accounting for >=70% of all tokens.
fn has_dominant_word(text: &str) -> bool {
    let words: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect();
    if words.is_empty() {
        return false;
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for word in &words {
        *counts.entry(word.as_str()).or_insert(0) += 1;
    }

    let total = words.len();
    counts
        .values()
        .any(|&count| count >= 3 && count * 10 >= total * 7)
}

/// Delete digit/dot runs, collapse identical terminator runs, collapse
/// whitespace runs.
fn collapse_noise(text: &str) -> String {
    let text = DIGIT_RUN.replace_all(text, "");

    let mut collapsed = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    for c in text.chars() {
        if is_terminator(c) && prev == Some(c) {
            continue;
        }
        collapsed.push(c);
        prev = Some(c);
    }

    WHITESPACE_RUN.replace_all(&collapsed, " ").to_string()
}

/// Collapse any substring of 2-15 characters repeated >=3 times consecutively
/// down to a single occurrence.
fn squash_repeated_substrings(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();
    let mut result = String::with_capacity(text.len());
    let mut i = 0;

    while i < total {
        let mut advanced = false;
        for pat_len in 2..=15usize.min((total - i) / 3) {
            let mut reps = 1;
            while i + (reps + 1) * pat_len <= total
                && chars[i + reps * pat_len..i + (reps + 1) * pat_len]
                    == chars[i..i + pat_len]
            {
                reps += 1;
            }
            if reps >= 3 {
                result.extend(&chars[i..i + pat_len]);
                i += reps * pat_len;
                advanced = true;
                break;
            }
        }
        if !advanced {
            result.push(chars[i]);
            i += 1;
        }
    }
    result
}

/// Collapse a token repeated >=3 times consecutively down to one occurrence.
/// Tokens are separated by whitespace or commas; only the collapsed span is
/// rewritten, separators elsewhere in the text stay as they are.
fn squash_repeated_tokens(text: &str) -> String {
    let is_separator = |c: char| c.is_whitespace() || c == ',' || c == '、';

    // Byte spans of the non-separator tokens.
    let mut spans: Vec<(usize, usize)> = Vec::new();
    let mut start: Option<usize> = None;
    for (idx, c) in text.char_indices() {
        if is_separator(c) {
            if let Some(s) = start.take() {
                spans.push((s, idx));
            }
        } else if start.is_none() {
            start = Some(idx);
        }
    }
    if let Some(s) = start {
        spans.push((s, text.len()));
    }
    if spans.len() < 3 {
        return text.to_string();
    }

    let mut result = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut i = 0;
    while i < spans.len() {
        let (first_start, first_end) = spans[i];
        let token = &text[first_start..first_end];
        let mut reps = 1;
        while i + reps < spans.len() {
            let (s, e) = spans[i + reps];
            if &text[s..e] != token {
                break;
            }
            reps += 1;
        }
        if reps >= 3 {
            // Keep the text up to and including the first occurrence, then
            // skip to the end of the run.
            result.push_str(&text[cursor..first_end]);
            cursor = spans[i + reps - 1].1;
        }
        i += reps;
    }
    result.push_str(&text[cursor..]);
    result
}

/// ASCII punctuation plus the common CJK marks.
fn unicode_punct(c: char) -> bool {
    c.is_ascii_punctuation()
        || matches!(c,
            '、' | '。' | '，' | '．' | '！' | '？' | '・' | '「' | '」' | '『' | '』' | '（'
                | '）' | '【' | '】' | '〔' | '〕' | '…' | '‥' | '〜' | '：' | '；')
}
