//! Text cleaning applied before either tokenization path.
//!
//! Raw input goes through four deterministic steps: Unicode NFD fold to
//! ASCII, optional lowercasing, abbreviation expansion from the configured
//! table, and integer spell-out (`12` → `twelve`), with whitespace collapsed
//! at the end. The output contains only characters the vocabulary can map
//! plus punctuation, which both tokenization paths silently skip.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::error::{Result, TtsError};

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d+\b").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

// ─────────────────────────────────────────────────────────────────────────────
// Number → words
// ─────────────────────────────────────────────────────────────────────────────

const ONES: &[&str] = &[
    "", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
    "ten", "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen",
    "seventeen", "eighteen", "nineteen",
];
const TENS: &[&str] =
    &["", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety"];
const SCALE: &[&str] = &["", "thousand", "million", "billion", "trillion"];

fn three_digits_to_words(n: u64) -> String {
    if n == 0 {
        return String::new();
    }
    let mut parts = Vec::new();
    let hundreds = n / 100;
    let remainder = n % 100;
    if hundreds > 0 {
        parts.push(format!("{} hundred", ONES[hundreds as usize]));
    }
    if remainder < 20 {
        if remainder > 0 {
            parts.push(ONES[remainder as usize].to_string());
        }
    } else {
        let tens_word = TENS[(remainder / 10) as usize];
        let ones_word = ONES[(remainder % 10) as usize];
        if ones_word.is_empty() {
            parts.push(tens_word.to_string());
        } else {
            parts.push(format!("{}-{}", tens_word, ones_word));
        }
    }
    parts.join(" ")
}

/// Spell out a non-negative integer in English words.
pub fn number_to_words(n: u64) -> String {
    if n == 0 {
        return "zero".to_string();
    }
    let mut parts = Vec::new();
    let mut remaining = n;
    for &scale in SCALE {
        let chunk = remaining % 1000;
        if chunk > 0 {
            let chunk_words = three_digits_to_words(chunk);
            if scale.is_empty() {
                parts.push(chunk_words);
            } else {
                parts.push(format!("{} {}", chunk_words, scale));
            }
        }
        remaining /= 1000;
        if remaining == 0 {
            break;
        }
    }
    parts.reverse();
    parts.join(" ")
}

// ─────────────────────────────────────────────────────────────────────────────
// Cleaner
// ─────────────────────────────────────────────────────────────────────────────

/// Deterministic text cleaner; all state fixed at construction.
#[derive(Debug)]
pub struct TextCleaner {
    lowercase: bool,
    abbreviations: Vec<(Regex, String)>,
}

impl TextCleaner {
    /// Build a cleaner from the abbreviation table.
    /// Each key matches as `\b<key>\.` case-insensitively.
    pub fn new(lowercase: bool, abbreviations: &HashMap<String, String>) -> Result<Self> {
        let mut compiled = Vec::with_capacity(abbreviations.len());
        for (abbr, expansion) in abbreviations {
            let pattern = format!(r"(?i)\b{}\.", regex::escape(abbr));
            let re = Regex::new(&pattern)
                .map_err(|e| TtsError::Config(format!("invalid abbreviation {abbr:?}: {e}")))?;
            compiled.push((re, expansion.clone()));
        }
        Ok(Self { lowercase, abbreviations: compiled })
    }

    /// NFD-decompose and keep only ASCII, so `café` becomes `cafe`.
    fn to_ascii(text: &str) -> String {
        text.nfd().filter(char::is_ascii).collect()
    }

    fn expand_abbreviations(&self, text: &str) -> String {
        let mut result = text.to_string();
        for (re, expansion) in &self.abbreviations {
            result = re.replace_all(&result, expansion.as_str()).into_owned();
        }
        result
    }

    fn spell_out_numbers(text: &str) -> String {
        NUMBER_RE
            .replace_all(text, |caps: &regex::Captures| {
                match caps[0].parse::<u64>() {
                    Ok(n) => number_to_words(n),
                    // Too many digits for u64: leave the literal in place.
                    Err(_) => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    /// Run the full cleaning pipeline. Pure: same input, same output.
    pub fn clean(&self, text: &str) -> String {
        let mut text = Self::to_ascii(text);
        if self.lowercase {
            text = text.to_lowercase();
        }
        let text = self.expand_abbreviations(&text);
        let text = Self::spell_out_numbers(&text);
        WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
    }
}
