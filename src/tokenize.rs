//! Grapheme tokenizer — the direct text → vocoder-id path.
//!
//! Maps each character of cleaned text to its vocabulary id; characters
//! outside the table (punctuation, digits left by the cleaner) are silently
//! skipped. This path feeds the vocoder without any phoneme inference and is
//! a pure function of the input text and the fixed vocabulary.

use std::sync::Arc;

use crate::vocab::Vocab;

#[derive(Debug, Clone)]
pub struct Tokenizer {
    vocab: Arc<Vocab>,
}

impl Tokenizer {
    pub fn new(vocab: Arc<Vocab>) -> Self {
        Self { vocab }
    }

    /// Convert cleaned text to a vocabulary id sequence.
    pub fn text_to_ids(&self, text: &str) -> Vec<i64> {
        text.chars().filter_map(|c| self.vocab.char_id(c)).collect()
    }
}
