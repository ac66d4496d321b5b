//! Token vocabulary — the character/control-token → id table shared by the
//! grapheme tokenizer and the phonemizer.
//!
//! Insertion order defines the ids, so the layout is part of the model
//! contract: pad is always 0, the language codes take 1 and 2, the end token
//! takes 3, then `a–z`, `A–Z`, the German umlauts and `'`. Note that this
//! puts the end token on id 3 — the same value the phoneme models use as
//! their boundary class — and the second language code on id 2, the word
//! separator. The vocabulary and the control constants must stay in step.

use std::collections::HashMap;

use crate::config::PipelineConfig;
use crate::error::{Result, TtsError};

#[derive(Debug, Clone)]
pub struct Vocab {
    token_to_id: HashMap<String, i64>,
}

impl Vocab {
    /// Build the table from the configured control tokens.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let mut tokens: Vec<String> = vec![
            config.pad_token.clone(),
            config.language_code_en.clone(),
            config.language_code_de.clone(),
            config.end_token.clone(),
        ];
        tokens.extend(('a'..='z').map(String::from));
        tokens.extend(('A'..='Z').map(String::from));
        tokens.extend("äöüÄÖÜß".chars().map(String::from));
        tokens.push("'".to_string());
        Self::from_tokens(tokens)
    }

    /// Build a table from an explicit token list; ids follow list order.
    pub fn from_tokens(tokens: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut token_to_id = HashMap::new();
        for (id, token) in tokens.into_iter().enumerate() {
            if token_to_id.insert(token.clone(), id as i64).is_some() {
                return Err(TtsError::Config(format!(
                    "duplicate vocabulary token {token:?}"
                )));
            }
        }
        Ok(Self { token_to_id })
    }

    /// Id of a (possibly multi-character) control token.
    pub fn token_id(&self, token: &str) -> Option<i64> {
        self.token_to_id.get(token).copied()
    }

    /// Id of a single character, `None` for characters outside the table.
    pub fn char_id(&self, c: char) -> Option<i64> {
        let mut buf = [0u8; 4];
        self.token_to_id.get(c.encode_utf8(&mut buf) as &str).copied()
    }

    pub fn len(&self) -> usize {
        self.token_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.token_to_id.is_empty()
    }
}
