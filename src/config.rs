//! Pipeline configuration — deserialised from a JSON document.
//!
//! The four tokenizer keys (`max_seq_len`, `lowercase`, `language_code_en`,
//! `end_token`) plus `language_code_de` and `pad_token` are required; their
//! absence is a fatal [`TtsError::Config`] at startup. Everything else has
//! defaults matching the reference deployment.

use std::{collections::HashMap, fs, path::Path};

use serde::Deserialize;

use crate::error::{Result, TtsError};
use crate::speaker::SpeakerMap;

/// Default noise / duration-noise / length scales of the vocoder.
/// These are model-specific training-time defaults; changing them without
/// retraining the paired model changes voice quality, not just speed.
pub const DEFAULT_SCALES: [f32; 3] = [0.667, 1.0, 0.8];

/// Sample rate of the reference vocoder. The pipeline never resamples.
pub const DEFAULT_SAMPLE_RATE: u32 = 22_050;

fn default_scales() -> [f32; 3] {
    DEFAULT_SCALES
}

fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}

/// Which producer turns text into the vocoder's id sequence.
///
/// The two paths yield the same tensor shape and are selected once at
/// pipeline construction — they are never mixed within one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenSource {
    /// Character-level ids straight from the vocabulary table.
    Graphemes,
    /// Per-word phoneme inference followed by sequence combination.
    #[default]
    Phonemes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Maximum raw token length of a single word fed to the phoneme model.
    pub max_seq_len: usize,

    /// Lowercase words before character lookup.
    pub lowercase: bool,

    /// Vocabulary key of the English language control token.
    pub language_code_en: String,

    /// Vocabulary key of the German language control token.
    pub language_code_de: String,

    /// Vocabulary key of the padding token (always id 0).
    pub pad_token: String,

    /// Vocabulary key of the end-of-word control token.
    pub end_token: String,

    /// Abbreviation → spoken expansion table applied during text cleaning.
    /// Keys match as `\b<abbr>\.` case-insensitively.
    #[serde(default)]
    pub abbreviations: HashMap<String, String>,

    /// Vocoder noise / duration / length scales.
    #[serde(default = "default_scales")]
    pub scales: [f32; 3],

    /// Output sample rate in Hz.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Logical speaker id → model embedding id table.
    #[serde(default)]
    pub speakers: SpeakerMap,

    /// Id producer used by the synthesizer.
    #[serde(default)]
    pub token_source: TokenSource,
}

impl PipelineConfig {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| TtsError::io(path, e))?;
        let config: PipelineConfig = serde_json::from_slice(&bytes)
            .map_err(|e| TtsError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_seq_len == 0 {
            return Err(TtsError::Config("max_seq_len must be positive".into()));
        }
        for (name, token) in [
            ("language_code_en", &self.language_code_en),
            ("language_code_de", &self.language_code_de),
            ("pad_token", &self.pad_token),
            ("end_token", &self.end_token),
        ] {
            if token.is_empty() {
                return Err(TtsError::Config(format!("{name} must not be empty")));
            }
        }
        if self.sample_rate == 0 {
            return Err(TtsError::Config("sample_rate must be positive".into()));
        }
        Ok(())
    }
}
