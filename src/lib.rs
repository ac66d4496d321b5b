//! # vits-tts
//!
//! Lightweight ONNX-based VITS text-to-speech pipeline.
//!
//! Text is cleaned (ASCII fold, abbreviation expansion, number spell-out),
//! converted to an integer id sequence — either directly from characters or
//! through a neural phonemizer with per-word caching — and fed to a VITS
//! vocoder that produces a 22.05 kHz mono float waveform. Long texts are
//! split into sentence chunks, synthesized independently, and concatenated.
//!
//! ## Quick start
//!
//! ```no_run
//! use std::path::Path;
//! use vits_tts::TextToSpeech;
//!
//! let tts = TextToSpeech::load(
//!     Path::new("assets/tokenizer_config.json"),
//!     Path::new("assets/phonemizer_model.onnx"),
//!     Path::new("assets/vits_model.onnx"),
//! ).unwrap();
//!
//! // Speaker 0–4 selects a voice; anything else uses the default voice.
//! let audio = tts.synthesize_long("Hello from Rust! How are you?", 0).unwrap();
//! tts.synthesize_to_file("Hello again.", Path::new("hello.wav"), 0).unwrap();
//! # let _ = audio;
//! ```
//!
//! ## Pipeline
//! 1. **Text cleaning** — accents folded to ASCII, abbreviations and
//!    numbers expanded to spoken words.
//! 2. **Chunking** — long texts split at sentence-ending punctuation.
//! 3. **Id sequence** — per-word phoneme inference (cached) with separator
//!    insertion, de-duplication and boundary interleaving; or plain
//!    character ids, depending on configuration.
//! 4. **VITS inference** — model takes `(input, input_lengths, scales,
//!    sid)`, outputs the waveform.
//! 5. **Concat** — per-chunk audio concatenated into a single waveform.

pub mod audio;
pub mod config;
pub mod error;
pub mod model;
pub mod phonemize;
pub mod pipeline;
pub mod preprocess;
pub mod speaker;
pub mod tokenize;
pub mod vocab;

// ─── Re-exports for convenience ─────────────────────────────────────────────

pub use config::{PipelineConfig, TokenSource, DEFAULT_SAMPLE_RATE, DEFAULT_SCALES};
pub use error::{Result, TtsError};
pub use pipeline::TextToSpeech;
pub use speaker::SpeakerMap;
