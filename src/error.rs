//! Error taxonomy for the synthesis pipeline.
//!
//! Construction-time failures (`Config`, `Io`, `PhonemizerInit`) abort
//! pipeline setup entirely — no partially-usable pipeline is ever returned.
//! Per-call failures (`PhonemizerInference`, `Synthesis`, `ChunkSynthesis`)
//! propagate to the immediate caller of that synthesis step. The pipeline
//! never retries; retry policy belongs to the caller.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TtsError>;

#[derive(Debug, Error)]
pub enum TtsError {
    /// Missing or malformed startup configuration. Fatal.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Asset or resource file could not be read.
    #[error("cannot read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The phoneme model or its ORT session could not be created.
    #[error("phonemizer initialization failed")]
    PhonemizerInit(#[source] ort::Error),

    /// A single-word phoneme inference call failed. Aborts the whole
    /// sentence-level phonemization that requested it.
    #[error("phoneme inference failed for word {word:?}")]
    PhonemizerInference {
        word: String,
        #[source]
        source: Box<TtsError>,
    },

    /// The vocoder model or its ORT session could not be created.
    #[error("synthesizer initialization failed")]
    SynthesizerInit(#[source] ort::Error),

    /// A vocoder inference call failed.
    #[error("synthesis failed")]
    Synthesis(#[source] Box<TtsError>),

    /// Raw inference-engine invocation failure, wrapped into
    /// `PhonemizerInference` or `Synthesis` by the calling component.
    #[error("inference engine error")]
    Engine(#[from] ort::Error),

    /// One chunk of a long-form synthesis failed. Carries the chunk index so
    /// callers can report which part of the utterance was lost.
    #[error("synthesis failed for chunk {index}: {chunk:?}")]
    ChunkSynthesis {
        index: usize,
        chunk: String,
        #[source]
        source: Box<TtsError>,
    },

    /// A model returned a tensor whose shape does not match its contract.
    #[error("unexpected model output: {0}")]
    Output(String),

    /// WAV encoding failed.
    #[error("WAV encoding failed")]
    Wav(#[from] hound::Error),
}

impl TtsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TtsError::Io { path: path.into(), source }
    }
}
