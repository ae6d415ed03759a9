//! Error types for the enhancement pipeline.

/// Top-level error type for the text-enhancement and audio-assembly system.
///
/// Text stages never fail on malformed input — unmatched patterns pass
/// through verbatim — so their variants only surface programmer or
/// configuration mistakes. Audio stages are stricter: a malformed buffer
/// cannot be silently patched.
#[derive(Debug, thiserror::Error)]
pub enum EnhanceError {
    /// Region key outside the supported enumeration.
    #[error("unsupported region: {0}")]
    Region(String),

    /// Configuration error (bad stage parameters, missing reference data).
    #[error("config error: {0}")]
    Config(String),

    /// Audio buffer or audio-format error.
    #[error("audio error: {0}")]
    Audio(String),

    /// Synthesis failed for one chunk; the whole request is aborted since
    /// crossfading needs every chunk.
    #[error("synthesis failed on chunk {chunk}: {message}")]
    Synthesis { chunk: usize, message: String },

    /// Transcription sidecar could not be read or parsed.
    #[error("sidecar error: {0}")]
    Sidecar(String),

    /// The request was cancelled; in-flight chunks were discarded.
    #[error("request cancelled")]
    Cancelled,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, EnhanceError>;
