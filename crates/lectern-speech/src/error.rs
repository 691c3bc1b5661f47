//! Error types for speech playback.

/// Speech-specific errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpeechError {
    /// The engine refused the utterance synchronously.
    #[error("Speech engine rejected the utterance: {0}")]
    Rejected(String),
    /// No speech backend is available.
    #[error("Speech engine unavailable: {0}")]
    Unavailable(String),
    /// There is no text to speak.
    #[error("Nothing to speak: text is empty")]
    EmptyText,
}

/// A specialized Result type for speech operations.
pub type Result<T> = std::result::Result<T, SpeechError>;
