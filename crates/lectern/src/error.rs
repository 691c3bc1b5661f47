//! Error types for Lectern.

use std::path::PathBuf;

use lectern_core::NodeId;
use lectern_speech::SpeechError;

/// Result type alias for reader operations.
pub type Result<T> = std::result::Result<T, ReaderError>;

/// Errors raised by the document arena and the markup loader.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    /// The node is not (or no longer) part of the document.
    #[error("Node {0:?} is not in the document")]
    InvalidNode(NodeId),

    /// The operation needs an element but got a text node.
    #[error("Node {0:?} is not an element")]
    NotAnElement(NodeId),

    /// The document root cannot be removed.
    #[error("The document root cannot be removed")]
    RootRemoval,

    /// The markup could not be parsed.
    #[error("Malformed markup at byte {position}: {message}")]
    Markup { position: u64, message: String },
}

impl DocumentError {
    /// Create a markup error.
    pub fn markup(position: u64, message: impl Into<String>) -> Self {
        Self::Markup {
            position,
            message: message.into(),
        }
    }
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid TOML or does not match the schema.
    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigError {
    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a value error.
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Umbrella error for [`ReaderSession`](crate::ReaderSession) operations.
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Speech(#[from] SpeechError),

    /// Activation was requested while no block is hovered.
    #[error("Nothing is hovered")]
    NothingHovered,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = DocumentError::markup(12, "unexpected end");
        assert_eq!(err.to_string(), "Malformed markup at byte 12: unexpected end");

        let err = ConfigError::invalid_value("overlay.offset_x", "must be finite");
        assert_eq!(
            err.to_string(),
            "Invalid value for 'overlay.offset_x': must be finite"
        );
    }

    #[test]
    fn test_reader_error_is_transparent() {
        let err: ReaderError = SpeechError::EmptyText.into();
        assert_eq!(err.to_string(), SpeechError::EmptyText.to_string());
    }
}
