//! Error types for Lectern core systems.

use std::fmt;

/// The main error type for Lectern core operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LecternError {
    /// Timer-related error.
    Timer(TimerError),
}

impl fmt::Display for LecternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timer(err) => write!(f, "Timer error: {err}"),
        }
    }
}

impl std::error::Error for LecternError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Timer(err) => Some(err),
        }
    }
}

/// Timer-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// The requested deadline cannot be represented by the clock.
    DeadlineOverflow,
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeadlineOverflow => write!(f, "Timer deadline overflows the clock"),
        }
    }
}

impl std::error::Error for TimerError {}

impl From<TimerError> for LecternError {
    fn from(err: TimerError) -> Self {
        Self::Timer(err)
    }
}

/// A specialized Result type for Lectern core operations.
pub type Result<T> = std::result::Result<T, LecternError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_display_and_source() {
        let err: LecternError = TimerError::DeadlineOverflow.into();
        assert_eq!(err.to_string(), "Timer error: Timer deadline overflows the clock");
        assert!(err.source().is_some());
    }
}
