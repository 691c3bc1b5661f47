//! The speech engine seam.
//!
//! Lectern never synthesizes speech itself. A host plugs in an engine (a
//! platform speech API, a remote service, a test double) by implementing
//! [`SpeechEngine`].

use std::fmt;
use std::sync::Arc;

use lectern_core::Signal;

use crate::error::Result;

/// Identifies one utterance handed to an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtteranceId(u64);

impl UtteranceId {
    /// Create an utterance ID from a raw value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw value of this ID.
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "utterance#{}", self.0)
    }
}

/// A piece of text to be spoken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    /// The ID the engine reports back on completion.
    pub id: UtteranceId,
    /// The text to speak.
    pub text: String,
}

/// An external text-to-speech engine.
///
/// `speak` starts speaking and returns immediately; the engine later emits
/// the utterance's ID exactly once on [`completed`](Self::completed). An
/// engine may emit completions for utterances nobody is waiting on any more,
/// and listeners must tolerate that.
pub trait SpeechEngine: Send + Sync {
    /// Start speaking an utterance.
    ///
    /// An error means the utterance was never started and no completion will
    /// be emitted for it.
    fn speak(&self, utterance: &Utterance) -> Result<()>;

    /// Stop whatever is being spoken.
    fn cancel(&self) {}

    /// Signal emitted with the ID of each utterance that finished.
    fn completed(&self) -> &Arc<Signal<UtteranceId>>;
}
