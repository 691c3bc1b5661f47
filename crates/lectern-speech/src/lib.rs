//! Speech playback for Lectern.
//!
//! Lectern does not synthesize speech. Hosts provide a [`SpeechEngine`] and
//! Lectern drives it through a [`PlaybackGate`], which keeps at most one
//! utterance in flight and resets when the engine reports completion.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use lectern_core::{NodeId, Signal};
//! use lectern_speech::{Activation, PlaybackGate, SpeechEngine, Utterance, UtteranceId};
//!
//! struct Silent {
//!     completed: Arc<Signal<UtteranceId>>,
//! }
//!
//! impl SpeechEngine for Silent {
//!     fn speak(&self, _utterance: &Utterance) -> lectern_speech::Result<()> {
//!         Ok(())
//!     }
//!
//!     fn completed(&self) -> &Arc<Signal<UtteranceId>> {
//!         &self.completed
//!     }
//! }
//!
//! let engine = Arc::new(Silent { completed: Arc::new(Signal::new()) });
//! let gate = PlaybackGate::new(engine.clone());
//! let node = NodeId::from_raw(1 << 32);
//!
//! let Activation::Started(id) = gate.activate(node, "Hello")? else {
//!     unreachable!();
//! };
//! assert_eq!(gate.activate(node, "Hello")?, Activation::Busy);
//!
//! engine.completed.emit(id);
//! assert!(!gate.is_speaking());
//! # Ok::<(), lectern_speech::SpeechError>(())
//! ```

mod engine;
mod error;
mod gate;

pub use engine::{SpeechEngine, Utterance, UtteranceId};
pub use error::{Result, SpeechError};
pub use gate::{Activation, PlaybackGate, PlaybackState};
