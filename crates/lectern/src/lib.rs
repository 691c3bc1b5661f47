//! Lectern - hover-to-read for rendered documents.
//!
//! Lectern finds the readable blocks of a document, tracks the pointer over
//! them, and places a "read aloud" control next to the hovered block. Speech
//! itself comes from a host-provided engine.
//!
//! This is the main crate; it re-exports the core and speech APIs.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Instant;
//! use lectern::speech::{Activation, SpeechEngine, Utterance, UtteranceId};
//! use lectern::{DocumentTree, PointerEvent, ReaderConfig, ReaderSession, Signal};
//!
//! struct Engine {
//!     completed: Arc<Signal<UtteranceId>>,
//! }
//!
//! impl SpeechEngine for Engine {
//!     fn speak(&self, utterance: &Utterance) -> lectern::speech::Result<()> {
//!         println!("speaking: {}", utterance.text);
//!         Ok(())
//!     }
//!
//!     fn completed(&self) -> &Arc<Signal<UtteranceId>> {
//!         &self.completed
//!     }
//! }
//!
//! let doc = DocumentTree::from_markup("<article><h1>Title</h1><p>Hello world</p></article>")?;
//! let engine = Arc::new(Engine { completed: Arc::new(Signal::new()) });
//! let mut session = ReaderSession::new(&doc, ReaderConfig::default(), engine)?;
//!
//! let p = session.readable_set().nodes()[0];
//! session.dispatch(&doc, &PointerEvent::Enter { node: p }, Instant::now());
//! assert!(session.overlay_view().is_visible());
//! assert!(matches!(session.activate(&doc)?, Activation::Started(_)));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod bounds;
pub mod config;
pub mod debug;
pub mod document;
mod error;
pub mod geometry;
pub mod hover;
mod markup;
pub mod overlay;
pub mod selector;
pub mod session;

pub use lectern_core::logging;
pub use lectern_core::{ConnectionGuard, ConnectionId, NodeId, PerfSpan, Signal};

/// Speech playback.
pub mod speech {
    pub use lectern_speech::*;
}

pub use bounds::{LineHeight, NodeBounds, first_line_height};
pub use config::ReaderConfig;
pub use document::{Category, ComputedStyle, DocumentTree, ElementData, NodeKind};
pub use error::{ConfigError, DocumentError, ReaderError, Result};
pub use geometry::{Point, Rect, Size};
pub use hover::{
    HighlightChange, HoverConfig, HoverCoordinate, HoverState, HoverTracker, PointerEvent,
    RelatedTarget,
};
pub use overlay::{OverlayPlacement, OverlayView, place};
pub use selector::{IgnoreSet, ReadableSet, ReadableSetId, select, select_document};
pub use session::ReaderSession;
