//! A reader session: selector, tracker, overlay and playback wired together.
//!
//! [`ReaderSession`] is what a host creates once per page. It selects the
//! readable set, binds a [`HoverTracker`] to it, owns the [`PlaybackGate`],
//! and answers the two questions the render layer asks: where is the overlay
//! and is it enabled.

use std::sync::Arc;
use std::time::Instant;

use lectern_speech::{Activation, PlaybackGate, SpeechEngine};

use crate::config::ReaderConfig;
use crate::document::DocumentTree;
use crate::error::{ReaderError, Result};
use crate::hover::{HoverTracker, PointerEvent, RelatedTarget};
use crate::overlay::OverlayView;
use crate::selector::{IgnoreSet, ReadableSet, select_document};

const TARGET: &str = "lectern::session";

/// One page's worth of hover-to-read state.
pub struct ReaderSession<E: SpeechEngine> {
    config: ReaderConfig,
    ignore: IgnoreSet,
    tracker: HoverTracker,
    gate: PlaybackGate<E>,
}

impl<E: SpeechEngine> ReaderSession<E> {
    /// Validate `config`, select the readable set of `doc` and bind to it.
    pub fn new(doc: &DocumentTree, config: ReaderConfig, engine: Arc<E>) -> Result<Self> {
        config.validate()?;
        let ignore = config.ignore_set();
        let set = select_document(doc, &ignore);
        tracing::info!(target: TARGET, readable = set.len(), "reader session started");

        Ok(Self {
            tracker: HoverTracker::new(set, config.hover_config()),
            gate: PlaybackGate::new(engine),
            ignore,
            config,
        })
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn readable_set(&self) -> &ReadableSet {
        self.tracker.readable_set()
    }

    pub fn tracker(&self) -> &HoverTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut HoverTracker {
        &mut self.tracker
    }

    pub fn gate(&self) -> &PlaybackGate<E> {
        &self.gate
    }

    /// Class name the host applies to the node named by each
    /// [`HighlightChange::Marked`](crate::hover::HighlightChange::Marked).
    pub fn highlight_class(&self) -> &str {
        &self.config.highlight.class_name
    }

    /// Select again after the document changed.
    ///
    /// The tracker is only rebound when membership actually changed; returns
    /// whether it was.
    pub fn reparse(&mut self, doc: &DocumentTree) -> bool {
        let set = select_document(doc, &self.ignore);
        if set.nodes() == self.tracker.readable_set().nodes() {
            tracing::trace!(target: TARGET, "readable set unchanged");
            return false;
        }
        self.tracker.rebind(set)
    }

    /// Classify a raw related node using the configured overlay marker.
    pub fn resolve_related(
        &self,
        doc: &DocumentTree,
        target: Option<lectern_core::NodeId>,
    ) -> RelatedTarget {
        RelatedTarget::resolve(doc, target, &self.config.overlay.marker)
    }

    /// Feed a pointer event to the tracker.
    pub fn dispatch(&mut self, doc: &DocumentTree, event: &PointerEvent, now: Instant) {
        self.tracker.dispatch(doc, event, now);
    }

    /// Fire due timers.
    pub fn poll(&mut self, now: Instant) {
        self.tracker.poll(now);
    }

    /// Speak the hovered block.
    ///
    /// A hovered block that has since left the document is dropped and
    /// reported as [`ReaderError::NothingHovered`].
    pub fn activate(&mut self, doc: &DocumentTree) -> Result<Activation> {
        self.tracker.drop_stale(doc);
        let node = self
            .tracker
            .state()
            .node()
            .ok_or(ReaderError::NothingHovered)?;
        let text = doc.trimmed_text(node);
        Ok(self.gate.activate(node, &text)?)
    }

    /// Stop speaking.
    pub fn stop(&self) -> bool {
        self.gate.stop()
    }

    /// What the render collaborator should draw.
    pub fn overlay_view(&self) -> OverlayView {
        OverlayView::from_states(
            &self.tracker.state(),
            &self.gate.state(),
            self.config.overlay.offset_x,
        )
    }
}

impl<E: SpeechEngine> std::fmt::Debug for ReaderSession<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaderSession")
            .field("tracker", &self.tracker)
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}
