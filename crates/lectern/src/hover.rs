//! Hover tracking over the readable set.
//!
//! A [`HoverTracker`] turns pointer enter/leave events over readable blocks
//! (and over the floating overlay control) into a single active
//! [`HoverCoordinate`]. Leaving a block does not clear the hover at once: the
//! clear is debounced so the pointer can travel from the block to the overlay,
//! or on to the next block, without flicker.
//!
//! The tracker is single-threaded and never reads a clock. Every operation
//! that can start the debounce takes the current [`Instant`] from the host,
//! and pending clears only fire when the host calls [`HoverTracker::poll`].
//!
//! # Example
//!
//! ```
//! use std::time::{Duration, Instant};
//! use lectern::{DocumentTree, HoverConfig, HoverTracker, IgnoreSet, RelatedTarget};
//!
//! let doc = DocumentTree::from_markup("<p>one</p><p>two</p>")?;
//! let set = lectern::select_document(&doc, &IgnoreSet::default());
//! let (a, b) = (set.nodes()[0], set.nodes()[1]);
//!
//! let mut tracker = HoverTracker::new(set, HoverConfig::default());
//! let now = Instant::now();
//!
//! tracker.pointer_enter(&doc, a);
//! tracker.pointer_leave(&doc, a, RelatedTarget::None, now);
//! tracker.pointer_enter(&doc, b);
//! tracker.poll(now + Duration::from_millis(50));
//!
//! assert_eq!(tracker.state().node(), Some(b));
//! # Ok::<(), lectern::DocumentError>(())
//! ```

use std::collections::HashMap;
use std::time::{Duration, Instant};

use lectern_core::logging::span_names;
use lectern_core::{ConnectionId, NodeId, PerfSpan, Signal, TimerId, TimerManager};
use slotmap::{SlotMap, new_key_type};

use crate::bounds::NodeBounds;
use crate::document::DocumentTree;
use crate::selector::ReadableSet;

const TARGET: &str = "lectern::hover";

/// Default delay before a leave clears the hover.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(10);

new_key_type! {
    /// Identifies a per-node listener binding.
    pub struct ListenerId;
}

/// Tracker settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverConfig {
    /// Delay between a qualifying leave and the clear.
    pub debounce: Duration,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

/// Where the active block sits, captured when it was entered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverCoordinate {
    /// Top of the block in document coordinates.
    pub top: f32,
    /// Left of the block in document coordinates.
    pub left: f32,
    pub first_line_height: f32,
}

impl From<&NodeBounds> for HoverCoordinate {
    fn from(bounds: &NodeBounds) -> Self {
        Self {
            top: bounds.top(),
            left: bounds.left(),
            first_line_height: bounds.first_line_height,
        }
    }
}

/// Hover state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum HoverState {
    #[default]
    Idle,
    Active {
        node: NodeId,
        coordinate: HoverCoordinate,
    },
}

impl HoverState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    pub fn node(&self) -> Option<NodeId> {
        match self {
            Self::Idle => None,
            Self::Active { node, .. } => Some(*node),
        }
    }

    pub fn coordinate(&self) -> Option<HoverCoordinate> {
        match self {
            Self::Idle => None,
            Self::Active { coordinate, .. } => Some(*coordinate),
        }
    }
}

/// A change to the highlight slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightChange {
    /// The marker was removed from this node.
    Cleared(NodeId),
    /// The marker was put on this node.
    Marked(NodeId),
}

/// Where the pointer went when it left something.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelatedTarget {
    /// Outside the document, or unknown.
    #[default]
    None,
    /// The overlay control.
    Overlay,
    /// A document node.
    Node(NodeId),
}

impl RelatedTarget {
    /// Classify a raw related node.
    ///
    /// A node inside an element carrying `overlay_marker` is the overlay.
    pub fn resolve(doc: &DocumentTree, target: Option<NodeId>, overlay_marker: &str) -> Self {
        match target {
            None => Self::None,
            Some(node) if doc.closest_with_attribute(node, overlay_marker).is_some() => {
                Self::Overlay
            }
            Some(node) => Self::Node(node),
        }
    }
}

/// A pointer event routed through [`HoverTracker::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Enter { node: NodeId },
    Leave { node: NodeId, related: RelatedTarget },
    /// A window-level pointer-out.
    WindowOut { related: RelatedTarget },
    OverlayEnter,
    OverlayLeave { related: RelatedTarget },
}

/// Converts pointer events over a readable set into a single hover state.
pub struct HoverTracker {
    config: HoverConfig,
    set: ReadableSet,
    listeners: SlotMap<ListenerId, NodeId>,
    listener_by_node: HashMap<NodeId, ListenerId>,
    state: HoverState,
    highlight: Option<NodeId>,
    pending_clear: Option<TimerId>,
    timers: TimerManager,
    overlay_hovered: bool,
    state_changed: Signal<HoverState>,
    highlight_changed: Signal<HighlightChange>,
}

impl HoverTracker {
    /// Create an idle tracker bound to `set`.
    pub fn new(set: ReadableSet, config: HoverConfig) -> Self {
        let mut tracker = Self {
            config,
            set: ReadableSet::empty(),
            listeners: SlotMap::with_key(),
            listener_by_node: HashMap::new(),
            state: HoverState::Idle,
            highlight: None,
            pending_clear: None,
            timers: TimerManager::new(),
            overlay_hovered: false,
            state_changed: Signal::new(),
            highlight_changed: Signal::new(),
        };
        tracker.attach(set);
        tracker
    }

    pub fn config(&self) -> &HoverConfig {
        &self.config
    }

    /// The currently bound set.
    pub fn readable_set(&self) -> &ReadableSet {
        &self.set
    }

    pub fn state(&self) -> HoverState {
        self.state
    }

    /// The node carrying the highlight marker, if any.
    pub fn highlighted(&self) -> Option<NodeId> {
        self.highlight
    }

    pub fn is_overlay_hovered(&self) -> bool {
        self.overlay_hovered
    }

    /// Whether a debounced clear is waiting to fire.
    pub fn has_pending_clear(&self) -> bool {
        self.pending_clear.is_some()
    }

    /// Number of live per-node listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Whether `node` has a listener in the current binding.
    pub fn is_bound(&self, node: NodeId) -> bool {
        self.listener_by_node.contains_key(&node)
    }

    /// Connect a callback to the state changed signal.
    pub fn on_state_changed<F>(&self, callback: F) -> ConnectionId
    where
        F: Fn(&HoverState) + Send + Sync + 'static,
    {
        self.state_changed.connect(callback)
    }

    /// Disconnect a state changed callback.
    pub fn disconnect_state_changed(&self, id: ConnectionId) -> bool {
        self.state_changed.disconnect(id)
    }

    /// Connect a callback to the highlight changed signal.
    pub fn on_highlight_changed<F>(&self, callback: F) -> ConnectionId
    where
        F: Fn(&HighlightChange) + Send + Sync + 'static,
    {
        self.highlight_changed.connect(callback)
    }

    /// Disconnect a highlight changed callback.
    pub fn disconnect_highlight_changed(&self, id: ConnectionId) -> bool {
        self.highlight_changed.disconnect(id)
    }

    /// The pointer entered `node`.
    ///
    /// Cancels any pending clear and moves the highlight and the active
    /// coordinate to `node`, whether or not another block was active.
    pub fn pointer_enter(&mut self, doc: &DocumentTree, node: NodeId) {
        if !self.is_bound(node) {
            tracing::debug!(target: TARGET, ?node, "enter on unbound node");
            self.go_idle();
            return;
        }
        let bounds = match NodeBounds::of(doc, node) {
            Ok(bounds) => bounds,
            Err(err) => {
                tracing::debug!(target: TARGET, ?node, error = %err, "enter on stale node");
                self.go_idle();
                return;
            }
        };

        self.cancel_pending();
        self.mark(node);
        self.set_state(HoverState::Active {
            node,
            coordinate: HoverCoordinate::from(&bounds),
        });
    }

    /// The pointer left `node` toward `related`.
    ///
    /// Moving onto the overlay or into any readable block keeps the hover.
    /// Otherwise an active hover is cleared after the debounce.
    pub fn pointer_leave(
        &mut self,
        doc: &DocumentTree,
        node: NodeId,
        related: RelatedTarget,
        now: Instant,
    ) {
        if !self.is_bound(node) || !doc.contains_node(node) {
            tracing::debug!(target: TARGET, ?node, "leave on unbound or stale node");
            self.go_idle();
            return;
        }
        if self.keeps_hover(doc, related) {
            tracing::trace!(target: TARGET, ?node, ?related, "leave keeps hover");
            return;
        }
        if self.state.is_active() {
            self.schedule_clear(now);
        }
    }

    /// The pointer left the viewport. Clears immediately.
    pub fn pointer_exit_document(&mut self) {
        tracing::trace!(target: TARGET, "pointer left the document");
        self.overlay_hovered = false;
        self.go_idle();
    }

    /// A window-level pointer-out. Only an exit with no related target
    /// leaves the document.
    pub fn window_pointer_out(&mut self, related: RelatedTarget) {
        if related == RelatedTarget::None {
            self.pointer_exit_document();
        }
    }

    /// The pointer entered the overlay control.
    pub fn overlay_enter(&mut self) {
        self.overlay_hovered = true;
    }

    /// The pointer left the overlay control toward `related`.
    pub fn overlay_leave(&mut self, doc: &DocumentTree, related: RelatedTarget, now: Instant) {
        self.overlay_hovered = false;
        if self.keeps_hover(doc, related) {
            return;
        }
        if self.state.is_active() {
            self.schedule_clear(now);
        }
    }

    /// Route an event to the matching operation.
    pub fn dispatch(&mut self, doc: &DocumentTree, event: &PointerEvent, now: Instant) {
        match *event {
            PointerEvent::Enter { node } => self.pointer_enter(doc, node),
            PointerEvent::Leave { node, related } => self.pointer_leave(doc, node, related, now),
            PointerEvent::WindowOut { related } => self.window_pointer_out(related),
            PointerEvent::OverlayEnter => self.overlay_enter(),
            PointerEvent::OverlayLeave { related } => self.overlay_leave(doc, related, now),
        }
    }

    /// Fire any debounced clear that is due at `now`.
    pub fn poll(&mut self, now: Instant) {
        for timer in self.timers.process_expired(now) {
            if self.pending_clear != Some(timer) {
                continue;
            }
            self.pending_clear = None;
            if self.overlay_hovered {
                tracing::trace!(target: TARGET, "clear aborted, pointer is on the overlay");
                continue;
            }
            tracing::trace!(target: TARGET, "debounced clear fired");
            self.clear_highlight();
            self.set_state(HoverState::Idle);
        }
    }

    /// How long until [`poll`](Self::poll) has work to do.
    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        self.timers.time_until_next(now)
    }

    /// Go idle if the active node is no longer in `doc`.
    ///
    /// Returns whether the hover was dropped.
    pub fn drop_stale(&mut self, doc: &DocumentTree) -> bool {
        match self.state.node() {
            Some(node) if !doc.contains_node(node) => {
                tracing::debug!(target: TARGET, ?node, "active node left the document");
                self.go_idle();
                true
            }
            _ => false,
        }
    }

    /// Bind to a new readable set.
    ///
    /// Binding a different set tears down every listener of the old one,
    /// cancels any pending clear, clears the highlight and goes idle before
    /// the new listeners are attached. Binding the same set again does
    /// nothing. Returns whether anything changed.
    pub fn rebind(&mut self, set: ReadableSet) -> bool {
        if set.id() == self.set.id() {
            return false;
        }
        let _perf = PerfSpan::new(span_names::REBIND);
        tracing::debug!(target: TARGET, from = %self.set.id(), to = %set.id(), "rebinding");

        self.detach();
        self.overlay_hovered = false;
        self.go_idle();
        self.attach(set);
        true
    }

    fn attach(&mut self, set: ReadableSet) {
        for node in set.iter() {
            let listener = self.listeners.insert(node);
            self.listener_by_node.insert(node, listener);
        }
        tracing::debug!(target: TARGET, set = %set.id(), listeners = self.listeners.len(), "listeners attached");
        self.set = set;
    }

    fn detach(&mut self) {
        let removed = self.listeners.len();
        self.listeners.clear();
        self.listener_by_node.clear();
        tracing::debug!(target: TARGET, set = %self.set.id(), removed, "listeners detached");
    }

    fn keeps_hover(&self, doc: &DocumentTree, related: RelatedTarget) -> bool {
        match related {
            RelatedTarget::None => false,
            RelatedTarget::Overlay => true,
            RelatedTarget::Node(node) => self.set.contains_inclusive(doc, node),
        }
    }

    fn schedule_clear(&mut self, now: Instant) {
        self.cancel_pending();
        match self.timers.start_one_shot(now, self.config.debounce) {
            Ok(timer) => {
                tracing::trace!(target: TARGET, debounce = ?self.config.debounce, "clear scheduled");
                self.pending_clear = Some(timer);
            }
            Err(err) => {
                tracing::warn!(target: TARGET, error = %err, "cannot schedule clear, clearing now");
                self.go_idle();
            }
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(timer) = self.pending_clear.take() {
            self.timers.cancel(timer);
        }
    }

    fn go_idle(&mut self) {
        self.cancel_pending();
        self.clear_highlight();
        self.set_state(HoverState::Idle);
    }

    fn mark(&mut self, node: NodeId) {
        if self.highlight == Some(node) {
            return;
        }
        self.clear_highlight();
        self.highlight = Some(node);
        self.highlight_changed.emit(HighlightChange::Marked(node));
    }

    fn clear_highlight(&mut self) {
        if let Some(previous) = self.highlight.take() {
            self.highlight_changed.emit(HighlightChange::Cleared(previous));
        }
    }

    fn set_state(&mut self, state: HoverState) {
        if self.state == state {
            return;
        }
        tracing::debug!(target: TARGET, from = ?self.state.node(), to = ?state.node(), "hover state changed");
        self.state = state;
        self.state_changed.emit(state);
    }
}

impl std::fmt::Debug for HoverTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HoverTracker")
            .field("set", &self.set.id())
            .field("state", &self.state)
            .field("highlight", &self.highlight)
            .field("pending_clear", &self.pending_clear.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::selector::{IgnoreSet, select_document};
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct Fixture {
        doc: DocumentTree,
        tracker: HoverTracker,
        a: NodeId,
        b: NodeId,
        outside: NodeId,
        overlay_button: NodeId,
        start: Instant,
    }

    fn fixture() -> Fixture {
        let mut doc = DocumentTree::from_markup(
            r#"<p id="a">First <em>block</em></p><p id="b">Second block</p><nav></nav><div data-hover-player=""><button></button></div>"#,
        )
        .unwrap();
        let a = doc.element_by_id("a").unwrap();
        let b = doc.element_by_id("b").unwrap();
        doc.set_layout(a, Rect::new(100.0, 10.0, 400.0, 40.0)).unwrap();
        doc.set_layout(b, Rect::new(100.0, 60.0, 400.0, 40.0)).unwrap();
        let outside = doc.elements()[3];
        let overlay_button = doc.elements()[5];

        let set = select_document(&doc, &IgnoreSet::default());
        assert_eq!(set.nodes(), &[a, b]);
        let tracker = HoverTracker::new(set, HoverConfig::default());

        Fixture {
            doc,
            tracker,
            a,
            b,
            outside,
            overlay_button,
            start: Instant::now(),
        }
    }

    fn ms(start: Instant, millis: u64) -> Instant {
        start + Duration::from_millis(millis)
    }

    #[test]
    fn test_enter_activates_with_coordinate() {
        let mut f = fixture();
        f.tracker.pointer_enter(&f.doc, f.a);

        assert_eq!(
            f.tracker.state(),
            HoverState::Active {
                node: f.a,
                coordinate: HoverCoordinate {
                    top: 10.0,
                    left: 100.0,
                    first_line_height: 20.0,
                },
            }
        );
        assert_eq!(f.tracker.highlighted(), Some(f.a));
    }

    #[test]
    fn test_coordinate_is_not_rederived() {
        let mut f = fixture();
        f.tracker.pointer_enter(&f.doc, f.a);
        f.doc.set_layout(f.a, Rect::new(0.0, 500.0, 10.0, 10.0)).unwrap();

        assert_eq!(f.tracker.state().coordinate().map(|c| c.top), Some(10.0));
    }

    #[test]
    fn test_switch_between_blocks_never_idles() {
        let mut f = fixture();
        let states = Arc::new(Mutex::new(Vec::new()));
        let states_clone = states.clone();
        f.tracker
            .on_state_changed(move |state| states_clone.lock().push(state.node()));

        f.tracker.pointer_enter(&f.doc, f.a);
        f.tracker
            .pointer_leave(&f.doc, f.a, RelatedTarget::Node(f.b), f.start);
        f.tracker.pointer_enter(&f.doc, f.b);

        assert!(!f.tracker.has_pending_clear());
        assert_eq!(*states.lock(), vec![Some(f.a), Some(f.b)]);
        assert_eq!(f.tracker.highlighted(), Some(f.b));
    }

    #[test]
    fn test_leave_to_outside_clears_after_debounce() {
        let mut f = fixture();
        f.tracker.pointer_enter(&f.doc, f.a);
        f.tracker
            .pointer_leave(&f.doc, f.a, RelatedTarget::Node(f.outside), f.start);

        assert!(f.tracker.has_pending_clear());
        assert_eq!(f.tracker.next_deadline(f.start), Some(DEFAULT_DEBOUNCE));

        f.tracker.poll(ms(f.start, 9));
        assert_eq!(f.tracker.state().node(), Some(f.a));

        f.tracker.poll(ms(f.start, 10));
        assert_eq!(f.tracker.state(), HoverState::Idle);
        assert_eq!(f.tracker.highlighted(), None);
        assert!(!f.tracker.has_pending_clear());
    }

    #[test]
    fn test_leave_into_nested_element_keeps_hover() {
        let mut f = fixture();
        let em = f.doc.element_children(f.a).next().unwrap();
        f.tracker.pointer_enter(&f.doc, f.a);
        f.tracker
            .pointer_leave(&f.doc, f.a, RelatedTarget::Node(em), f.start);

        assert!(!f.tracker.has_pending_clear());
        f.tracker.poll(ms(f.start, 100));
        assert_eq!(f.tracker.state().node(), Some(f.a));
    }

    #[test]
    fn test_debounce_cancelled_by_enter() {
        let mut f = fixture();
        f.tracker.pointer_enter(&f.doc, f.a);
        f.tracker.pointer_leave(&f.doc, f.a, RelatedTarget::None, f.start);
        f.tracker.pointer_enter(&f.doc, f.b);

        f.tracker.poll(ms(f.start, 50));
        assert_eq!(f.tracker.state().node(), Some(f.b));
    }

    #[test]
    fn test_overlay_transit_keeps_hover() {
        let mut f = fixture();
        f.tracker.pointer_enter(&f.doc, f.a);
        let related = RelatedTarget::resolve(&f.doc, Some(f.overlay_button), "data-hover-player");
        assert_eq!(related, RelatedTarget::Overlay);

        f.tracker.pointer_leave(&f.doc, f.a, related, f.start);
        f.tracker.overlay_enter();
        f.tracker.poll(ms(f.start, 100));

        assert_eq!(f.tracker.state().node(), Some(f.a));
    }

    #[test]
    fn test_clear_aborts_while_overlay_hovered() {
        let mut f = fixture();
        f.tracker.pointer_enter(&f.doc, f.a);
        f.tracker.pointer_leave(&f.doc, f.a, RelatedTarget::None, f.start);
        f.tracker.overlay_enter();
        f.tracker.poll(ms(f.start, 20));

        assert_eq!(f.tracker.state().node(), Some(f.a));
        assert!(!f.tracker.has_pending_clear());
    }

    #[test]
    fn test_overlay_leave_to_outside_schedules_clear() {
        let mut f = fixture();
        f.tracker.pointer_enter(&f.doc, f.a);
        f.tracker.overlay_enter();
        f.tracker.overlay_leave(&f.doc, RelatedTarget::Node(f.outside), f.start);

        assert!(f.tracker.has_pending_clear());
        f.tracker.poll(ms(f.start, 10));
        assert_eq!(f.tracker.state(), HoverState::Idle);
    }

    #[test]
    fn test_overlay_leave_back_to_block_keeps_hover() {
        let mut f = fixture();
        f.tracker.pointer_enter(&f.doc, f.a);
        f.tracker.overlay_enter();
        f.tracker.overlay_leave(&f.doc, RelatedTarget::Node(f.a), f.start);

        assert!(!f.tracker.has_pending_clear());
        assert!(!f.tracker.is_overlay_hovered());
    }

    #[test]
    fn test_window_exit_clears_immediately() {
        let mut f = fixture();
        f.tracker.pointer_enter(&f.doc, f.a);
        f.tracker.pointer_leave(&f.doc, f.a, RelatedTarget::None, f.start);

        f.tracker.window_pointer_out(RelatedTarget::Node(f.b));
        assert!(f.tracker.state().is_active());

        f.tracker.window_pointer_out(RelatedTarget::None);
        assert_eq!(f.tracker.state(), HoverState::Idle);
        assert_eq!(f.tracker.highlighted(), None);
        assert!(!f.tracker.has_pending_clear());
        assert_eq!(f.tracker.next_deadline(f.start), None);
    }

    #[test]
    fn test_leave_while_idle_schedules_nothing() {
        let mut f = fixture();
        f.tracker.pointer_leave(&f.doc, f.a, RelatedTarget::None, f.start);
        assert!(!f.tracker.has_pending_clear());
    }

    #[test]
    fn test_stale_node_is_implicit_idle() {
        let mut f = fixture();
        f.tracker.pointer_enter(&f.doc, f.a);
        f.doc.remove(f.b).unwrap();

        f.tracker.pointer_enter(&f.doc, f.b);
        assert_eq!(f.tracker.state(), HoverState::Idle);
        assert_eq!(f.tracker.highlighted(), None);
    }

    #[test]
    fn test_drop_stale_after_active_node_removed() {
        let mut f = fixture();
        f.tracker.pointer_enter(&f.doc, f.a);
        assert!(!f.tracker.drop_stale(&f.doc));
        assert_eq!(f.tracker.state().node(), Some(f.a));

        f.doc.remove(f.a).unwrap();
        assert!(f.tracker.drop_stale(&f.doc));
        assert_eq!(f.tracker.state(), HoverState::Idle);
        assert_eq!(f.tracker.highlighted(), None);
        assert!(!f.tracker.drop_stale(&f.doc));
    }

    #[test]
    fn test_unbound_node_is_implicit_idle() {
        let mut f = fixture();
        f.tracker.pointer_enter(&f.doc, f.a);
        f.tracker.pointer_enter(&f.doc, f.outside);
        assert_eq!(f.tracker.state(), HoverState::Idle);
    }

    #[test]
    fn test_highlight_is_mutually_exclusive() {
        let mut f = fixture();
        let marked = Arc::new(Mutex::new(Vec::<NodeId>::new()));
        let max_marked = Arc::new(Mutex::new(0usize));
        let (marked_clone, max_clone) = (marked.clone(), max_marked.clone());
        f.tracker.on_highlight_changed(move |change| {
            let mut marked = marked_clone.lock();
            match *change {
                HighlightChange::Marked(node) => marked.push(node),
                HighlightChange::Cleared(node) => marked.retain(|&n| n != node),
            }
            let mut max = max_clone.lock();
            *max = (*max).max(marked.len());
        });

        for _ in 0..3 {
            f.tracker.pointer_enter(&f.doc, f.a);
            f.tracker.pointer_enter(&f.doc, f.b);
        }
        f.tracker.pointer_exit_document();

        assert_eq!(*max_marked.lock(), 1);
        assert!(marked.lock().is_empty());
    }

    #[test]
    fn test_rebind_resets_and_replaces_listeners() {
        let mut f = fixture();
        f.tracker.pointer_enter(&f.doc, f.a);
        f.tracker.pointer_leave(&f.doc, f.a, RelatedTarget::None, f.start);
        assert_eq!(f.tracker.listener_count(), 2);

        let new_doc = DocumentTree::from_markup("<p>only</p>").unwrap();
        let new_set = select_document(&new_doc, &IgnoreSet::default());
        let only = new_set.nodes()[0];

        assert!(f.tracker.rebind(new_set));
        assert_eq!(f.tracker.state(), HoverState::Idle);
        assert_eq!(f.tracker.highlighted(), None);
        assert!(!f.tracker.has_pending_clear());
        assert_eq!(f.tracker.listener_count(), 1);
        assert!(f.tracker.is_bound(only));
        assert!(!f.tracker.is_bound(f.a));
    }

    #[test]
    fn test_rebind_same_set_is_noop() {
        let mut f = fixture();
        f.tracker.pointer_enter(&f.doc, f.a);
        let same = f.tracker.readable_set().clone();

        assert!(!f.tracker.rebind(same));
        assert_eq!(f.tracker.state().node(), Some(f.a));
    }

    #[test]
    fn test_dispatch_routes_events() {
        let mut f = fixture();
        f.tracker
            .dispatch(&f.doc, &PointerEvent::Enter { node: f.b }, f.start);
        assert_eq!(f.tracker.state().node(), Some(f.b));

        f.tracker.dispatch(
            &f.doc,
            &PointerEvent::Leave {
                node: f.b,
                related: RelatedTarget::None,
            },
            f.start,
        );
        f.tracker.poll(ms(f.start, 10));
        assert_eq!(f.tracker.state(), HoverState::Idle);
    }

    #[test]
    fn test_resolve_related_target() {
        let f = fixture();
        assert_eq!(
            RelatedTarget::resolve(&f.doc, None, "data-hover-player"),
            RelatedTarget::None
        );
        assert_eq!(
            RelatedTarget::resolve(&f.doc, Some(f.b), "data-hover-player"),
            RelatedTarget::Node(f.b)
        );
    }
}
