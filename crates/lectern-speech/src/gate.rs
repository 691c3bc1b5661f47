//! Single-flight playback over a [`SpeechEngine`].
//!
//! A [`PlaybackGate`] lets at most one utterance be in flight. While it is
//! speaking, further activations are refused with [`Activation::Busy`]. The
//! gate returns to idle when the engine reports completion of *its*
//! utterance, when the engine refuses to start, or when [`PlaybackGate::stop`]
//! is called.
//!
//! # Example
//!
//! ```ignore
//! let gate = PlaybackGate::new(Arc::new(engine));
//! gate.on_state_changed(|state| println!("playback: {state:?}"));
//!
//! match gate.activate(node, "Hello world")? {
//!     Activation::Started(id) => println!("speaking {id}"),
//!     Activation::Busy => println!("already speaking"),
//! }
//! ```

use std::sync::{Arc, Weak};

use lectern_core::{ConnectionGuard, ConnectionId, NodeId, Signal};
use parking_lot::Mutex;

use crate::engine::{SpeechEngine, Utterance, UtteranceId};
use crate::error::{Result, SpeechError};

const TARGET: &str = "lectern_speech::gate";

/// The current playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Nothing is being spoken.
    #[default]
    Idle,
    /// An utterance for `node` is in flight.
    Speaking {
        /// The node whose text is being spoken.
        node: NodeId,
        /// The utterance handed to the engine.
        utterance: UtteranceId,
    },
}

impl PlaybackState {
    /// Whether an utterance is in flight.
    pub fn is_speaking(&self) -> bool {
        matches!(self, Self::Speaking { .. })
    }

    /// The node being spoken, if any.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Self::Idle => None,
            Self::Speaking { node, .. } => Some(*node),
        }
    }
}

/// Outcome of [`PlaybackGate::activate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// A new utterance was handed to the engine.
    Started(UtteranceId),
    /// Something is already being spoken; nothing was started.
    Busy,
}

struct GateState {
    state: PlaybackState,
    /// The completion handler for the utterance in flight.
    completion: Option<ConnectionGuard<UtteranceId>>,
    next_utterance: u64,
}

/// Gates speech invocations so only one is in flight at a time.
pub struct PlaybackGate<E: SpeechEngine> {
    engine: Arc<E>,
    state: Arc<Mutex<GateState>>,
    state_changed: Arc<Signal<PlaybackState>>,
}

impl<E: SpeechEngine> PlaybackGate<E> {
    /// Create an idle gate over `engine`.
    pub fn new(engine: Arc<E>) -> Self {
        Self {
            engine,
            state: Arc::new(Mutex::new(GateState {
                state: PlaybackState::Idle,
                completion: None,
                next_utterance: 1,
            })),
            state_changed: Arc::new(Signal::new()),
        }
    }

    /// The engine this gate drives.
    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    /// The current playback state.
    pub fn state(&self) -> PlaybackState {
        self.state.lock().state
    }

    /// Whether an utterance is in flight.
    pub fn is_speaking(&self) -> bool {
        self.state().is_speaking()
    }

    /// Connect a callback to the state changed signal.
    pub fn on_state_changed<F>(&self, callback: F) -> ConnectionId
    where
        F: Fn(&PlaybackState) + Send + Sync + 'static,
    {
        self.state_changed.connect(callback)
    }

    /// Disconnect a state changed callback.
    pub fn disconnect_state_changed(&self, id: ConnectionId) -> bool {
        self.state_changed.disconnect(id)
    }

    /// Speak `text` on behalf of `node`, unless something is already in flight.
    ///
    /// Exactly one completion handler is registered for the new utterance; it
    /// ignores completions reported for any other utterance. If the engine
    /// refuses to start, the handler is removed, the gate is idle again and
    /// the engine's error is returned.
    pub fn activate(&self, node: NodeId, text: &str) -> Result<Activation> {
        let text = text.trim();

        let (utterance, speaking) = {
            let mut gate = self.state.lock();
            if gate.state.is_speaking() {
                tracing::debug!(target: TARGET, ?node, state = ?gate.state, "activation ignored, already speaking");
                return Ok(Activation::Busy);
            }
            if text.is_empty() {
                return Err(SpeechError::EmptyText);
            }

            let id = UtteranceId::new(gate.next_utterance);
            gate.next_utterance += 1;

            let weak_state = Arc::downgrade(&self.state);
            let state_changed = self.state_changed.clone();
            let guard = self.engine.completed().connect_scoped(move |&finished| {
                on_completed(&weak_state, &state_changed, id, finished);
            });

            let speaking = PlaybackState::Speaking {
                node,
                utterance: id,
            };
            gate.state = speaking;
            gate.completion = Some(guard);

            (
                Utterance {
                    id,
                    text: text.to_owned(),
                },
                speaking,
            )
        };

        tracing::debug!(target: TARGET, ?node, utterance = %utterance.id, "speaking");
        self.state_changed.emit(speaking);

        match self.engine.speak(&utterance) {
            Ok(()) => Ok(Activation::Started(utterance.id)),
            Err(err) => {
                tracing::warn!(target: TARGET, utterance = %utterance.id, error = %err, "speech engine refused utterance");
                self.reset_if_current(utterance.id);
                Err(err)
            }
        }
    }

    /// Stop speaking and return to idle.
    ///
    /// Returns `false` if nothing was in flight.
    pub fn stop(&self) -> bool {
        let guard = {
            let mut gate = self.state.lock();
            if !gate.state.is_speaking() {
                return false;
            }
            gate.state = PlaybackState::Idle;
            gate.completion.take()
        };
        drop(guard);

        self.engine.cancel();
        tracing::debug!(target: TARGET, "playback stopped");
        self.state_changed.emit(PlaybackState::Idle);
        true
    }

    fn reset_if_current(&self, utterance: UtteranceId) {
        if let Some(guard) = take_if_current(&self.state, utterance) {
            drop(guard);
            self.state_changed.emit(PlaybackState::Idle);
        }
    }
}

impl<E: SpeechEngine> std::fmt::Debug for PlaybackGate<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackGate")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Move to idle if `utterance` is the one in flight, handing back its
/// completion guard so the caller can drop it outside the lock.
fn take_if_current(
    state: &Mutex<GateState>,
    utterance: UtteranceId,
) -> Option<Option<ConnectionGuard<UtteranceId>>> {
    let mut gate = state.lock();
    match gate.state {
        PlaybackState::Speaking { utterance: current, .. } if current == utterance => {
            gate.state = PlaybackState::Idle;
            Some(gate.completion.take())
        }
        _ => None,
    }
}

fn on_completed(
    state: &Weak<Mutex<GateState>>,
    state_changed: &Signal<PlaybackState>,
    expected: UtteranceId,
    finished: UtteranceId,
) {
    if finished != expected {
        tracing::trace!(target: TARGET, %finished, %expected, "ignoring completion for another utterance");
        return;
    }
    let Some(state) = state.upgrade() else {
        return;
    };
    if let Some(guard) = take_if_current(&state, finished) {
        drop(guard);
        tracing::debug!(target: TARGET, utterance = %finished, "utterance completed");
        state_changed.emit(PlaybackState::Idle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct RecordingEngine {
        spoken: Mutex<Vec<Utterance>>,
        cancelled: AtomicBool,
        refuse: AtomicBool,
        completed: Arc<Signal<UtteranceId>>,
    }

    impl RecordingEngine {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                spoken: Mutex::new(Vec::new()),
                cancelled: AtomicBool::new(false),
                refuse: AtomicBool::new(false),
                completed: Arc::new(Signal::new()),
            })
        }

        fn finish(&self, id: UtteranceId) {
            self.completed.emit(id);
        }

        fn spoken_texts(&self) -> Vec<String> {
            self.spoken.lock().iter().map(|u| u.text.clone()).collect()
        }
    }

    impl SpeechEngine for RecordingEngine {
        fn speak(&self, utterance: &Utterance) -> Result<()> {
            if self.refuse.load(Ordering::SeqCst) {
                return Err(SpeechError::Rejected("engine busy".into()));
            }
            self.spoken.lock().push(utterance.clone());
            Ok(())
        }

        fn cancel(&self) {
            self.cancelled.store(true, Ordering::SeqCst);
        }

        fn completed(&self) -> &Arc<Signal<UtteranceId>> {
            &self.completed
        }
    }

    fn node(n: u32) -> NodeId {
        NodeId::from_raw((1u64 << 32) | u64::from(n))
    }

    fn started(activation: Activation) -> UtteranceId {
        match activation {
            Activation::Started(id) => id,
            Activation::Busy => panic!("expected a started utterance"),
        }
    }

    #[test]
    fn test_activate_speaks_once() {
        let engine = RecordingEngine::new();
        let gate = PlaybackGate::new(engine.clone());

        let first = gate.activate(node(1), "Hello world").unwrap();
        let second = gate.activate(node(1), "Hello world").unwrap();

        assert!(matches!(first, Activation::Started(_)));
        assert_eq!(second, Activation::Busy);
        assert_eq!(engine.spoken_texts(), vec!["Hello world".to_string()]);
        assert!(gate.is_speaking());
        assert_eq!(gate.state().node(), Some(node(1)));
    }

    #[test]
    fn test_completion_returns_to_idle() {
        let engine = RecordingEngine::new();
        let gate = PlaybackGate::new(engine.clone());

        let id = started(gate.activate(node(1), "Hello").unwrap());
        assert_eq!(engine.completed.connection_count(), 1);

        engine.finish(id);

        assert_eq!(gate.state(), PlaybackState::Idle);
        assert_eq!(engine.completed.connection_count(), 0);
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let engine = RecordingEngine::new();
        let gate = PlaybackGate::new(engine.clone());

        let old = started(gate.activate(node(1), "first").unwrap());
        engine.finish(old);
        let new = started(gate.activate(node(2), "second").unwrap());

        engine.finish(old);
        assert_eq!(
            gate.state(),
            PlaybackState::Speaking {
                node: node(2),
                utterance: new
            }
        );

        engine.finish(new);
        assert_eq!(gate.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_one_handler_per_utterance() {
        let engine = RecordingEngine::new();
        let gate = PlaybackGate::new(engine.clone());

        for n in 0..5 {
            let id = started(gate.activate(node(n), "text").unwrap());
            assert_eq!(engine.completed.connection_count(), 1);
            engine.finish(id);
            assert_eq!(engine.completed.connection_count(), 0);
        }
        assert_eq!(engine.spoken.lock().len(), 5);
    }

    #[test]
    fn test_refused_speak_resets() {
        let engine = RecordingEngine::new();
        engine.refuse.store(true, Ordering::SeqCst);
        let gate = PlaybackGate::new(engine.clone());

        let err = gate.activate(node(1), "Hello").unwrap_err();
        assert!(matches!(err, SpeechError::Rejected(_)));
        assert_eq!(gate.state(), PlaybackState::Idle);
        assert_eq!(engine.completed.connection_count(), 0);

        engine.refuse.store(false, Ordering::SeqCst);
        assert!(matches!(
            gate.activate(node(1), "Hello").unwrap(),
            Activation::Started(_)
        ));
    }

    #[test]
    fn test_empty_text_is_rejected() {
        let engine = RecordingEngine::new();
        let gate = PlaybackGate::new(engine.clone());

        assert_eq!(gate.activate(node(1), "   ").unwrap_err(), SpeechError::EmptyText);
        assert_eq!(gate.state(), PlaybackState::Idle);
        assert!(engine.spoken.lock().is_empty());
    }

    #[test]
    fn test_stop_cancels_engine() {
        let engine = RecordingEngine::new();
        let gate = PlaybackGate::new(engine.clone());

        assert!(!gate.stop());
        let id = started(gate.activate(node(1), "Hello").unwrap());
        assert!(gate.stop());

        assert!(engine.cancelled.load(Ordering::SeqCst));
        assert_eq!(gate.state(), PlaybackState::Idle);
        assert_eq!(engine.completed.connection_count(), 0);

        // A late completion after stop has no one to notify.
        engine.finish(id);
        assert_eq!(gate.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_state_changed_announces_transitions() {
        let engine = RecordingEngine::new();
        let gate = PlaybackGate::new(engine.clone());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_clone = seen.clone();
        gate.on_state_changed(move |state| seen_clone.lock().push(*state));

        let id = started(gate.activate(node(7), "Hello").unwrap());
        engine.finish(id);

        let seen = seen.lock();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].node(), Some(node(7)));
        assert_eq!(seen[1], PlaybackState::Idle);
    }

    #[test]
    fn test_dropping_gate_disconnects_handler() {
        let engine = RecordingEngine::new();
        {
            let gate = PlaybackGate::new(engine.clone());
            gate.activate(node(1), "Hello").unwrap();
            assert_eq!(engine.completed.connection_count(), 1);
        }
        assert_eq!(engine.completed.connection_count(), 0);
    }
}
