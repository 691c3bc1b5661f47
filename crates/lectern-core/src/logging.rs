//! Logging facilities for Lectern.
//!
//! Lectern uses the `tracing` crate for instrumentation. To see logs, install
//! a subscriber in the host application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("lectern=debug,lectern_speech=debug")
//!     .init();
//! ```
//!
//! Every event is emitted under one of the [`targets`] below, so a host can
//! turn on, say, hover transitions without the signal chatter.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "lectern_core";
    /// Timer system target.
    pub const TIMER: &str = "lectern_core::timer";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "lectern_core::signal";
    /// Document arena and markup loading.
    pub const DOCUMENT: &str = "lectern::document";
    /// Readable block selection.
    pub const SELECTOR: &str = "lectern::selector";
    /// Hover tracking state machine.
    pub const HOVER: &str = "lectern::hover";
    /// Session wiring.
    pub const SESSION: &str = "lectern::session";
    /// Speech playback gate.
    pub const PLAYBACK: &str = "lectern_speech::gate";
}

/// Span names used throughout Lectern for tracing.
pub mod span_names {
    /// Readable set selection span.
    pub const SELECT: &str = "lectern::select";
    /// Tracker rebinding span.
    pub const REBIND: &str = "lectern::rebind";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations such as a full
/// readable-set selection over a large document.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "lectern::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}
