//! Core systems for Lectern.
//!
//! This crate provides the foundational pieces shared by the Lectern crates:
//!
//! - **Node keys**: [`NodeId`], the generational key every document arena uses
//! - **Signal/Slot System**: Type-safe change notification between components
//! - **Timers**: One-shot timers driven by host-supplied instants, used for
//!   debounced transitions
//! - **Logging**: Tracing target names and a timing span guard
//!
//! # Signal/Slot Example
//!
//! ```
//! use lectern_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//!
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! value_changed.emit(42);
//! value_changed.disconnect(conn_id);
//! ```
//!
//! # Timer Example
//!
//! ```
//! use lectern_core::TimerManager;
//! use std::time::{Duration, Instant};
//!
//! let mut timers = TimerManager::new();
//! let now = Instant::now();
//! let id = timers.start_one_shot(now, Duration::from_millis(10))?;
//!
//! assert!(timers.process_expired(now).is_empty());
//! assert_eq!(timers.process_expired(now + Duration::from_millis(10)), vec![id]);
//! # Ok::<(), lectern_core::LecternError>(())
//! ```

mod error;
pub mod logging;
pub mod node;
pub mod signal;
pub mod timer;

pub use error::{LecternError, Result, TimerError};
pub use logging::PerfSpan;
pub use node::NodeId;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use timer::{TimerId, TimerManager};
