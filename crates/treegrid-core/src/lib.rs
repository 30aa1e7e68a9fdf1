//! Core systems for treegrid.
//!
//! This crate provides the plumbing shared by table components:
//!
//! - **Signal/Slot System**: Typed change notifications
//! - **Timers**: Cancel-and-reschedule one-shot timers and keyed debouncing
//! - **Session**: Explicit per-session context (identifier generation)
//! - **Logging**: `tracing` targets and hierarchy debug dumps
//!
//! # Signal Example
//!
//! ```
//! use treegrid_core::Signal;
//!
//! let expanded = Signal::<(String, bool)>::new();
//! expanded.connect(|(row, state)| {
//!     println!("row {} expanded: {}", row, state);
//! });
//! expanded.emit(("r1".to_string(), false));
//! ```
//!
//! # Debounce Example
//!
//! ```
//! use std::time::{Duration, Instant};
//! use treegrid_core::Debouncer;
//!
//! let mut debouncer = Debouncer::new(Duration::from_millis(300));
//! let now = Instant::now();
//! debouncer.schedule("selection", now);
//! // A second request before the delay elapses replaces the first.
//! debouncer.schedule("selection", now + Duration::from_millis(100));
//! assert!(debouncer.poll(now + Duration::from_millis(300)).is_empty());
//! assert_eq!(debouncer.poll(now + Duration::from_millis(400)), vec!["selection"]);
//! ```

mod error;
pub mod logging;
mod session;
pub mod signal;
pub mod timer;

pub use error::{CoreError, Result};
pub use logging::{TreeDump, TreeFormatOptions, TreeSource, TreeStyle};
pub use session::{DEFAULT_ID_PREFIX, Session};
pub use signal::{ConnectionGuard, ConnectionId, Signal, SignalBlocker};
pub use timer::{Debouncer, TimerId, TimerManager};
