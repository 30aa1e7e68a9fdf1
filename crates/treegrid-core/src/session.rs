//! Session state shared by the components of one UI session.
//!
//! A [`Session`] replaces process-wide registries: everything that needs a
//! session-unique value receives the session explicitly. Dropping the session
//! tears its state down.

use std::sync::atomic::{AtomicU64, Ordering};

/// Default prefix for generated identifiers.
pub const DEFAULT_ID_PREFIX: &str = "ui";

/// Explicit per-session context.
///
/// # Example
///
/// ```
/// use treegrid_core::Session;
///
/// let session = Session::new();
/// assert_eq!(session.next_id(), "ui1");
/// assert_eq!(session.next_id(), "ui2");
/// ```
#[derive(Debug)]
pub struct Session {
    id_prefix: String,
    id_counter: AtomicU64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates a session generating ids with the default prefix.
    pub fn new() -> Self {
        Self::with_id_prefix(DEFAULT_ID_PREFIX)
    }

    /// Creates a session generating ids with a custom prefix.
    pub fn with_id_prefix(prefix: impl Into<String>) -> Self {
        Self {
            id_prefix: prefix.into(),
            id_counter: AtomicU64::new(0),
        }
    }

    /// Returns a new identifier, unique within this session.
    pub fn next_id(&self) -> String {
        let n = self.id_counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}{}", self.id_prefix, n)
    }

    /// Returns how many identifiers this session has handed out.
    pub fn generated_ids(&self) -> u64 {
        self.id_counter.load(Ordering::Relaxed)
    }

    /// Returns the prefix of generated identifiers.
    pub fn id_prefix(&self) -> &str {
        &self.id_prefix
    }
}
