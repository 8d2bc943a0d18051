//! Timestamp representation.
//!
//! Every engine entry point takes `now` explicitly so tests stay
//! deterministic; only callers at the edge (the CLI) read the wall clock.

use std::time::SystemTime;

/// Milliseconds since the Unix epoch.
pub type UnixMillis = u64;

/// Reads the wall clock as [`UnixMillis`].
pub fn now_millis() -> UnixMillis {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as UnixMillis
}
