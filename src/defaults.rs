//! Built-in constants shared across the engine.

use std::time::Duration;

/// Name of the sentinel column that holds athletes not placed in any live
/// position. It is never persisted as a `Position` and always sorts last.
pub const UNASSIGNED: &str = "Unassigned";

/// Default upper bound on a single persistence call before it is classified
/// as a failure and the discard-and-reload path runs.
pub const DEFAULT_PERSISTENCE_TIMEOUT: Duration = Duration::from_secs(30);

/// Returns true when `name` is the unassigned sentinel column.
pub fn is_unassigned(name: &str) -> bool {
    name == UNASSIGNED
}
