//! Task priority levels.
//!
//! Priorities are plain signed integers; a larger value wins. Only the
//! priority-based policies read them, round-robin ignores them.

use core::fmt;

/// Task priority level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(pub i32);

impl Priority {
    /// Forced onto the bootstrap task at admission.
    pub const BOOTSTRAP: Priority = Priority(1);

    /// Priority of a slot nobody assigned one to.
    pub const DEFAULT: Priority = Priority(1);

    /// First forked child under the static-priority policy.
    pub const STATIC_FIRST_CHILD: Priority = Priority(0);

    /// Later children under the static-priority policy.
    pub const STATIC_STAGED: Priority = Priority(1);

    /// First forked child under the dynamic policy.
    pub const DYNAMIC_FIRST_CHILD: Priority = Priority(0);

    /// Later children under the dynamic policy.
    pub const DYNAMIC_DEFAULT: Priority = Priority(4);

    /// Get the next higher priority.
    pub fn higher(self) -> Self {
        Priority(self.0.saturating_add(1))
    }

    /// True when `self` strictly beats `other`.
    ///
    /// Ties never win, so a linear scan keeps the lowest index among equals.
    pub fn outranks(self, other: Priority) -> bool {
        self.0 > other.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::DEFAULT
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
