//! Process Management
//!
//! Task lifecycle on top of the scheduler's task table: admission of the
//! bootstrap task, the fork family, wait and exit, plus the process-table
//! report.

pub mod manager;
pub mod table;

use core::fmt;

use crate::config::SchedPolicy;
use crate::scheduler::{Priority, Task, TaskState};

pub use manager::add_task;
pub use table::ProcessTable;

/// Lifecycle operation error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskError {
    /// Every task slot is taken
    CapacityExceeded,
    /// The operation needs a running task and none has been scheduled yet
    NoCurrentTask,
    /// The bootstrap task was already admitted
    AlreadyInitialized,
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskError::CapacityExceeded => write!(f, "task table is full"),
            TaskError::NoCurrentTask => write!(f, "no task is running"),
            TaskError::AlreadyInitialized => write!(f, "bootstrap task already admitted"),
        }
    }
}

/// Initial-state rule applied to a freshly forked child.
///
/// The variants share the copy itself and only differ in the state and
/// priority the child starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForkVariant {
    /// READY, default priority.
    Plain,
    /// First child READY at priority 0, later children BLOCKED at priority 1
    /// until staged admission.
    StaticPriority,
    /// First child at priority 0, later children at priority 4.
    Dynamic,
}

impl ForkVariant {
    /// Variant whose children the given policy expects.
    pub fn for_policy(policy: SchedPolicy) -> Self {
        match policy {
            SchedPolicy::RoundRobin => ForkVariant::Plain,
            SchedPolicy::StaticPriority => ForkVariant::StaticPriority,
            SchedPolicy::Dynamic => ForkVariant::Dynamic,
        }
    }

    /// Apply the initial state/priority to a child about to occupy `slot`.
    pub(crate) fn admit(self, child: &mut Task, slot: usize) {
        let first_child = slot == 1;
        match self {
            ForkVariant::Plain => child.set_state(TaskState::Ready),
            ForkVariant::StaticPriority => {
                if first_child {
                    child.set_state(TaskState::Ready);
                    child.set_priority(Priority::STATIC_FIRST_CHILD);
                } else {
                    child.set_state(TaskState::Blocked);
                    child.set_priority(Priority::STATIC_STAGED);
                }
            }
            ForkVariant::Dynamic => {
                child.set_priority(if first_child {
                    Priority::DYNAMIC_FIRST_CHILD
                } else {
                    Priority::DYNAMIC_DEFAULT
                });
            }
        }
    }
}

/// Result of a wait call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Caller is now BLOCKED until the target exits.
    Blocked,
    /// Nothing to wait for; the caller keeps running.
    Rejected(WaitRejection),
}

impl WaitOutcome {
    /// Value handed back through the result register.
    pub fn result_code(self) -> i64 {
        match self {
            WaitOutcome::Blocked => 1,
            WaitOutcome::Rejected(_) => 0,
        }
    }
}

/// Why a wait returned immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitRejection {
    /// Target already TERMINATED
    AlreadyTerminated,
    /// Target is the caller
    SelfWait,
    /// No slot with that pid
    NoSuchTask,
}
