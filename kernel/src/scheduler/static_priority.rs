//! Preemptive static-priority scheduler policy.
//!
//! The highest-priority READY or RUNNING task runs; the running task keeps
//! the CPU unless someone strictly outranks it. Children forked under this
//! policy are staged: all but the first start BLOCKED and are admitted
//! together at the admission tick.

use core::fmt::Write;

use super::{TaskState, TaskTable};

/// Pick the best READY/RUNNING task and hand it the RUNNING mark.
pub(crate) fn select<C: Write>(table: &mut TaskTable<C>) -> Option<usize> {
    let next = table.highest_priority(|t| {
        matches!(t.state(), TaskState::Ready | TaskState::Running)
    })?;

    table.promote(next);
    log::trace!(
        "static-priority: pid {} runs at priority {}",
        table.tasks[next].pid(),
        table.tasks[next].priority()
    );
    Some(next)
}

/// Tick hook: staged admission, trace line, then selection.
pub(crate) fn on_tick<C: Write>(table: &mut TaskTable<C>, tick: u64) -> Option<usize> {
    let config = *table.config();

    if tick == config.staged_admission_tick {
        admit_staged(table);
    }

    if tick < config.static_priority_trace_until {
        match table.current() {
            Some(pid) => table.notice(format_args!(
                "Interrupt Count: {}, Current PID: {}",
                tick, pid
            )),
            None => table.notice(format_args!("Interrupt Count: {}, Current PID: -", tick)),
        }
    }

    select(table)
}

/// Release every BLOCKED task past slot 1.
///
/// Slot 1 is the first child, admitted READY at fork time.
fn admit_staged<C: Write>(table: &mut TaskTable<C>) {
    for task in table.tasks.iter_mut().skip(2) {
        if task.state() == TaskState::Blocked {
            task.set_state(TaskState::Ready);
            log::debug!("static-priority: admitted pid {}", task.pid());
        }
    }
}
