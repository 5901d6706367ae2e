//! Dynamic-priority scheduler policy.
//!
//! Like the static policy, but the running task is always put back to READY
//! before the scan, and the first forked child (slot 1), which starts with
//! the lowest priority, gains one level every aging interval so it cannot
//! starve.

use core::fmt::Write;

use super::{TaskState, TaskTable};

/// Slot targeted by aging: the first forked child.
const AGED_SLOT: usize = 1;

/// Demote the running task, then pick the best READY task.
pub(crate) fn select<C: Write>(table: &mut TaskTable<C>) -> Option<usize> {
    if let Some(slot) = table.current {
        if table.tasks[slot].state() == TaskState::Running {
            table.tasks[slot].set_state(TaskState::Ready);
        }
    }

    let next = table.highest_priority(|t| t.is_ready())?;
    table.promote(next);
    log::trace!(
        "dynamic: pid {} runs at priority {}",
        table.tasks[next].pid(),
        table.tasks[next].priority()
    );
    Some(next)
}

/// Tick hook: aging, selection, then a dump on aging ticks.
pub(crate) fn on_tick<C: Write>(table: &mut TaskTable<C>, tick: u64) -> Option<usize> {
    let config = *table.config();
    let aging_tick = config.is_aging_tick(tick);

    if aging_tick {
        age_first_child(table);
    }

    // Nothing to run: resume the interrupted task without reporting.
    let next = select(table)?;

    if aging_tick && tick < config.dynamic_trace_until {
        table.render_process_table();
        table.pause();
    }
    if tick == config.dynamic_trace_until {
        table.notice(format_args!(
            "\nScheduling continues without printing process tables...\n"
        ));
    }
    Some(next)
}

fn age_first_child<C: Write>(table: &mut TaskTable<C>) {
    if let Some(task) = table.tasks.get_mut(AGED_SLOT) {
        if !task.is_terminated() {
            let aged = task.priority().higher();
            task.set_priority(aged);
            log::debug!("dynamic: pid {} aged to priority {}", task.pid(), aged);
        }
    }
}
