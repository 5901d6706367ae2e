//! Round-robin scheduler policy.
//!
//! Cooperative rotation over READY tasks, ignoring priority. The policy
//! never marks a task RUNNING; `current` alone says who runs.

use core::fmt::Write;

use super::TaskTable;

/// Next READY slot after the current one, wrapping around.
///
/// The scan covers at most one full lap (ending on the current slot
/// itself), so a table without READY tasks yields `None` instead of
/// spinning forever.
pub(crate) fn select<C: Write>(table: &mut TaskTable<C>) -> Option<usize> {
    let count = table.tasks.len();
    let start = table.current.map_or(0, |slot| slot + 1);

    let next = (0..count)
        .map(|step| (start + step) % count)
        .find(|&slot| table.tasks[slot].is_ready())?;

    table.current = Some(next);
    log::trace!("round-robin: switching to pid {}", table.tasks[next].pid());
    Some(next)
}

/// Tick hook: select, then dump the table while inside the trace window.
pub(crate) fn on_tick<C: Write>(table: &mut TaskTable<C>, tick: u64) -> Option<usize> {
    let next = select(table);

    let (after, until) = table.config().round_robin_trace_window;
    if tick > after && tick < until {
        table.render_process_table();
        table.pause();
    }
    if tick == until {
        table.notice(format_args!(
            "\nScheduling continues without printing process tables..."
        ));
    }
    next
}
