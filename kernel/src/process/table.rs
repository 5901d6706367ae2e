//! Process Table
//!
//! Read-only report over every populated slot, in pid order.

use core::fmt::{self, Write};

use crate::scheduler::{Task, TaskState, TaskTable};

const HEADER: &str = " PID | PPID | WaitNum | WaitParent |   State   | Priority";
const SEPARATOR: &str = "-----|------|---------|------------|-----------|---------";

/// Borrowed view of the task table that renders as the process table.
pub struct ProcessTable<'a> {
    tasks: &'a [Task],
    current: Option<usize>,
}

impl<'a> ProcessTable<'a> {
    /// View over `tasks` with `current` marking the running slot.
    pub fn new(tasks: &'a [Task], current: Option<usize>) -> Self {
        ProcessTable { tasks, current }
    }

    /// State label for `slot`.
    ///
    /// The current slot always shows as RUNNING; round-robin never sets
    /// that state itself.
    fn label(&self, slot: usize, task: &Task) -> &'static str {
        if self.current == Some(slot) {
            TaskState::Running.label()
        } else {
            task.state().label()
        }
    }
}

impl fmt::Display for ProcessTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "{}", HEADER)?;
        writeln!(f, "{}", SEPARATOR)?;
        for (slot, task) in self.tasks.iter().enumerate() {
            writeln!(
                f,
                " {:<4}| {:<5}| {:<8}| {:<11}| {:<10}| {}",
                task.pid(),
                task.ppid(),
                task.wait_count(),
                task.awaited_by_parent(),
                self.label(slot, task),
                task.priority()
            )?;
        }
        writeln!(f)
    }
}

impl<C: Write> TaskTable<C> {
    /// Snapshot view for rendering.
    pub fn process_table(&self) -> ProcessTable<'_> {
        ProcessTable::new(&self.tasks, self.current)
    }

    /// Write the process table to the console.
    pub fn render_process_table(&mut self) {
        let view = ProcessTable::new(&self.tasks, self.current);
        let _ = write!(self.console, "{}", view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedConfig;
    use crate::scheduler::{Pid, Priority};
    use alloc::format;
    use alloc::string::String;

    #[test]
    fn test_row_layout() {
        let mut boot = Task::blank();
        boot.set_state(TaskState::Blocked);
        boot.add_wait();
        let mut child = boot.fork_child(Pid(1));
        child.set_awaited_by_parent(true);
        child.set_priority(Priority(4));
        let mut done = boot.fork_child(Pid(12));
        done.set_state(TaskState::Terminated);

        let tasks = [boot, child, done];
        let out = format!("{}", ProcessTable::new(&tasks, Some(1)));

        let expected = "\n\
             \x20PID | PPID | WaitNum | WaitParent |   State   | Priority\n\
             -----|------|---------|------------|-----------|---------\n\
             \x200   | 0    | 1       | false      | BLOCKED   | 1\n\
             \x201   | 0    | 0       | true       | RUNNING   | 4\n\
             \x2012  | 0    | 0       | false      | TERMINATED| 1\n\
             \n";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_empty_table_renders_header_only() {
        let out = format!("{}", ProcessTable::new(&[], None));
        assert_eq!(out, format!("\n{}\n{}\n\n", HEADER, SEPARATOR));
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut table = TaskTable::new(SchedConfig::default().without_pause(), String::new());
        table.init_task(&Task::blank()).unwrap();

        table.render_process_table();
        let first = table.console().clone();
        table.render_process_table();

        assert_eq!(table.console().len(), first.len() * 2);
        assert!(table.console().ends_with(first.as_str()));
        assert_eq!(format!("{}", table.process_table()), first);
    }
}
