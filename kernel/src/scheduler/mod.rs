//! Kernel scheduler module.
//!
//! This module owns the task table and the timer-tick entry point. The
//! interrupt layer hands in the context of the task it interrupted together
//! with a monotonically increasing tick count, and gets back the context to
//! restore. Three policies are available (see [`SchedPolicy`]); exactly one
//! drives a given table.
//!
//! # Tick protocol
//!
//! 1. An empty table returns the incoming context untouched.
//! 2. If a task is current, the incoming context is saved into its slot.
//! 3. The policy runs its tick hooks and picks the next task.
//! 4. The chosen task's saved context is returned, or the incoming one when
//!    nothing is eligible.

pub mod context;
pub mod dynamic;
pub mod priority;
pub mod round_robin;
pub mod static_priority;
pub mod task;

use alloc::vec::Vec;
use core::fmt::{self, Write};
use core::sync::atomic::{AtomicU64, Ordering};
use spin::Mutex;

use crate::config::{SchedConfig, SchedPolicy, MAX_TASKS};
use crate::process::TaskError;
use crate::serial::SerialWriter;

pub use context::CpuState;
pub use priority::Priority;
pub use task::{Pid, Task, TaskState};

/// Global task table, driven by the interrupt layer.
static TASK_TABLE: Mutex<Option<TaskTable<SerialWriter>>> = Mutex::new(None);

/// Boot tick counter (incremented every timer tick).
static BOOT_TICKS: AtomicU64 = AtomicU64::new(0);

/// Initialize the global task table and admit the bootstrap task.
///
/// The bootstrap task starts at `entry` with the kernel selectors from the
/// GDT. Re-initializing replaces the previous table.
pub fn init(config: SchedConfig, entry: u64) -> Result<Pid, TaskError> {
    let bootstrap = Task::new(entry, crate::gdt::code_selector(), crate::gdt::data_selector());

    let mut table = TaskTable::new(config, SerialWriter);
    let pid = table.init_task(&bootstrap)?;
    *TASK_TABLE.lock() = Some(table);
    BOOT_TICKS.store(0, Ordering::Relaxed);

    log::info!(
        "task table initialized ({} policy, {} slots)",
        config.policy.name(),
        MAX_TASKS
    );
    Ok(pid)
}

/// Timer tick handler (called from timer interrupt).
///
/// Increments boot ticks and runs one scheduling decision. Before [`init`]
/// the interrupted context is returned unchanged.
pub fn timer_tick(ctx: &CpuState) -> CpuState {
    let tick = BOOT_TICKS.fetch_add(1, Ordering::Relaxed) + 1;
    with_table(|table| table.schedule(ctx, tick)).unwrap_or(*ctx)
}

/// Get boot tick count (incremented each timer_tick).
pub fn boot_ticks() -> u64 {
    BOOT_TICKS.load(Ordering::Relaxed)
}

/// Run `f` against the global table, if one is installed.
pub(crate) fn with_table<R>(f: impl FnOnce(&mut TaskTable<SerialWriter>) -> R) -> Option<R> {
    TASK_TABLE.lock().as_mut().map(f)
}

/// Fixed-capacity task table.
///
/// Slots are appended and never removed, so a slot index is a stable pid.
/// Terminated tasks stay in place and are skipped by every policy.
pub struct TaskTable<C: Write> {
    /// Populated slots; `tasks.len()` is the live count.
    pub(crate) tasks: Vec<Task>,
    /// Slot of the running task, `None` before the first decision.
    pub(crate) current: Option<usize>,
    /// Policy and tick thresholds.
    config: SchedConfig,
    /// Console sink for tables and notices.
    pub(crate) console: C,
}

impl<C: Write> TaskTable<C> {
    /// Create an empty table writing its reports to `console`.
    pub fn new(config: SchedConfig, console: C) -> Self {
        TaskTable {
            tasks: Vec::with_capacity(MAX_TASKS),
            current: None,
            config,
            console,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &SchedConfig {
        &self.config
    }

    /// Number of populated slots.
    pub fn count(&self) -> usize {
        self.tasks.len()
    }

    /// True once every slot is taken.
    pub fn is_full(&self) -> bool {
        self.tasks.len() >= MAX_TASKS
    }

    /// Pid of the current slot.
    pub fn current(&self) -> Option<Pid> {
        self.current.map(|slot| self.tasks[slot].pid())
    }

    /// Look up a task by pid.
    pub fn task(&self, pid: Pid) -> Option<&Task> {
        self.tasks.get(pid.index())
    }

    /// All populated slots in pid order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Console sink.
    pub fn console(&self) -> &C {
        &self.console
    }

    /// One timer tick: save the interrupted context, run the policy, and
    /// return the context to resume.
    pub fn schedule(&mut self, ctx: &CpuState, tick: u64) -> CpuState {
        if self.tasks.is_empty() {
            return *ctx;
        }
        self.persist(ctx);

        let next = match self.config.policy {
            SchedPolicy::RoundRobin => round_robin::on_tick(self, tick),
            SchedPolicy::StaticPriority => static_priority::on_tick(self, tick),
            SchedPolicy::Dynamic => dynamic::on_tick(self, tick),
        };
        self.resume(next, ctx)
    }

    /// Pick a new task outside of a timer tick.
    ///
    /// Used by the syscall path after the caller blocked or exited. Runs
    /// only the policy's selection step: no aging, admission or dumps.
    pub fn reschedule(&mut self, ctx: &CpuState) -> CpuState {
        if self.tasks.is_empty() {
            return *ctx;
        }
        self.persist(ctx);

        let next = match self.config.policy {
            SchedPolicy::RoundRobin => round_robin::select(self),
            SchedPolicy::StaticPriority => static_priority::select(self),
            SchedPolicy::Dynamic => dynamic::select(self),
        };
        self.resume(next, ctx)
    }

    /// Save the interrupted task's live registers into its slot.
    fn persist(&mut self, ctx: &CpuState) {
        if let Some(slot) = self.current {
            self.tasks[slot].save_context(ctx);
        }
    }

    fn resume(&self, next: Option<usize>, ctx: &CpuState) -> CpuState {
        match next {
            Some(slot) => self.tasks[slot].context(),
            None => {
                log::trace!("no eligible task, resuming interrupted context");
                *ctx
            }
        }
    }

    /// Highest-priority slot accepted by `eligible`.
    ///
    /// Strict comparison: among equal priorities the lowest index wins.
    pub(crate) fn highest_priority(&self, eligible: impl Fn(&Task) -> bool) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (slot, task) in self.tasks.iter().enumerate() {
            if !eligible(task) {
                continue;
            }
            match best {
                Some(b) if !task.priority().outranks(self.tasks[b].priority()) => {}
                _ => best = Some(slot),
            }
        }
        best
    }

    /// Move the RUNNING mark from the current slot to `next`.
    pub(crate) fn promote(&mut self, next: usize) {
        if let Some(slot) = self.current {
            if self.tasks[slot].state() == TaskState::Running {
                self.tasks[slot].set_state(TaskState::Ready);
            }
        }
        self.tasks[next].set_state(TaskState::Running);
        self.current = Some(next);
    }

    /// Write a plain status line to the console.
    pub(crate) fn notice(&mut self, args: fmt::Arguments) {
        let _ = self.console.write_fmt(args);
        let _ = self.console.write_char('\n');
    }

    /// Fixed busy-wait so diagnostic dumps stay on screen long enough to read.
    pub(crate) fn pause(&self) {
        for _ in 0..self.config.pause_spins {
            core::hint::spin_loop();
        }
    }
}
