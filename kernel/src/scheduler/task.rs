//! Task definition.
//!
//! A task owns a fixed-size stack buffer and remembers where its saved
//! [`CpuState`] lives inside that buffer as a plain byte offset. No pointer
//! into the buffer is ever stored, so copying a stack (fork, admission) only
//! has to carry the offset across.

use alloc::boxed::Box;
use alloc::vec;
use core::fmt;

use x86_64::structures::gdt::SegmentSelector;

use super::context::CpuState;
use super::priority::Priority;
use crate::config::TASK_STACK_SIZE;

/// Process identifier. Doubles as the task's slot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pid(pub usize);

impl Pid {
    /// The bootstrap task (always 0).
    pub const BOOTSTRAP: Pid = Pid(0);

    /// Slot index of this pid in the task table.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Task state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Task is ready to run.
    Ready,
    /// Task is currently running.
    Running,
    /// Task is blocked waiting for children to exit (or for staged admission).
    Blocked,
    /// Task has terminated. Never scheduled again.
    Terminated,
}

impl TaskState {
    /// Label shown in the process table.
    pub fn label(self) -> &'static str {
        match self {
            TaskState::Ready => "READY",
            TaskState::Running => "RUNNING",
            TaskState::Blocked => "BLOCKED",
            TaskState::Terminated => "TERMINATED",
        }
    }
}

/// Offset of the context of a task that has never run: the top of its stack.
const INITIAL_CONTEXT_OFFSET: usize = TASK_STACK_SIZE - CpuState::SIZE;

/// A task in the system.
pub struct Task {
    /// Process ID (slot index).
    pid: Pid,
    /// Creator's process ID.
    ppid: Pid,
    /// Task state.
    state: TaskState,
    /// Task priority.
    priority: Priority,
    /// Number of child exits this task is still blocked on.
    wait_count: u32,
    /// Set while the parent has an active wait on this task.
    awaited_by_parent: bool,
    /// Owned stack buffer, always `TASK_STACK_SIZE` bytes.
    stack: Box<[u8]>,
    /// Position of the saved context inside `stack`.
    /// Always `<= TASK_STACK_SIZE - CpuState::SIZE`.
    context_offset: usize,
}

impl Task {
    /// Create a fresh kernel task that will start at `entry`.
    ///
    /// The selectors come from the descriptor table; the context is placed
    /// at the top of the new stack.
    pub fn new(entry: u64, code: SegmentSelector, data: SegmentSelector) -> Self {
        let mut task = Task::blank();
        task.save_context(&CpuState::new_kernel(entry, code, data));
        task
    }

    /// Zeroed slot: pid 0, READY, default priority, context at the stack top.
    pub(crate) fn blank() -> Self {
        Task {
            pid: Pid::BOOTSTRAP,
            ppid: Pid::BOOTSTRAP,
            state: TaskState::Ready,
            priority: Priority::DEFAULT,
            wait_count: 0,
            awaited_by_parent: false,
            stack: vec![0u8; TASK_STACK_SIZE].into_boxed_slice(),
            context_offset: INITIAL_CONTEXT_OFFSET,
        }
    }

    /// Make `self` an independent duplicate of `src`.
    ///
    /// Copies identity, state and wait bookkeeping, then the whole stack
    /// byte-for-byte, and finally re-applies the source's context offset to
    /// the destination buffer. Priority is left alone.
    pub fn copy_from(&mut self, src: &Task) {
        self.pid = src.pid;
        self.ppid = src.ppid;
        self.state = src.state;
        self.wait_count = src.wait_count;
        self.awaited_by_parent = src.awaited_by_parent;
        self.stack.copy_from_slice(&src.stack);
        self.context_offset = src.context_offset;
    }

    /// Build the child half of a fork.
    ///
    /// The child gets the parent's stack and context position, `pid` as its
    /// identity, and a zero in the syscall result register so it can tell
    /// itself apart from the parent. State and priority stay at their blank
    /// defaults for the fork variant to set.
    pub(crate) fn fork_child(&self, pid: Pid) -> Task {
        let mut child = Task::blank();
        child.pid = pid;
        child.ppid = self.pid;
        child.context_offset = self.context_offset;
        child.stack.copy_from_slice(&self.stack);

        let mut ctx = child.context();
        ctx.set_syscall_result(0);
        child.save_context(&ctx);
        child
    }

    /// Get the process ID.
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Get the parent process ID.
    pub fn ppid(&self) -> Pid {
        self.ppid
    }

    /// Get the task state.
    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Set the task state.
    pub fn set_state(&mut self, state: TaskState) {
        self.state = state;
    }

    /// True for READY tasks.
    pub fn is_ready(&self) -> bool {
        self.state == TaskState::Ready
    }

    /// True for TERMINATED tasks.
    pub fn is_terminated(&self) -> bool {
        self.state == TaskState::Terminated
    }

    /// Get the task priority.
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Set the task priority.
    pub fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    /// Number of outstanding child exits this task waits for.
    pub fn wait_count(&self) -> u32 {
        self.wait_count
    }

    /// Whether the parent is waiting on this task.
    pub fn awaited_by_parent(&self) -> bool {
        self.awaited_by_parent
    }

    pub(crate) fn set_awaited_by_parent(&mut self, awaited: bool) {
        self.awaited_by_parent = awaited;
    }

    pub(crate) fn add_wait(&mut self) {
        self.wait_count = self.wait_count.saturating_add(1);
    }

    /// Record one child exit; returns the number still outstanding.
    pub(crate) fn finish_wait(&mut self) -> u32 {
        self.wait_count = self.wait_count.saturating_sub(1);
        self.wait_count
    }

    /// Byte offset of the saved context inside the stack buffer.
    pub fn context_offset(&self) -> usize {
        self.context_offset
    }

    /// Raw stack buffer.
    pub fn stack(&self) -> &[u8] {
        &self.stack
    }

    /// Read the saved context.
    pub fn context(&self) -> CpuState {
        CpuState::read_from(&self.stack[self.context_offset..])
    }

    /// Overwrite the saved context in place.
    pub fn save_context(&mut self, ctx: &CpuState) {
        ctx.write_to(&mut self.stack[self.context_offset..]);
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("pid", &self.pid)
            .field("ppid", &self.ppid)
            .field("state", &self.state)
            .field("priority", &self.priority)
            .field("wait_count", &self.wait_count)
            .field("awaited_by_parent", &self.awaited_by_parent)
            .field("context_offset", &self.context_offset)
            .finish_non_exhaustive()
    }
}
