//! Process Manager
//!
//! Lifecycle operations on the task table. Every operation that acts on
//! behalf of a caller takes the caller's live context, since its saved copy
//! in the slot is only refreshed on timer ticks.

use core::fmt::Write;

use super::{ForkVariant, TaskError, WaitOutcome, WaitRejection};
use crate::scheduler::{CpuState, Pid, Priority, Task, TaskState, TaskTable};

/// Copy `src` into `dest` as an independent duplicate.
///
/// Identity, wait bookkeeping and the full stack are copied; the saved
/// context keeps the same offset inside the new buffer.
pub fn add_task(src: &Task, dest: &mut Task) {
    dest.copy_from(src);
}

impl<C: Write> TaskTable<C> {
    /// Admit the bootstrap task into slot 0 with priority 1.
    pub fn init_task(&mut self, bootstrap: &Task) -> Result<Pid, TaskError> {
        if !self.tasks.is_empty() {
            return Err(TaskError::AlreadyInitialized);
        }

        let mut slot = Task::blank();
        add_task(bootstrap, &mut slot);
        slot.set_priority(Priority::BOOTSTRAP);
        let pid = slot.pid();
        self.tasks.push(slot);

        log::debug!("admitted bootstrap task pid {}", pid);
        Ok(pid)
    }

    /// Duplicate the running task into the next free slot.
    ///
    /// Returns the child's pid. The child's result register reads 0; the
    /// parent's result is left to the caller.
    pub fn fork(&mut self, variant: ForkVariant, ctx: &CpuState) -> Result<Pid, TaskError> {
        if self.is_full() {
            log::warn!("fork failed: all {} slots in use", self.count());
            return Err(TaskError::CapacityExceeded);
        }
        let parent = self.current.ok_or(TaskError::NoCurrentTask)?;

        // The child copies the parent's stack, so bring it up to date first.
        self.tasks[parent].save_context(ctx);

        let slot = self.tasks.len();
        let mut child = self.tasks[parent].fork_child(Pid(slot));
        variant.admit(&mut child, slot);
        let pid = child.pid();
        self.tasks.push(child);

        log::debug!(
            "pid {} forked pid {} ({:?})",
            self.tasks[parent].pid(),
            pid,
            variant
        );
        Ok(pid)
    }

    /// Block the running task until the task named in the argument register
    /// exits.
    ///
    /// The result register of `ctx` is set to 1 when the caller blocked and
    /// to 0 when the wait was rejected.
    pub fn wait(&mut self, ctx: &mut CpuState) -> Result<WaitOutcome, TaskError> {
        let caller = self.current.ok_or(TaskError::NoCurrentTask)?;
        let target = ctx.syscall_arg() as usize;
        let caller_pid = self.tasks[caller].pid();

        self.notice(format_args!(
            "PID {} is waiting for PID {}...",
            caller_pid, target
        ));

        let rejection = match self.tasks.get(target) {
            None => Some(WaitRejection::NoSuchTask),
            Some(task) if task.is_terminated() => Some(WaitRejection::AlreadyTerminated),
            Some(_) if target == caller => Some(WaitRejection::SelfWait),
            Some(_) => None,
        };

        let outcome = match rejection {
            Some(reason) => {
                log::warn!("pid {}: wait on {} rejected ({:?})", caller_pid, target, reason);
                WaitOutcome::Rejected(reason)
            }
            None => {
                self.tasks[target].set_awaited_by_parent(true);
                let task = &mut self.tasks[caller];
                task.set_state(TaskState::Blocked);
                task.add_wait();
                log::debug!(
                    "pid {} blocked on pid {} (waiting for {})",
                    caller_pid,
                    target,
                    task.wait_count()
                );
                WaitOutcome::Blocked
            }
        };

        ctx.set_syscall_result(outcome.result_code());
        self.tasks[caller].save_context(ctx);
        Ok(outcome)
    }

    /// Terminate the running task and release a waiting parent.
    ///
    /// The parent only becomes READY once its outstanding wait count drops
    /// to zero.
    pub fn exit(&mut self, ctx: &CpuState) -> Result<Pid, TaskError> {
        let slot = self.current.ok_or(TaskError::NoCurrentTask)?;
        let pid = self.tasks[slot].pid();

        if self.tasks[slot].is_terminated() {
            log::warn!("pid {} exited twice", pid);
            return Ok(pid);
        }

        self.tasks[slot].save_context(ctx);
        self.tasks[slot].set_state(TaskState::Terminated);
        self.notice(format_args!("Process with PID {} exited.", pid));

        if self.tasks[slot].awaited_by_parent() {
            let ppid = self.tasks[slot].ppid();
            if let Some(parent) = self.tasks.get_mut(ppid.index()) {
                if parent.state() == TaskState::Blocked && parent.finish_wait() == 0 {
                    parent.set_state(TaskState::Ready);
                    log::debug!("pid {} unblocked by exit of pid {}", ppid, pid);
                }
            }
        }

        log::debug!("pid {} terminated", pid);
        Ok(pid)
    }

    /// Pid of the running task.
    pub fn getpid(&self) -> Result<Pid, TaskError> {
        self.current().ok_or(TaskError::NoCurrentTask)
    }
}
