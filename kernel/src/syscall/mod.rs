//! System call handling module.
//!
//! Syscalls arrive as the caller's saved register state: `rax` carries the
//! number, `rbx` the argument and `rcx` receives the result. Dispatch
//! returns the context to resume, which is the caller's own context unless
//! the call blocked or terminated it.

use core::fmt::Write;

use crate::process::{ForkVariant, TaskError, WaitOutcome};
use crate::scheduler::{self, CpuState, TaskTable};

/// Result written back when a syscall fails.
pub const SYSCALL_FAILURE: i64 = -1;

/// System call numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u64)]
pub enum SyscallNumber {
    /// Exit the current process.
    Exit = 0,
    /// Fork process.
    Fork = 7,
    /// Wait for child process.
    Wait = 9,
    /// Get process ID.
    GetPid = 24,
}

impl TryFrom<u64> for SyscallNumber {
    type Error = ();

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SyscallNumber::Exit),
            7 => Ok(SyscallNumber::Fork),
            9 => Ok(SyscallNumber::Wait),
            24 => Ok(SyscallNumber::GetPid),
            _ => Err(()),
        }
    }
}

/// Handle a syscall against the global task table.
///
/// Before [`scheduler::init`] the caller's context comes back unchanged.
pub fn handle(ctx: &CpuState) -> CpuState {
    scheduler::with_table(|table| dispatch(table, ctx)).unwrap_or(*ctx)
}

/// Dispatch a system call.
pub fn dispatch<C: Write>(table: &mut TaskTable<C>, ctx: &CpuState) -> CpuState {
    let mut ctx = *ctx;

    let syscall = match SyscallNumber::try_from(ctx.syscall_num()) {
        Ok(syscall) => syscall,
        Err(()) => {
            log::warn!("unknown syscall {}", ctx.syscall_num());
            ctx.set_syscall_result(SYSCALL_FAILURE);
            return ctx;
        }
    };
    log::trace!("syscall {:?} from {:?}", syscall, table.current());

    match syscall {
        SyscallNumber::Fork => {
            let variant = ForkVariant::for_policy(table.config().policy);
            let result = table.fork(variant, &ctx).map(|pid| pid.index() as i64);
            ctx.set_syscall_result(result_or_failure(syscall, result));
            ctx
        }
        SyscallNumber::Wait => match table.wait(&mut ctx) {
            Ok(WaitOutcome::Blocked) => table.reschedule(&ctx),
            Ok(WaitOutcome::Rejected(_)) => ctx,
            Err(err) => {
                ctx.set_syscall_result(result_or_failure(syscall, Err(err)));
                ctx
            }
        },
        SyscallNumber::Exit => match table.exit(&ctx) {
            Ok(_) => table.reschedule(&ctx),
            Err(err) => {
                ctx.set_syscall_result(result_or_failure(syscall, Err(err)));
                ctx
            }
        },
        SyscallNumber::GetPid => {
            let result = table.getpid().map(|pid| pid.index() as i64);
            ctx.set_syscall_result(result_or_failure(syscall, result));
            ctx
        }
    }
}

fn result_or_failure(syscall: SyscallNumber, result: Result<i64, TaskError>) -> i64 {
    match result {
        Ok(value) => value,
        Err(err) => {
            log::warn!("{:?} failed: {}", syscall, err);
            SYSCALL_FAILURE
        }
    }
}
