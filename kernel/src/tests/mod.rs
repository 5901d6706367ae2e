//! Kernel Unit Tests Module
//!
//! Scenario tests that drive the task table through its public entry
//! points.

mod scheduler_tests;

use alloc::string::String;

use crate::config::{SchedConfig, SchedPolicy};
use crate::scheduler::{CpuState, Pid, Task, TaskTable};

/// Table with only the bootstrap task admitted, nothing scheduled yet.
pub(crate) fn booted(policy: SchedPolicy) -> TaskTable<String> {
    let mut table = TaskTable::new(SchedConfig::new(policy).without_pause(), String::new());
    let mut boot = Task::blank();
    boot.save_context(&CpuState {
        rip: 0x1000,
        ..CpuState::default()
    });
    table.init_task(&boot).unwrap();
    table
}

/// Context of a task about to make a syscall.
pub(crate) fn syscall_ctx(number: u64, arg: u64) -> CpuState {
    CpuState {
        rax: number,
        rbx: arg,
        ..CpuState::default()
    }
}

/// Make `pid` the running slot, the way a tick would.
pub(crate) fn run(table: &mut TaskTable<String>, pid: Pid) {
    table.current = Some(pid.index());
}
