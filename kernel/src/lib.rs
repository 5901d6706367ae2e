//! Taskcore Kernel Library
//!
//! Process-management core of a single-core kernel: the task table, the
//! fork/wait/exit lifecycle and three tick-driven schedulers.
//!
//! # Entry points
//!
//! - [`scheduler::init`] admits the bootstrap task.
//! - [`scheduler::timer_tick`] is called from the timer interrupt.
//! - [`syscall::handle`] is called from the syscall interrupt.
//!
//! The library is `no_std` in kernel builds; host unit tests link `std`.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

extern crate alloc;

pub mod config;
pub mod gdt;
pub mod process;
pub mod scheduler;
pub mod serial;
pub mod syscall;

#[cfg(test)]
mod tests;
