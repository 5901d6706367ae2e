//! Execution context records.
//!
//! A [`CpuState`] is the register snapshot the interrupt entry stub pushes
//! before calling into the scheduler, and the snapshot the exit stub pops
//! when it resumes a task. The scheduler treats it as opaque except for the
//! three syscall channels:
//!
//! | Register | Role |
//! | :------: | ---- |
//! | `rax` | syscall number |
//! | `rbx` | argument (e.g. the pid passed to `wait`) |
//! | `rcx` | result written back to the caller |

use core::mem::size_of;
use core::ptr;

use x86_64::registers::rflags::RFlags;
use x86_64::structures::gdt::SegmentSelector;

/// Saved processor state of a suspended task.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct CpuState {
    // General purpose registers
    pub rax: u64,
    pub rbx: u64,
    pub rcx: u64,
    pub rdx: u64,
    pub rsi: u64,
    pub rdi: u64,
    pub rbp: u64,
    pub r8: u64,
    pub r9: u64,
    pub r10: u64,
    pub r11: u64,
    pub r12: u64,
    pub r13: u64,
    pub r14: u64,
    pub r15: u64,

    /// Fault/error code (0 for interrupts that push none).
    pub error: u64,

    // Interrupt frame (pushed by CPU on interrupt)
    /// Instruction pointer
    pub rip: u64,
    /// Code segment
    pub cs: u64,
    /// RFLAGS register
    pub rflags: u64,
    /// Stack pointer
    pub rsp: u64,
    /// Stack segment
    pub ss: u64,
}

/// RFLAGS bit 1 is reserved and must always read as 1.
const RFLAGS_RESERVED: u64 = 1 << 1;

/// Default RFLAGS of a new task: interrupts enabled plus the reserved bit (0x202).
pub const DEFAULT_RFLAGS: u64 = RFlags::INTERRUPT_FLAG.bits() | RFLAGS_RESERVED;

impl CpuState {
    /// Size of the record as laid out inside a task stack.
    pub const SIZE: usize = size_of::<CpuState>();

    /// Context of a kernel task that has never run.
    ///
    /// General registers are zeroed; `rsp` is left for the switcher to fill
    /// in because the core only knows stack offsets, not addresses.
    pub fn new_kernel(entry: u64, code: SegmentSelector, data: SegmentSelector) -> Self {
        CpuState {
            rip: entry,
            cs: u64::from(code.0),
            rflags: DEFAULT_RFLAGS,
            ss: u64::from(data.0),
            ..CpuState::default()
        }
    }

    /// Decode a context from the first [`CpuState::SIZE`] bytes of `bytes`.
    ///
    /// Panics if `bytes` is shorter than a context; task stacks guarantee it
    /// never is.
    pub fn read_from(bytes: &[u8]) -> Self {
        let bytes = &bytes[..Self::SIZE];
        // SAFETY: `bytes` holds exactly `SIZE` readable bytes, `CpuState` is
        // `repr(C)` with only `u64` fields (no padding, every bit pattern is
        // valid), and `read_unaligned` places no alignment requirement.
        unsafe { ptr::read_unaligned(bytes.as_ptr().cast::<CpuState>()) }
    }

    /// Encode this context into the first [`CpuState::SIZE`] bytes of `bytes`.
    pub fn write_to(&self, bytes: &mut [u8]) {
        let bytes = &mut bytes[..Self::SIZE];
        // SAFETY: `bytes` is an exclusively borrowed region of exactly `SIZE`
        // bytes and `write_unaligned` places no alignment requirement.
        unsafe { ptr::write_unaligned(bytes.as_mut_ptr().cast::<CpuState>(), *self) }
    }

    /// Get syscall number.
    #[inline]
    pub fn syscall_num(&self) -> u64 {
        self.rax
    }

    /// Get the syscall argument channel.
    #[inline]
    pub fn syscall_arg(&self) -> u64 {
        self.rbx
    }

    /// Get the syscall result channel.
    #[inline]
    pub fn syscall_result(&self) -> i64 {
        self.rcx as i64
    }

    /// Set the syscall result channel; negative values are sign-extended.
    #[inline]
    pub fn set_syscall_result(&mut self, value: i64) {
        self.rcx = value as u64;
    }
}
