//! Kernel configuration constants.
//!
//! This module contains compile-time configuration for the process core.
//! Values here affect task table capacity, stack layout, and the tick
//! thresholds that drive each scheduling policy.

/// Maximum number of task slots.
pub const MAX_TASKS: usize = 256;

/// Stack buffer owned by every task (4 KB).
pub const TASK_STACK_SIZE: usize = 4096;

/// Round-robin renders the process table for ticks strictly inside this window.
pub const ROUND_ROBIN_TRACE_WINDOW: (u64, u64) = (10, 20);

/// Tick at which the static-priority policy admits staged tasks.
pub const STAGED_ADMISSION_TICK: u64 = 5;

/// The static-priority policy prints a trace line for ticks below this value.
pub const STATIC_PRIORITY_TRACE_UNTIL: u64 = 15;

/// The dynamic policy ages the first child every this many ticks.
pub const AGING_INTERVAL: u64 = 5;

/// The dynamic policy renders the process table on aging ticks below this value.
pub const DYNAMIC_TRACE_UNTIL: u64 = 100;

/// Busy-wait iterations after each diagnostic dump.
pub const DIAGNOSTIC_PAUSE_SPINS: u64 = 100_000_000;

/// Scheduling policy driven by the timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedPolicy {
    /// Cooperative round-robin over READY tasks.
    RoundRobin,
    /// Preemptive static priority with staged admission.
    StaticPriority,
    /// Priority aging of the first forked child.
    Dynamic,
}

impl SchedPolicy {
    /// Resolve the policy selected by cargo features.
    pub const fn from_build() -> Self {
        if cfg!(feature = "policy-dynamic") {
            SchedPolicy::Dynamic
        } else if cfg!(feature = "policy-static-priority") {
            SchedPolicy::StaticPriority
        } else {
            SchedPolicy::RoundRobin
        }
    }

    /// Short name used in log records.
    pub fn name(self) -> &'static str {
        match self {
            SchedPolicy::RoundRobin => "round-robin",
            SchedPolicy::StaticPriority => "static-priority",
            SchedPolicy::Dynamic => "dynamic",
        }
    }
}

impl Default for SchedPolicy {
    fn default() -> Self {
        Self::from_build()
    }
}

/// Scheduler tuning parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedConfig {
    /// Active policy
    pub policy: SchedPolicy,
    /// Open tick interval in which round-robin dumps the process table
    pub round_robin_trace_window: (u64, u64),
    /// Tick at which staged (blocked) tasks are admitted
    pub staged_admission_tick: u64,
    /// Static-priority trace lines are printed below this tick
    pub static_priority_trace_until: u64,
    /// Aging period of the dynamic policy
    pub aging_interval: u64,
    /// Dynamic policy dumps stop at this tick
    pub dynamic_trace_until: u64,
    /// Busy-wait length after a dump; 0 disables the pause
    pub pause_spins: u64,
}

impl SchedConfig {
    /// Configuration built from the constants above.
    pub const fn new(policy: SchedPolicy) -> Self {
        Self {
            policy,
            round_robin_trace_window: ROUND_ROBIN_TRACE_WINDOW,
            staged_admission_tick: STAGED_ADMISSION_TICK,
            static_priority_trace_until: STATIC_PRIORITY_TRACE_UNTIL,
            aging_interval: AGING_INTERVAL,
            dynamic_trace_until: DYNAMIC_TRACE_UNTIL,
            pause_spins: DIAGNOSTIC_PAUSE_SPINS,
        }
    }

    /// Same thresholds without the diagnostic busy-wait.
    pub const fn without_pause(mut self) -> Self {
        self.pause_spins = 0;
        self
    }

    /// True when `tick` is an aging tick of the dynamic policy.
    pub fn is_aging_tick(&self, tick: u64) -> bool {
        self.aging_interval != 0 && tick % self.aging_interval == 0
    }
}

impl Default for SchedConfig {
    fn default() -> Self {
        Self::new(SchedPolicy::from_build())
    }
}
