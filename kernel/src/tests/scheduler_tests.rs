//! Scheduler Unit Tests
//!
//! Tick-by-tick scenarios for the three policies.

#[cfg(test)]
mod tests {
    use crate::config::SchedPolicy;
    use crate::process::ForkVariant;
    use crate::scheduler::{CpuState, Pid, Priority, TaskState, TaskTable};
    use crate::tests::{booted, run, syscall_ctx};
    use alloc::string::String;

    fn running_count(table: &TaskTable<String>) -> usize {
        table
            .tasks()
            .iter()
            .filter(|t| t.state() == TaskState::Running)
            .count()
    }

    // ========================================
    // Round-Robin Tests
    // ========================================

    #[test]
    fn test_round_robin_wraps() {
        let mut table = booted(SchedPolicy::RoundRobin);
        run(&mut table, Pid(0));
        let ctx = CpuState::default();
        table.fork(ForkVariant::Plain, &ctx).unwrap();
        table.fork(ForkVariant::Plain, &ctx).unwrap();

        table.schedule(&ctx, 1);
        assert_eq!(table.current(), Some(Pid(1)));
        table.schedule(&ctx, 2);
        assert_eq!(table.current(), Some(Pid(2)));
        table.schedule(&ctx, 3);
        assert_eq!(table.current(), Some(Pid(0)));

        assert_eq!(running_count(&table), 0);
    }

    #[test]
    fn test_round_robin_first_tick_picks_bootstrap() {
        let mut table = booted(SchedPolicy::RoundRobin);
        let interrupted = CpuState {
            rip: 0xdead,
            ..CpuState::default()
        };

        let next = table.schedule(&interrupted, 1);

        assert_eq!(table.current(), Some(Pid(0)));
        assert_eq!(next.rip, 0x1000);
    }

    #[test]
    fn test_round_robin_idles_when_nothing_ready() {
        let mut table = booted(SchedPolicy::RoundRobin);
        run(&mut table, Pid(0));
        table.exit(&CpuState::default()).unwrap();

        let interrupted = CpuState {
            rip: 0xbeef,
            ..CpuState::default()
        };
        let next = table.schedule(&interrupted, 1);

        assert_eq!(next, interrupted);
        assert_eq!(table.current(), Some(Pid(0)));
    }

    // ========================================
    // Static-Priority Tests
    // ========================================

    #[test]
    fn test_static_priority_staging() {
        let mut table = booted(SchedPolicy::StaticPriority);
        run(&mut table, Pid(0));
        let ctx = CpuState::default();

        assert_eq!(table.fork(ForkVariant::StaticPriority, &ctx), Ok(Pid(1)));
        assert_eq!(table.fork(ForkVariant::StaticPriority, &ctx), Ok(Pid(2)));
        assert_eq!(table.task(Pid(1)).unwrap().state(), TaskState::Ready);
        assert_eq!(table.task(Pid(1)).unwrap().priority(), Priority(0));
        assert_eq!(table.task(Pid(2)).unwrap().state(), TaskState::Blocked);
        assert_eq!(table.task(Pid(2)).unwrap().priority(), Priority(1));

        // Bootstrap steps aside by waiting on its first child.
        let mut wait = syscall_ctx(9, 1);
        table.wait(&mut wait).unwrap();

        for tick in 1..5 {
            table.schedule(&ctx, tick);
            assert_eq!(table.current(), Some(Pid(1)));
            assert_eq!(table.task(Pid(2)).unwrap().state(), TaskState::Blocked);
        }

        table.schedule(&ctx, 5);
        assert_eq!(table.current(), Some(Pid(2)));
        assert_eq!(table.task(Pid(1)).unwrap().state(), TaskState::Ready);
        assert_eq!(table.task(Pid(2)).unwrap().state(), TaskState::Running);
        // Slot 0 is not part of staged admission.
        assert_eq!(table.task(Pid(0)).unwrap().state(), TaskState::Blocked);

        assert!(table
            .console()
            .contains("Interrupt Count: 4, Current PID: 1\n"));
        assert!(table
            .console()
            .contains("Interrupt Count: 5, Current PID: 1\n"));
    }

    #[test]
    fn test_static_priority_single_running() {
        let mut table = booted(SchedPolicy::StaticPriority);
        run(&mut table, Pid(0));
        let ctx = CpuState::default();
        for _ in 0..4 {
            table.fork(ForkVariant::StaticPriority, &ctx).unwrap();
        }

        for tick in 1..30 {
            table.schedule(&ctx, tick);
            assert!(running_count(&table) <= 1, "tick {}", tick);
        }
    }

    // ========================================
    // Dynamic Priority Tests
    // ========================================

    #[test]
    fn test_dynamic_aging() {
        let mut table = booted(SchedPolicy::Dynamic);
        run(&mut table, Pid(0));
        let ctx = CpuState::default();
        table.fork(ForkVariant::Dynamic, &ctx).unwrap();
        table.fork(ForkVariant::Dynamic, &ctx).unwrap();
        assert_eq!(table.task(Pid(1)).unwrap().priority(), Priority(0));
        assert_eq!(table.task(Pid(2)).unwrap().priority(), Priority(4));

        for tick in 1..=10 {
            table.schedule(&ctx, tick);
        }
        assert_eq!(table.task(Pid(1)).unwrap().priority(), Priority(2));
        assert_eq!(table.current(), Some(Pid(2)));

        for tick in 11..=19 {
            table.schedule(&ctx, tick);
            assert_eq!(table.current(), Some(Pid(2)));
        }

        // Equal priority at tick 20: the lower index wins.
        table.schedule(&ctx, 20);
        assert_eq!(table.task(Pid(1)).unwrap().priority(), Priority(4));
        assert_eq!(table.current(), Some(Pid(1)));
        assert_eq!(running_count(&table), 1);
    }

    #[test]
    fn test_dynamic_dumps_table_on_aging_ticks() {
        let mut table = booted(SchedPolicy::Dynamic);
        let ctx = CpuState::default();

        for tick in 1..=10 {
            table.schedule(&ctx, tick);
        }

        assert_eq!(table.console().matches(" PID | PPID").count(), 2);
    }

    // ========================================
    // Shared Invariants
    // ========================================

    #[test]
    fn test_terminated_never_selected() {
        for policy in [
            SchedPolicy::RoundRobin,
            SchedPolicy::StaticPriority,
            SchedPolicy::Dynamic,
        ] {
            let mut table = booted(policy);
            run(&mut table, Pid(0));
            let ctx = CpuState::default();
            table.fork(ForkVariant::Plain, &ctx).unwrap();

            run(&mut table, Pid(1));
            table.exit(&ctx).unwrap();

            // Boost the dead task far above everyone else.
            table.tasks[1].set_priority(Priority(100));

            for tick in 1..12 {
                table.schedule(&ctx, tick);
                assert_eq!(table.current(), Some(Pid(0)), "{:?} tick {}", policy, tick);
            }
        }
    }

    #[test]
    fn test_reschedule_skips_tick_hooks() {
        let mut table = booted(SchedPolicy::Dynamic);
        run(&mut table, Pid(0));
        let ctx = CpuState::default();
        table.fork(ForkVariant::Dynamic, &ctx).unwrap();

        table.reschedule(&ctx);

        assert_eq!(table.task(Pid(1)).unwrap().priority(), Priority(0));
        assert!(table.console().is_empty());
        assert_eq!(table.current(), Some(Pid(0)));
    }
}
