use std::cmp::Reverse;
use std::collections::BinaryHeap;

use super::{Admission, Context, Cpu, ReadyEntry, Scheduler, Selection};
use crate::{Algorithm, Error, Options, Processes, Result, Time};

/// Shortest remaining time.
///
/// Ready processes are ranked by their service time minus the CPU time they have consumed so
/// far; ties go to the process that became ready first.
///
/// By default, the decision is only made when the CPU becomes idle: a running burst is never
/// interrupted. With the `preemptive = true` option, a process that becomes ready with strictly
/// less remaining time than the running one takes the CPU away from it.
#[derive(Debug)]
pub struct ShortestRemainingTime {
    cpu: Cpu,
    preemptive: bool,
    ready: BinaryHeap<Reverse<(Time, u64, ReadyEntry)>>,
    next_seq: u64,
}

impl ShortestRemainingTime {
    /// Constructs a new SRT scheduler.
    ///
    /// Requires `service_given` and `alpha` options; accepts an optional `preemptive` flag.
    ///
    /// # Errors
    ///
    /// Returns an error if options are missing, unexpected, or invalid. Service time estimation
    /// is not supported, so `service_given` must be `true`.
    pub fn new(options: &Options) -> Result<Self> {
        options.validate_keys(Algorithm::Srt)?;
        require_service_given(options)?;
        Ok(Self::with_preemption(
            options.flag_or_default("preemptive", false)?,
        ))
    }

    fn with_preemption(preemptive: bool) -> Self {
        Self {
            cpu: Cpu::default(),
            preemptive,
            ready: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Whether a running burst can be interrupted.
    #[must_use]
    pub fn is_preemptive(&self) -> bool {
        self.preemptive
    }

    /// Takes the CPU away from the running process if a ready one has less time remaining.
    fn preempt(&mut self, ctx: &mut Context<'_>) {
        let running = match self.cpu.running() {
            Some(running) => *running,
            None => return,
        };
        let shortest = match self.ready.peek() {
            Some(Reverse((remaining, _, _))) => *remaining,
            None => return,
        };
        let unrun = running.until() - ctx.clock;
        let process = &mut ctx.processes[running.process];
        if shortest >= process.remaining_time() + unrun {
            return;
        }
        let cancelled = ctx.events.remove_all_for(running.process);
        debug_assert_eq!(cancelled, 1, "running process must have exactly one pending event");
        process.restore_burst(unrun);
        process.refund(unrun);
        self.cpu.release(running.process);
        log::debug!(
            "[{}] process {} preempted with {} left of its burst",
            ctx.clock,
            running.process,
            unrun
        );
        self.admit(
            ReadyEntry::new(running.process, ctx.clock),
            Admission::Preemption,
            ctx.processes,
        );
    }
}

/// Rejects configurations asking for service time estimation.
pub(super) fn require_service_given(options: &Options) -> Result<()> {
    options.fraction("alpha")?;
    if options.flag("service_given")? {
        Ok(())
    } else {
        Err(Error::InvalidConfiguration(String::from(
            "service time estimation is not supported; set `service_given = true`",
        )))
    }
}

impl Scheduler for ShortestRemainingTime {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Srt
    }

    fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    fn admit(&mut self, entry: ReadyEntry, _: Admission, processes: &Processes) {
        let remaining = processes[entry.process].remaining_time();
        self.ready.push(Reverse((remaining, self.next_seq, entry)));
        self.next_seq += 1;
    }

    fn select(&mut self, _: Time, _: &mut Processes) -> Option<Selection> {
        self.ready
            .pop()
            .map(|Reverse((_, _, entry))| Selection::to_completion(entry))
    }

    fn num_ready(&self) -> usize {
        self.ready.len()
    }

    fn schedule(&mut self, ctx: &mut Context<'_>) {
        if self.preemptive {
            self.preempt(ctx);
        }
        self.dispatch(ctx);
    }
}
