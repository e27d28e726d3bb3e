use std::ops::{Index, IndexMut};

use delegate::delegate;
use serde::Serialize;

use crate::{Error, ProcessId, Result, Stats, Time};

/// A single burst of a process's execution plan.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum Activity {
    /// CPU burst of the given duration.
    Cpu(Time),
    /// I/O burst of the given duration.
    Io(Time),
}

impl Activity {
    /// Duration of the burst.
    #[must_use]
    pub fn duration(self) -> Time {
        match self {
            Self::Cpu(d) | Self::Io(d) => d,
        }
    }
}

/// A job consisting of alternating CPU and I/O bursts, starting and ending with a CPU burst.
///
/// Activities are kept as a stack with the next activity on top, so both reading and removing
/// the next activity take constant time.
#[derive(Debug, Clone, PartialEq)]
pub struct Process {
    id: ProcessId,
    activities: Vec<Time>,
    stats: Stats,
    first_cpu_access: bool,
    last_cpu_access_duration: Time,
    last_dispatched_from: usize,
    execution_time_so_far: Time,
}

impl Process {
    /// Constructs a new process arriving at `arrival_time`, with `bursts` listed in execution
    /// order: `cpu, io, cpu, ..., cpu`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProcessSpec`] if there are no bursts, if the last burst is not a
    /// CPU burst (even number of bursts), if the total CPU demand is zero, or if the arrival time
    /// plus all bursts does not fit in [`Time`].
    pub fn new(id: ProcessId, arrival_time: Time, bursts: Vec<Time>) -> Result<Self> {
        Self::with_line(id, arrival_time, bursts, usize::from(id) + 1)
    }

    pub(crate) fn with_line(
        id: ProcessId,
        arrival_time: Time,
        mut bursts: Vec<Time>,
        line: usize,
    ) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidProcessSpec {
            line,
            reason: reason.to_string(),
        };
        if bursts.is_empty() {
            return Err(invalid("missing activities"));
        }
        if bursts.len() % 2 == 0 {
            return Err(invalid("no final CPU activity"));
        }
        bursts
            .iter()
            .try_fold(arrival_time, |total, &duration| total.checked_add(duration))
            .ok_or_else(|| invalid("total duration overflows"))?;
        bursts.reverse();
        let service_time: Time = bursts.iter().step_by(2).sum();
        if service_time == 0 {
            return Err(invalid("total CPU demand must be positive"));
        }
        Ok(Self {
            id,
            activities: bursts,
            stats: Stats::new(arrival_time, service_time),
            first_cpu_access: true,
            last_cpu_access_duration: 0,
            last_dispatched_from: 0,
            execution_time_so_far: 0,
        })
    }

    /// Sum of the remaining CPU and I/O durations.
    pub(crate) fn total_duration(&self) -> Time {
        self.activities.iter().sum()
    }

    /// Process ID.
    #[must_use]
    pub fn id(&self) -> ProcessId {
        self.id
    }

    /// Statistics collected so far.
    #[must_use]
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut Stats {
        &mut self.stats
    }

    delegate! {
        to self.stats {
            /// The time the process enters the system.
            #[must_use]
            pub fn arrival_time(&self) -> Time;
            /// Total CPU demand, computed once at creation.
            #[must_use]
            pub fn service_time(&self) -> Time;
        }
    }

    /// Number of activities not yet completed.
    #[must_use]
    pub fn remaining_activities(&self) -> usize {
        self.activities.len()
    }

    /// Returns `true` once every activity has been consumed.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.activities.is_empty()
    }

    /// The activity to execute next, without removing it.
    #[must_use]
    pub fn next_activity(&self) -> Option<Activity> {
        let duration = *self.activities.last()?;
        // The bottom of the stack is always the final CPU burst.
        if self.activities.len() % 2 == 1 {
            Some(Activity::Cpu(duration))
        } else {
            Some(Activity::Io(duration))
        }
    }

    /// Duration of the activity to execute next.
    #[must_use]
    pub fn next_activity_duration(&self) -> Option<Time> {
        self.activities.last().copied()
    }

    /// Removes and returns the next activity.
    pub fn pop_activity(&mut self) -> Option<Activity> {
        let activity = self.next_activity()?;
        self.activities.pop();
        Some(activity)
    }

    /// Shortens the CPU burst on top of the stack by `elapsed`, after it was cut off by a quantum.
    pub(crate) fn truncate_burst(&mut self, elapsed: Time) {
        let top = self
            .activities
            .last_mut()
            .expect("truncating burst of a finished process");
        debug_assert!(*top > elapsed, "truncation must leave a positive remainder");
        *top -= elapsed;
    }

    /// Puts back the unexecuted part of a CPU burst that was popped at dispatch.
    pub(crate) fn restore_burst(&mut self, remaining: Time) {
        debug_assert!(self.activities.len() % 2 == 0, "restored burst must be a CPU burst");
        self.activities.push(remaining);
    }

    /// Returns `true` until the process is dispatched for the first time.
    #[must_use]
    pub fn first_cpu_access(&self) -> bool {
        self.first_cpu_access
    }

    /// CPU time granted at the most recent dispatch.
    #[must_use]
    pub fn last_cpu_access_duration(&self) -> Time {
        self.last_cpu_access_duration
    }

    pub(crate) fn set_last_cpu_access_duration(&mut self, duration: Time) {
        self.last_cpu_access_duration = duration;
    }

    /// Index of the feedback queue the process was most recently dispatched from.
    #[must_use]
    pub fn last_dispatched_from(&self) -> usize {
        self.last_dispatched_from
    }

    pub(crate) fn set_last_dispatched_from(&mut self, level: usize) {
        self.last_dispatched_from = level;
    }

    /// Total CPU time consumed so far.
    #[must_use]
    pub fn execution_time_so_far(&self) -> Time {
        self.execution_time_so_far
    }

    /// Service time not consumed yet.
    #[must_use]
    pub fn remaining_time(&self) -> Time {
        self.service_time() - self.execution_time_so_far
    }

    pub(crate) fn charge(&mut self, time: Time) {
        self.execution_time_so_far += time;
    }

    pub(crate) fn refund(&mut self, time: Time) {
        self.execution_time_so_far -= time;
    }

    /// Records that the process gained the CPU at `clock` after entering a ready queue at
    /// `entry_time`.
    pub(crate) fn record_dispatch(&mut self, clock: Time, entry_time: Time) {
        if self.first_cpu_access {
            self.stats.set_start_time(clock);
            self.first_cpu_access = false;
        }
        self.stats.record_response(clock - entry_time);
    }
}

/// All processes of a simulation, indexed by their IDs.
#[derive(Debug, Clone, Default)]
pub struct Processes(Vec<Process>);

impl Processes {
    /// Number of processes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no processes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over processes in the order of their IDs.
    pub fn iter(&self) -> impl Iterator<Item = &Process> {
        self.0.iter()
    }
}

impl From<Vec<Process>> for Processes {
    fn from(processes: Vec<Process>) -> Self {
        debug_assert!(processes
            .iter()
            .enumerate()
            .all(|(idx, p)| usize::from(p.id()) == idx));
        Self(processes)
    }
}

impl Index<ProcessId> for Processes {
    type Output = Process;
    fn index(&self, id: ProcessId) -> &Process {
        self.0.get(usize::from(id)).expect("process ID out of bounds")
    }
}

impl IndexMut<ProcessId> for Processes {
    fn index_mut(&mut self, id: ProcessId) -> &mut Process {
        self.0
            .get_mut(usize::from(id))
            .expect("process ID out of bounds")
    }
}
