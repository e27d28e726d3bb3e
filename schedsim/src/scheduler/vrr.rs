use std::collections::VecDeque;

use super::{Admission, Cpu, ReadyEntry, Scheduler, Selection};
use crate::{Algorithm, Options, Process, Processes, Result, Time};

/// Virtual round robin.
///
/// Preemptive at the time quantum. A process returning from I/O before using up its previous
/// quantum goes to the auxiliary queue, which is always served first, and may only run for the
/// unused remainder of that quantum.
#[derive(Debug)]
pub struct VirtualRoundRobin {
    cpu: Cpu,
    quantum: Time,
    ready: VecDeque<ReadyEntry>,
    auxiliary: VecDeque<ReadyEntry>,
}

impl VirtualRoundRobin {
    /// Constructs a new VRR scheduler. Requires a positive `quantum` option.
    ///
    /// # Errors
    ///
    /// Returns an error if `quantum` is missing or invalid, or if other options are given.
    pub fn new(options: &Options) -> Result<Self> {
        options.validate_keys(Algorithm::Vrr)?;
        Ok(Self::with_quantum(options.positive("quantum")?))
    }

    fn with_quantum(quantum: Time) -> Self {
        Self {
            cpu: Cpu::default(),
            quantum,
            ready: VecDeque::new(),
            auxiliary: VecDeque::new(),
        }
    }

    /// Time quantum.
    #[must_use]
    pub fn quantum(&self) -> Time {
        self.quantum
    }
}

impl Scheduler for VirtualRoundRobin {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Vrr
    }

    fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    fn admit(&mut self, entry: ReadyEntry, admission: Admission, processes: &Processes) {
        let credit = self
            .quantum
            .saturating_sub(processes[entry.process].last_cpu_access_duration());
        if admission == Admission::Unblock && credit > 0 {
            self.auxiliary.push_back(entry);
        } else {
            self.ready.push_back(entry);
        }
    }

    fn select(&mut self, _: Time, processes: &mut Processes) -> Option<Selection> {
        if let Some(entry) = self.auxiliary.pop_front() {
            let used = processes[entry.process].last_cpu_access_duration();
            Some(Selection::sliced(entry, self.quantum - used))
        } else {
            let quantum = self.quantum;
            self.ready
                .pop_front()
                .map(|entry| Selection::sliced(entry, quantum))
        }
    }

    fn num_ready(&self) -> usize {
        self.ready.len() + self.auxiliary.len()
    }

    fn dispatched(&mut self, process: &mut Process, granted: Time) {
        process.set_last_cpu_access_duration(granted);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::scheduler::test::{count, drive, finish_times, processes};
    use crate::{EventKind, ProcessId};

    #[test]
    fn test_requires_positive_quantum() {
        assert!(VirtualRoundRobin::new(&Options::default()).is_err());
        let mut options = Options::default();
        options.insert("quantum", "0");
        assert!(VirtualRoundRobin::new(&options).is_err());
        let mut options = Options::default();
        options.insert("quantum", "3");
        assert_eq!(VirtualRoundRobin::new(&options).unwrap().quantum(), 3);
    }

    #[test]
    fn test_single_long_burst() {
        let mut scheduler = VirtualRoundRobin::with_quantum(4);
        let mut procs = processes("0 10");
        let events = drive(&mut scheduler, &mut procs);
        let kinds: Vec<_> = events.iter().map(|e| (e.kind, e.time)).collect();
        assert_eq!(
            kinds,
            vec![
                (EventKind::Arrive, 0),
                (EventKind::Timeout, 4),
                (EventKind::Timeout, 8),
                (EventKind::Exit, 10),
            ]
        );
        let process = &procs[ProcessId::from(0)];
        assert_eq!(process.execution_time_so_far(), 10);
        assert!(process.stats().response_times().is_empty());
    }

    #[test]
    fn test_auxiliary_queue_first() {
        // P0 is I/O bound: it runs 1, blocks for 1, and returns with 2 units of credit.
        // P1 is CPU bound and keeps timing out.
        let mut scheduler = VirtualRoundRobin::with_quantum(3);
        let mut procs = processes("0 1 1 2\n0 9");
        let events = drive(&mut scheduler, &mut procs);
        // 0..1 P0 (blocks until 2), 1..4 P1 (timeout), 4..6 P0 from auxiliary queue with a
        // slice of 2 (exits), 6..12 P1.
        assert_eq!(finish_times(&procs), vec![6, 12]);
        assert_eq!(count(&events, EventKind::Timeout), 2);
        assert_eq!(procs[ProcessId::from(0)].stats().response_times(), &[2]);
    }

    #[test]
    fn test_unblock_admission() {
        let mut procs = processes("0 2 1 1");
        let pid = ProcessId::from(0);
        let mut scheduler = VirtualRoundRobin::with_quantum(2);

        procs[pid].set_last_cpu_access_duration(2);
        scheduler.admit(ReadyEntry::new(pid, 0), Admission::Unblock, &procs);
        assert_eq!((scheduler.ready.len(), scheduler.auxiliary.len()), (1, 0));

        procs[pid].set_last_cpu_access_duration(1);
        scheduler.admit(ReadyEntry::new(pid, 0), Admission::Unblock, &procs);
        assert_eq!((scheduler.ready.len(), scheduler.auxiliary.len()), (1, 1));

        scheduler.admit(ReadyEntry::new(pid, 0), Admission::Timeout, &procs);
        assert_eq!((scheduler.ready.len(), scheduler.auxiliary.len()), (2, 1));

        let selection = scheduler.select(0, &mut procs).unwrap();
        assert_eq!(selection.slice, Some(1));
        assert_eq!(scheduler.num_ready(), 2);
    }
}
