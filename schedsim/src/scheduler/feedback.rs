use std::collections::VecDeque;
use std::convert::TryFrom;

use super::{Admission, Cpu, ReadyEntry, Scheduler, Selection};
use crate::{Algorithm, Error, Options, Processes, Result, Time};

/// Multi-level feedback queues.
///
/// There are `num_priorities` FIFO queues, with 0 being the highest priority. Arriving processes
/// enter queue 0. A process that uses up its quantum is demoted by one level, down to the lowest
/// one. A process returning from I/O goes back to the queue it was last dispatched from.
#[derive(Debug)]
pub struct Feedback {
    cpu: Cpu,
    quantum: Time,
    queues: Vec<VecDeque<ReadyEntry>>,
}

impl Feedback {
    /// Constructs a new feedback scheduler.
    ///
    /// # Errors
    ///
    /// Returns an error unless exactly `quantum` and `num_priorities` are given, both positive.
    pub fn new(options: &Options) -> Result<Self> {
        options.validate_keys(Algorithm::Feedback)?;
        let quantum = options.positive("quantum")?;
        let levels = usize::try_from(options.positive("num_priorities")?).map_err(|_| {
            Error::InvalidConfiguration(String::from("`num_priorities` is too large"))
        })?;
        Ok(Self::with_levels(quantum, levels))
    }

    fn with_levels(quantum: Time, levels: usize) -> Self {
        Self {
            cpu: Cpu::default(),
            quantum,
            queues: vec![VecDeque::new(); levels],
        }
    }

    /// Time quantum.
    #[must_use]
    pub fn quantum(&self) -> Time {
        self.quantum
    }

    /// Number of priority levels.
    #[must_use]
    pub fn num_priorities(&self) -> usize {
        self.queues.len()
    }

    /// Number of processes waiting at each priority level.
    pub fn queue_lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.queues.iter().map(VecDeque::len)
    }

    fn lowest(&self) -> usize {
        self.queues.len() - 1
    }
}

impl Scheduler for Feedback {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Feedback
    }

    fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    fn admit(&mut self, entry: ReadyEntry, admission: Admission, processes: &Processes) {
        let last = processes[entry.process].last_dispatched_from();
        let level = match admission {
            Admission::Arrival => 0,
            Admission::Unblock => last,
            Admission::Timeout => (last + 1).min(self.lowest()),
            Admission::Preemption => unreachable!(
                "process {} preempted, but feedback queues only give up the CPU on timeout",
                entry.process
            ),
        };
        self.queues[level].push_back(entry);
    }

    fn select(&mut self, _: Time, processes: &mut Processes) -> Option<Selection> {
        let (level, entry) = self
            .queues
            .iter_mut()
            .enumerate()
            .find_map(|(level, queue)| queue.pop_front().map(|entry| (level, entry)))?;
        processes[entry.process].set_last_dispatched_from(level);
        Some(Selection::sliced(entry, self.quantum))
    }

    fn num_ready(&self) -> usize {
        self.queues.iter().map(VecDeque::len).sum()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::scheduler::test::{count, drive, finish_times, processes};
    use crate::{EventKind, ProcessId};
    use rstest::rstest;

    #[rstest(
        quantum,
        num_priorities,
        valid,
        case("2", "3", true),
        case("1", "1", true),
        case("0", "3", false),
        case("2", "0", false),
        case("2", "-1", false),
        case("2", "many", false)
    )]
    fn test_options(quantum: &str, num_priorities: &str, valid: bool) {
        let mut options = Options::default();
        options.insert("quantum", quantum);
        options.insert("num_priorities", num_priorities);
        assert_eq!(Feedback::new(&options).is_ok(), valid);
    }

    #[test]
    fn test_levels_from_options() {
        let mut options = Options::default();
        options.insert("quantum", "2");
        options.insert("num_priorities", "4");
        let scheduler = Feedback::new(&options).unwrap();
        assert_eq!(scheduler.quantum(), 2);
        assert_eq!(scheduler.num_priorities(), 4);
        assert_eq!(scheduler.queue_lengths().collect::<Vec<_>>(), vec![0; 4]);
    }

    #[test]
    fn test_demotion_stops_at_lowest_level() {
        let mut scheduler = Feedback::with_levels(2, 3);
        let mut procs = processes("0 7");
        let events = drive(&mut scheduler, &mut procs);
        // Levels 0, 1, 2, 2.
        assert_eq!(count(&events, EventKind::Timeout), 3);
        assert_eq!(finish_times(&procs), vec![7]);
        assert_eq!(procs[ProcessId::from(0)].last_dispatched_from(), 2);
        assert_eq!(procs[ProcessId::from(0)].execution_time_so_far(), 7);
    }

    #[test]
    fn test_higher_priority_first() {
        let mut scheduler = Feedback::with_levels(2, 2);
        let mut procs = processes("0 5\n1 1");
        drive(&mut scheduler, &mut procs);
        // P0 is demoted at 2, so P1 waiting at level 0 runs 2..3 before P0 resumes.
        assert_eq!(finish_times(&procs), vec![6, 3]);
        assert_eq!(procs[ProcessId::from(1)].stats().response_times(), &[1]);
    }

    #[test]
    fn test_unblock_keeps_level() {
        let mut scheduler = Feedback::with_levels(2, 3);
        let mut procs = processes("0 3 1 1");
        drive(&mut scheduler, &mut procs);
        // Demoted to level 1 at 2, blocks at 3, returns to level 1 at 4.
        assert_eq!(finish_times(&procs), vec![5]);
        assert_eq!(procs[ProcessId::from(0)].last_dispatched_from(), 1);
    }

    #[test]
    fn test_admission_levels() {
        let mut scheduler = Feedback::with_levels(1, 3);
        let mut procs = processes("0 1\n0 1\n0 1");
        procs[ProcessId::from(1)].set_last_dispatched_from(1);
        procs[ProcessId::from(2)].set_last_dispatched_from(2);
        let entry = |pid: usize| ReadyEntry::new(ProcessId::from(pid), 0);

        scheduler.admit(entry(1), Admission::Arrival, &procs);
        scheduler.admit(entry(1), Admission::Unblock, &procs);
        scheduler.admit(entry(1), Admission::Timeout, &procs);
        scheduler.admit(entry(2), Admission::Timeout, &procs);
        assert_eq!(scheduler.queue_lengths().collect::<Vec<_>>(), vec![1, 1, 2]);

        let selection = scheduler.select(0, &mut procs).unwrap();
        assert_eq!(selection.entry, entry(1));
        assert_eq!(selection.slice, Some(1));
        assert_eq!(procs[ProcessId::from(1)].last_dispatched_from(), 0);
        assert_eq!(scheduler.num_ready(), 3);
    }

    #[test]
    #[should_panic(expected = "only give up the CPU on timeout")]
    fn test_preemption_is_not_an_admission() {
        let mut scheduler = Feedback::with_levels(2, 2);
        let procs = processes("0 1");
        scheduler.admit(
            ReadyEntry::new(ProcessId::from(0), 0),
            Admission::Preemption,
            &procs,
        );
    }
}
