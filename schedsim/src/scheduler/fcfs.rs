use std::collections::VecDeque;

use super::{Admission, Cpu, ReadyEntry, Scheduler, Selection};
use crate::{Algorithm, Options, Processes, Result, Time};

/// First come, first served.
///
/// Non-preemptive: a dispatched process runs its CPU burst to completion.
#[derive(Debug, Default)]
pub struct Fcfs {
    cpu: Cpu,
    ready: VecDeque<ReadyEntry>,
}

impl Fcfs {
    /// Constructs a new FCFS scheduler. It accepts no options.
    ///
    /// # Errors
    ///
    /// Returns an error if any option is given.
    pub fn new(options: &Options) -> Result<Self> {
        options.validate_keys(Algorithm::Fcfs)?;
        Ok(Self::default())
    }
}

impl Scheduler for Fcfs {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Fcfs
    }

    fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    fn admit(&mut self, entry: ReadyEntry, _: Admission, _: &Processes) {
        self.ready.push_back(entry);
    }

    fn select(&mut self, _: Time, _: &mut Processes) -> Option<Selection> {
        self.ready.pop_front().map(Selection::to_completion)
    }

    fn num_ready(&self) -> usize {
        self.ready.len()
    }
}
