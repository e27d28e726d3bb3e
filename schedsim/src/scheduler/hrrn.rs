use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

use super::srt::require_service_given;
use super::{Admission, Cpu, ReadyEntry, Scheduler, Selection};
use crate::{Algorithm, Options, Process, Processes, Result, Time};

/// Highest response ratio next.
///
/// Non-preemptive. Pending processes are re-ranked from scratch at every dispatch by their
/// response ratio `(w + s) / s`, where `w` is the total time spent waiting in the ready state,
/// including the wait still in progress, and `s` is the service time. Ties go to the process that has been pending the longest.
#[derive(Debug, Default)]
pub struct HighestResponseRatio {
    cpu: Cpu,
    pending: Vec<ReadyEntry>,
}

impl HighestResponseRatio {
    /// Constructs a new HRRN scheduler. Requires `service_given` and `alpha` options.
    ///
    /// # Errors
    ///
    /// Returns an error if options are missing, unexpected, or invalid. Service time estimation
    /// is not supported, so `service_given` must be `true`.
    pub fn new(options: &Options) -> Result<Self> {
        options.validate_keys(Algorithm::Hrrn)?;
        require_service_given(options)?;
        Ok(Self::default())
    }
}

/// Response ratio of a process that has been waiting for `waiting` units in its current turn.
#[must_use]
pub fn response_ratio(process: &Process, waiting: Time) -> f64 {
    let service = process.service_time() as f64;
    let wait = process.stats().total_wait_time() + waiting;
    (wait as f64 + service) / service
}

impl Scheduler for HighestResponseRatio {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Hrrn
    }

    fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    fn admit(&mut self, entry: ReadyEntry, _: Admission, _: &Processes) {
        self.pending.push(entry);
    }

    fn select(&mut self, clock: Time, processes: &mut Processes) -> Option<Selection> {
        let mut ranking: BinaryHeap<_> = self
            .pending
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                (
                    OrderedFloat(response_ratio(
                        &processes[entry.process],
                        clock - entry.entry_time,
                    )),
                    Reverse(idx),
                )
            })
            .collect();
        let (ratio, Reverse(idx)) = ranking.pop()?;
        let entry = self.pending.remove(idx);
        log::trace!("process {} selected with ratio {}", entry.process, ratio);
        Some(Selection::to_completion(entry))
    }

    fn num_ready(&self) -> usize {
        self.pending.len()
    }
}
