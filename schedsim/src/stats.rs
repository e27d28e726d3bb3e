use serde::Serialize;

use crate::Time;

/// Performance statistics of a single process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    arrival_time: Time,
    start_time: Time,
    finish_time: Option<Time>,
    service_time: Time,
    response_times: Vec<Time>,
}

impl Stats {
    /// Creates statistics of a process entering the system at `arrival_time` and requiring
    /// `service_time` of CPU in total.
    #[must_use]
    pub fn new(arrival_time: Time, service_time: Time) -> Self {
        Self {
            arrival_time,
            start_time: 0,
            finish_time: None,
            service_time,
            response_times: Vec::new(),
        }
    }

    /// The time the process enters the system.
    #[must_use]
    pub fn arrival_time(&self) -> Time {
        self.arrival_time
    }

    /// The time the process is first dispatched to the CPU.
    #[must_use]
    pub fn start_time(&self) -> Time {
        self.start_time
    }

    /// The time of the final exit, or `None` if the process has not finished yet.
    #[must_use]
    pub fn finish_time(&self) -> Option<Time> {
        self.finish_time
    }

    /// Total CPU demand of the process.
    #[must_use]
    pub fn service_time(&self) -> Time {
        self.service_time
    }

    /// All recorded non-zero waits between entering a ready queue and being dispatched.
    #[must_use]
    pub fn response_times(&self) -> &[Time] {
        &self.response_times
    }

    /// Sum of all recorded response times.
    #[must_use]
    pub fn total_wait_time(&self) -> Time {
        self.response_times.iter().sum()
    }

    /// Time between arrival and finish.
    ///
    /// # Panics
    ///
    /// Panics if the process has not finished.
    #[must_use]
    pub fn turnaround_time(&self) -> Time {
        self.finish_time.expect("turnaround of an unfinished process") - self.arrival_time
    }

    /// Turnaround time relative to service time.
    #[must_use]
    pub fn normalized_turnaround_time(&self) -> f64 {
        self.turnaround_time() as f64 / self.service_time as f64
    }

    /// Mean of the recorded response times; `0.0` if the process never waited.
    #[must_use]
    pub fn average_response_time(&self) -> f64 {
        if self.response_times.is_empty() {
            0.0
        } else {
            self.total_wait_time() as f64 / self.response_times.len() as f64
        }
    }

    pub(crate) fn set_start_time(&mut self, time: Time) {
        self.start_time = time;
    }

    pub(crate) fn record_response(&mut self, wait: Time) {
        if wait > 0 {
            self.response_times.push(wait);
        }
    }

    pub(crate) fn set_finish_time(&mut self, time: Time) {
        assert!(
            self.finish_time.is_none(),
            "finish time set twice (previously {:?}, now {})",
            self.finish_time,
            time
        );
        self.finish_time = Some(time);
    }
}
