/// Errors reported by the simulator.
///
/// All parse and configuration errors are raised before the first event is processed.
/// [`Error::EmptyQueueAccess`] signals a defect in the driver loop rather than a user error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A malformed line in the process description.
    #[error("invalid process at line {line}: {reason}")]
    InvalidProcessSpec {
        /// 1-based line number in the process description.
        line: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// A malformed option line in the scheduler description.
    #[error("invalid scheduler option at line {line}: {reason}")]
    InvalidScheduleSpec {
        /// 1-based line number in the scheduler description.
        line: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// Options do not fit the chosen algorithm: missing, unexpected, or out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The algorithm name is not one of `FCFS`, `VRR`, `SRT`, `HRRN`, `FEEDBACK`.
    #[error("scheduling algorithm `{0}` not supported")]
    UnsupportedAlgorithm(String),

    /// Pop or peek on an empty event queue.
    #[error("{operation} on empty event queue")]
    EmptyQueueAccess {
        /// The offending operation.
        operation: &'static str,
    },

    /// Failed to read an input description.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type used throughout the library.
pub type Result<T, E = Error> = std::result::Result<T, E>;
