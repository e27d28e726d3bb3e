//! Discrete-event simulation of a single-CPU multitasking system.
//!
//! A set of processes, each being an alternating sequence of CPU and I/O bursts, is run to
//! completion under one of the supported scheduling algorithms:
//!
//! - [`Fcfs`]: first come, first served;
//! - [`VirtualRoundRobin`]: round robin with an auxiliary queue for processes returning from I/O;
//! - [`ShortestRemainingTime`]: shortest remaining service time first;
//! - [`HighestResponseRatio`]: highest response ratio next;
//! - [`Feedback`]: multi-level feedback queues.
//!
//! # Examples
//!
//! ```
//! # use schedsim::{SchedulerConfig, Simulation};
//! # fn main() -> schedsim::Result<()> {
//! let processes = schedsim::input::parse_processes("0 4\n0 2\n")?;
//! let config: SchedulerConfig = "SRT\nservice_given = true\nalpha = 0.5\n".parse()?;
//! let mut simulation = Simulation::new(processes, &config)?;
//! let report = simulation.run()?;
//! assert_eq!(report.processes[0].finish, 6);
//! assert_eq!(report.processes[1].finish, 2);
//! # Ok(())
//! # }
//! ```

#![warn(
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::default_trait_access,
    clippy::cast_precision_loss
)]

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

mod error;
pub use error::{Error, Result};

mod stats;
pub use stats::Stats;

mod process;
pub use process::{Activity, Process, Processes};

mod event;
pub use event::{Event, EventKind, EventQueue};

pub mod config;
pub use config::{Algorithm, Options, SchedulerConfig};

pub mod input;

pub mod scheduler;
pub use scheduler::{
    Context, Fcfs, Feedback, HighestResponseRatio, Scheduler, ShortestRemainingTime,
    VirtualRoundRobin,
};

mod simulation;
pub use simulation::Simulation;

pub mod report;
pub use report::{OutputFormat, ProcessReport, Report, SystemReport};

/// Simulation time, in abstract integer units.
pub type Time = u64;

/// Process ID, assigned in order of appearance in the input, starting from 0.
#[derive(
    From,
    Into,
    Debug,
    PartialEq,
    PartialOrd,
    Eq,
    Ord,
    Serialize,
    Deserialize,
    Copy,
    Clone,
    Hash,
    Display,
)]
pub struct ProcessId(usize);
