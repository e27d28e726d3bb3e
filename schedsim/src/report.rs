//! Final statistics of a simulation, per process and system-wide.

use std::fmt;
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::{Algorithm, Process, ProcessId, Processes, Result, Time};

/// Output format of a report.
#[derive(
    Debug, PartialEq, Eq, Clone, Copy, strum::EnumString, strum::Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable listing.
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Text
    }
}

/// Statistics of a single finished process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessReport {
    /// Process ID.
    pub pid: ProcessId,
    /// Arrival time.
    pub arrival: Time,
    /// Total CPU demand.
    pub service: Time,
    /// First dispatch.
    pub start: Time,
    /// Final exit.
    pub finish: Time,
    /// `finish - arrival`
    pub turnaround: Time,
    /// `turnaround / service`
    pub normalized_turnaround: f64,
    /// Mean of nonzero waits in ready queues, 0 if the process never waited.
    pub average_response: f64,
}

impl From<&Process> for ProcessReport {
    fn from(process: &Process) -> Self {
        let stats = process.stats();
        Self {
            pid: process.id(),
            arrival: stats.arrival_time(),
            service: stats.service_time(),
            start: stats.start_time(),
            finish: stats
                .finish_time()
                .unwrap_or_else(|| panic!("process {} has not finished", process.id())),
            turnaround: stats.turnaround_time(),
            normalized_turnaround: stats.normalized_turnaround_time(),
            average_response: stats.average_response_time(),
        }
    }
}

/// Means across all processes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemReport {
    /// Mean turnaround time.
    pub mean_turnaround: f64,
    /// Mean normalized turnaround time.
    pub mean_normalized_turnaround: f64,
    /// Mean of the per-process average response times.
    pub mean_average_response: f64,
}

fn mean(processes: &[ProcessReport], value: impl Fn(&ProcessReport) -> f64) -> f64 {
    if processes.is_empty() {
        0.0
    } else {
        processes.iter().map(value).sum::<f64>() / processes.len() as f64
    }
}

impl SystemReport {
    fn new(processes: &[ProcessReport]) -> Self {
        Self {
            mean_turnaround: mean(processes, |p| p.turnaround as f64),
            mean_normalized_turnaround: mean(processes, |p| p.normalized_turnaround),
            mean_average_response: mean(processes, |p| p.average_response),
        }
    }
}

/// Report of a finished simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Simulated algorithm.
    pub algorithm: Algorithm,
    /// Per-process statistics, ordered by process ID.
    pub processes: Vec<ProcessReport>,
    /// System-wide statistics.
    pub system: SystemReport,
}

impl Report {
    /// Builds the report from finished processes.
    ///
    /// # Panics
    ///
    /// Panics if any process has not finished.
    #[must_use]
    pub fn new(algorithm: Algorithm, processes: &Processes) -> Self {
        let processes: Vec<_> = processes.iter().map(ProcessReport::from).collect();
        let system = SystemReport::new(&processes);
        Self {
            algorithm,
            processes,
            system,
        }
    }

    /// Writes the report in the given format.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write<W: Write>(&self, mut writer: W, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Text => write!(writer, "{}", self)?,
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut writer, self).map_err(std::io::Error::from)?;
                writeln!(writer)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for p in &self.processes {
            writeln!(f, "For process {}:", p.pid)?;
            writeln!(f, "    Arrival Time: {}", p.arrival)?;
            writeln!(f, "    Service Time: {}", p.service)?;
            writeln!(f, "    Start Time: {}", p.start)?;
            writeln!(f, "    Finish Time: {}", p.finish)?;
            writeln!(f, "    Turnaround Time: {}", p.turnaround)?;
            writeln!(
                f,
                "    Normalized Turnaround Time: {}",
                p.normalized_turnaround
            )?;
            writeln!(f, "    Average Response Time: {}", p.average_response)?;
        }
        writeln!(f, "System Wide Statistics:")?;
        writeln!(f, "    Mean Turnaround Time: {}", self.system.mean_turnaround)?;
        writeln!(
            f,
            "    Mean Normalized Turnaround Time: {}",
            self.system.mean_normalized_turnaround
        )?;
        writeln!(
            f,
            "    Mean Average Response Time: {}",
            self.system.mean_average_response
        )
    }
}
