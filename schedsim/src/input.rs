//! Process description: one process per line, `arrival cpu io cpu ... cpu`.

use std::path::Path;

use crate::{Error, Process, ProcessId, Processes, Result, Time};

/// Parses a process description.
///
/// Blank lines are skipped but still counted, so errors report the line number as seen in the
/// file. Process IDs are assigned in order of appearance.
///
/// # Errors
///
/// Returns [`Error::InvalidProcessSpec`] for the first malformed line, or if there are no
/// processes at all.
pub fn parse_processes(input: &str) -> Result<Processes> {
    let mut processes = Vec::new();
    let mut latest_arrival: Time = 0;
    let mut total_work: Time = 0;
    let lines = input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());
    for (pid, (idx, line)) in lines.enumerate() {
        let process = parse_line(ProcessId::from(pid), line, idx + 1)?;
        latest_arrival = latest_arrival.max(process.arrival_time());
        // The clock never passes the latest arrival plus all the work of all processes.
        total_work = total_work
            .checked_add(process.total_duration())
            .filter(|work| latest_arrival.checked_add(*work).is_some())
            .ok_or_else(|| Error::InvalidProcessSpec {
                line: idx + 1,
                reason: String::from("simulation time overflows"),
            })?;
        processes.push(process);
    }
    if processes.is_empty() {
        return Err(Error::InvalidProcessSpec {
            line: 0,
            reason: String::from("no processes"),
        });
    }
    Ok(Processes::from(processes))
}

/// Reads and parses a process description file. See [`parse_processes`].
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid description.
pub fn read_processes<P: AsRef<Path>>(path: P) -> Result<Processes> {
    parse_processes(&std::fs::read_to_string(path)?)
}

fn parse_line(pid: ProcessId, line: &str, line_number: usize) -> Result<Process> {
    let values = line
        .split_whitespace()
        .map(|token| {
            token.parse::<Time>().map_err(|_| Error::InvalidProcessSpec {
                line: line_number,
                reason: format!("`{}` is not a non-negative integer", token),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    match values.split_first() {
        Some((&arrival, bursts)) if !bursts.is_empty() => {
            Process::with_line(pid, arrival, bursts.to_vec(), line_number)
        }
        _ => Err(Error::InvalidProcessSpec {
            line: line_number,
            reason: String::from("missing activities"),
        }),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Activity;
    use rstest::rstest;

    #[test]
    fn test_parse() {
        let processes = parse_processes("0 3 2 1\n\n  4\t5  \n").unwrap();
        assert_eq!(processes.len(), 2);
        let first = &processes[ProcessId::from(0)];
        assert_eq!(first.arrival_time(), 0);
        assert_eq!(first.service_time(), 4);
        assert_eq!(first.next_activity(), Some(Activity::Cpu(3)));
        let second = &processes[ProcessId::from(1)];
        assert_eq!(second.arrival_time(), 4);
        assert_eq!(second.service_time(), 5);
    }

    #[rstest(
        input,
        line,
        case("0 1\n7", 2),
        case("0 1\n0 1 2", 2),
        case("0 1\n\n0 x", 3),
        case("0 -1", 1),
        case("1.5 2", 1),
        case("", 0),
        case("\n\n", 0),
        case("0 18446744073709551615 0 1", 1),
        case("0 1\n18446744073709551615 1", 2),
        case("0 18446744073709551615\n\n0 1", 3),
        case("18446744073709551614 1\n0 1", 2)
    )]
    fn test_invalid(input: &str, line: usize) {
        match parse_processes(input) {
            Err(Error::InvalidProcessSpec { line: l, .. }) => assert_eq!(l, line),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_largest_horizon() {
        let processes = parse_processes("18446744073709551613 1\n0 1").unwrap();
        assert_eq!(processes.len(), 2);
        assert_eq!(processes[ProcessId::from(0)].total_duration(), 1);
    }
}
