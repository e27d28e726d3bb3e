//! Scheduling algorithms.
//!
//! Every algorithm implements [`Scheduler`]. The shared event handling and dispatch bookkeeping
//! are provided methods of the trait; an algorithm only defines its ready structure through
//! [`Scheduler::admit`] and [`Scheduler::select`], and overrides a hook where it deviates.

use crate::{
    Activity, Algorithm, Event, EventKind, EventQueue, Process, ProcessId, Processes, Result,
    SchedulerConfig, Time,
};

mod feedback;
mod fcfs;
mod hrrn;
mod srt;
mod vrr;

pub use feedback::Feedback;
pub use fcfs::Fcfs;
pub use hrrn::HighestResponseRatio;
pub use srt::ShortestRemainingTime;
pub use vrr::VirtualRoundRobin;

/// Mutable view of the simulation passed to the scheduler when handling events.
pub struct Context<'a> {
    /// Current simulation time.
    pub clock: Time,
    /// All processes in the simulation.
    pub processes: &'a mut Processes,
    /// Pending events.
    pub events: &'a mut EventQueue,
}

/// A process waiting in a ready structure, along with the time it entered it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReadyEntry {
    /// The waiting process.
    pub process: ProcessId,
    /// The time the process entered the ready structure.
    pub entry_time: Time,
}

impl ReadyEntry {
    /// Constructs a new entry.
    #[must_use]
    pub fn new(process: ProcessId, entry_time: Time) -> Self {
        Self {
            process,
            entry_time,
        }
    }
}

/// The reason a process becomes ready.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Admission {
    /// The process has just arrived.
    Arrival,
    /// The process has finished an I/O burst.
    Unblock,
    /// The process has used up its time slice.
    Timeout,
    /// The process was taken off the CPU in favor of another one.
    Preemption,
}

/// A process selected to run, and the longest it may hold the CPU.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Selected entry, already removed from the ready structure.
    pub entry: ReadyEntry,
    /// Time slice; `None` runs the burst to completion.
    pub slice: Option<Time>,
}

impl Selection {
    /// Runs the next burst of the entry to completion.
    #[must_use]
    pub fn to_completion(entry: ReadyEntry) -> Self {
        Self { entry, slice: None }
    }

    /// Runs the next burst of the entry for at most `slice`.
    #[must_use]
    pub fn sliced(entry: ReadyEntry, slice: Time) -> Self {
        Self {
            entry,
            slice: Some(slice),
        }
    }
}

/// The process currently holding the CPU.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Running {
    /// Running process.
    pub process: ProcessId,
    /// When it was dispatched.
    pub dispatched_at: Time,
    /// How much CPU time it was granted.
    pub granted: Time,
    /// The event that ends this run.
    pub ends_with: EventKind,
}

impl Running {
    /// The time the run ends.
    #[must_use]
    pub fn until(&self) -> Time {
        self.dispatched_at + self.granted
    }
}

/// State of the single CPU.
#[derive(Debug, Default, Clone)]
pub struct Cpu {
    running: Option<Running>,
}

impl Cpu {
    /// Returns `true` if no process is running.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.running.is_none()
    }

    /// The running process, if any.
    #[must_use]
    pub fn running(&self) -> Option<&Running> {
        self.running.as_ref()
    }

    fn start(&mut self, running: Running) {
        assert!(
            self.running.is_none(),
            "dispatching {} while {:?} is running",
            running.process,
            self.running
        );
        self.running = Some(running);
    }

    fn release(&mut self, process: ProcessId) -> Running {
        match self.running.take() {
            Some(running) if running.process == process => running,
            other => panic!(
                "process {} releasing the CPU held by {:?}",
                process, other
            ),
        }
    }
}

/// A scheduling algorithm.
///
/// The simulation routes every event to [`Scheduler::handle_event`], and once all events of
/// the current time have been handled, calls [`Scheduler::schedule`].
pub trait Scheduler {
    /// The algorithm implemented by this scheduler.
    fn algorithm(&self) -> Algorithm;

    /// The CPU state.
    fn cpu(&self) -> &Cpu;

    /// Mutable CPU state.
    fn cpu_mut(&mut self) -> &mut Cpu;

    /// Inserts a process into the ready structure.
    fn admit(&mut self, entry: ReadyEntry, admission: Admission, processes: &Processes);

    /// Removes the next process to run at `clock` from the ready structure, or returns `None` if
    /// there are no ready processes.
    fn select(&mut self, clock: Time, processes: &mut Processes) -> Option<Selection>;

    /// Number of processes in the ready structure.
    fn num_ready(&self) -> usize;

    /// Called right after `process` has been granted `granted` CPU time.
    fn dispatched(&mut self, _process: &mut Process, _granted: Time) {}

    /// Handles a single event by passing it to the corresponding hook.
    fn handle_event(&mut self, event: &Event, ctx: &mut Context<'_>) {
        log::trace!("{}", event);
        match event.kind {
            EventKind::Arrive => self.on_arrive(event, ctx),
            EventKind::Block => self.on_block(event, ctx),
            EventKind::Unblock => self.on_unblock(event, ctx),
            EventKind::Timeout => self.on_timeout(event, ctx),
            EventKind::Exit => self.on_exit(event, ctx),
        }
    }

    /// A process enters the system.
    fn on_arrive(&mut self, event: &Event, ctx: &mut Context<'_>) {
        self.admit(
            ReadyEntry::new(event.process, ctx.clock),
            Admission::Arrival,
            ctx.processes,
        );
    }

    /// The running process finished a CPU burst and starts its I/O.
    fn on_block(&mut self, event: &Event, ctx: &mut Context<'_>) {
        self.cpu_mut().release(event.process);
        let process = &ctx.processes[event.process];
        match process.next_activity() {
            Some(Activity::Io(duration)) => ctx.events.push(Event::new(
                EventKind::Unblock,
                event.process,
                ctx.clock + duration,
            )),
            other => panic!(
                "process {} blocked with {:?} as its next activity",
                event.process, other
            ),
        }
    }

    /// A process finished its I/O and becomes ready again.
    fn on_unblock(&mut self, event: &Event, ctx: &mut Context<'_>) {
        let process = &mut ctx.processes[event.process];
        match process.pop_activity() {
            Some(Activity::Io(_)) => {}
            other => panic!(
                "process {} unblocked after {:?} instead of I/O",
                event.process, other
            ),
        }
        self.admit(
            ReadyEntry::new(event.process, ctx.clock),
            Admission::Unblock,
            ctx.processes,
        );
    }

    /// The running process used up its time slice.
    fn on_timeout(&mut self, event: &Event, ctx: &mut Context<'_>) {
        self.cpu_mut().release(event.process);
        self.admit(
            ReadyEntry::new(event.process, ctx.clock),
            Admission::Timeout,
            ctx.processes,
        );
    }

    /// The running process finished its last CPU burst.
    fn on_exit(&mut self, event: &Event, ctx: &mut Context<'_>) {
        self.cpu_mut().release(event.process);
        let process = &mut ctx.processes[event.process];
        assert!(
            process.is_done(),
            "process {} exited with {} activities left",
            event.process,
            process.remaining_activities()
        );
        process.stats_mut().set_finish_time(ctx.clock);
        log::debug!("[{}] process {} finished", ctx.clock, event.process);
    }

    /// Makes a scheduling decision after all events of the current time have been handled.
    fn schedule(&mut self, ctx: &mut Context<'_>) {
        self.dispatch(ctx);
    }

    /// Dispatches the selected ready process if the CPU is idle, and schedules the event ending
    /// its run. Returns that event, or `None` if nothing was dispatched.
    fn dispatch(&mut self, ctx: &mut Context<'_>) -> Option<Event> {
        if !self.cpu().is_idle() {
            return None;
        }
        let Selection { entry, slice } = self.select(ctx.clock, ctx.processes)?;
        let process = &mut ctx.processes[entry.process];
        process.record_dispatch(ctx.clock, entry.entry_time);
        let burst = match process.next_activity() {
            Some(Activity::Cpu(burst)) => burst,
            other => panic!(
                "process {} dispatched with {:?} as its next activity",
                entry.process, other
            ),
        };
        let (kind, granted) = match slice {
            Some(slice) if burst > slice => {
                process.truncate_burst(slice);
                (EventKind::Timeout, slice)
            }
            _ => {
                process.pop_activity();
                if process.is_done() {
                    (EventKind::Exit, burst)
                } else {
                    (EventKind::Block, burst)
                }
            }
        };
        process.charge(granted);
        self.dispatched(process, granted);
        let event = Event::new(kind, entry.process, ctx.clock + granted);
        ctx.events.push(event);
        self.cpu_mut().start(Running {
            process: entry.process,
            dispatched_at: ctx.clock,
            granted,
            ends_with: kind,
        });
        log::debug!(
            "[{}] dispatched process {} for {} (waited {}), next: {}",
            ctx.clock,
            entry.process,
            granted,
            ctx.clock - entry.entry_time,
            kind
        );
        Some(event)
    }
}

/// Constructs the scheduler described by `config`.
///
/// # Errors
///
/// Returns [`Error::InvalidConfiguration`](crate::Error::InvalidConfiguration) if the options do
/// not fit the algorithm.
pub fn build(config: &SchedulerConfig) -> Result<Box<dyn Scheduler>> {
    let options = &config.options;
    Ok(match config.algorithm {
        Algorithm::Fcfs => Box::new(Fcfs::new(options)?),
        Algorithm::Vrr => Box::new(VirtualRoundRobin::new(options)?),
        Algorithm::Srt => Box::new(ShortestRemainingTime::new(options)?),
        Algorithm::Hrrn => Box::new(HighestResponseRatio::new(options)?),
        Algorithm::Feedback => Box::new(Feedback::new(options)?),
    })
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::input::parse_processes;

    /// Drives a scheduler directly, without the simulation, returning all handled events.
    pub(crate) fn drive(scheduler: &mut dyn Scheduler, processes: &mut Processes) -> Vec<Event> {
        let mut events = EventQueue::default();
        for process in processes.iter() {
            events.push(Event::new(
                EventKind::Arrive,
                process.id(),
                process.arrival_time(),
            ));
        }
        let mut handled = Vec::new();
        while let Ok(&next) = events.peek() {
            let clock = next.time;
            while events.peek().map_or(false, |e| e.time == clock) {
                let event = events.pop().unwrap();
                let mut ctx = Context {
                    clock,
                    processes: &mut *processes,
                    events: &mut events,
                };
                scheduler.handle_event(&event, &mut ctx);
                handled.push(event);
            }
            let mut ctx = Context {
                clock,
                processes: &mut *processes,
                events: &mut events,
            };
            scheduler.schedule(&mut ctx);
        }
        handled
    }

    pub(crate) fn processes(input: &str) -> Processes {
        parse_processes(input).unwrap()
    }

    pub(crate) fn finish_times(processes: &Processes) -> Vec<Time> {
        processes
            .iter()
            .map(|p| p.stats().finish_time().unwrap())
            .collect()
    }

    pub(crate) fn count(events: &[Event], kind: EventKind) -> usize {
        events.iter().filter(|e| e.kind == kind).count()
    }

    #[test]
    fn test_cpu() {
        let mut cpu = Cpu::default();
        assert!(cpu.is_idle());
        cpu.start(Running {
            process: ProcessId::from(1),
            dispatched_at: 3,
            granted: 4,
            ends_with: EventKind::Block,
        });
        assert!(!cpu.is_idle());
        assert_eq!(cpu.running().map(Running::until), Some(7));
        assert_eq!(cpu.release(ProcessId::from(1)).granted, 4);
        assert!(cpu.is_idle());
    }

    #[test]
    #[should_panic]
    fn test_cpu_release_by_other() {
        let mut cpu = Cpu::default();
        cpu.start(Running {
            process: ProcessId::from(1),
            dispatched_at: 0,
            granted: 1,
            ends_with: EventKind::Exit,
        });
        cpu.release(ProcessId::from(0));
    }

    #[test]
    fn test_build() {
        for (input, algorithm) in &[
            ("FCFS", Algorithm::Fcfs),
            ("VRR\nquantum = 2", Algorithm::Vrr),
            ("SRT\nservice_given = true\nalpha = 0.5", Algorithm::Srt),
            ("HRRN\nservice_given = true\nalpha = 0.5", Algorithm::Hrrn),
            ("FEEDBACK\nquantum = 2\nnum_priorities = 2", Algorithm::Feedback),
        ] {
            let config: SchedulerConfig = input.parse().unwrap();
            let scheduler = build(&config).unwrap();
            assert_eq!(scheduler.algorithm(), *algorithm);
            assert!(scheduler.cpu().is_idle());
            assert_eq!(scheduler.num_ready(), 0);
        }
    }

    #[test]
    fn test_single_burst_under_every_algorithm() {
        for input in &[
            "FCFS",
            "VRR\nquantum = 10",
            "SRT\nservice_given = true\nalpha = 0.5",
            "HRRN\nservice_given = true\nalpha = 0.5",
            "FEEDBACK\nquantum = 10\nnum_priorities = 2",
        ] {
            let mut scheduler = build(&input.parse().unwrap()).unwrap();
            let mut procs = processes("0 5");
            drive(scheduler.as_mut(), &mut procs);
            let stats = procs[ProcessId::from(0)].stats();
            assert_eq!(stats.start_time(), 0);
            assert_eq!(stats.finish_time(), Some(5));
            assert!(stats.response_times().is_empty());
        }
    }
}
