use crate::scheduler::{self, Context, Scheduler};
use crate::{
    Algorithm, Event, EventKind, EventQueue, Processes, Report, Result, SchedulerConfig, Time,
};

/// Simulation driver: owns the clock, the processes, the event queue, and the scheduler.
///
/// Every step advances the clock to the time of the earliest pending event, hands all events
/// with that time to the scheduler in event order, and then lets the scheduler dispatch.
pub struct Simulation {
    clock: Time,
    processes: Processes,
    events: EventQueue,
    scheduler: Box<dyn Scheduler>,
    trace: Vec<Event>,
}

impl Simulation {
    /// Constructs the scheduler described by `config` and schedules an arrival event for each
    /// process.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid for its algorithm. Nothing is simulated
    /// in that case.
    pub fn new(processes: Processes, config: &SchedulerConfig) -> Result<Self> {
        let scheduler = scheduler::build(config)?;
        let mut events = EventQueue::default();
        for process in processes.iter() {
            events.push(Event::new(
                EventKind::Arrive,
                process.id(),
                process.arrival_time(),
            ));
        }
        Ok(Self {
            clock: 0,
            processes,
            events,
            scheduler,
            trace: Vec::new(),
        })
    }

    /// Current simulation time.
    #[must_use]
    pub fn clock(&self) -> Time {
        self.clock
    }

    /// The simulated algorithm.
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.scheduler.algorithm()
    }

    /// The scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &dyn Scheduler {
        self.scheduler.as_ref()
    }

    /// Processes along with their statistics collected so far.
    #[must_use]
    pub fn processes(&self) -> &Processes {
        &self.processes
    }

    /// All events handled so far, in the order they were handled.
    #[must_use]
    pub fn trace(&self) -> &[Event] {
        &self.trace
    }

    /// Returns `true` once there are no pending events.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.events.is_empty()
    }

    /// Handles all events at the time of the earliest pending one, then lets the scheduler
    /// dispatch. Returns `false` without doing anything if there are no pending events.
    ///
    /// # Errors
    ///
    /// Propagates event queue errors, which indicate a defect in the driver.
    pub fn step(&mut self) -> Result<bool> {
        if self.events.is_empty() {
            return Ok(false);
        }
        let time = self.events.peek()?.time;
        assert!(
            self.clock <= time,
            "next event at time {} is earlier than current time {}",
            time,
            self.clock
        );
        self.clock = time;
        let mut ctx = Context {
            clock: self.clock,
            processes: &mut self.processes,
            events: &mut self.events,
        };
        while !ctx.events.is_empty() && ctx.events.peek()?.time == time {
            let event = ctx.events.pop()?;
            self.scheduler.handle_event(&event, &mut ctx);
            self.trace.push(event);
        }
        self.scheduler.schedule(&mut ctx);
        Ok(true)
    }

    /// Runs until no events are left, and returns the final report.
    ///
    /// # Errors
    ///
    /// Propagates event queue errors, which indicate a defect in the driver.
    pub fn run(&mut self) -> Result<Report> {
        log::info!(
            "Simulating {} processes under {}",
            self.processes.len(),
            self.algorithm()
        );
        while self.step()? {}
        log::info!(
            "Finished at time {} after {} events",
            self.clock,
            self.trace.len()
        );
        Ok(self.report())
    }

    /// Runs until the next pending event is later than `time`.
    ///
    /// # Errors
    ///
    /// Propagates event queue errors, which indicate a defect in the driver.
    pub fn run_until(&mut self, time: Time) -> Result<()> {
        while !self.events.is_empty() && self.events.peek()?.time <= time {
            self.step()?;
        }
        Ok(())
    }

    /// Runs at most `steps` steps.
    ///
    /// # Errors
    ///
    /// Propagates event queue errors, which indicate a defect in the driver.
    pub fn run_steps(&mut self, steps: usize) -> Result<()> {
        for _ in 0..steps {
            if !self.step()? {
                break;
            }
        }
        Ok(())
    }

    /// Builds the report of a finished simulation.
    ///
    /// # Panics
    ///
    /// Panics if some process has not finished yet.
    #[must_use]
    pub fn report(&self) -> Report {
        Report::new(self.algorithm(), &self.processes)
    }
}
