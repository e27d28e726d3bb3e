use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fmt;

use crate::{Error, ProcessId, Result, Time};

/// Type of an event.
///
/// The declaration order is the tie-break priority of events happening at the same time.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::EnumString,
)]
pub enum EventKind {
    /// A process enters the system.
    #[strum(serialize = "ARRIVE")]
    Arrive,
    /// A process finished its I/O burst.
    #[strum(serialize = "UNBLOCK")]
    Unblock,
    /// A process used up its time slice before finishing its CPU burst.
    #[strum(serialize = "TIMEOUT")]
    Timeout,
    /// A process finished a CPU burst and starts an I/O burst.
    #[strum(serialize = "BLOCK")]
    Block,
    /// A process finished its last CPU burst.
    #[strum(serialize = "EXIT")]
    Exit,
}

/// An event happening to a process at a certain time.
///
/// Events are ordered by time, then by kind (see [`EventKind`]), then by process ID.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Event {
    /// Type of the event.
    pub kind: EventKind,
    /// The process the event refers to.
    pub process: ProcessId,
    /// The time the event occurs.
    pub time: Time,
}

impl Event {
    /// Constructs a new event.
    #[must_use]
    pub fn new(kind: EventKind, process: ProcessId, time: Time) -> Self {
        Self {
            kind,
            process,
            time,
        }
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.time, self.kind, self.process).cmp(&(other.time, other.kind, other.process))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "At time {}, {} Event for Process {}",
            self.time, self.kind, self.process
        )
    }
}

/// Pending events ordered from the earliest.
#[derive(Debug, Default, Clone)]
pub struct EventQueue {
    events: BinaryHeap<Reverse<Event>>,
}

impl EventQueue {
    /// Adds an event to the queue.
    pub fn push(&mut self, event: Event) {
        self.events.push(Reverse(event));
    }

    /// Removes and returns the earliest event.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyQueueAccess`] if the queue is empty.
    pub fn pop(&mut self) -> Result<Event> {
        self.events
            .pop()
            .map(|Reverse(event)| event)
            .ok_or(Error::EmptyQueueAccess { operation: "pop" })
    }

    /// Returns the earliest event without removing it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyQueueAccess`] if the queue is empty.
    pub fn peek(&self) -> Result<&Event> {
        self.events
            .peek()
            .map(|Reverse(event)| event)
            .ok_or(Error::EmptyQueueAccess { operation: "peek" })
    }

    /// Returns `true` if no events are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of pending events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Cancels all pending events of `process`, returning how many were removed.
    pub fn remove_all_for(&mut self, process: ProcessId) -> usize {
        let before = self.events.len();
        self.events = std::mem::take(&mut self.events)
            .into_iter()
            .filter(|Reverse(event)| event.process != process)
            .collect();
        before - self.events.len()
    }
}
