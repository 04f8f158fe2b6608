use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use serde::Serialize;
use sim_types::{OverheadKind, Tick};

use crate::process::LifecycleState;

/// Kinds of transitions recorded during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Arrival,
    StartOverhead(OverheadKind),
    EndOverhead(OverheadKind),
    StartExecution,
    EndExecution,
    Block,
    StartIo,
    FinishIo,
    Preemption,
    Terminate,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Arrival => f.write_str("arrival"),
            EventKind::StartOverhead(kind) => write!(f, "start {}", kind.as_str()),
            EventKind::EndOverhead(kind) => write!(f, "end {}", kind.as_str()),
            EventKind::StartExecution => f.write_str("start execution"),
            EventKind::EndExecution => f.write_str("end execution"),
            EventKind::Block => f.write_str("block"),
            EventKind::StartIo => f.write_str("start io"),
            EventKind::FinishIo => f.write_str("finish io"),
            EventKind::Preemption => f.write_str("preemption"),
            EventKind::Terminate => f.write_str("terminate"),
        }
    }
}

/// One timestamped transition of a process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub tick: Tick,
    pub subject: String,
    pub kind: EventKind,
    /// State of the subject once the transition is applied.
    pub state: LifecycleState,
}

/// Append-only sequence of events in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub(crate) fn push(&mut self, event: Event) {
        debug_assert!(self
            .events
            .last()
            .map_or(true, |last| last.tick <= event.tick));
        self.events.push(event);
    }

    /// Returns all events in order.
    pub fn as_slice(&self) -> &[Event] {
        &self.events
    }

    /// Iterates over events in order.
    pub fn iter(&self) -> core::slice::Iter<'_, Event> {
        self.events.iter()
    }

    /// Returns the number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events about one process, in order.
    pub fn for_subject<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Event> + 'a {
        self.events.iter().filter(move |event| event.subject == name)
    }

    /// Counts events of the given kind.
    pub fn count(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|event| event.kind == kind).count()
    }
}

impl<'a> IntoIterator for &'a EventLog {
    type Item = &'a Event;
    type IntoIter = core::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
