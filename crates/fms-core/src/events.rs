//! Append-only structured event records emitted by the basis algorithms.

use std::cell::RefCell;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Named event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A forward spawn search began.
    SpawnStart,
    /// One step of a forward spawn search.
    SpawnStep,
    /// The forward search located a spawn point.
    SpawnSuccess,
    /// The forward search ended without a spawn point.
    SpawnFailure,
    /// One step of backward re-propagation of a child.
    SpawnBack,
    /// A child was discarded because it duplicates existing coverage.
    SpawnRejected,
}

impl EventKind {
    /// Stable event name.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::SpawnStart => "spawn_start",
            EventKind::SpawnStep => "spawn_step",
            EventKind::SpawnSuccess => "spawn_success",
            EventKind::SpawnFailure => "spawn_failure",
            EventKind::SpawnBack => "spawn_back",
            EventKind::SpawnRejected => "spawn_rejected",
        }
    }
}

/// One positional argument of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventArg {
    /// Integer argument (labels, state indices).
    Int(i64),
    /// Real argument (times, couplings, overlaps).
    Float(f64),
    /// Free text argument (reasons).
    Text(String),
}

impl From<usize> for EventArg {
    fn from(value: usize) -> Self {
        EventArg::Int(value as i64)
    }
}

impl From<f64> for EventArg {
    fn from(value: f64) -> Self {
        EventArg::Float(value)
    }
}

impl From<&str> for EventArg {
    fn from(value: &str) -> Self {
        EventArg::Text(value.to_string())
    }
}

impl From<String> for EventArg {
    fn from(value: String) -> Self {
        EventArg::Text(value)
    }
}

impl Display for EventArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventArg::Int(v) => write!(f, "{v}"),
            EventArg::Float(v) => write!(f, "{v:.8}"),
            EventArg::Text(v) => write!(f, "{v}"),
        }
    }
}

/// Event name plus ordered arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    /// Event kind.
    pub kind: EventKind,
    /// Ordered argument list.
    pub args: Vec<EventArg>,
}

impl LogEvent {
    /// Creates an event without arguments.
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            args: Vec::new(),
        }
    }

    /// Appends an argument.
    pub fn arg(mut self, value: impl Into<EventArg>) -> Self {
        self.args.push(value.into());
        self
    }
}

impl Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.as_str())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Receiver for structured events. Emitting never fails and never alters
/// the caller's control flow.
pub trait EventSink {
    /// Records one event.
    fn emit(&self, event: LogEvent);
}

/// Forwards events to the `log` facade under the `fms::events` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: LogEvent) {
        match event.kind {
            EventKind::SpawnStep | EventKind::SpawnBack => {
                log::debug!(target: "fms::events", "{event}")
            }
            _ => log::info!(target: "fms::events", "{event}"),
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: LogEvent) {}
}

/// Buffers events in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: RefCell<Vec<LogEvent>>,
}

impl MemorySink {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all events recorded so far.
    pub fn events(&self) -> Vec<LogEvent> {
        self.events.borrow().clone()
    }

    /// Events of a single kind, in emission order.
    pub fn of_kind(&self, kind: EventKind) -> Vec<LogEvent> {
        self.events
            .borrow()
            .iter()
            .filter(|event| event.kind == kind)
            .cloned()
            .collect()
    }

    /// Drains the buffer.
    pub fn take(&self) -> Vec<LogEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: LogEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for &S {
    fn emit(&self, event: LogEvent) {
        (**self).emit(event)
    }
}
