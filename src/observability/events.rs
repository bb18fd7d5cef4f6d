//! Observable events
//!
//! Events are explicit and typed; each has a stable upper-case name.

use std::fmt;

use super::logger::Severity;

/// Observable events of the engine and the batch runner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Catalog
    /// A named index was defined
    IndexDefined,
    /// A define or insertion was rejected
    IndexRejected,
    /// An element was left out of one index because of a missing criterion
    ObservationSkipped,
    /// A cross product was evaluated
    QueryExecuted,
    /// A query call addressed an unknown index
    QueryRejected,

    // Batch run
    /// Configuration loaded and validated
    ConfigLoaded,
    /// Output file written
    OutputWritten,
    /// The run failed
    RunFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::IndexDefined => "INDEX_DEFINED",
            Event::IndexRejected => "INDEX_REJECTED",
            Event::ObservationSkipped => "OBSERVATION_SKIPPED",
            Event::QueryExecuted => "QUERY_COMPLETE",
            Event::QueryRejected => "QUERY_REJECTED",

            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::OutputWritten => "OUTPUT_WRITTEN",
            Event::RunFailed => "RUN_FAILED",
        }
    }

    /// Returns true if this event ends the process
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::RunFailed)
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::RunFailed => Severity::Fatal,
            Event::IndexRejected | Event::QueryRejected => Severity::Warn,
            Event::ObservationSkipped | Event::QueryExecuted => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
