//! Observability subsystem
//!
//! - Structured logging (JSON lines)
//! - Exact, monotonic counters
//! - Timed scopes for batch phases
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on indexing or query results
//! 3. No background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use multirange::observability::{log_event_with_fields, Event, ObservationScope};
//!
//! log_event_with_fields(Event::IndexDefined, &[("index", "NAME")]);
//!
//! let scope = ObservationScope::new("INGEST");
//! // ... do work ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::{ObservationScope, Timer};

/// Log an event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log an event at its own severity, with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        log_event(Event::ConfigLoaded);
        log_event(Event::ObservationSkipped);
    }

    #[test]
    fn test_log_event_with_fields() {
        log_event_with_fields(Event::IndexDefined, &[("index", "NAME")]);
    }
}
