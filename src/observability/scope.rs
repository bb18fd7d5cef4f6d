//! Timed observation scopes
//!
//! A scope logs `{name}_BEGIN` on creation and exactly one closing line:
//! `{name}_COMPLETE` (with `elapsed_ms`), `{name}_FAILED`, or
//! `{name}_INCOMPLETE` when dropped without either.

use std::cell::Cell;
use std::time::Instant;

use super::logger::Logger;

/// A scope that logs its start, outcome and duration
///
/// ```ignore
/// let scope = ObservationScope::new("INGEST");
/// // ... index rows ...
/// scope.complete_with_fields(&[("rows", "42")]);
/// ```
pub struct ObservationScope<'a> {
    name: &'a str,
    timer: Timer,
    closed: Cell<bool>,
}

impl<'a> ObservationScope<'a> {
    /// Open a scope, logging `{name}_BEGIN`
    pub fn new(name: &'a str) -> Self {
        Self::with_fields(name, &[])
    }

    /// Open a scope with fields on the BEGIN line
    pub fn with_fields(name: &'a str, fields: &[(&str, &str)]) -> Self {
        Logger::info(&format!("{}_BEGIN", name), fields);
        Self {
            name,
            timer: Timer::new(),
            closed: Cell::new(false),
        }
    }

    /// Close successfully, logging `{name}_COMPLETE`
    pub fn complete(self) {
        self.complete_with_fields(&[]);
    }

    /// Close successfully with extra fields
    pub fn complete_with_fields(self, fields: &[(&str, &str)]) {
        self.closed.set(true);
        let elapsed = self.timer.elapsed_ms();
        let mut all_fields = vec![("elapsed_ms", elapsed.as_str())];
        all_fields.extend_from_slice(fields);
        Logger::info(&format!("{}_COMPLETE", self.name), &all_fields);
    }

    /// Close with a failure, logging `{name}_FAILED` at ERROR
    pub fn fail(self, reason: &str) {
        self.closed.set(true);
        Logger::error(&format!("{}_FAILED", self.name), &[("reason", reason)]);
    }

    /// Whether the scope was closed
    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }
}

impl Drop for ObservationScope<'_> {
    fn drop(&mut self) {
        if !self.closed.get() {
            Logger::warn(
                &format!("{}_INCOMPLETE", self.name),
                &[("reason", "scope dropped without completion")],
            );
        }
    }
}

/// Wall-clock timer for elapsed-time fields
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a timer
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed milliseconds as a string
    pub fn elapsed_ms(&self) -> String {
        self.start.elapsed().as_millis().to_string()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_starts_open() {
        let scope = ObservationScope::new("TEST");
        assert!(!scope.is_closed());
        scope.complete();
    }

    #[test]
    fn test_scope_complete_with_fields() {
        let scope = ObservationScope::with_fields("TEST", &[("input", "persons.csv")]);
        scope.complete_with_fields(&[("rows", "3")]);
    }

    #[test]
    fn test_scope_fail() {
        let scope = ObservationScope::new("TEST");
        scope.fail("something went wrong");
    }

    #[test]
    fn test_scope_drop_without_complete() {
        let scope = ObservationScope::new("TEST");
        drop(scope);
    }

    #[test]
    fn test_timer() {
        let timer = Timer::new();
        std::thread::sleep(std::time::Duration::from_millis(10));
        let ms: u64 = timer.elapsed_ms().parse().unwrap();
        assert!(ms >= 10);
    }
}
