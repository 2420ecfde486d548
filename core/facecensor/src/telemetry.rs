//! Injected logging for the detection and censoring stages.
//!
//! Nothing in this crate calls the global logging macros. Each stage holds a
//! [`Telemetry`] handle that forwards records to a caller-provided
//! [`log::Log`] implementation (by default the process-wide `log::logger()`),
//! so hosts decide per instance where diagnostics go.

use std::borrow::Cow;
use std::fmt;
use std::time::{Duration, Instant};

use log::{Level, Log, Metadata, Record};

/// Log target used by the detector.
pub const DETECTOR_TARGET: &str = "facecensor::detector";

/// Log target used by the censor engine.
pub const CENSOR_TARGET: &str = "facecensor::censor";

/// Borrowed logger plus the target records are emitted under.
#[derive(Clone, Copy)]
pub struct Telemetry<'a> {
    logger: &'a dyn Log,
    target: &'static str,
}

impl<'a> Telemetry<'a> {
    /// Route records for `target` to `logger`.
    pub fn new(logger: &'a dyn Log, target: &'static str) -> Self {
        Self { logger, target }
    }

    /// Returns `true` when the logger accepts records at `level`.
    pub fn enabled(&self, level: Level) -> bool {
        self.logger.enabled(
            &Metadata::builder()
                .level(level)
                .target(self.target)
                .build(),
        )
    }

    /// Emit a single record.
    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        self.logger.log(
            &Record::builder()
                .level(level)
                .target(self.target)
                .module_path_static(Some(module_path!()))
                .args(args)
                .build(),
        );
    }

    /// Emit at `warn`.
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args);
    }

    /// Emit at `debug`.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args);
    }

    /// Emit at `trace`.
    pub fn trace(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Trace, args);
    }

    /// Start a guard that logs the elapsed time of `label` at `debug` when dropped.
    pub fn timing(&self, label: impl Into<Cow<'static, str>>) -> TimingGuard<'a> {
        TimingGuard {
            telemetry: *self,
            label: label.into(),
            start: Instant::now(),
            active: self.enabled(Level::Debug),
        }
    }
}

impl Telemetry<'static> {
    /// Forward to whatever logger the host installed with the `log` facade.
    pub fn global(target: &'static str) -> Self {
        Self::new(log::logger(), target)
    }
}

impl fmt::Debug for Telemetry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Telemetry")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

/// RAII helper that logs how long an operation took when dropped.
pub struct TimingGuard<'a> {
    telemetry: Telemetry<'a>,
    label: Cow<'static, str>,
    start: Instant,
    active: bool,
}

impl TimingGuard<'_> {
    /// Consume the guard and return the elapsed duration without logging.
    pub fn finish(mut self) -> Duration {
        self.active = false;
        self.start.elapsed()
    }
}

impl Drop for TimingGuard<'_> {
    fn drop(&mut self) {
        if self.active {
            self.telemetry.debug(format_args!(
                "{} completed in {:.2?}",
                self.label,
                self.start.elapsed()
            ));
        }
    }
}


#[cfg(test)]
mod tests {
    use super::capture::CaptureLog;
    use super::*;

    #[test]
    fn records_carry_target_and_level() {
        let sink = CaptureLog::default();
        let telemetry = Telemetry::new(&sink, CENSOR_TARGET);
        telemetry.warn(format_args!("odd input {}", 3));

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, Level::Warn);
        assert_eq!(records[0].1, CENSOR_TARGET);
        assert_eq!(records[0].2, "odd input 3");
    }

    #[test]
    fn timing_guard_logs_on_drop() {
        let sink = CaptureLog::default();
        let telemetry = Telemetry::new(&sink, DETECTOR_TARGET);
        {
            let _guard = telemetry.timing("detect");
        }
        let debug = sink.messages_at(Level::Debug);
        assert_eq!(debug.len(), 1);
        assert!(debug[0].starts_with("detect completed in"));
    }

    #[test]
    fn finished_guard_stays_quiet() {
        let sink = CaptureLog::default();
        let telemetry = Telemetry::new(&sink, DETECTOR_TARGET);
        let guard = telemetry.timing("censor");
        let _ = guard.finish();
        assert!(sink.records().is_empty());
    }
}
