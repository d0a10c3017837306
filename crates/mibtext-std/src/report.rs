//! `tracing` adapter for core load events.

use mibtext_core::report::{LoadEvent, LoadReporter, Severity};

/// Forwards core load events to `tracing` at mapped levels.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingReporter;

impl LoadReporter for TracingReporter {
    fn report(&mut self, severity: Severity, event: LoadEvent<'_>) {
        match severity {
            Severity::Error => tracing::error!("{event}"),
            Severity::Warn => tracing::warn!("{event}"),
            Severity::Info => tracing::info!("{event}"),
            Severity::Debug => tracing::debug!("{event}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mibtext_core::report::Phase;

    #[test]
    fn test_reporter_does_not_panic_without_subscriber() {
        let mut reporter = TracingReporter;
        reporter.report(
            Severity::Info,
            LoadEvent::PhaseStart { phase: Phase::Oids },
        );
    }
}
