use std::time::{Duration, Instant};

use extract::FieldTally;
use serde::Serialize;
use tracing::info;

/// Failures listed in the end-of-run log; the rest are summarized by count.
pub const MAX_LOGGED_FAILURES: usize = 10;

/// Counters for one orchestration run. Created at run start, reported at
/// run end, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct RunStatistics {
    pub records_total: usize,
    pub records_enriched: usize,
    pub records_missing: usize,
    pub records_skipped: usize,
    pub records_failed: usize,

    pub requests_issued: usize,
    pub requests_succeeded: usize,
    pub requests_failed: usize,

    pub fields_found: FieldTally,
    /// Every failure as `id: error`, in processing order.
    pub failures: Vec<String>,

    pub elapsed_ms: u64,
    #[serde(skip)]
    started: Instant,
}

impl RunStatistics {
    pub fn new(records_total: usize) -> Self {
        Self {
            records_total,
            records_enriched: 0,
            records_missing: 0,
            records_skipped: 0,
            records_failed: 0,
            requests_issued: 0,
            requests_succeeded: 0,
            requests_failed: 0,
            fields_found: FieldTally::default(),
            failures: Vec::new(),
            elapsed_ms: 0,
            started: Instant::now(),
        }
    }

    pub fn record_request(&mut self, success: bool) {
        self.requests_issued += 1;
        if success {
            self.requests_succeeded += 1;
        } else {
            self.requests_failed += 1;
        }
    }

    pub fn record_fields(&mut self, found: &FieldTally) {
        self.fields_found.merge(found);
    }

    pub fn record_enriched(&mut self) {
        self.records_enriched += 1;
    }

    pub fn record_missing(&mut self) {
        self.records_missing += 1;
    }

    pub fn record_skipped(&mut self) {
        self.records_skipped += 1;
    }

    pub fn record_failure(&mut self, id: &str, error: &dyn std::fmt::Display) {
        self.records_failed += 1;
        self.failures.push(format!("{id}: {error}"));
    }

    /// Records that were written, with or without a generated description.
    pub fn records_written(&self) -> usize {
        self.records_enriched + self.records_missing
    }

    pub fn processed(&self) -> usize {
        self.records_written() + self.records_skipped + self.records_failed
    }

    /// Percentage of the batch that was written.
    pub fn success_rate(&self) -> f64 {
        if self.records_total == 0 {
            return 0.0;
        }
        self.records_written() as f64 / self.records_total as f64 * 100.0
    }

    pub fn finish(&mut self) {
        self.elapsed_ms = duration_ms(self.started.elapsed());
    }

    pub fn log_summary(&self) {
        info!(
            total = self.records_total,
            enriched = self.records_enriched,
            missing = self.records_missing,
            skipped = self.records_skipped,
            failed = self.records_failed,
            success_rate = %format!("{:.1}%", self.success_rate()),
            elapsed_ms = self.elapsed_ms,
            "enrichment run complete"
        );
        info!(
            issued = self.requests_issued,
            succeeded = self.requests_succeeded,
            failed = self.requests_failed,
            "registry requests"
        );

        for (field, count) in self.fields_found.ranked() {
            info!(field, sites = count, "field found");
        }

        for failure in self.failures.iter().take(MAX_LOGGED_FAILURES) {
            info!(failure = %failure, "record failure");
        }
        if self.failures.len() > MAX_LOGGED_FAILURES {
            info!(
                more = self.failures.len() - MAX_LOGGED_FAILURES,
                "further record failures not listed"
            );
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_requests_and_outcomes() {
        let mut stats = RunStatistics::new(4);
        stats.record_request(true);
        stats.record_request(false);
        stats.record_enriched();
        stats.record_missing();
        stats.record_skipped();
        stats.record_failure("a", &"boom");

        assert_eq!(stats.requests_issued, 2);
        assert_eq!(stats.requests_succeeded, 1);
        assert_eq!(stats.requests_failed, 1);
        assert_eq!(stats.processed(), 4);
        assert_eq!(stats.success_rate(), 50.0);
        assert_eq!(stats.failures, vec!["a: boom".to_string()]);
    }

    #[test]
    fn every_failure_is_kept() {
        let mut stats = RunStatistics::new(20);
        for i in 0..15 {
            stats.record_failure(&i.to_string(), &"timeout");
        }
        assert_eq!(stats.records_failed, 15);
        assert_eq!(stats.failures.len(), 15);
        assert!(stats.failures.len() > MAX_LOGGED_FAILURES);
        assert_eq!(stats.failures[0], "0: timeout");
        assert_eq!(stats.failures[14], "14: timeout");
    }

    #[test]
    fn field_tallies_are_merged() {
        let mut first = FieldTally::default();
        first.record("Beskrivning");
        first.record("url");
        let mut second = FieldTally::default();
        second.record("Beskrivning");

        let mut stats = RunStatistics::new(2);
        stats.record_fields(&first);
        stats.record_fields(&second);
        assert_eq!(stats.fields_found.get("Beskrivning"), 2);
        assert_eq!(stats.fields_found.get("url"), 1);
    }

    #[test]
    fn empty_run_has_zero_rate() {
        let mut stats = RunStatistics::new(0);
        stats.finish();
        assert_eq!(stats.success_rate(), 0.0);
    }
}
