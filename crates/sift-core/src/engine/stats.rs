use crate::model::QcStats;
use std::sync::Mutex;

#[derive(Debug, Default)]
struct Counters {
    total: u64,
    passed: u64,
    failed: u64,
    avg_confidence: f64,
    short_circuited: u64,
    semantic_failures: u64,
}

/// One validation outcome as seen by the statistics.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Outcome {
    pub passed: bool,
    pub confidence: f64,
    pub short_circuited: bool,
    pub semantic_failed: bool,
}

/// Running counters shared by concurrent validations. The lock is held only
/// for the update itself, never across an await point.
#[derive(Debug, Default)]
pub(crate) struct StatsRecorder {
    inner: Mutex<Counters>,
}

impl StatsRecorder {
    pub(crate) fn record(&self, outcome: Outcome) {
        let mut c = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        c.total += 1;
        if outcome.passed {
            c.passed += 1;
        } else {
            c.failed += 1;
        }
        let n = c.total as f64;
        c.avg_confidence = (c.avg_confidence * (n - 1.0) + outcome.confidence) / n;
        if outcome.short_circuited {
            c.short_circuited += 1;
        }
        if outcome.semantic_failed {
            c.semantic_failures += 1;
        }
    }

    pub(crate) fn snapshot(&self) -> QcStats {
        let c = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        QcStats {
            total_checked: c.total,
            passed: c.passed,
            failed: c.failed,
            pass_rate: if c.total == 0 {
                0.0
            } else {
                c.passed as f64 / c.total as f64
            },
            avg_confidence: c.avg_confidence,
            short_circuited: c.short_circuited,
            semantic_failures: c.semantic_failures,
        }
    }
}
