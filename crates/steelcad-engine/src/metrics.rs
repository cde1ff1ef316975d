//! Engine-wide counters: updated under a mutex on job completion, read
//! as a point-in-time snapshot. Catalogue/parser-factory caching is
//! immutable after load, so this is the only mutable shared state in the
//! engine's hot path.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_imports: u64,
    pub total_exports: u64,
    pub failed_imports: u64,
    pub per_format_usage: HashMap<String, u64>,
    pub average_processing_time_ms: f64,
}

#[derive(Default)]
struct Inner {
    total_imports: u64,
    total_exports: u64,
    failed_imports: u64,
    per_format_usage: HashMap<String, u64>,
    total_processing_time_ms: f64,
}

pub struct EngineMetrics {
    inner: Mutex<Inner>,
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self { inner: Mutex::new(Inner::default()) }
    }

    pub fn record_import(&self, format_id: &str, duration_ms: f64, success: bool) {
        let mut inner = self.inner.lock().unwrap();
        inner.total_imports += 1;
        if !success {
            inner.failed_imports += 1;
        }
        *inner.per_format_usage.entry(format_id.to_string()).or_insert(0) += 1;
        inner.total_processing_time_ms += duration_ms;
    }

    pub fn record_export(&self, format_id: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.total_exports += 1;
        *inner.per_format_usage.entry(format_id.to_string()).or_insert(0) += 1;
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let inner = self.inner.lock().unwrap();
        let total_jobs = inner.total_imports + inner.total_exports;
        let average_processing_time_ms = if total_jobs > 0 {
            inner.total_processing_time_ms / total_jobs as f64
        } else {
            0.0
        };
        MetricsSnapshot {
            total_imports: inner.total_imports,
            total_exports: inner.total_exports,
            failed_imports: inner.failed_imports,
            per_format_usage: inner.per_format_usage.clone(),
            average_processing_time_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_import_increments_counters() {
        let metrics = EngineMetrics::new();
        metrics.record_import("dstv", 10.0, true);
        metrics.record_import("dstv", 20.0, false);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_imports, 2);
        assert_eq!(snapshot.failed_imports, 1);
        assert_eq!(snapshot.per_format_usage.get("dstv"), Some(&2));
        assert!((snapshot.average_processing_time_ms - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_snapshot_of_empty_metrics_has_zero_average() {
        let metrics = EngineMetrics::new();
        assert_eq!(metrics.snapshot().average_processing_time_ms, 0.0);
    }
}
