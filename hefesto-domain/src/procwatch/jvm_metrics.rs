use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single garbage collector's cumulative counters.
#[derive(Debug, Clone, Serialize)]
pub struct GcCollectorStats {
    pub name: String,
    pub collection_count: u64,
    pub collection_time_ms: u64,
}

/// Snapshot of a JVM process's memory, threading, class-loading, and GC state.
///
/// Obtained via the JVM Metrics Adapter (local-attach `jcmd` or a well-known
/// JMX port), never hand-computed.
#[derive(Debug, Clone, Serialize)]
pub struct JvmMetrics {
    pub heap_used_bytes: u64,
    pub heap_committed_bytes: u64,
    pub heap_max_bytes: u64,
    pub non_heap_used_bytes: u64,
    pub non_heap_committed_bytes: u64,
    pub thread_count: u32,
    pub daemon_thread_count: u32,
    pub deadlocked_thread_count: u32,
    pub gc_collectors: Vec<GcCollectorStats>,
    pub loaded_class_count: u64,
    pub unloaded_class_count: u64,
    pub uptime_ms: u64,
    pub vm_name: String,
    pub vm_version: String,
    pub sample_time: DateTime<Utc>,
}

impl JvmMetrics {
    /// Total GC time across all collectors, in milliseconds.
    pub fn total_gc_time_ms(&self) -> u64 {
        self.gc_collectors.iter().map(|c| c.collection_time_ms).sum()
    }

    /// Total GC collection count across all collectors.
    pub fn total_gc_count(&self) -> u64 {
        self.gc_collectors.iter().map(|c| c.collection_count).sum()
    }

    /// Heap usage as a percentage of max heap, or 0.0 when max is unknown (0).
    pub fn heap_usage_percent(&self) -> f64 {
        if self.heap_max_bytes == 0 {
            0.0
        } else {
            (self.heap_used_bytes as f64 / self.heap_max_bytes as f64) * 100.0
        }
    }

    /// True when the management agent reported at least one deadlocked thread.
    pub fn has_deadlocks(&self) -> bool {
        self.deadlocked_thread_count > 0
    }

    pub fn heap_used_formatted(&self) -> String {
        format_bytes(self.heap_used_bytes)
    }

    pub fn heap_max_formatted(&self) -> String {
        format_bytes(self.heap_max_bytes)
    }

    pub fn uptime_formatted(&self) -> String {
        let seconds = self.uptime_ms / 1000;
        let hours = seconds / 3600;
        let minutes = (seconds % 3600) / 60;
        let secs = seconds % 60;
        if hours > 0 {
            format!("{}h{:02}m{:02}s", hours, minutes, secs)
        } else if minutes > 0 {
            format!("{}m{:02}s", minutes, secs)
        } else {
            format!("{}s", secs)
        }
    }
}

fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;
    let b = bytes as f64;
    if b >= GB {
        format!("{:.2} GB", b / GB)
    } else if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.0} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> JvmMetrics {
        JvmMetrics {
            heap_used_bytes: 512 * 1024 * 1024,
            heap_committed_bytes: 768 * 1024 * 1024,
            heap_max_bytes: 1024 * 1024 * 1024,
            non_heap_used_bytes: 64 * 1024 * 1024,
            non_heap_committed_bytes: 96 * 1024 * 1024,
            thread_count: 42,
            daemon_thread_count: 30,
            deadlocked_thread_count: 0,
            gc_collectors: vec![
                GcCollectorStats {
                    name: "G1 Young Generation".to_string(),
                    collection_count: 10,
                    collection_time_ms: 150,
                },
                GcCollectorStats {
                    name: "G1 Old Generation".to_string(),
                    collection_count: 1,
                    collection_time_ms: 50,
                },
            ],
            loaded_class_count: 8000,
            unloaded_class_count: 10,
            uptime_ms: 3_725_000,
            vm_name: "OpenJDK 64-Bit Server VM".to_string(),
            vm_version: "21.0.1".to_string(),
            sample_time: Utc::now(),
        }
    }

    #[test]
    fn test_heap_usage_percent() {
        let m = sample();
        assert_eq!(m.heap_usage_percent(), 50.0);
    }

    #[test]
    fn test_heap_usage_percent_zero_max() {
        let mut m = sample();
        m.heap_max_bytes = 0;
        assert_eq!(m.heap_usage_percent(), 0.0);
    }

    #[test]
    fn test_total_gc_time_and_count() {
        let m = sample();
        assert_eq!(m.total_gc_time_ms(), 200);
        assert_eq!(m.total_gc_count(), 11);
    }

    #[test]
    fn test_has_deadlocks() {
        let mut m = sample();
        assert!(!m.has_deadlocks());
        m.deadlocked_thread_count = 2;
        assert!(m.has_deadlocks());
    }

    #[test]
    fn test_uptime_formatted() {
        let m = sample();
        assert_eq!(m.uptime_formatted(), "1h02m05s");
    }
}
