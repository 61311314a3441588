use parking_lot::Mutex;
use serde::Serialize;

// 最新1000件のみ保持
const LATENCY_CAPACITY: usize = 1000;

/// ローカルメトリクス収集器
pub struct Metrics {
    counters: Mutex<MetricsCounters>,
    latencies: Mutex<Vec<LatencyRecord>>,
}

#[derive(Debug, Default)]
struct MetricsCounters {
    refreshes_started: u64,
    refreshes_committed: u64,
    refreshes_failed: u64,
    refreshes_superseded: u64,
    submissions_accepted: u64,
    submissions_rejected: u64,
    submissions_failed: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LatencyRecord {
    pub phase: String,
    pub duration_ms: u64,
    pub timestamp: String,
}

/// メトリクスサマリー（表示用）
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSummary {
    pub refreshes: RefreshCounts,
    pub submissions: SubmissionCounts,
    pub avg_latency_ms: AvgLatency,
    pub recent_latencies: Vec<LatencyRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshCounts {
    pub started: u64,
    pub committed: u64,
    pub failed: u64,
    /// 後発のリフレッシュに追い越されて破棄された応答
    pub superseded: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionCounts {
    pub accepted: u64,
    /// 送信中だったため拒否
    pub rejected: u64,
    pub failed: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvgLatency {
    pub list: Option<f64>,
    pub create: Option<f64>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            counters: Mutex::new(MetricsCounters::default()),
            latencies: Mutex::new(Vec::new()),
        }
    }

    pub fn inc_refreshes_started(&self) {
        self.counters.lock().refreshes_started += 1;
    }

    pub fn inc_refreshes_committed(&self) {
        self.counters.lock().refreshes_committed += 1;
    }

    pub fn inc_refreshes_failed(&self) {
        self.counters.lock().refreshes_failed += 1;
    }

    pub fn inc_refreshes_superseded(&self) {
        self.counters.lock().refreshes_superseded += 1;
    }

    pub fn inc_submissions_accepted(&self) {
        self.counters.lock().submissions_accepted += 1;
    }

    pub fn inc_submissions_rejected(&self) {
        self.counters.lock().submissions_rejected += 1;
    }

    pub fn inc_submissions_failed(&self) {
        self.counters.lock().submissions_failed += 1;
    }

    pub fn record_latency(&self, phase: &str, duration_ms: u64) {
        let record = LatencyRecord {
            phase: phase.to_string(),
            duration_ms,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        let mut latencies = self.latencies.lock();
        latencies.push(record);
        if latencies.len() > LATENCY_CAPACITY {
            let excess = latencies.len() - LATENCY_CAPACITY;
            latencies.drain(0..excess);
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        let c = self.counters.lock();
        let latencies = self.latencies.lock();

        let avg = |phase: &str| -> Option<f64> {
            let vals: Vec<f64> = latencies
                .iter()
                .filter(|r| r.phase == phase)
                .map(|r| r.duration_ms as f64)
                .collect();
            if vals.is_empty() {
                None
            } else {
                Some(vals.iter().sum::<f64>() / vals.len() as f64)
            }
        };

        let recent: Vec<LatencyRecord> = latencies.iter().rev().take(20).cloned().collect();

        MetricsSummary {
            refreshes: RefreshCounts {
                started: c.refreshes_started,
                committed: c.refreshes_committed,
                failed: c.refreshes_failed,
                superseded: c.refreshes_superseded,
            },
            submissions: SubmissionCounts {
                accepted: c.submissions_accepted,
                rejected: c.submissions_rejected,
                failed: c.submissions_failed,
            },
            avg_latency_ms: AvgLatency {
                list: avg("list"),
                create: avg("create"),
            },
            recent_latencies: recent,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
