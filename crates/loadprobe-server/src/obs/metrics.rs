//! Metrics registry for the HTTP service.
//!
//! Label values are stored in the order of the family's declared label names,
//! so `path, method, status` render exactly in that order. Label arity is part
//! of each family's type. Each series remembers when it was first observed and
//! exposition walks series in that order, which keeps the output stable and
//! append-only across scrapes.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Latency bucket upper bounds in seconds, paired with their exposition text.
pub const DURATION_BUCKETS: [(f64, &str); 11] = [
    (0.001, "0.001"),
    (0.005, "0.005"),
    (0.01, "0.01"),
    (0.025, "0.025"),
    (0.05, "0.05"),
    (0.1, "0.1"),
    (0.25, "0.25"),
    (0.5, "0.5"),
    (1.0, "1.0"),
    (2.5, "2.5"),
    (5.0, "5.0"),
];

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn label_str(names: &[&str], values: &[String]) -> String {
    names
        .iter()
        .zip(values)
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

fn label_key<const N: usize>(values: [&str; N]) -> [String; N] {
    values.map(str::to_string)
}

fn write_header(out: &mut String, name: &str, help: &str, kind: &str) {
    let _ = writeln!(out, "# HELP {} {}", name, help);
    let _ = writeln!(out, "# TYPE {} {}", name, kind);
}

/// A series plus its first-observation sequence number.
struct Slot<T> {
    seq: u64,
    value: T,
}

pub struct CounterVec<const N: usize> {
    label_names: [&'static str; N],
    map: DashMap<[String; N], Slot<AtomicU64>>,
    next_seq: AtomicU64,
}

impl<const N: usize> CounterVec<N> {
    pub fn new(label_names: [&'static str; N]) -> Self {
        Self {
            label_names,
            map: DashMap::new(),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Increment by 1. `values` follow the declared label order.
    pub fn inc(&self, values: [&str; N]) {
        self.add(values, 1);
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, values: [&str; N], v: u64) {
        let slot = self.map.entry(label_key(values)).or_insert_with(|| Slot {
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
            value: AtomicU64::new(0),
        });
        slot.value.fetch_add(v, Ordering::Relaxed);
    }

    /// Current value of one series, `None` if it was never observed.
    pub fn get(&self, values: [&str; N]) -> Option<u64> {
        self.map
            .get(&label_key(values))
            .map(|s| s.value.load(Ordering::Relaxed))
    }

    fn render(&self, name: &str, help: &str, out: &mut String) {
        write_header(out, name, help, "counter");
        let mut rows: Vec<(u64, String, u64)> = self
            .map
            .iter()
            .map(|r| {
                let slot = r.value();
                (
                    slot.seq,
                    label_str(&self.label_names, r.key()),
                    slot.value.load(Ordering::Relaxed),
                )
            })
            .collect();
        rows.sort_by_key(|(seq, _, _)| *seq);
        for (_, labels, val) in rows {
            let _ = writeln!(out, "{}{{{}}} {}", name, labels, val);
        }
    }
}

/// Unlabeled gauge.
#[derive(Default)]
pub struct Gauge {
    value: AtomicI64,
}

impl Gauge {
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dec(&self) {
        self.value.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Increment now, decrement when the returned guard is dropped.
    pub fn track(&self) -> InFlight<'_> {
        self.inc();
        InFlight { gauge: self }
    }

    fn render(&self, name: &str, help: &str, out: &mut String) {
        write_header(out, name, help, "gauge");
        let _ = writeln!(out, "{} {}", name, self.get());
    }
}

/// Scope guard returned by [`Gauge::track`].
///
/// The decrement runs on every exit path, unwinding included.
pub struct InFlight<'a> {
    gauge: &'a Gauge,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.gauge.dec();
    }
}

/// Buckets, sum and count of one series. Updated and read under one lock so
/// a scrape never sees a bucket ahead of `+Inf` or a sum without its count.
#[derive(Default)]
struct HistogramState {
    count: u64,
    sum_nanos: u64,
    buckets: [u64; DURATION_BUCKETS.len()],
}

/// Point-in-time copy of one histogram series.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    /// Cumulative counts, one per entry of [`DURATION_BUCKETS`].
    pub buckets: Vec<u64>,
    pub count: u64,
    pub sum_seconds: f64,
}

// A panic while holding the lock leaves plain integers behind; keep serving them.
fn lock(m: &Mutex<HistogramState>) -> MutexGuard<'_, HistogramState> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct HistogramVec<const N: usize> {
    label_names: [&'static str; N],
    map: DashMap<[String; N], Slot<Mutex<HistogramState>>>,
    next_seq: AtomicU64,
}

impl<const N: usize> HistogramVec<N> {
    pub fn new(label_names: [&'static str; N]) -> Self {
        Self {
            label_names,
            map: DashMap::new(),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Observe a duration and increment every bucket whose bound is >= it.
    pub fn observe(&self, values: [&str; N], duration: Duration) {
        let slot = self.map.entry(label_key(values)).or_insert_with(|| Slot {
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
            value: Mutex::new(HistogramState::default()),
        });
        let secs = duration.as_secs_f64();
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);

        let mut hist = lock(&slot.value);
        for (i, &(bound, _)) in DURATION_BUCKETS.iter().enumerate() {
            if secs <= bound {
                hist.buckets[i] += 1;
            }
        }
        hist.sum_nanos = hist.sum_nanos.saturating_add(nanos);
        hist.count += 1;
    }

    pub fn snapshot(&self, values: [&str; N]) -> Option<HistogramSnapshot> {
        self.map
            .get(&label_key(values))
            .map(|s| snapshot_of(&s.value))
    }

    fn render(&self, name: &str, help: &str, out: &mut String) {
        write_header(out, name, help, "histogram");
        let mut rows: Vec<(u64, String, HistogramSnapshot)> = self
            .map
            .iter()
            .map(|r| {
                (
                    r.value().seq,
                    label_str(&self.label_names, r.key()),
                    snapshot_of(&r.value().value),
                )
            })
            .collect();
        rows.sort_by_key(|(seq, _, _)| *seq);

        for (_, labels, snap) in rows {
            let prefix = if labels.is_empty() { String::new() } else { format!("{},", labels) };
            for (i, &(_, le)) in DURATION_BUCKETS.iter().enumerate() {
                let _ = writeln!(out, "{}_bucket{{{}le=\"{}\"}} {}", name, prefix, le, snap.buckets[i]);
            }
            let _ = writeln!(out, "{}_bucket{{{}le=\"+Inf\"}} {}", name, prefix, snap.count);
            let _ = writeln!(out, "{}_sum{{{}}} {}", name, labels, snap.sum_seconds);
            let _ = writeln!(out, "{}_count{{{}}} {}", name, labels, snap.count);
        }
    }
}

fn snapshot_of(hist: &Mutex<HistogramState>) -> HistogramSnapshot {
    let hist = lock(hist);
    HistogramSnapshot {
        buckets: hist.buckets.to_vec(),
        count: hist.count,
        sum_seconds: hist.sum_nanos as f64 / 1e9,
    }
}

const REQUEST_LABELS: [&str; 3] = ["path", "method", "status"];
const DURATION_LABELS: [&str; 2] = ["path", "method"];

/// The three request-level families, created empty at startup.
pub struct HttpMetrics {
    namespace: String,
    pub requests: CounterVec<3>,
    pub duration: HistogramVec<2>,
    pub in_flight: Gauge,
}

impl HttpMetrics {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            requests: CounterVec::new(REQUEST_LABELS),
            duration: HistogramVec::new(DURATION_LABELS),
            in_flight: Gauge::default(),
        }
    }

    /// Record one finished request.
    pub fn observe_request(&self, path: &str, method: &str, status: u16, elapsed: Duration) {
        self.duration.observe([path, method], elapsed);
        let status = status.to_string();
        self.requests.inc([path, method, &status]);
    }

    /// Render all families in Prometheus text exposition format.
    pub fn render(&self) -> String {
        let ns = &self.namespace;
        let mut out = String::new();
        self.requests.render(
            &format!("{ns}_requests_total"),
            "Total HTTP requests received",
            &mut out,
        );
        self.duration.render(
            &format!("{ns}_request_duration_seconds"),
            "Request duration in seconds",
            &mut out,
        );
        self.in_flight.render(
            &format!("{ns}_requests_in_progress"),
            "Requests currently being processed",
            &mut out,
        );
        out
    }
}
