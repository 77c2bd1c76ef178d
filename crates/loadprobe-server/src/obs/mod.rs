//! In-process request metrics.
//!
//! Counters, histograms and the in-flight gauge are stored as atomics and
//! rendered in Prometheus text format by the `/metrics` endpoint.

pub mod metrics;

pub use metrics::{CounterVec, Gauge, HistogramSnapshot, HistogramVec, HttpMetrics, InFlight};
