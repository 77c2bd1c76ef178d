//! Operational endpoints.
//!
//! - `/metrics` : Prometheus text format
//! - `/healthz` : liveness
//! - `/ready`   : readiness with a timestamp

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::Serialize;

use loadprobe_core::error::{LoadProbeError, Result};
use loadprobe_core::reply::CONTENT_TYPE_METRICS;
use loadprobe_core::Reply;

use crate::dispatch::Endpoint;
use crate::obs::HttpMetrics;

pub struct MetricsEndpoint {
    metrics: Arc<HttpMetrics>,
}

impl MetricsEndpoint {
    pub fn new(metrics: Arc<HttpMetrics>) -> Self {
        Self { metrics }
    }
}

#[async_trait]
impl Endpoint for MetricsEndpoint {
    fn name(&self) -> &'static str {
        "metrics"
    }

    async fn handle(&self) -> Result<Reply> {
        Ok(Reply::new(self.metrics.render(), 200, CONTENT_TYPE_METRICS))
    }
}

pub struct HealthzEndpoint;

#[async_trait]
impl Endpoint for HealthzEndpoint {
    fn name(&self) -> &'static str {
        "healthz"
    }

    async fn handle(&self) -> Result<Reply> {
        Ok(Reply::text("OK\n"))
    }
}

#[derive(Debug, Serialize)]
struct Readiness {
    status: &'static str,
    timestamp: f64,
}

pub struct ReadyEndpoint;

#[async_trait]
impl Endpoint for ReadyEndpoint {
    fn name(&self) -> &'static str {
        "ready"
    }

    async fn handle(&self) -> Result<Reply> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| LoadProbeError::Internal(format!("clock before unix epoch: {e}")))?
            .as_secs_f64();
        let body = serde_json::to_vec(&Readiness { status: "ready", timestamp })
            .map_err(|e| LoadProbeError::Serialize(e.to_string()))?;
        Ok(Reply::json(body))
    }
}
