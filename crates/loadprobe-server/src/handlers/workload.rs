//! Demo workloads: constant greeting, fixed delay, bounded CPU work.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use loadprobe_core::error::{LoadProbeError, Result};
use loadprobe_core::Reply;

use crate::dispatch::Endpoint;

/// Fallback for `/` and every unregistered path.
pub struct GreetingEndpoint;

#[async_trait]
impl Endpoint for GreetingEndpoint {
    fn name(&self) -> &'static str {
        "root"
    }

    async fn handle(&self) -> Result<Reply> {
        Ok(Reply::text("Hello, World!\n"))
    }
}

/// Holds its request for a fixed delay before answering.
///
/// The delay is a timer sleep on the runtime, so with the multi-threaded
/// server it only slows the request that hit `/slow`.
pub struct SlowEndpoint {
    delay: Duration,
}

impl SlowEndpoint {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Endpoint for SlowEndpoint {
    fn name(&self) -> &'static str {
        "slow"
    }

    async fn handle(&self) -> Result<Reply> {
        tokio::time::sleep(self.delay).await;
        Ok(Reply::text("Slow response completed\n"))
    }
}

#[derive(Debug, Serialize)]
struct Computation {
    result: u64,
    message: &'static str,
}

/// Sum of squares over `0..upper_bound`.
pub struct ComputeEndpoint {
    upper_bound: u64,
}

impl ComputeEndpoint {
    pub fn new(upper_bound: u64) -> Self {
        Self { upper_bound }
    }
}

#[async_trait]
impl Endpoint for ComputeEndpoint {
    fn name(&self) -> &'static str {
        "compute"
    }

    async fn handle(&self) -> Result<Reply> {
        let result = sum_of_squares(self.upper_bound)?;
        let body = serde_json::to_vec(&Computation { result, message: "Computation completed" })
            .map_err(|e| LoadProbeError::Serialize(e.to_string()))?;
        Ok(Reply::json(body))
    }
}

pub fn sum_of_squares(upper_bound: u64) -> Result<u64> {
    (0..upper_bound).try_fold(0u64, |acc, i| {
        i.checked_mul(i)
            .and_then(|sq| acc.checked_add(sq))
            .ok_or_else(|| LoadProbeError::Compute(format!("sum of squares overflows u64 at i={i}")))
    })
}
