//! Built-in endpoints and the default route table.

pub mod ops;
pub mod workload;

use std::sync::Arc;
use std::time::Duration;

use loadprobe_core::Result;

use crate::config::ServerConfig;
use crate::dispatch::RouteTable;
use crate::obs::HttpMetrics;

pub use ops::{HealthzEndpoint, MetricsEndpoint, ReadyEndpoint};
pub use workload::{ComputeEndpoint, GreetingEndpoint, SlowEndpoint};

pub fn builtin_routes(cfg: &ServerConfig, metrics: Arc<HttpMetrics>) -> Result<RouteTable> {
    let routes = RouteTable::new(Arc::new(GreetingEndpoint));
    routes.register("/metrics", Arc::new(MetricsEndpoint::new(metrics)))?;
    routes.register("/healthz", Arc::new(HealthzEndpoint))?;
    routes.register("/ready", Arc::new(ReadyEndpoint))?;
    routes.register("/slow", Arc::new(SlowEndpoint::new(Duration::from_millis(cfg.slow_delay_ms))))?;
    routes.register("/api/compute", Arc::new(ComputeEndpoint::new(cfg.compute_upper_bound)))?;
    Ok(routes)
}
