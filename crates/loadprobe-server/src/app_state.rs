//! Shared application state for the loadprobe server.
//!
//! Owns the metrics registry and the dispatcher built on top of it. Startup
//! errors surface as `Result` so `main` can report them without panicking.

use std::sync::Arc;

use loadprobe_core::error::Result;

use crate::config::ServerConfig;
use crate::dispatch::{Dispatcher, RouteTable};
use crate::handlers;
use crate::obs::HttpMetrics;

#[derive(Clone)]
pub struct AppState {
    cfg: Arc<ServerConfig>,
    metrics: Arc<HttpMetrics>,
    dispatcher: Arc<Dispatcher>,
}

impl AppState {
    /// Build state with the built-in route table.
    pub fn new(cfg: ServerConfig) -> Result<Self> {
        cfg.validate()?;
        let metrics = Arc::new(HttpMetrics::new(cfg.metrics_namespace.clone()));
        let routes = handlers::builtin_routes(&cfg, Arc::clone(&metrics))?;
        Ok(Self::from_parts(cfg, metrics, routes))
    }

    /// Build state around an existing registry and route table.
    pub fn from_parts(cfg: ServerConfig, metrics: Arc<HttpMetrics>, routes: RouteTable) -> Self {
        let dispatcher = Dispatcher::new(routes, Arc::clone(&metrics), cfg.expose_fault_detail);
        Self {
            cfg: Arc::new(cfg),
            metrics,
            dispatcher: Arc::new(dispatcher),
        }
    }

    pub fn cfg(&self) -> &ServerConfig {
        &self.cfg
    }

    pub fn metrics(&self) -> Arc<HttpMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }
}
