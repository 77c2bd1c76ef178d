use std::net::SocketAddr;

use loadprobe_core::error::{LoadProbeError, Result};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: String,
    /// Prefix for every exported metric family.
    pub metrics_namespace: String,
    pub slow_delay_ms: u64,
    /// `/api/compute` sums squares over `0..compute_upper_bound`.
    pub compute_upper_bound: u64,
    /// Embed the fault description in 500 bodies.
    pub expose_fault_detail: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            metrics_namespace: default_metrics_namespace(),
            slow_delay_ms: default_slow_delay_ms(),
            compute_upper_bound: default_compute_upper_bound(),
            expose_fault_detail: true,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;

        if !is_metric_ident(&self.metrics_namespace) {
            return Err(LoadProbeError::Config(format!(
                "metrics_namespace must match [a-zA-Z_][a-zA-Z0-9_]*, got {:?}",
                self.metrics_namespace
            )));
        }
        if self.slow_delay_ms > 60_000 {
            return Err(LoadProbeError::Config(
                "slow_delay_ms must be between 0 and 60000".into(),
            ));
        }
        if !(1..=1_000_000).contains(&self.compute_upper_bound) {
            return Err(LoadProbeError::Config(
                "compute_upper_bound must be between 1 and 1000000".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            LoadProbeError::Config(format!("listen must be a valid socket address ({}): {e}", self.listen))
        })
    }
}

fn is_metric_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn default_listen() -> String {
    "0.0.0.0:8000".into()
}
fn default_metrics_namespace() -> String {
    "python_app".into()
}
fn default_slow_delay_ms() -> u64 {
    2000
}
fn default_compute_upper_bound() -> u64 {
    10_000
}
