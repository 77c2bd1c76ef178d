//! Server config loader (environment overrides, strict keys).
//!
//! Every variable with the `LOADPROBE_` prefix must be recognised; a typo is a
//! startup error rather than a silently ignored setting.

pub mod schema;

use loadprobe_core::error::{LoadProbeError, Result};

pub use schema::ServerConfig;

pub const ENV_PREFIX: &str = "LOADPROBE_";

pub fn load_from_env() -> Result<ServerConfig> {
    load_from_vars(std::env::vars())
}

pub fn load_from_vars<I>(vars: I) -> Result<ServerConfig>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut cfg = ServerConfig::default();
    for (key, value) in vars {
        let Some(field) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        match field {
            "LISTEN" => cfg.listen = value,
            "METRICS_NAMESPACE" => cfg.metrics_namespace = value,
            "SLOW_DELAY_MS" => cfg.slow_delay_ms = parse_u64(&key, &value)?,
            "COMPUTE_UPPER_BOUND" => cfg.compute_upper_bound = parse_u64(&key, &value)?,
            "EXPOSE_FAULT_DETAIL" => cfg.expose_fault_detail = parse_bool(&key, &value)?,
            _ => return Err(LoadProbeError::Config(format!("unknown variable: {key}"))),
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn parse_u64(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|e| LoadProbeError::Config(format!("{key}={value:?}: {e}")))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(LoadProbeError::Config(format!("{key}={value:?}: expected a boolean"))),
    }
}
