//! loadprobe server
//!
//! - HTTP/1.1 on 0.0.0.0:8000 (override with LOADPROBE_LISTEN)
//! - Per-request count, latency histogram and in-flight gauge on /metrics
//! - Runs until Ctrl-C; in-flight requests are not drained

use std::future::IntoFuture;
use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

use loadprobe_core::error::{LoadProbeError, Result};
use loadprobe_server::{app_state, config, router};

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.code().as_str(), error = %e, "loadprobe-server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let state = app_state::AppState::new(config::load_from_env()?)?;
    let listen = state.cfg().listen_addr()?;
    let paths = state.dispatcher().routes().paths();
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| LoadProbeError::Internal(format!("bind {listen} failed: {e}")))?;

    tracing::info!(%listen, "loadprobe-server starting");
    for path in &paths {
        tracing::info!(url = %format!("http://localhost:{}{}", listen.port(), path), "endpoint");
    }

    tokio::select! {
        res = axum::serve(listener, app).into_future() => {
            res.map_err(|e| LoadProbeError::Internal(format!("server failed: {e}")))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
        }
    }
    Ok(())
}
