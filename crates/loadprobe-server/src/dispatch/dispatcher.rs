use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures_util::FutureExt;

use loadprobe_core::error::LoadProbeError;
use loadprobe_core::Reply;

use crate::dispatch::routes::RouteTable;
use crate::obs::HttpMetrics;

/// Body used for 500s when fault detail is not exposed.
const REDACTED_FAULT: &str = "internal error";

/// Runs one request end to end and records its metrics.
///
/// Every call produces exactly one reply, one histogram observation, one
/// counter increment and one balanced in-flight inc/dec pair, whether the
/// endpoint succeeds, returns an error or panics. `dispatch` itself must be
/// polled to completion for that to hold; callers that may be dropped early
/// (a connection going away) use [`Dispatcher::spawn_dispatch`].
pub struct Dispatcher {
    routes: RouteTable,
    metrics: Arc<HttpMetrics>,
    expose_fault_detail: bool,
}

impl Dispatcher {
    pub fn new(routes: RouteTable, metrics: Arc<HttpMetrics>, expose_fault_detail: bool) -> Self {
        Self {
            routes,
            metrics,
            expose_fault_detail,
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub async fn dispatch(&self, method: &str, path: &str) -> Reply {
        let _in_flight = self.metrics.in_flight.track();
        let start = Instant::now();

        let endpoint = self.routes.resolve(path);
        let reply = match AssertUnwindSafe(endpoint.handle()).catch_unwind().await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => self.fault(endpoint.name(), method, path, &e),
            Err(panic) => {
                let e = LoadProbeError::Internal(panic_message(&*panic));
                self.fault(endpoint.name(), method, path, &e)
            }
        };

        self.metrics
            .observe_request(path, method, reply.status, start.elapsed());
        reply
    }

    /// Run `dispatch` as its own task and wait for it.
    ///
    /// Dropping the returned future does not cancel the request: the handler
    /// still runs to completion and its metrics are still recorded.
    pub async fn spawn_dispatch(self: Arc<Self>, method: String, path: String) -> Reply {
        let task = tokio::spawn(async move { self.dispatch(&method, &path).await });
        match task.await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "dispatch task failed");
                Reply::fault(format!("Error: {REDACTED_FAULT}\n"))
            }
        }
    }

    fn fault(&self, endpoint: &str, method: &str, path: &str, e: &LoadProbeError) -> Reply {
        tracing::warn!(endpoint, method, path, code = e.code().as_str(), error = %e, "handler fault");
        let body = if self.expose_fault_detail {
            format!("Error: {e}\n")
        } else {
            format!("Error: {REDACTED_FAULT}\n")
        };
        Reply::fault(body)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panic: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panic: {s}")
    } else {
        "panic".to_string()
    }
}
