//! Exact-match route table.
//!
//! Paths map to endpoint trait objects. There is no prefix or pattern
//! matching and no method-based routing; anything not registered resolves to
//! the fallback endpoint, which is also bound to `/`.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use loadprobe_core::error::{LoadProbeError, Result};
use loadprobe_core::Reply;

pub const ROOT_PATH: &str = "/";

/// One HTTP endpoint. Takes no input beyond the request it serves.
#[async_trait]
pub trait Endpoint: Send + Sync {
    /// Stable identifier, used in logs and tests.
    fn name(&self) -> &'static str;
    async fn handle(&self) -> Result<Reply>;
}

pub struct RouteTable {
    routes: DashMap<String, Arc<dyn Endpoint>>,
    fallback: Arc<dyn Endpoint>,
}

impl RouteTable {
    pub fn new(fallback: Arc<dyn Endpoint>) -> Self {
        let routes: DashMap<String, Arc<dyn Endpoint>> = DashMap::new();
        routes.insert(ROOT_PATH.to_string(), Arc::clone(&fallback));
        Self { routes, fallback }
    }

    /// Bind `path` to `endpoint`. Each path may be bound once.
    pub fn register(&self, path: &str, endpoint: Arc<dyn Endpoint>) -> Result<()> {
        match self.routes.entry(path.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(LoadProbeError::DuplicateRoute(path.to_string()))
            }
            dashmap::mapref::entry::Entry::Vacant(v) => {
                v.insert(endpoint);
                Ok(())
            }
        }
    }

    /// Swap the endpoint behind an already registered path.
    /// Returns the previous endpoint, or `None` if the path was not bound.
    pub fn replace(&self, path: &str, endpoint: Arc<dyn Endpoint>) -> Option<Arc<dyn Endpoint>> {
        let mut slot = self.routes.get_mut(path)?;
        Some(std::mem::replace(slot.value_mut(), endpoint))
    }

    pub fn resolve(&self, path: &str) -> Arc<dyn Endpoint> {
        self.routes
            .get(path)
            .map(|e| Arc::clone(e.value()))
            .unwrap_or_else(|| Arc::clone(&self.fallback))
    }

    /// Registered paths, sorted.
    pub fn paths(&self) -> Vec<String> {
        let mut out: Vec<String> = self.routes.iter().map(|e| e.key().clone()).collect();
        out.sort();
        out
    }
}
