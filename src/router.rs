//! Exact-match route registry: a flat `(method, path)` table built
//! once at startup and immutable for the life of the process.

use crate::config::Config;
use crate::http::request::Request;
use crate::http::response::HttpResponse;
use std::collections::HashMap;
use std::sync::Arc;

pub type Handler = fn(&Request, &[u8], &Config) -> HttpResponse;

pub struct Router {
    routes: HashMap<(String, String), Handler>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingError {
    NotFound,
}

impl Router {
    /// `find` never mutates; the table was frozen at `build()` time.
    pub fn find(&self, method: &str, path: &str) -> Result<Handler, RoutingError> {
        self.routes
            .get(&(method.to_string(), path.to_string()))
            .copied()
            .ok_or(RoutingError::NotFound)
    }
}

#[derive(Default)]
pub struct RouterBuilder {
    routes: HashMap<(String, String), Handler>,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, method: &str, path: &str, handler: Handler) -> Self {
        self.routes
            .insert((method.to_string(), path.to_string()), handler);
        self
    }

    pub fn build(self) -> Arc<Router> {
        Arc::new(Router {
            routes: self.routes,
        })
    }
}
