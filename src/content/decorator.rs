//! Response decoration
//!
//! Steps that run once a file has been matched, before the body is sent.

use super::provider::FileInfo;
use crate::http::cache;
use hyper::header::{HeaderMap, HeaderValue, CACHE_CONTROL};
use std::fmt;
use std::sync::Arc;

/// What a decorator sees of the response being prepared
pub struct ResponseContext<'a> {
    /// Request subpath the file was resolved for
    pub subpath: &'a str,
    pub file: &'a FileInfo,
    pub headers: &'a mut HeaderMap,
}

pub type PrepareResponse = Arc<dyn Fn(&mut ResponseContext<'_>) + Send + Sync>;

/// Ordered prepare-response steps
#[derive(Clone, Default)]
pub struct ResponseDecorators {
    steps: Vec<PrepareResponse>,
}

impl ResponseDecorators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a step that runs after every step already registered
    pub fn push<F>(&mut self, step: F)
    where
        F: Fn(&mut ResponseContext<'_>) + Send + Sync + 'static,
    {
        self.steps.push(Arc::new(step));
    }

    pub fn apply(&self, ctx: &mut ResponseContext<'_>) {
        for step in &self.steps {
            step(ctx);
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Debug for ResponseDecorators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseDecorators")
            .field("steps", &self.steps.len())
            .finish()
    }
}

/// Let the browser keep a copy but revalidate it (by `ETag`) before each use
///
/// A `Cache-Control` set by an earlier step is left alone.
pub fn set_cache_headers(ctx: &mut ResponseContext<'_>) {
    if ctx.headers.contains_key(CACHE_CONTROL) {
        return;
    }
    ctx.headers
        .insert(CACHE_CONTROL, HeaderValue::from_static(cache::NO_CACHE));
}
