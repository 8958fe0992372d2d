//! Request Context
//!
//! Per-operation context handed to every pre-check, validator and resolver.
//! Applications attach their own handles (database pools, the current user)
//! as typed data; nothing here is shared between operations.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use uuid::Uuid;

/// Context carried through the resolution pipeline
#[derive(Clone)]
pub struct RequestContext {
    /// Request ID for tracing
    pub request_id: Uuid,

    /// Free-form metadata for observability
    pub metadata: HashMap<String, Value>,

    data: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,

    /// Start time for duration tracking
    started_at: Instant,
}

impl RequestContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            metadata: HashMap::new(),
            data: HashMap::new(),
            started_at: Instant::now(),
        }
    }

    /// Get elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u128 {
        self.started_at.elapsed().as_millis()
    }

    /// Add metadata for observability
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Attach a typed value, replacing any previous value of the same type.
    pub fn with_data<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.insert(value);
        self
    }

    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.data.insert(TypeId::of::<T>(), Arc::new(value));
    }

    /// Typed value previously attached with [`with_data`](Self::with_data).
    pub fn data<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.data
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("request_id", &self.request_id)
            .field("metadata", &self.metadata)
            .field("data", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct CurrentUser(&'static str);

    #[test]
    fn test_typed_data() {
        let ctx = RequestContext::new().with_data(CurrentUser("ada"));
        assert_eq!(ctx.data::<CurrentUser>(), Some(&CurrentUser("ada")));
        assert!(ctx.data::<String>().is_none());
    }

    #[test]
    fn test_metadata() {
        let ctx = RequestContext::new().with_metadata("client", Value::from("cli"));
        assert_eq!(ctx.metadata["client"], Value::from("cli"));
    }
}
