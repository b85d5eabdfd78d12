use serde_json::Value;

use crate::{common::MemCache, common::Vars, utils};

const DEFAULT_CAPACITY: usize = 1024;

/// External values handed to a graph run and to every handler.
///
/// Values are keyed either by `"<nodeId>.<property>"` or by a bare
/// `"<property>"` name.
#[derive(Clone)]
pub struct Context {
    id: String,
    values: MemCache<String, Value>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id: utils::longid(),
            values: MemCache::new(capacity),
        }
    }

    /// run id, used in events and logs
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn get(
        &self,
        key: &str,
    ) -> Option<Value> {
        self.values.get(&key.to_string())
    }

    pub fn set<V: Into<Value>>(
        &self,
        key: &str,
        value: V,
    ) {
        self.values.set(key.to_string(), value.into());
    }

    pub fn with<V: Into<Value>>(
        self,
        key: &str,
        value: V,
    ) -> Self {
        self.set(key, value);
        self
    }

    pub fn remove(
        &self,
        key: &str,
    ) {
        self.values.remove(&key.to_string());
    }

    /// Seed value for an input property: the node-qualified key wins over
    /// the bare property name.
    pub fn resolve(
        &self,
        nid: &str,
        property: &str,
    ) -> Option<Value> {
        self.get(&format!("{}.{}", nid, property)).or_else(|| self.get(property))
    }

    /// Snapshot of every value.
    pub fn values(&self) -> Vars {
        self.values.iter().map(|(k, v)| (k.as_ref().clone(), v)).collect()
    }
}

impl From<Vars> for Context {
    fn from(vars: Vars) -> Self {
        let ctx = Self::with_capacity(DEFAULT_CAPACITY.max(vars.len()));
        for (k, v) in vars.iter() {
            ctx.set(k, v.clone());
        }
        ctx
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_resolve_prefers_qualified_key() {
        let ctx = Context::new().with("url", "https://a").with("fetch.url", "https://b");
        assert_eq!(ctx.resolve("fetch", "url"), Some(json!("https://b")));
        assert_eq!(ctx.resolve("other", "url"), Some(json!("https://a")));
        assert_eq!(ctx.resolve("other", "missing"), None);

        ctx.remove("fetch.url");
        assert_eq!(ctx.resolve("fetch", "url"), Some(json!("https://a")));
    }

    #[test]
    fn test_from_vars() {
        let ctx = Context::from(Vars::new().with("a", 1).with("b", json!(null)));
        assert_eq!(ctx.get("a"), Some(json!(1)));
        assert_eq!(ctx.get("b"), Some(json!(null)));
        assert_eq!(ctx.values().len(), 2);
        assert!(!ctx.id().is_empty());
    }

    #[test]
    fn test_values_outlive_capacity() {
        let ctx = Context::with_capacity(16);
        for i in 0..3000 {
            ctx.set(&format!("n{}.value", i), i);
        }
        let missing = (0..3000).filter(|i| ctx.resolve(&format!("n{}", i), "value").is_none()).count();
        assert_eq!(missing, 0);
        assert_eq!(ctx.resolve("n2999", "value"), Some(json!(2999)));
    }
}
