//! Dynamic property bag addressed by string name.
//!
//! A key that is absent is "undefined"; a key holding `Value::Null` is a
//! real value and is propagated like any other.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct Vars {
    inner: Map<String, Value>,
}

impl Vars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder style [`Vars::set`].
    pub fn with<V: Into<Value>>(
        mut self,
        key: &str,
        value: V,
    ) -> Self {
        self.set(key, value);
        self
    }

    pub fn set<V: Into<Value>>(
        &mut self,
        key: &str,
        value: V,
    ) {
        self.inner.insert(key.to_string(), value.into());
    }

    /// Typed read, `None` when the key is absent or has another shape.
    pub fn get<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Option<T> {
        self.inner.get(key).and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn get_value(
        &self,
        key: &str,
    ) -> Option<&Value> {
        self.inner.get(key)
    }

    pub fn remove(
        &mut self,
        key: &str,
    ) -> Option<Value> {
        self.inner.remove(key)
    }

    pub fn contains_key(
        &self,
        key: &str,
    ) -> bool {
        self.inner.contains_key(key)
    }

    /// Copy every entry of `other` onto `self`, overwriting existing keys.
    pub fn extend(
        &mut self,
        other: &Vars,
    ) {
        for (k, v) in other.iter() {
            self.inner.insert(k.clone(), v.clone());
        }
    }

    pub fn iter(&self) -> serde_json::map::Iter<'_> {
        self.inner.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.inner.keys()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl From<Map<String, Value>> for Vars {
    fn from(inner: Map<String, Value>) -> Self {
        Self {
            inner,
        }
    }
}

/// Non-object values become an empty bag.
impl From<Value> for Vars {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(inner) => Self {
                inner,
            },
            _ => Self::new(),
        }
    }
}

impl From<Vars> for Value {
    fn from(vars: Vars) -> Self {
        Value::Object(vars.inner)
    }
}

impl FromIterator<(String, Value)> for Vars {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_null_is_a_value() {
        let vars = Vars::new().with("a", Value::Null);
        assert!(vars.contains_key("a"));
        assert!(!vars.contains_key("b"));
    }

    #[test]
    fn test_typed_get() {
        let vars = Vars::from(json!({"count": 3, "name": "x"}));
        assert_eq!(vars.get::<u64>("count"), Some(3));
        assert_eq!(vars.get::<u64>("name"), None);
        assert_eq!(vars.get::<String>("name").as_deref(), Some("x"));
    }

    #[test]
    fn test_non_object_is_empty() {
        assert!(Vars::from(json!([1, 2])).is_empty());
    }
}
