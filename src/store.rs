use crate::{
    value::{Callable, Mapping, Value},
    Error,
};
use serde::Serialize;
use serde_json::to_value;

/// Provides storage for data that templates can be rendered against.
///
/// The [`Store`] is the top-level data context of a render call. Values
/// inserted here form the outermost scope, directives such as `map` push
/// additional scopes on top of it while they render.
pub struct Store {
    /// Always the [`Value::Mapping`] variant.
    data: Value,
}

impl Store {
    /// Create a new Store.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: Value::Mapping(Mapping::new()),
        }
    }

    /// Insert the value into the Store.
    ///
    /// # Errors
    ///
    /// Returns an error if the serialization fails.
    pub fn insert<S, T>(&mut self, key: S, value: T) -> Result<(), Error>
    where
        S: Into<String>,
        T: Serialize,
    {
        let key = key.into();
        let serialized = to_value(value)
            .map_err(|_| Error::build(format!("value for key `{key}` is unserializable")))?;

        self.mapping_mut().insert(key, Value::from(serialized));
        Ok(())
    }

    /// Insert the value into the Store.
    ///
    /// # Panics
    ///
    /// Will panic if the serialization fails.
    #[inline]
    pub fn insert_must<S, T>(&mut self, key: S, value: T)
    where
        S: Into<String>,
        T: Serialize,
    {
        self.mapping_mut()
            .insert(key.into(), Value::from(to_value(value).unwrap()));
    }

    /// Insert an already-built [`Value`] into the Store.
    ///
    /// Useful when the value was produced by this crate, such as a mapping
    /// from [`record_to_mapping`][`crate::record_to_mapping`], and does not
    /// need to pass through serde.
    pub fn insert_value<S>(&mut self, key: S, value: Value)
    where
        S: Into<String>,
    {
        self.mapping_mut().insert(key.into(), value);
    }

    /// Insert an already-built [`Value`] into the Store.
    ///
    /// Returns the Store, so additional methods may be chained.
    pub fn with_value<S>(mut self, key: S, value: Value) -> Self
    where
        S: Into<String>,
    {
        self.insert_value(key, value);
        self
    }

    /// Insert a callable value into the Store.
    ///
    /// The function is invoked during rendering, either automatically when an
    /// attribute reference resolves to it, or explicitly by the `apply`
    /// directive.
    pub fn insert_callable<S, F>(&mut self, key: S, function: F)
    where
        S: Into<String>,
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.mapping_mut()
            .insert(key.into(), Value::Callable(Callable::new(function)));
    }

    /// Insert the value into the Store.
    ///
    /// Returns the Store, so additional methods may be chained.
    ///
    /// # Errors
    ///
    /// Returns an error if the serialization fails.
    pub fn with<S, T>(mut self, key: S, value: T) -> Result<Self, Error>
    where
        S: Into<String>,
        T: Serialize,
    {
        self.insert(key, value)?;
        Ok(self)
    }

    /// Insert the value into the Store.
    ///
    /// Returns the Store, so additional methods may be chained.
    ///
    /// # Panics
    ///
    /// Will panic if the serialization fails.
    #[inline]
    pub fn with_must<S, T>(mut self, key: S, value: T) -> Self
    where
        S: Into<String>,
        T: Serialize,
    {
        self.insert_must(key, value);
        self
    }

    /// Insert a callable value into the Store.
    ///
    /// Returns the Store, so additional methods may be chained.
    pub fn with_callable<S, F>(mut self, key: S, function: F) -> Self
    where
        S: Into<String>,
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.insert_callable(key, function);
        self
    }

    /// Get the value of the given key, if any.
    #[inline]
    pub fn get(&self, index: &str) -> Option<&Value> {
        self.mapping().get(index)
    }

    /// Return the outermost [`Mapping`] of the Store.
    pub(crate) fn mapping(&self) -> &Mapping {
        match &self.data {
            Value::Mapping(mapping) => mapping,
            _ => unreachable!("store data is always a mapping"),
        }
    }

    fn mapping_mut(&mut self) -> &mut Mapping {
        match &mut self.data {
            Value::Mapping(mapping) => mapping,
            _ => unreachable!("store data is always a mapping"),
        }
    }

    /// Return the Store data as a [`Value`].
    ///
    /// This is the argument handed to an auto-invoked callable.
    pub(crate) fn as_value(&self) -> &Value {
        &self.data
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::{Store, Value};

    #[test]
    fn test_insert() {
        let mut store = Store::new();
        store.insert_must("one", "two");

        assert_eq!(store.get("one"), Some(&Value::from("two")));
    }

    #[test]
    fn test_insert_fluent() {
        assert_eq!(
            Store::new().with_must("three", "four").get("three"),
            Some(&Value::from("four"))
        );
    }

    #[test]
    fn test_insert_callable() {
        let store = Store::new().with_callable("fun", |_| Value::from("out"));

        assert!(matches!(store.get("fun"), Some(Value::Callable(_))));
    }

    #[test]
    fn test_insert_nested() {
        let store = Store::new().with_must("person", serde_json::json!({"name": "taylor"}));

        match store.get("person") {
            Some(Value::Mapping(mapping)) => {
                assert_eq!(mapping.get("name"), Some(&Value::from("taylor")))
            }
            other => panic!("expected a mapping, found {other:?}"),
        }
    }
}
