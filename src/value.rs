use std::{
    collections::BTreeMap,
    fmt::{Debug, Formatter, Result},
    sync::Arc,
};

/// A single scope of key to [`Value`] associations.
pub type Mapping = BTreeMap<String, Value>;

/// The run-time data model that templates are rendered against.
///
/// Data usually enters a [`Store`][`crate::Store`] through serde, in which
/// case it is converted from a [`serde_json::Value`]. Functions are the
/// exception, they are inserted directly as the `Callable` variant.
#[derive(Debug, Clone)]
pub enum Value {
    /// Text, rendered verbatim.
    Scalar(String),
    /// A key to `Value` association.
    Mapping(Mapping),
    /// An ordered sequence of values, the iteration source for `map`
    /// and `join`.
    List(Vec<Value>),
    /// A function over values.
    ///
    /// A terminal callable reached by plain attribute resolution is invoked
    /// automatically with the outermost mapping of the data context, and the
    /// `apply` directive invokes one explicitly with a resolved argument.
    Callable(Callable),
}

impl Value {
    /// Describe the variant of this [`Value`].
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Scalar(_) => "scalar",
            Value::Mapping(_) => "mapping",
            Value::List(_) => "list",
            Value::Callable(_) => "callable",
        }
    }

    /// Return true if this [`Value`] is considered truthy by the `if`
    /// directive.
    ///
    /// Empty scalars and empty lists are falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Scalar(text) => !text.is_empty(),
            Value::List(list) => !list.is_empty(),
            Value::Mapping(_) | Value::Callable(_) => true,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Scalar(left), Value::Scalar(right)) => left == right,
            (Value::Mapping(left), Value::Mapping(right)) => left == right,
            (Value::List(left), Value::List(right)) => left == right,
            // Function identity is not observable, callables never compare equal.
            (Value::Callable(_), Value::Callable(_)) => false,
            _ => false,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Scalar(String::new()),
            serde_json::Value::Bool(bool) => Value::Scalar(bool.to_string()),
            serde_json::Value::Number(number) => Value::Scalar(number.to_string()),
            serde_json::Value::String(string) => Value::Scalar(string),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => Value::Mapping(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Scalar(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Scalar(value)
    }
}

/// A function over values, stored in a [`Store`][`crate::Store`].
#[derive(Clone)]
pub struct Callable(Arc<dyn Fn(&Value) -> Value + Send + Sync>);

impl Callable {
    /// Create a new [`Callable`] from the given function.
    pub fn new<F>(function: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Self(Arc::new(function))
    }

    /// Invoke the [`Callable`] with the given argument.
    pub fn call(&self, argument: &Value) -> Value {
        (self.0)(argument)
    }
}

impl Debug for Callable {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str("<callable>")
    }
}

#[cfg(test)]
mod tests {
    use super::{Callable, Value};
    use serde_json::json;

    #[test]
    fn test_from_serde() {
        let value = Value::from(json!({
            "name": "taylor",
            "age": 25,
            "tags": ["a", "b"],
        }));

        match value {
            Value::Mapping(mapping) => {
                assert_eq!(mapping.get("name"), Some(&Value::from("taylor")));
                assert_eq!(mapping.get("age"), Some(&Value::from("25")));
                assert_eq!(
                    mapping.get("tags"),
                    Some(&Value::List(vec![Value::from("a"), Value::from("b")]))
                );
            }
            other => panic!("expected a mapping, found {}", other.kind()),
        }
    }

    #[test]
    fn test_truthy() {
        assert!(Value::from("text").is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::List(vec![Value::from("a")]).is_truthy());
        assert!(!Value::List(vec![]).is_truthy());
        assert!(Value::Mapping(Default::default()).is_truthy());
    }

    #[test]
    fn test_call() {
        let upper = Callable::new(|value| match value {
            Value::Scalar(text) => Value::Scalar(text.to_uppercase()),
            other => other.clone(),
        });

        assert_eq!(upper.call(&Value::from("abc")), Value::from("ABC"));
    }
}
