//! Loosely typed plugin contribution values.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Number, Value};

type CallbackFn = dyn Fn(&mut Value, &[Value]) -> anyhow::Result<Value> + Send + Sync;

/// A function contributed by a plugin.
///
/// Every callback receives a mutable target and a slice of arguments and
/// returns a value. Hooks and producers ignore the target; chain mutators
/// ignore the return value.
#[derive(Clone)]
pub struct Callback {
    inner: Arc<CallbackFn>,
}

impl Callback {
    /// Create a callback from a raw `(target, args) -> value` closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Value, &[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Lifecycle hook that only looks at its arguments.
    pub fn hook<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self::new(move |_, args| f(args).map(|()| Value::Null))
    }

    /// Mutator that edits the target in place.
    pub fn mutator<F>(f: F) -> Self
    where
        F: Fn(&mut Value, &[Value]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self::new(move |target, args| f(target, args).map(|()| Value::Null))
    }

    /// Producer that computes a value from its arguments.
    pub fn producer<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self::new(move |_, args| f(args))
    }

    /// Invoke the callback.
    pub fn call(&self, target: &mut Value, args: &[Value]) -> anyhow::Result<Value> {
        (self.inner)(target, args)
    }

    /// Whether both handles point to the same function.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

/// A value supplied by a plugin for one extension point.
#[derive(Debug, Clone)]
pub enum PluginValue {
    /// A callback.
    Function(Callback),
    /// A sequence of values.
    List(Vec<PluginValue>),
    /// A plain object.
    Object(Map<String, Value>),
    /// A string (usually a module path).
    String(String),
    /// A boolean.
    Bool(bool),
    /// A number.
    Number(Number),
    /// An explicit null. Treated as "no value" by option instances.
    Null,
}

impl PluginValue {
    /// Human readable type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Function(_) => "Function",
            Self::List(_) => "Array",
            Self::Object(_) => "Object",
            Self::String(_) => "String",
            Self::Bool(_) => "Boolean",
            Self::Number(_) => "Number",
            Self::Null => "Null",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_function(&self) -> Option<&Callback> {
        match self {
            Self::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Convert to JSON. Functions have no data representation and yield `None`;
    /// lists drop their function elements.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            Self::Function(_) => None,
            Self::List(items) => {
                Some(Value::Array(items.iter().filter_map(Self::to_json).collect()))
            }
            Self::Object(map) => Some(Value::Object(map.clone())),
            Self::String(s) => Some(Value::String(s.clone())),
            Self::Bool(b) => Some(Value::Bool(*b)),
            Self::Number(n) => Some(Value::Number(n.clone())),
            Self::Null => Some(Value::Null),
        }
    }
}

impl From<Value> for PluginValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::Object(map),
        }
    }
}

impl From<Callback> for PluginValue {
    fn from(callback: Callback) -> Self {
        Self::Function(callback)
    }
}

impl From<&str> for PluginValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for PluginValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for PluginValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Map<String, Value>> for PluginValue {
    fn from(map: Map<String, Value>) -> Self {
        Self::Object(map)
    }
}

impl<T: Into<Self>> From<Vec<T>> for PluginValue {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}
