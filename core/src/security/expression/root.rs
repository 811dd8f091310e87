//! Variable resolution for group expressions.

use std::collections::HashMap;

use crate::directory::Value;

/// Resolves the root identifiers of an expression.
///
/// Implement this trait to expose values that are computed on demand
/// instead of bound up front.
///
/// # Example
/// ```
/// use computed_groups_core::directory::Value;
/// use computed_groups_core::security::expression::{ExpressionContext, ExpressionRoot};
///
/// struct Tenant {
///     default: ExpressionContext,
///     name: String,
/// }
///
/// impl ExpressionRoot for Tenant {
///     fn resolve_variable(&self, name: &str) -> Option<Value> {
///         match name {
///             "tenant" => Some(Value::from(self.name.as_str())),
///             _ => self.default.resolve_variable(name),
///         }
///     }
/// }
/// ```
pub trait ExpressionRoot {
    /// Returns the value bound to `name`, or `None` if the name is unknown.
    ///
    /// Unknown names make evaluation fail. Return `Some(Value::Null)` for a
    /// known name that has no value.
    fn resolve_variable(&self, name: &str) -> Option<Value>;
}

/// Binding environment for one evaluation.
///
/// Built fresh for each evaluation and discarded afterwards.
///
/// # Example
/// ```
/// use computed_groups_core::directory::{Record, Value};
/// use computed_groups_core::security::expression::{ExpressionContext, ExpressionRoot};
///
/// let context = ExpressionContext::new()
///     .with_binding("currentUser", Record::new("jdoe"));
///
/// assert!(context.is_bound("currentUser"));
/// assert!(context.resolve_variable("other").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExpressionContext {
    bindings: HashMap<String, Value>,
}

impl ExpressionContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to `value`, replacing a previous binding.
    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.bindings.insert(name.into(), value.into());
    }

    /// Binds `name` to `value` (builder pattern).
    pub fn with_binding(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.bind(name, value);
        self
    }

    /// Returns the value bound to `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// Returns true if `name` is bound.
    pub fn is_bound(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }
}

impl ExpressionRoot for ExpressionContext {
    fn resolve_variable(&self, name: &str) -> Option<Value> {
        self.bindings.get(name).cloned()
    }
}
