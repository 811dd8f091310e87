//! Expression checks used by computed groups.
//!
//! Both operations are total: malformed expressions and evaluation failures
//! come back as `false`, never as an error.

use tracing::debug;

use crate::directory::{Record, Value};
use crate::security::expression::{ElExpression, ExpressionContext, ExpressionEvaluator};

/// Default name the user record is bound to.
pub const CURRENT_USER: &str = "currentUser";

/// Validates and evaluates group expressions against user records.
///
/// # Example
/// ```
/// use computed_groups_core::directory::Record;
/// use computed_groups_core::security::computed_groups::GroupExpressionHelper;
///
/// let helper = GroupExpressionHelper::new();
/// assert!(helper.is_valid_el(Some("empty currentUser")));
/// assert!(!helper.is_valid_el(Some("testMethodCall == hello")));
///
/// let mut user = Record::new("jdoe");
/// user.set_property("user", "company", "acme");
/// assert!(helper.is_user_in_group(&user, "currentUser.user.company == 'acme'"));
/// ```
#[derive(Debug, Clone)]
pub struct GroupExpressionHelper {
    binding: String,
    evaluator: ExpressionEvaluator,
}

impl Default for GroupExpressionHelper {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupExpressionHelper {
    /// Creates a helper binding the user as `currentUser`.
    pub fn new() -> Self {
        Self::with_binding(CURRENT_USER)
    }

    /// Creates a helper binding the user under another name.
    pub fn with_binding(binding: impl Into<String>) -> Self {
        GroupExpressionHelper {
            binding: binding.into(),
            evaluator: ExpressionEvaluator::new(),
        }
    }

    /// Returns the name the user record is bound to.
    pub fn binding(&self) -> &str {
        &self.binding
    }

    /// Returns true if `expr` is a usable group expression.
    ///
    /// The expression must parse, reference no variable other than the
    /// user binding, and produce a boolean when evaluated against an empty
    /// user record.
    pub fn is_valid_el(&self, expr: Option<&str>) -> bool {
        let expr = match expr {
            Some(expr) if !expr.trim().is_empty() => expr,
            _ => return false,
        };

        let parsed = match ElExpression::parse(expr) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(expression = expr, error = %e, "invalid group expression");
                return false;
            }
        };

        let context = self.context(Record::default());
        match self.evaluator.evaluate_bool(parsed.ast(), &context) {
            Ok(_) => true,
            Err(e) => {
                debug!(expression = expr, error = %e, "group expression does not evaluate");
                false
            }
        }
    }

    /// Returns true if `expr` evaluates to true with `user` bound.
    pub fn is_user_in_group(&self, user: &Record, expr: &str) -> bool {
        let context = self.context(user.clone());
        match self.evaluator.evaluate_str_bool(expr, &context) {
            Ok(result) => result,
            Err(e) => {
                debug!(
                    user = user.id(),
                    expression = expr,
                    error = %e,
                    "group expression failed, treating as non-member"
                );
                false
            }
        }
    }

    fn context(&self, user: Record) -> ExpressionContext {
        ExpressionContext::new().with_binding(self.binding.as_str(), Value::Record(user))
    }
}

/// [`GroupExpressionHelper::is_valid_el`] with the default binding.
pub fn is_valid_el(expr: Option<&str>) -> bool {
    GroupExpressionHelper::new().is_valid_el(expr)
}

/// [`GroupExpressionHelper::is_user_in_group`] with the default binding.
pub fn is_user_in_group(user: &Record, expr: &str) -> bool {
    GroupExpressionHelper::new().is_user_in_group(user, expr)
}
