//! Expression language for computed groups.
//!
//! # Overview
//! Computed groups are defined by small boolean expressions evaluated
//! against the user being resolved, which is bound as `currentUser`.
//! This module provides the lexer, parser, AST and evaluator for that
//! restricted, EL-like language.
//!
//! # Supported Expressions
//!
//! ## Operands
//! - `currentUser.user.company` - Property access; a record exposes each
//!   schema as a nested record
//! - `hello[1]`, `currentUser["user.company"]` - Bracket access
//! - `"text"`, `'text'`, `42`, `1.5`, `true`, `false`, `null` - Literals
//!
//! ## Operators
//! - `==` / `eq`, `!=` / `ne` - Equality
//! - `<` / `lt`, `<=` / `le`, `>` / `gt`, `>=` / `ge` - Ordering
//! - `&&` / `and`, `||` / `or`, `!` / `not` - Logic
//! - `empty` - True for null, empty strings, lists and records
//! - `(` `)` - Grouping
//!
//! A surrounding `${...}` is accepted. Function and method calls are not
//! part of the language and are rejected by the parser.
//!
//! # Examples
//! ```
//! use computed_groups_core::directory::Record;
//! use computed_groups_core::security::expression::{
//!     ElExpression, ExpressionContext, ExpressionEvaluator,
//! };
//!
//! let mut user = Record::new("jdoe");
//! user.set_property("user", "company", "acme");
//!
//! let context = ExpressionContext::new().with_binding("currentUser", user);
//! let expr = ElExpression::parse("currentUser.user.company == 'acme'").unwrap();
//!
//! let evaluator = ExpressionEvaluator::new();
//! assert!(evaluator.evaluate_bool(expr.ast(), &context).unwrap());
//! ```

mod ast;
mod evaluator;
mod parser;
mod root;

pub use ast::{BinaryOp, Expression, UnaryOp};
pub use evaluator::{coerce_bool, EvaluationError, ExpressionError, ExpressionEvaluator};
pub use parser::{ElExpression, ParseError, MAX_DEPTH};
pub use root::{ExpressionContext, ExpressionRoot};
