//! Abstract Syntax Tree for group expressions.

use crate::directory::Value;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// Logical AND (`&&`, `and`)
    And,
    /// Logical OR (`||`, `or`)
    Or,
    /// Equality (`==`, `eq`)
    Eq,
    /// Inequality (`!=`, `ne`)
    Ne,
    /// `<`, `lt`
    Lt,
    /// `<=`, `le`
    Le,
    /// `>`, `gt`
    Gt,
    /// `>=`, `ge`
    Ge,
}

impl BinaryOp {
    /// Canonical symbol, used in error messages.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Logical NOT (`!`, `not`)
    Not,
    /// Emptiness / existence check (`empty`)
    Empty,
    /// Arithmetic negation (`-`)
    Neg,
}

/// An expression AST node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A literal: string, number, boolean or null
    Literal(Value),

    /// A root variable looked up in the evaluation context
    /// e.g., `currentUser`
    Identifier(String),

    /// Property access
    /// e.g., `currentUser.user` -> Member(Identifier("currentUser"), "user")
    Member {
        target: Box<Expression>,
        name: String,
    },

    /// Bracket access
    /// e.g., `hello[1]`, `currentUser["user.company"]`
    Index {
        target: Box<Expression>,
        index: Box<Expression>,
    },

    /// A binary operation
    /// e.g., `currentUser.user.company == "acme"`
    Binary {
        left: Box<Expression>,
        op: BinaryOp,
        right: Box<Expression>,
    },

    /// A unary operation
    /// e.g., `empty currentUser.user.email`
    Unary { op: UnaryOp, expr: Box<Expression> },

    /// A grouped expression (parentheses)
    Group(Box<Expression>),
}

impl Expression {
    /// Creates a literal expression.
    pub fn literal(value: impl Into<Value>) -> Self {
        Expression::Literal(value.into())
    }

    /// Creates an identifier expression.
    pub fn identifier(name: impl Into<String>) -> Self {
        Expression::Identifier(name.into())
    }

    /// Creates a member access on `target`.
    pub fn member(target: Expression, name: impl Into<String>) -> Self {
        Expression::Member {
            target: Box::new(target),
            name: name.into(),
        }
    }

    /// Builds `root.a.b.c` from a dotted path.
    pub fn path(path: &str) -> Self {
        let mut parts = path.split('.');
        let root = Expression::identifier(parts.next().unwrap_or_default());
        parts.fold(root, Expression::member)
    }

    /// Creates a binary expression.
    pub fn binary(left: Expression, op: BinaryOp, right: Expression) -> Self {
        Expression::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Creates a unary expression.
    pub fn unary(op: UnaryOp, expr: Expression) -> Self {
        Expression::Unary {
            op,
            expr: Box::new(expr),
        }
    }

    /// Root identifiers referenced anywhere in the expression, in order of
    /// first appearance.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_identifiers(&mut names);
        names
    }

    fn collect_identifiers<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Expression::Literal(_) => {}
            Expression::Identifier(name) => {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
            Expression::Member { target, .. } => target.collect_identifiers(names),
            Expression::Index { target, index } => {
                target.collect_identifiers(names);
                index.collect_identifiers(names);
            }
            Expression::Binary { left, right, .. } => {
                left.collect_identifiers(names);
                right.collect_identifiers(names);
            }
            Expression::Unary { expr, .. } | Expression::Group(expr) => {
                expr.collect_identifiers(names)
            }
        }
    }
}
