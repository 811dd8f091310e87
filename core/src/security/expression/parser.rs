//! Group expression parser.
//!
//! Parses EL-like boolean expressions into an AST.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use super::ast::{BinaryOp, Expression, UnaryOp};
use crate::directory::Value;

/// Maximum nesting of operators, groups and accessors in one expression.
pub const MAX_DEPTH: usize = 128;

/// Error type for expression parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Unexpected end of input
    UnexpectedEof,
    /// Unexpected character
    UnexpectedChar(char),
    /// Unexpected token
    UnexpectedToken(String),
    /// Unclosed parenthesis
    UnclosedParen,
    /// Unclosed bracket
    UnclosedBracket,
    /// Unclosed string
    UnclosedString,
    /// Empty expression
    EmptyExpression,
    /// Function or method call, which the grammar does not support
    InvalidFunction(String),
    /// Numeric literal out of range
    InvalidNumber(String),
    /// Nesting deeper than [`MAX_DEPTH`]
    TooDeep,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedEof => write!(f, "unexpected end of expression"),
            ParseError::UnexpectedChar(c) => write!(f, "unexpected character: '{}'", c),
            ParseError::UnexpectedToken(t) => write!(f, "unexpected token: '{}'", t),
            ParseError::UnclosedParen => write!(f, "unclosed parenthesis"),
            ParseError::UnclosedBracket => write!(f, "unclosed bracket"),
            ParseError::UnclosedString => write!(f, "unclosed string literal"),
            ParseError::EmptyExpression => write!(f, "empty expression"),
            ParseError::InvalidFunction(name) => {
                write!(f, "function calls are not supported: '{}'", name)
            }
            ParseError::InvalidNumber(n) => write!(f, "invalid number: '{}'", n),
            ParseError::TooDeep => {
                write!(f, "expression nested deeper than {} levels", MAX_DEPTH)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Token types for the lexer.
#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// Identifier (variable or property name)
    Ident(String),
    /// String literal
    String(String),
    /// Integer literal
    Integer(i64),
    /// Floating point literal
    Float(f64),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Dot,
    Minus,
    And,
    Or,
    Not,
    Empty,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    True,
    False,
    Null,
}

/// A parsed group expression.
///
/// # Example
/// ```
/// use computed_groups_core::security::expression::ElExpression;
///
/// let expr = ElExpression::parse("currentUser.user.company == \"acme\"").unwrap();
/// assert_eq!(expr.ast().identifiers(), vec!["currentUser"]);
///
/// assert!(ElExpression::parse("fdsfds ! fdsf^6").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ElExpression {
    /// The expression string as written
    source: String,
    /// The parsed AST
    ast: Expression,
}

impl ElExpression {
    /// Parses an expression string.
    ///
    /// A surrounding `${...}` or `#{...}` delimiter is accepted and stripped.
    pub fn parse(expr: &str) -> Result<Self, ParseError> {
        let tokens = tokenize(strip_delimiters(expr))?;
        if tokens.is_empty() {
            return Err(ParseError::EmptyExpression);
        }

        let ast = Parser::new(tokens).parse()?;

        Ok(ElExpression {
            source: expr.to_string(),
            ast,
        })
    }

    /// Returns the expression string as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns a reference to the parsed AST.
    pub fn ast(&self) -> &Expression {
        &self.ast
    }

    /// Consumes self and returns the AST.
    pub fn into_ast(self) -> Expression {
        self.ast
    }
}

fn strip_delimiters(expr: &str) -> &str {
    let trimmed = expr.trim();
    for opening in ["${", "#{"] {
        if let Some(inner) = trimmed
            .strip_prefix(opening)
            .and_then(|rest| rest.strip_suffix('}'))
        {
            return inner;
        }
    }
    trimmed
}

/// Tokenizes an expression string into tokens.
fn tokenize(expr: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            // Whitespace - skip
            ' ' | '\t' | '\n' | '\r' => {
                chars.next();
            }

            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '[' => {
                chars.next();
                tokens.push(Token::LBracket);
            }
            ']' => {
                chars.next();
                tokens.push(Token::RBracket);
            }
            '.' => {
                chars.next();
                tokens.push(Token::Dot);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }

            // String literals (single or double quotes)
            '\'' | '"' => {
                tokens.push(parse_string(&mut chars)?);
            }

            '0'..='9' => {
                tokens.push(parse_number(&mut chars)?);
            }

            // Operators
            '&' => {
                chars.next();
                expect_char(&mut chars, '&', '&')?;
                tokens.push(Token::And);
            }
            '|' => {
                chars.next();
                expect_char(&mut chars, '|', '|')?;
                tokens.push(Token::Or);
            }
            '=' => {
                chars.next();
                expect_char(&mut chars, '=', '=')?;
                tokens.push(Token::Eq);
            }
            '!' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Ne);
                } else {
                    tokens.push(Token::Not);
                }
            }
            '<' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Le);
                } else {
                    tokens.push(Token::Lt);
                }
            }
            '>' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Ge);
                } else {
                    tokens.push(Token::Gt);
                }
            }

            // Identifiers and keywords
            'a'..='z' | 'A'..='Z' | '_' | '$' => {
                tokens.push(parse_identifier(&mut chars));
            }

            // Unknown character
            _ => {
                return Err(ParseError::UnexpectedChar(c));
            }
        }
    }

    Ok(tokens)
}

/// Consumes the second character of a two-character operator.
fn expect_char(chars: &mut Peekable<Chars>, expected: char, first: char) -> Result<(), ParseError> {
    if chars.peek() == Some(&expected) {
        chars.next();
        Ok(())
    } else {
        Err(ParseError::UnexpectedChar(first))
    }
}

/// Parses a string literal.
fn parse_string(chars: &mut Peekable<Chars>) -> Result<Token, ParseError> {
    let quote = match chars.next() {
        Some(q) => q,
        None => return Err(ParseError::UnexpectedEof),
    };
    let mut value = String::new();

    loop {
        match chars.next() {
            Some(c) if c == quote => {
                return Ok(Token::String(value));
            }
            Some('\\') => {
                // Escape sequence
                if let Some(escaped) = chars.next() {
                    value.push(escaped);
                } else {
                    return Err(ParseError::UnclosedString);
                }
            }
            Some(c) => {
                value.push(c);
            }
            None => {
                return Err(ParseError::UnclosedString);
            }
        }
    }
}

/// Parses an integer or decimal literal.
fn parse_number(chars: &mut Peekable<Chars>) -> Result<Token, ParseError> {
    let mut literal = String::new();
    let mut is_float = false;

    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() {
            literal.push(c);
            chars.next();
        } else if c == '.' && !is_float {
            // Only a fraction if a digit follows, so `list[1].x` still lexes
            let mut lookahead = chars.clone();
            lookahead.next();
            if lookahead.peek().map_or(false, char::is_ascii_digit) {
                is_float = true;
                literal.push(c);
                chars.next();
            } else {
                break;
            }
        } else {
            break;
        }
    }

    if is_float {
        literal
            .parse::<f64>()
            .map(Token::Float)
            .map_err(|_| ParseError::InvalidNumber(literal))
    } else {
        literal
            .parse::<i64>()
            .map(Token::Integer)
            .map_err(|_| ParseError::InvalidNumber(literal))
    }
}

/// Parses an identifier or keyword.
fn parse_identifier(chars: &mut Peekable<Chars>) -> Token {
    let mut ident = String::new();

    while let Some(&c) = chars.peek() {
        if c.is_alphanumeric() || c == '_' || c == '$' {
            ident.push(c);
            chars.next();
        } else {
            break;
        }
    }

    match ident.as_str() {
        "and" => Token::And,
        "or" => Token::Or,
        "not" => Token::Not,
        "empty" => Token::Empty,
        "eq" => Token::Eq,
        "ne" => Token::Ne,
        "lt" => Token::Lt,
        "le" => Token::Le,
        "gt" => Token::Gt,
        "ge" => Token::Ge,
        "true" => Token::True,
        "false" => Token::False,
        "null" => Token::Null,
        _ => Token::Ident(ident),
    }
}

/// Recursive descent parser for group expressions.
///
/// Every unary operator, group, accessor and chained binary operator counts
/// as one level of nesting, which bounds both the recursion here and the
/// depth of the resulting AST.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn descend(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::TooDeep);
        }
        self.depth += 1;
        Ok(())
    }

    fn ascend(&mut self, levels: usize) {
        self.depth -= levels;
    }

    fn parse(&mut self) -> Result<Expression, ParseError> {
        let expr = self.parse_or()?;

        if let Some(token) = self.peek() {
            return Err(ParseError::UnexpectedToken(format!("{:?}", token)));
        }

        Ok(expr)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    /// Parse OR expressions (lowest precedence)
    fn parse_or(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_and()?;
        let mut levels = 0;

        while matches!(self.peek(), Some(Token::Or)) {
            self.advance();
            self.descend()?;
            levels += 1;
            let right = self.parse_and()?;
            left = Expression::binary(left, BinaryOp::Or, right);
        }

        self.ascend(levels);
        Ok(left)
    }

    /// Parse AND expressions (higher precedence than OR)
    fn parse_and(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_equality()?;
        let mut levels = 0;

        while matches!(self.peek(), Some(Token::And)) {
            self.advance();
            self.descend()?;
            levels += 1;
            let right = self.parse_equality()?;
            left = Expression::binary(left, BinaryOp::And, right);
        }

        self.ascend(levels);
        Ok(left)
    }

    /// Parse `==` / `!=`
    fn parse_equality(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_relational()?;
        let mut levels = 0;

        loop {
            let op = match self.peek() {
                Some(Token::Eq) => BinaryOp::Eq,
                Some(Token::Ne) => BinaryOp::Ne,
                _ => break,
            };
            self.advance();
            self.descend()?;
            levels += 1;
            let right = self.parse_relational()?;
            left = Expression::binary(left, op, right);
        }

        self.ascend(levels);
        Ok(left)
    }

    /// Parse `<`, `<=`, `>`, `>=`
    fn parse_relational(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_unary()?;
        let mut levels = 0;

        loop {
            let op = match self.peek() {
                Some(Token::Lt) => BinaryOp::Lt,
                Some(Token::Le) => BinaryOp::Le,
                Some(Token::Gt) => BinaryOp::Gt,
                Some(Token::Ge) => BinaryOp::Ge,
                _ => break,
            };
            self.advance();
            self.descend()?;
            levels += 1;
            let right = self.parse_unary()?;
            left = Expression::binary(left, op, right);
        }

        self.ascend(levels);
        Ok(left)
    }

    /// Parse unary expressions (NOT, empty, negation)
    fn parse_unary(&mut self) -> Result<Expression, ParseError> {
        let op = match self.peek() {
            Some(Token::Not) => UnaryOp::Not,
            Some(Token::Empty) => UnaryOp::Empty,
            Some(Token::Minus) => UnaryOp::Neg,
            _ => return self.parse_postfix(),
        };
        self.advance();
        self.descend()?;
        let expr = self.parse_unary()?;
        self.ascend(1);
        Ok(Expression::unary(op, expr))
    }

    /// Parse property and bracket access chains
    fn parse_postfix(&mut self) -> Result<Expression, ParseError> {
        let mut expr = self.parse_primary()?;
        let mut levels = 0;

        loop {
            match self.peek() {
                Some(Token::Dot) => {
                    self.advance();
                    self.descend()?;
                    levels += 1;
                    let name = match self.advance().cloned() {
                        Some(Token::Ident(name)) => name,
                        Some(token) => {
                            return Err(ParseError::UnexpectedToken(format!("{:?}", token)))
                        }
                        None => return Err(ParseError::UnexpectedEof),
                    };
                    if matches!(self.peek(), Some(Token::LParen)) {
                        return Err(ParseError::InvalidFunction(name));
                    }
                    expr = Expression::member(expr, name);
                }
                Some(Token::LBracket) => {
                    self.advance();
                    self.descend()?;
                    levels += 1;
                    let index = self.parse_or()?;
                    if !matches!(self.peek(), Some(Token::RBracket)) {
                        return Err(ParseError::UnclosedBracket);
                    }
                    self.advance();
                    expr = Expression::Index {
                        target: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                _ => break,
            }
        }

        self.ascend(levels);
        Ok(expr)
    }

    /// Parse primary expressions (literals, identifiers, groups)
    fn parse_primary(&mut self) -> Result<Expression, ParseError> {
        match self.advance().cloned() {
            Some(Token::True) => Ok(Expression::Literal(Value::Bool(true))),
            Some(Token::False) => Ok(Expression::Literal(Value::Bool(false))),
            Some(Token::Null) => Ok(Expression::Literal(Value::Null)),
            Some(Token::String(s)) => Ok(Expression::Literal(Value::String(s))),
            Some(Token::Integer(i)) => Ok(Expression::Literal(Value::Integer(i))),
            Some(Token::Float(x)) => Ok(Expression::Literal(Value::Float(x))),
            Some(Token::LParen) => {
                self.descend()?;
                let expr = self.parse_or()?;
                if !matches!(self.peek(), Some(Token::RParen)) {
                    return Err(ParseError::UnclosedParen);
                }
                self.advance();
                self.ascend(1);
                Ok(Expression::Group(Box::new(expr)))
            }
            Some(Token::Ident(name)) => {
                if matches!(self.peek(), Some(Token::LParen)) {
                    return Err(ParseError::InvalidFunction(name));
                }
                Ok(Expression::Identifier(name))
            }
            Some(token) => Err(ParseError::UnexpectedToken(format!("{:?}", token))),
            None => Err(ParseError::UnexpectedEof),
        }
    }
}
