//! A recursive-descent parser for assignment statements.
//!
//! Parsing and evaluation are a single pass: identifier references resolve
//! against the symbol table as soon as they are reduced, and every binary
//! node is folded to its value when it is built. The finished tree therefore
//! doubles as an evaluation trace, and the assignment is recorded in the
//! table only once the whole statement has parsed.

use serde::Serialize;
use std::fmt;
use tracing::trace;

use crate::symbol_table::SymbolTable;
use crate::tokenizer::{TokenData, TokenList};

#[derive(Clone, Debug, Serialize)]
pub enum Statement {
    Assign { variable: String, value: Expression },
}

#[derive(Clone, Debug, Serialize)]
pub enum Expression {
    Number(i64),
    Variable {
        name: String,
        value: i64,
    },
    BinaryOp {
        op: Op,
        value: i64,
        left: Box<Expression>,
        right: Box<Expression>,
    },
}

impl Expression {
    pub fn value(&self) -> i64 {
        match self {
            Expression::Number(value) => *value,
            Expression::Variable { value, .. } => *value,
            Expression::BinaryOp { value, .. } => *value,
        }
    }

    fn binary(op: Op, left: Expression, right: Expression) -> Result<Self, ParseError> {
        let value = op.apply(left.value(), right.value())?;
        Ok(Expression::BinaryOp {
            op,
            value,
            left: Box::new(left),
            right: Box::new(right),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Op {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Op {
    fn apply(self, lhs: i64, rhs: i64) -> Result<i64, ParseError> {
        Ok(match self {
            Op::Add => lhs + rhs,
            Op::Subtract => lhs - rhs,
            Op::Multiply => lhs * rhs,
            Op::Divide => {
                if rhs == 0 {
                    return Err(ParseError::DivisionByZero);
                }
                lhs / rhs
            }
        })
    }

    pub fn symbol(self) -> char {
        match self {
            Op::Add => '+',
            Op::Subtract => '-',
            Op::Multiply => '*',
            Op::Divide => '/',
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("syntax error: {message}")]
    Syntax { message: String },
    #[error("undeclared variable: {name}")]
    UndeclaredVariable { name: String },
    #[error("division by zero")]
    DivisionByZero,
}

fn syntax_error(message: impl Into<String>) -> ParseError {
    ParseError::Syntax {
        message: message.into(),
    }
}

/// Parse one `IDENTIFIER = expression ;` statement. On success the variable
/// has already been recorded in `symbols`; on failure the table is untouched.
#[tracing::instrument(level = "trace", skip_all)]
pub fn parse(mut tokens: TokenList, symbols: &mut SymbolTable) -> Result<Statement, ParseError> {
    let tokens = &mut tokens.tokens;

    let variable = match pop(tokens)? {
        TokenData::Identifier(name) => name,
        token => {
            return Err(syntax_error(format!(
                "expected identifier at start of statement, found {token:?}"
            )))
        }
    };
    expect(tokens, TokenData::Assign, "expected '=' after identifier")?;
    let value = parse_expression(tokens, symbols)?;
    expect(tokens, TokenData::Semicolon, "expected ';' after expression")?;
    if let Some(token) = tokens.first() {
        return Err(syntax_error(format!(
            "unexpected token {token:?} after ';'"
        )));
    }

    // The whole statement parsed, so the assignment may take effect.
    symbols.assign(&variable, value.value());
    Ok(Statement::Assign { variable, value })
}

fn parse_expression(
    tokens: &mut Vec<TokenData>,
    symbols: &mut SymbolTable,
) -> Result<Expression, ParseError> {
    trace!(?tokens, "Parsing expression");

    let mut expr = parse_term(tokens, symbols)?;
    loop {
        let op = match tokens.first() {
            Some(TokenData::Plus) => Op::Add,
            Some(TokenData::Minus) => Op::Subtract,
            _ => break,
        };
        tokens.remove(0);
        let right = parse_term(tokens, symbols)?;
        expr = Expression::binary(op, expr, right)?;
    }
    Ok(expr)
}

fn parse_term(
    tokens: &mut Vec<TokenData>,
    symbols: &mut SymbolTable,
) -> Result<Expression, ParseError> {
    let mut expr = parse_factor(tokens, symbols)?;
    loop {
        let op = match tokens.first() {
            Some(TokenData::Multiply) => Op::Multiply,
            Some(TokenData::Divide) => Op::Divide,
            _ => break,
        };
        tokens.remove(0);
        let right = parse_factor(tokens, symbols)?;
        expr = Expression::binary(op, expr, right)?;
    }
    Ok(expr)
}

fn parse_factor(
    tokens: &mut Vec<TokenData>,
    symbols: &mut SymbolTable,
) -> Result<Expression, ParseError> {
    match pop(tokens)? {
        TokenData::Number(value) => Ok(Expression::Number(value)),
        TokenData::Identifier(name) => match symbols.resolve(&name) {
            Some(value) => Ok(Expression::Variable { name, value }),
            None => Err(ParseError::UndeclaredVariable { name }),
        },
        TokenData::LeftParen => {
            let expr = parse_expression(tokens, symbols)?;
            expect(tokens, TokenData::RightParen, "expected ')'")?;
            Ok(expr)
        }
        token => Err(syntax_error(format!(
            "expected number, identifier, or '(', found {token:?}"
        ))),
    }
}

fn pop(tokens: &mut Vec<TokenData>) -> Result<TokenData, ParseError> {
    if tokens.is_empty() {
        return Err(syntax_error("unexpected end of statement"));
    }
    Ok(tokens.remove(0))
}

fn expect(
    tokens: &mut Vec<TokenData>,
    expected: TokenData,
    message: &str,
) -> Result<(), ParseError> {
    let token = pop(tokens)?;
    if token != expected {
        return Err(syntax_error(format!("{message}, found {token:?}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn parse_line(source: &str, symbols: &mut SymbolTable) -> Result<Statement, ParseError> {
        let scan = tokenize(source);
        assert!(scan.errors.is_empty(), "unexpected lexical errors");
        parse(scan.tokens, symbols)
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let mut symbols = SymbolTable::default();
        let statement = parse_line("x = 2 + 3 * 4;", &mut symbols).unwrap();

        assert_eq!(symbols.resolve("x"), Some(14));
        let Statement::Assign { variable, value } = statement;
        assert_eq!(variable, "x");
        assert_eq!(value.value(), 14);
        // The root is the addition; the multiplication hangs off its right.
        assert!(matches!(
            value,
            Expression::BinaryOp {
                op: Op::Add,
                ref right,
                ..
            } if matches!(**right, Expression::BinaryOp { op: Op::Multiply, .. })
        ));
    }

    #[test]
    fn operators_are_left_associative() {
        let mut symbols = SymbolTable::default();
        parse_line("x = 10 - 2 - 3;", &mut symbols).unwrap();
        assert_eq!(symbols.resolve("x"), Some(5));
    }

    #[test]
    fn parentheses_override_precedence() {
        let mut symbols = SymbolTable::default();
        parse_line("x = (2 + 3) * 4;", &mut symbols).unwrap();
        assert_eq!(symbols.resolve("x"), Some(20));
    }

    #[test]
    fn division_truncates_toward_zero() {
        let mut symbols = SymbolTable::default();
        parse_line("x = 7 / 2;", &mut symbols).unwrap();
        assert_eq!(symbols.resolve("x"), Some(3));
    }

    #[test]
    fn variables_resolve_to_their_last_assigned_value() {
        let mut symbols = SymbolTable::default();
        parse_line("x = 5;", &mut symbols).unwrap();
        let statement = parse_line("y = x + 1;", &mut symbols).unwrap();

        assert_eq!(symbols.resolve("y"), Some(6));
        // The reference was resolved eagerly, at parse time.
        let Statement::Assign { value, .. } = statement;
        assert!(matches!(
            value,
            Expression::BinaryOp { ref left, .. }
                if matches!(**left, Expression::Variable { value: 5, .. })
        ));
    }

    #[test]
    fn undeclared_variable_aborts_without_mutation() {
        let mut symbols = SymbolTable::default();
        let err = parse_line("z = w + 1;", &mut symbols).unwrap_err();

        assert_eq!(
            err,
            ParseError::UndeclaredVariable {
                name: "w".to_string()
            }
        );
        assert!(symbols.is_empty(), "no partial assignment of z");
    }

    #[test]
    fn reassignment_overwrites() {
        let mut symbols = SymbolTable::default();
        parse_line("x = 1;", &mut symbols).unwrap();
        parse_line("x = x + 1;", &mut symbols).unwrap();
        assert_eq!(symbols.resolve("x"), Some(2));
        assert_eq!(symbols.len(), 1);
    }

    #[test]
    fn missing_semicolon_is_a_syntax_error() {
        let mut symbols = SymbolTable::default();
        let err = parse_line("x = 1", &mut symbols).unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
        assert!(symbols.is_empty());
    }

    #[test]
    fn empty_statement_is_a_syntax_error() {
        let mut symbols = SymbolTable::default();
        let err = parse_line("", &mut symbols).unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
    }

    #[test]
    fn trailing_tokens_after_semicolon_do_not_assign() {
        let mut symbols = SymbolTable::default();
        let err = parse_line("x = 1; y", &mut symbols).unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
        assert!(symbols.is_empty(), "assignment must be all-or-nothing");
    }

    #[test]
    fn unbalanced_parenthesis_is_a_syntax_error() {
        let mut symbols = SymbolTable::default();
        let err = parse_line("x = (1 + 2;", &mut symbols).unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
    }

    #[test]
    fn statement_must_start_with_an_identifier() {
        let mut symbols = SymbolTable::default();
        let err = parse_line("2 = x;", &mut symbols).unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
    }

    #[test]
    fn unary_minus_is_not_supported() {
        let mut symbols = SymbolTable::default();
        let err = parse_line("x = -3;", &mut symbols).unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
    }

    #[test]
    fn division_by_zero_aborts_without_mutation() {
        let mut symbols = SymbolTable::default();
        let err = parse_line("x = 1 / 0;", &mut symbols).unwrap_err();
        assert_eq!(err, ParseError::DivisionByZero);
        assert!(symbols.is_empty());
    }

    #[test]
    fn token_stream_with_a_lexical_gap_fails_to_parse() {
        // "x = 2 @ 3;" scans to [x, =, 2, 3, ;] with the '@' skipped, and the
        // leftover Number(3) then trips the parser.
        let mut symbols = SymbolTable::default();
        let scan = tokenize("x = 2 @ 3;");
        assert_eq!(scan.errors.len(), 1);
        let err = parse(scan.tokens, &mut symbols).unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
        assert!(symbols.is_empty());
    }
}
