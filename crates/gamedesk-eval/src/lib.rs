//! Safe arithmetic expression evaluation.
//!
//! The expression text originates from free-form user input relayed by the
//! oracle, so this is a security boundary, not a convenience parser. Only
//! numeric literals and the operators `+ - * / % ** ( )` are accepted; any
//! identifier or other construct is rejected before evaluation. Evaluation is
//! deterministic: the same input always yields the same value or the same
//! error kind.
//!
//! Policy notes: `%` is the truncated remainder (`f64::rem`), `**` is
//! right-associative, unary minus binds looser than `**` (so `-2 ** 2 == -4`),
//! and scientific notation is not part of the literal grammar.

use gamedesk_protocol::ToolError;

/// Longest accepted expression, in bytes.
const MAX_EXPRESSION_LEN: usize = 1024;
/// Deepest accepted parenthesis/operator nesting.
const MAX_DEPTH: usize = 32;
/// Largest accepted exponent magnitude for `**`.
const MAX_EXPONENT: f64 = 1024.0;

/// Evaluate a whitelisted arithmetic expression.
pub fn evaluate(expression: &str) -> Result<f64, ToolError> {
    if expression.len() > MAX_EXPRESSION_LEN {
        return Err(ToolError::ResourceLimit(format!(
            "expression exceeds {MAX_EXPRESSION_LEN} bytes"
        )));
    }

    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(ToolError::UnsafeExpression("empty expression".to_owned()));
    }

    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.parse_expression(0, 0)?;
    if parser.pos != parser.tokens.len() {
        return Err(ToolError::UnsafeExpression(format!(
            "unexpected trailing token: {}",
            parser.tokens[parser.pos].describe()
        )));
    }

    if !value.is_finite() {
        return Err(ToolError::Arithmetic(
            "result is not a finite number".to_owned(),
        ));
    }
    Ok(value)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    DoubleStar,
    LParen,
    RParen,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {n}"),
            Token::Plus => "'+'".to_owned(),
            Token::Minus => "'-'".to_owned(),
            Token::Star => "'*'".to_owned(),
            Token::Slash => "'/'".to_owned(),
            Token::Percent => "'%'".to_owned(),
            Token::DoubleStar => "'**'".to_owned(),
            Token::LParen => "'('".to_owned(),
            Token::RParen => "')'".to_owned(),
        }
    }
}

fn tokenize(expression: &str) -> Result<Vec<Token>, ToolError> {
    let mut tokens = Vec::new();
    let bytes = expression.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;
        match c {
            ' ' | '\t' | '\r' | '\n' => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                if bytes.get(i + 1) == Some(&b'*') {
                    tokens.push(Token::DoubleStar);
                    i += 2;
                } else {
                    tokens.push(Token::Star);
                    i += 1;
                }
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '%' => {
                tokens.push(Token::Percent);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '0'..='9' | '.' => {
                let start = i;
                let mut dots = 0;
                while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                    if bytes[i] == b'.' {
                        dots += 1;
                    }
                    i += 1;
                }
                let literal = &expression[start..i];
                if dots > 1 || literal == "." {
                    return Err(ToolError::UnsafeExpression(format!(
                        "malformed numeric literal '{literal}'"
                    )));
                }
                let value: f64 = literal.parse().map_err(|_| {
                    ToolError::UnsafeExpression(format!("malformed numeric literal '{literal}'"))
                })?;
                tokens.push(Token::Number(value));
            }
            _ => {
                // Identifiers, attribute access, quotes, commas — anything
                // outside the whitelist lands here. The whitelisted bytes are
                // all ASCII, so `i` is always on a character boundary and the
                // full (possibly multi-byte) character can be reported.
                let offending = expression[i..].chars().next().unwrap_or(c);
                return Err(ToolError::UnsafeExpression(format!(
                    "disallowed character '{offending}'"
                )));
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

// Binding powers: additive 1, multiplicative 2, unary minus 3, power 4.
// Power parses its right side at its own level (right-associative); unary
// minus parses at level 3 so a following `**` still binds tighter.
const ADD_PREC: u8 = 1;
const MUL_PREC: u8 = 2;
const UNARY_PREC: u8 = 3;
const POW_PREC: u8 = 4;

impl Parser {
    fn parse_expression(&mut self, min_prec: u8, depth: usize) -> Result<f64, ToolError> {
        if depth > MAX_DEPTH {
            return Err(ToolError::ResourceLimit(format!(
                "expression nesting exceeds depth {MAX_DEPTH}"
            )));
        }

        let mut lhs = self.parse_prefix(depth)?;

        while let Some(op) = self.peek() {
            let (prec, right_assoc) = match op {
                Token::Plus | Token::Minus => (ADD_PREC, false),
                Token::Star | Token::Slash | Token::Percent => (MUL_PREC, false),
                Token::DoubleStar => (POW_PREC, true),
                Token::RParen => break,
                other => {
                    return Err(ToolError::UnsafeExpression(format!(
                        "expected operator, found {}",
                        other.describe()
                    )));
                }
            };
            if prec < min_prec {
                break;
            }
            let op = self.advance();
            let next_min = if right_assoc { prec } else { prec + 1 };
            let rhs = self.parse_expression(next_min, depth + 1)?;
            lhs = apply(op, lhs, rhs)?;
        }

        Ok(lhs)
    }

    fn parse_prefix(&mut self, depth: usize) -> Result<f64, ToolError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.advance();
                Ok(-self.parse_expression(UNARY_PREC, depth + 1)?)
            }
            Some(Token::Plus) => {
                self.advance();
                self.parse_expression(UNARY_PREC, depth + 1)
            }
            Some(Token::Number(value)) => {
                self.advance();
                Ok(value)
            }
            Some(Token::LParen) => {
                self.advance();
                let value = self.parse_expression(0, depth + 1)?;
                match self.peek() {
                    Some(Token::RParen) => {
                        self.advance();
                        Ok(value)
                    }
                    _ => Err(ToolError::UnsafeExpression(
                        "unbalanced parenthesis".to_owned(),
                    )),
                }
            }
            Some(other) => Err(ToolError::UnsafeExpression(format!(
                "expected a value, found {}",
                other.describe()
            ))),
            None => Err(ToolError::UnsafeExpression(
                "expression ended unexpectedly".to_owned(),
            )),
        }
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos];
        self.pos += 1;
        token
    }
}

fn apply(op: Token, lhs: f64, rhs: f64) -> Result<f64, ToolError> {
    match op {
        Token::Plus => Ok(lhs + rhs),
        Token::Minus => Ok(lhs - rhs),
        Token::Star => Ok(lhs * rhs),
        Token::Slash => {
            if rhs == 0.0 {
                Err(ToolError::Arithmetic("division by zero".to_owned()))
            } else {
                Ok(lhs / rhs)
            }
        }
        Token::Percent => {
            if rhs == 0.0 {
                Err(ToolError::Arithmetic("modulo by zero".to_owned()))
            } else {
                Ok(lhs % rhs)
            }
        }
        Token::DoubleStar => {
            if rhs.abs() > MAX_EXPONENT {
                Err(ToolError::ResourceLimit(format!(
                    "exponent magnitude exceeds {MAX_EXPONENT}"
                )))
            } else {
                Ok(lhs.powf(rhs))
            }
        }
        // parse_expression only forwards binary operators here.
        other => Err(ToolError::UnsafeExpression(format!(
            "unexpected token {}",
            other.describe()
        ))),
    }
}
