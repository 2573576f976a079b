//! Arithmetic expressions over stat values.
//!
//! Grammar:
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := '-' unary | primary
//! primary := NUMBER | 'value' | '{' STAT_ID '}' | FUNC '(' expr ')' | '(' expr ')'
//! FUNC    := 'floor' | 'round' | 'abs'
//! ```
//! `value` is the stat being formatted; `{custom:jump}` reads another stat of
//! the same player (unrecorded stats read as zero).

use std::fmt;

use mcstats_common::{StatId, StatsRecord};

/// Errors from parsing or evaluating an expression.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExprError {
    #[error("parse error at offset {offset}: {message}")]
    Parse { offset: usize, message: String },
    #[error("field {0} referenced without a stats record")]
    UnknownField(String),
    #[error("division by zero")]
    DivideByZero,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    fn precedence(self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Sub => 1,
            BinaryOp::Mul | BinaryOp::Div => 2,
        }
    }

    fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Floor,
    Round,
    Abs,
}

impl Func {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "floor" => Some(Func::Floor),
            "round" => Some(Func::Round),
            "abs" => Some(Func::Abs),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Func::Floor => "floor",
            Func::Round => "round",
            Func::Abs => "abs",
        }
    }

    fn apply(self, x: f64) -> f64 {
        match self {
            Func::Floor => x.floor(),
            Func::Round => x.round(),
            Func::Abs => x.abs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(f64),
    Value,
    Field(StatId),
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        func: Func,
        arg: Box<Expr>,
    },
}

/// Inputs an expression is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    pub value: f64,
    pub record: Option<&'a StatsRecord>,
}

impl<'a> EvalContext<'a> {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            record: None,
        }
    }

    pub fn with_record(value: f64, record: &'a StatsRecord) -> Self {
        Self {
            value,
            record: Some(record),
        }
    }
}

impl Expr {
    pub fn parse(src: &str) -> Result<Self, ExprError> {
        let tokens = tokenize(src)?;
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.parse_expr(0)?;
        match parser.peek() {
            None => Ok(expr),
            Some((offset, tok)) => Err(ExprError::Parse {
                offset: *offset,
                message: format!("unexpected {tok}"),
            }),
        }
    }

    pub fn eval(&self, ctx: &EvalContext<'_>) -> Result<f64, ExprError> {
        Ok(match self {
            Expr::Literal(x) => *x,
            Expr::Value => ctx.value,
            Expr::Field(id) => {
                let record = ctx
                    .record
                    .ok_or_else(|| ExprError::UnknownField(id.to_string()))?;
                record.get_or_zero(id) as f64
            }
            Expr::Neg(inner) => -inner.eval(ctx)?,
            Expr::Binary { op, left, right } => {
                let l = left.eval(ctx)?;
                let r = right.eval(ctx)?;
                match op {
                    BinaryOp::Add => l + r,
                    BinaryOp::Sub => l - r,
                    BinaryOp::Mul => l * r,
                    BinaryOp::Div => {
                        if r == 0.0 {
                            return Err(ExprError::DivideByZero);
                        }
                        l / r
                    }
                }
            }
            Expr::Call { func, arg } => func.apply(arg.eval(ctx)?),
        })
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(x) => write!(f, "{x}"),
            Expr::Value => f.write_str("value"),
            Expr::Field(id) => write!(f, "{{{id}}}"),
            Expr::Neg(inner) => write!(f, "-({inner})"),
            Expr::Binary { op, left, right } => write!(f, "({left} {} {right})", op.symbol()),
            Expr::Call { func, arg } => write!(f, "{}({arg})", func.name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Field(String),
    Op(BinaryOp),
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(x) => write!(f, "number {x}"),
            Token::Ident(name) => write!(f, "`{name}`"),
            Token::Field(id) => write!(f, "field {{{id}}}"),
            Token::Op(op) => write!(f, "`{}`", op.symbol()),
            Token::LParen => f.write_str("`(`"),
            Token::RParen => f.write_str("`)`"),
        }
    }
}

fn tokenize(src: &str) -> Result<Vec<(usize, Token)>, ExprError> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        let start = i;
        match c {
            b' ' | b'\t' | b'\n' | b'\r' => {
                i += 1;
                continue;
            }
            b'+' => tokens.push((start, Token::Op(BinaryOp::Add))),
            b'-' => tokens.push((start, Token::Op(BinaryOp::Sub))),
            b'*' => tokens.push((start, Token::Op(BinaryOp::Mul))),
            b'/' => tokens.push((start, Token::Op(BinaryOp::Div))),
            b'(' => tokens.push((start, Token::LParen)),
            b')' => tokens.push((start, Token::RParen)),
            b'{' => {
                let end = src[start..].find('}').ok_or_else(|| ExprError::Parse {
                    offset: start,
                    message: "unterminated field".into(),
                })?;
                tokens.push((start, Token::Field(src[start + 1..start + end].to_string())));
                i = start + end + 1;
                continue;
            }
            b'0'..=b'9' | b'.' => {
                while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                    i += 1;
                }
                let text = &src[start..i];
                let x = text.parse().map_err(|_| ExprError::Parse {
                    offset: start,
                    message: format!("bad number {text:?}"),
                })?;
                tokens.push((start, Token::Number(x)));
                continue;
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                tokens.push((start, Token::Ident(src[start..i].to_string())));
                continue;
            }
            _ => {
                return Err(ExprError::Parse {
                    offset: start,
                    message: format!("unexpected character {:?}", src[start..].chars().next()),
                });
            }
        }
        i += 1;
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&(usize, Token)> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<(usize, Token)> {
        let tok = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        tok
    }

    fn end_offset(&self) -> usize {
        self.tokens.last().map(|(o, _)| o + 1).unwrap_or(0)
    }

    /// Precedence climbing; every binary operator is left-associative.
    fn parse_expr(&mut self, min_prec: u8) -> Result<Expr, ExprError> {
        let mut left = self.parse_unary()?;
        while let Some((_, Token::Op(op))) = self.peek() {
            let op = *op;
            if op.precedence() <= min_prec {
                break;
            }
            self.pos += 1;
            let right = self.parse_expr(op.precedence())?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        if let Some((_, Token::Op(BinaryOp::Sub))) = self.peek() {
            self.pos += 1;
            return Ok(Expr::Neg(Box::new(self.parse_unary()?)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        let end = self.end_offset();
        let (offset, tok) = self.next().ok_or(ExprError::Parse {
            offset: end,
            message: "unexpected end of expression".into(),
        })?;
        match tok {
            Token::Number(x) => Ok(Expr::Literal(x)),
            Token::Field(id) => StatId::parse(&id)
                .map(Expr::Field)
                .map_err(|e| ExprError::Parse {
                    offset,
                    message: e.to_string(),
                }),
            Token::Ident(name) if name == "value" => Ok(Expr::Value),
            Token::Ident(name) => {
                let func = Func::from_name(&name).ok_or_else(|| ExprError::Parse {
                    offset,
                    message: format!("unknown identifier `{name}`"),
                })?;
                self.expect_lparen()?;
                let arg = self.parse_expr(0)?;
                self.expect_rparen()?;
                Ok(Expr::Call {
                    func,
                    arg: Box::new(arg),
                })
            }
            Token::LParen => {
                let inner = self.parse_expr(0)?;
                self.expect_rparen()?;
                Ok(inner)
            }
            other => Err(ExprError::Parse {
                offset,
                message: format!("unexpected {other}"),
            }),
        }
    }

    fn expect_lparen(&mut self) -> Result<(), ExprError> {
        self.expect(Token::LParen, "`(`")
    }

    fn expect_rparen(&mut self) -> Result<(), ExprError> {
        self.expect(Token::RParen, "`)`")
    }

    fn expect(&mut self, want: Token, label: &str) -> Result<(), ExprError> {
        let end = self.end_offset();
        match self.next() {
            Some((_, tok)) if tok == want => Ok(()),
            Some((offset, tok)) => Err(ExprError::Parse {
                offset,
                message: format!("expected {label}, found {tok}"),
            }),
            None => Err(ExprError::Parse {
                offset: end,
                message: format!("expected {label}"),
            }),
        }
    }
}
