//! AST and value types for command blocks
//!
//! `Expr` is what the parser produces from arithmetic text. It covers more
//! node kinds than the evaluator accepts; anything outside the allow-list is
//! rejected when the tree is walked, never executed.
//!
//! `Number` is a scalar produced by evaluation, `Value` is one element of a
//! list output (sequences, `|` lists, random samples).

use serde::Serialize;
use std::fmt;

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    Invert,
    Not,
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Invert => "~",
            UnaryOp::Not => "not",
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    MatMul,
    LShift,
    RShift,
    BitAnd,
    BitOr,
    BitXor,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::MatMul => "@",
            BinaryOp::LShift => "<<",
            BinaryOp::RShift => ">>",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
        }
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    NotEq,
}

/// Boolean connectives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

/// Expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal
    Num(Number),
    /// String literal: 'abc'
    Str(String),
    /// True / False
    Bool(bool),
    /// None
    NoneLit,
    /// Bare name: pi
    Name(String),
    /// Prefix operator: -x
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// Infix operator: a + b
    Binary { op: BinaryOp, left: Box<Expr>, right: Box<Expr> },
    /// a and b / a or b
    BoolOp { op: BoolOp, values: Vec<Expr> },
    /// Chained comparison: a < b <= c
    Compare { left: Box<Expr>, ops: Vec<(CompareOp, Expr)> },
    /// Function call: sqrt(16)
    Call { func: Box<Expr>, args: Vec<Expr> },
    /// Attribute access: os.path
    Attribute { value: Box<Expr>, attr: String },
    /// Subscript: a[0]
    Subscript { value: Box<Expr>, index: Box<Expr> },
    /// Bare tuple: 1, 2
    Tuple(Vec<Expr>),
}

impl Expr {
    /// Short kind name used in rejection messages
    pub fn kind(&self) -> &'static str {
        match self {
            Expr::Num(_) => "Constant",
            Expr::Str(_) => "Str",
            Expr::Bool(_) => "Bool",
            Expr::NoneLit => "None",
            Expr::Name(_) => "Name",
            Expr::Unary { .. } => "UnaryOp",
            Expr::Binary { .. } => "BinOp",
            Expr::BoolOp { .. } => "BoolOp",
            Expr::Compare { .. } => "Compare",
            Expr::Call { .. } => "Call",
            Expr::Attribute { .. } => "Attribute",
            Expr::Subscript { .. } => "Subscript",
            Expr::Tuple(_) => "Tuple",
        }
    }
}

/// Scalar number: an integer stays an integer until an operation promotes it
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Int(n) => *n as f64,
            Number::Float(f) => *f,
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Number::Int(n) => *n == 0,
            Number::Float(f) => *f == 0.0,
        }
    }

    /// Integer view when the value is whole and fits in an i64
    pub fn as_whole(&self) -> Option<i64> {
        match self {
            Number::Int(n) => Some(*n),
            Number::Float(f) => whole_f64(*f),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(n) => write!(f, "{}", n),
            Number::Float(x) => write!(f, "{}", format_float(*x)),
        }
    }
}

/// `Some(i)` when `f` is finite, has no fractional part and fits in an i64
pub fn whole_f64(f: f64) -> Option<i64> {
    // 2^63 is exactly representable; anything at or beyond it overflows
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.is_finite() && f.fract() == 0.0 && (-LIMIT..LIMIT).contains(&f) {
        Some(f as i64)
    } else {
        None
    }
}

/// Render a float the way a calculator would: always with a fractional part
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        "nan".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "inf".to_string() } else { "-inf".to_string() }
    } else if f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{:.1}", f)
    } else {
        format!("{}", f)
    }
}

/// One element of a list output
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Double(f64),
    String(String),
}

impl Value {
    /// Whole values collapse to `Integer`, the rest stay `Double`
    pub fn from_f64(f: f64) -> Self {
        match whole_f64(f) {
            Some(n) => Value::Integer(n),
            None => Value::Double(f),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Double(f) => Some(*f),
            Value::String(_) => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Double(_) => "double",
            Value::String(_) => "string",
        }
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        match n {
            Number::Int(i) => Value::Integer(i),
            Number::Float(f) => Value::Double(f),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Double(x) => write!(f, "{}", format_float(*x)),
            Value::String(s) => write!(f, "{}", s),
        }
    }
}
