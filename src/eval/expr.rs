//! Allow-list expression evaluator
//!
//! Arithmetic text is lexed and parsed into an `Expr` tree, then walked
//! recursively. Every node kind is matched explicitly: literals, allow-listed
//! operators, allow-listed function calls and allow-listed constants are
//! evaluated; every other node is rejected.
//!
//! The three tables below are the whole surface of the language. Nothing is
//! added to them at runtime.

use super::{invalid, EvalError};
use crate::ast::{BinaryOp, Expr, Number, UnaryOp};
use crate::lexer::lex;
use crate::parser::parse;

type BinaryFn = fn(Number, Number) -> Result<Number, EvalError>;
type UnaryFn = fn(Number) -> Result<Number, EvalError>;

/// Allowed binary operators
pub(crate) const BINARY_OPERATORS: &[(BinaryOp, BinaryFn)] = &[
    (BinaryOp::Add, add),
    (BinaryOp::Sub, sub),
    (BinaryOp::Mul, mul),
    (BinaryOp::Div, div),
    (BinaryOp::Mod, modulo),
    (BinaryOp::Pow, power),
];

/// Allowed unary operators
pub(crate) const UNARY_OPERATORS: &[(UnaryOp, UnaryFn)] = &[
    (UnaryOp::Plus, positive),
    (UnaryOp::Minus, negate),
];

/// Number of arguments a function accepts
#[derive(Debug, Clone, Copy)]
pub enum Arity {
    Exactly(usize),
    Between(usize, usize),
}

impl Arity {
    fn accepts(&self, n: usize) -> bool {
        match *self {
            Arity::Exactly(k) => n == k,
            Arity::Between(lo, hi) => (lo..=hi).contains(&n),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Arity::Exactly(1) => "exactly one argument",
            Arity::Exactly(2) => "exactly 2 arguments",
            Arity::Between(1, 2) => "1 or 2 arguments",
            _ => "a different number of arguments",
        }
    }
}

/// An allow-listed math function; arguments arrive already evaluated
pub struct Function {
    pub name: &'static str,
    pub arity: Arity,
    call: fn(&[f64]) -> Result<f64, EvalError>,
}

/// Allowed functions. All of them return floats.
pub const FUNCTIONS: &[Function] = &[
    Function { name: "abs", arity: Arity::Exactly(1), call: |a| Ok(a[0].abs()) },
    Function { name: "sqrt", arity: Arity::Exactly(1), call: sqrt },
    Function { name: "pow", arity: Arity::Exactly(2), call: pow },
    Function { name: "rad", arity: Arity::Exactly(1), call: |a| Ok(a[0].to_radians()) },
    Function { name: "deg", arity: Arity::Exactly(1), call: |a| Ok(a[0].to_degrees()) },
    Function { name: "sin", arity: Arity::Exactly(1), call: |a| Ok(a[0].sin()) },
    Function { name: "cos", arity: Arity::Exactly(1), call: |a| Ok(a[0].cos()) },
    Function { name: "tan", arity: Arity::Exactly(1), call: |a| Ok(a[0].tan()) },
    Function { name: "asin", arity: Arity::Exactly(1), call: |a| Ok(a[0].asin()) },
    Function { name: "acos", arity: Arity::Exactly(1), call: |a| Ok(a[0].acos()) },
    Function { name: "atan", arity: Arity::Exactly(1), call: |a| Ok(a[0].atan()) },
    Function { name: "log", arity: Arity::Between(1, 2), call: log },
    Function { name: "log10", arity: Arity::Exactly(1), call: log10 },
    Function { name: "exp", arity: Arity::Exactly(1), call: |a| Ok(a[0].exp()) },
];

/// Allowed constants
pub const CONSTANTS: &[(&str, f64)] = &[("pi", std::f64::consts::PI)];

/// Whether `name` is an allow-listed function or constant
pub fn is_allowed_name(name: &str) -> bool {
    is_function(name) || CONSTANTS.iter().any(|(c, _)| *c == name)
}

pub(crate) fn is_function(name: &str) -> bool {
    lookup_function(name).is_some()
}

/// Safely evaluate an arithmetic expression
pub fn evaluate(text: &str) -> Result<Number, EvalError> {
    let tokens = lex(text)?;
    let tree = parse(tokens)?;
    eval_node(&tree)
}

fn eval_node(node: &Expr) -> Result<Number, EvalError> {
    match node {
        Expr::Num(n) => Ok(*n),

        Expr::Binary { op, left, right } => {
            let apply = lookup_binary(*op).ok_or(EvalError::OperatorNotAllowed(op.symbol()))?;
            apply(eval_node(left)?, eval_node(right)?)
        }

        Expr::Unary { op, operand } => {
            let apply = UNARY_OPERATORS
                .iter()
                .find(|(allowed, _)| allowed == op)
                .map(|(_, f)| *f)
                .ok_or(EvalError::UnaryOperatorNotAllowed(op.symbol()))?;
            apply(eval_node(operand)?)
        }

        Expr::Call { func, args } => {
            let Expr::Name(name) = func.as_ref() else {
                return Err(EvalError::FunctionNotAllowed);
            };
            let function = lookup_function(name).ok_or(EvalError::FunctionNotAllowed)?;
            let values = args
                .iter()
                .map(|arg| eval_node(arg).map(|n| n.as_f64()))
                .collect::<Result<Vec<_>, _>>()?;
            apply_function(function, &values).map(Number::Float)
        }

        Expr::Name(name) => CONSTANTS
            .iter()
            .find(|(c, _)| *c == name.as_str())
            .map(|(_, v)| Number::Float(*v))
            .ok_or(EvalError::UnknownConstant),

        other => Err(EvalError::ExpressionNotAllowed(other.kind())),
    }
}

pub(crate) fn lookup_binary(op: BinaryOp) -> Option<BinaryFn> {
    BINARY_OPERATORS
        .iter()
        .find(|(allowed, _)| *allowed == op)
        .map(|(_, f)| *f)
}

/// Allowed binary operator by its symbol: "+", "**", ...
pub(crate) fn lookup_binary_symbol(symbol: &str) -> Option<BinaryFn> {
    BINARY_OPERATORS
        .iter()
        .find(|(op, _)| op.symbol() == symbol)
        .map(|(_, f)| *f)
}

fn lookup_function(name: &str) -> Option<&'static Function> {
    FUNCTIONS.iter().find(|f| f.name == name)
}

fn apply_function(function: &Function, args: &[f64]) -> Result<f64, EvalError> {
    if !function.arity.accepts(args.len()) {
        return Err(EvalError::Arity {
            name: function.name,
            expected: function.arity.describe(),
            got: args.len(),
        });
    }
    let result = (function.call)(args)?;
    check_float_result(args, result)
}

/// Call an allow-listed function by name
pub fn call_function(name: &str, args: &[f64]) -> Result<f64, EvalError> {
    let function = lookup_function(name).ok_or(EvalError::FunctionNotAllowed)?;
    apply_function(function, args)
}

/// NaN out of non-NaN input is a domain error, infinity out of finite input
/// is a range error
fn check_float_result(args: &[f64], result: f64) -> Result<f64, EvalError> {
    if result.is_nan() && !args.iter().any(|a| a.is_nan()) {
        Err(EvalError::Domain)
    } else if result.is_infinite() && args.iter().all(|a| a.is_finite()) {
        Err(EvalError::Range)
    } else {
        Ok(result)
    }
}

fn sqrt(a: &[f64]) -> Result<f64, EvalError> {
    if a[0] < 0.0 {
        return Err(EvalError::Domain);
    }
    Ok(a[0].sqrt())
}

fn pow(a: &[f64]) -> Result<f64, EvalError> {
    let (base, exp) = (a[0], a[1]);
    if base == 0.0 && exp < 0.0 {
        return Err(EvalError::Domain);
    }
    Ok(base.powf(exp))
}

fn log(a: &[f64]) -> Result<f64, EvalError> {
    let x = ln_checked(a[0])?;
    match a.get(1) {
        None => Ok(x),
        Some(&base) => {
            let b = ln_checked(base)?;
            if b == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            Ok(x / b)
        }
    }
}

fn ln_checked(x: f64) -> Result<f64, EvalError> {
    if x <= 0.0 {
        return Err(EvalError::Domain);
    }
    Ok(x.ln())
}

fn log10(a: &[f64]) -> Result<f64, EvalError> {
    if a[0] <= 0.0 {
        return Err(EvalError::Domain);
    }
    Ok(a[0].log10())
}

// ========================================
// Operators
// ========================================

fn add(a: Number, b: Number) -> Result<Number, EvalError> {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => x.checked_add(y).map(Number::Int).ok_or(EvalError::Overflow),
        _ => Ok(Number::Float(a.as_f64() + b.as_f64())),
    }
}

fn sub(a: Number, b: Number) -> Result<Number, EvalError> {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => x.checked_sub(y).map(Number::Int).ok_or(EvalError::Overflow),
        _ => Ok(Number::Float(a.as_f64() - b.as_f64())),
    }
}

fn mul(a: Number, b: Number) -> Result<Number, EvalError> {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => x.checked_mul(y).map(Number::Int).ok_or(EvalError::Overflow),
        _ => Ok(Number::Float(a.as_f64() * b.as_f64())),
    }
}

/// True division: always a float
fn div(a: Number, b: Number) -> Result<Number, EvalError> {
    if b.is_zero() {
        return Err(EvalError::DivisionByZero);
    }
    Ok(Number::Float(a.as_f64() / b.as_f64()))
}

/// Floored modulo: the result takes the sign of the divisor
fn modulo(a: Number, b: Number) -> Result<Number, EvalError> {
    if b.is_zero() {
        return Err(EvalError::DivisionByZero);
    }
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => {
            let r = x.wrapping_rem(y);
            if r != 0 && (r < 0) != (y < 0) {
                Ok(Number::Int(r + y))
            } else {
                Ok(Number::Int(r))
            }
        }
        _ => {
            let (x, y) = (a.as_f64(), b.as_f64());
            let r = x % y;
            if r != 0.0 && (r < 0.0) != (y < 0.0) {
                Ok(Number::Float(r + y))
            } else {
                Ok(Number::Float(r))
            }
        }
    }
}

fn power(a: Number, b: Number) -> Result<Number, EvalError> {
    match (a, b) {
        (Number::Int(base), Number::Int(exp)) if exp >= 0 => int_power(base, exp),
        _ => {
            let (base, exp) = (a.as_f64(), b.as_f64());
            if base == 0.0 && exp < 0.0 {
                return Err(EvalError::ZeroNegativePower);
            }
            if base < 0.0 && exp.is_finite() && exp.fract() != 0.0 {
                return Err(EvalError::ComplexResult);
            }
            let result = base.powf(exp);
            if result.is_infinite() && base.is_finite() && exp.is_finite() {
                return Err(EvalError::Range);
            }
            Ok(Number::Float(result))
        }
    }
}

fn int_power(base: i64, exp: i64) -> Result<Number, EvalError> {
    match (base, u32::try_from(exp)) {
        (_, Ok(e)) => base.checked_pow(e).map(Number::Int).ok_or(EvalError::Overflow),
        (0, Err(_)) => Ok(Number::Int(0)),
        (1, Err(_)) => Ok(Number::Int(1)),
        (-1, Err(_)) => Ok(Number::Int(if exp % 2 == 0 { 1 } else { -1 })),
        _ => Err(EvalError::Overflow),
    }
}

fn positive(a: Number) -> Result<Number, EvalError> {
    Ok(a)
}

fn negate(a: Number) -> Result<Number, EvalError> {
    match a {
        Number::Int(x) => x.checked_neg().map(Number::Int).ok_or(EvalError::Overflow),
        Number::Float(f) => Ok(Number::Float(-f)),
    }
}

/// Apply an allowed binary operator given by symbol
pub(crate) fn apply_symbol(symbol: &str, a: Number, b: Number) -> Result<Number, EvalError> {
    let apply = lookup_binary_symbol(symbol)
        .ok_or_else(|| invalid(format!("Unsupported operation: {}", symbol)))?;
    apply(a, b)
}
