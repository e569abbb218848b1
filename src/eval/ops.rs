//! Numeric building blocks shared by loop, modulo and list-split front-ends
//!
//! These reuse the allow-listed operator and function tables of the
//! expression evaluator, so a loop can never apply anything an expression
//! could not.

use super::expr::{apply_symbol, call_function, is_function};
use super::{invalid, EvalError};
use crate::ast::Number;
use std::fmt;

/// Right-hand side of a loop operation
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Scalar(Number),
    /// One entry per iteration; the last entry repeats once exhausted
    List(Vec<Number>),
    None,
}

impl Operand {
    fn at(&self, i: usize) -> Option<Number> {
        match self {
            Operand::Scalar(n) => Some(*n),
            Operand::List(items) => items.get(i).or(items.last()).copied(),
            Operand::None => None,
        }
    }
}

/// Apply `op` `repeat` times, feeding each result into the next iteration.
///
/// `op` is a binary operator symbol (`+ - * / % **`) or the name of an
/// allow-listed function. Functions take the operand when there is one and
/// the running value otherwise.
///
/// Usage: `loop_operation(Int(1), "*", Scalar(Int(2)), 4)` -> `[2, 4, 8, 16]`
pub fn loop_operation(
    init: Number,
    op: &str,
    operand: Operand,
    repeat: usize,
) -> Result<Vec<Number>, EvalError> {
    if let Operand::List(items) = &operand {
        check_homogeneous(items)?;
    }

    let mut results = Vec::with_capacity(repeat);
    let mut current = init;
    for i in 0..repeat {
        current = step(current, op, operand.at(i))?;
        results.push(current);
    }
    Ok(results)
}

fn step(current: Number, op: &str, operand: Option<Number>) -> Result<Number, EvalError> {
    if is_function(op) {
        let arg = operand.unwrap_or(current);
        return call_function(op, &[arg.as_f64()]).map(Number::Float);
    }

    let Some(operand) = operand else {
        return Err(invalid(format!("Operation {} needs an operand", op)));
    };
    if matches!(op, "/" | "%") && operand.is_zero() {
        return Err(invalid("Division by zero is not allowed."));
    }
    apply_symbol(op, current, operand)
}

fn check_homogeneous(items: &[Number]) -> Result<(), EvalError> {
    let has_int = items.iter().any(|n| matches!(n, Number::Int(_)));
    let has_float = items.iter().any(|n| matches!(n, Number::Float(_)));
    match (has_int, has_float) {
        (false, false) => Err(invalid("Operand list is empty")),
        (true, true) => Err(invalid(
            "All operands in the list must be of the same type (found: [int, float]).",
        )),
        _ => Ok(()),
    }
}

/// Floored modulo of every element of `xs` by `y`
pub fn modulo(xs: &[Number], y: Number) -> Result<Vec<Number>, EvalError> {
    if xs.is_empty() {
        return Err(EvalError::Empty("X is empty"));
    }
    if y.is_zero() {
        return Err(invalid("Can't divide by zero"));
    }
    xs.iter().map(|x| apply_symbol("%", *x, y)).collect()
}

/// One entry of a split mask
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaskValue {
    Bool(bool),
    Number(Number),
}

impl MaskValue {
    fn truth(&self) -> Result<bool, EvalError> {
        match self {
            MaskValue::Bool(b) => Ok(*b),
            MaskValue::Number(n) if n.as_f64() == 1.0 => Ok(true),
            MaskValue::Number(n) if n.as_f64() == 0.0 => Ok(false),
            MaskValue::Number(n) => Err(invalid(format!(
                "Invalid mask value: {}. Only bool, 0, 1 allowed.",
                n
            ))),
        }
    }
}

impl fmt::Display for MaskValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaskValue::Bool(true) => write!(f, "True"),
            MaskValue::Bool(false) => write!(f, "False"),
            MaskValue::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Partition `items` into `(true_items, false_items)` by `mask`.
///
/// A short mask is padded with false; an empty mask sends everything to the
/// false side.
pub fn split_by_mask<T: Clone>(
    items: &[T],
    mask: &[MaskValue],
) -> Result<(Vec<T>, Vec<T>), EvalError> {
    if items.is_empty() {
        return Err(EvalError::Empty("List is empty"));
    }
    let flags = mask.iter().map(MaskValue::truth).collect::<Result<Vec<_>, _>>()?;

    let mut yes = Vec::new();
    let mut no = Vec::new();
    for (i, item) in items.iter().enumerate() {
        if flags.get(i).copied().unwrap_or(false) {
            yes.push(item.clone());
        } else {
            no.push(item.clone());
        }
    }
    Ok((yes, no))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::Severity;

    #[test]
    fn doubling_loop() {
        let out = loop_operation(Number::Int(1), "*", Operand::Scalar(Number::Int(2)), 4).unwrap();
        assert_eq!(
            out,
            vec![Number::Int(2), Number::Int(4), Number::Int(8), Number::Int(16)]
        );
    }

    #[test]
    fn list_operand_repeats_last() {
        let operand = Operand::List(vec![Number::Int(1), Number::Int(10)]);
        let out = loop_operation(Number::Int(0), "+", operand, 4).unwrap();
        assert_eq!(
            out,
            vec![Number::Int(1), Number::Int(11), Number::Int(21), Number::Int(31)]
        );
    }

    #[test]
    fn zero_divisor_in_loop() {
        let err = loop_operation(Number::Int(5), "/", Operand::Scalar(Number::Int(0)), 1).unwrap_err();
        assert_eq!(err.to_string(), "Division by zero is not allowed.");
        let err = loop_operation(Number::Int(5), "%", Operand::Scalar(Number::Float(0.0)), 1).unwrap_err();
        assert_eq!(err.to_string(), "Division by zero is not allowed.");
    }

    #[test]
    fn function_on_running_value() {
        let out = loop_operation(Number::Int(256), "sqrt", Operand::None, 3).unwrap();
        assert_eq!(
            out,
            vec![Number::Float(16.0), Number::Float(4.0), Number::Float(2.0)]
        );
    }

    #[test]
    fn function_on_operand() {
        let out = loop_operation(Number::Int(0), "abs", Operand::Scalar(Number::Int(-3)), 2).unwrap();
        assert_eq!(out, vec![Number::Float(3.0), Number::Float(3.0)]);
    }

    #[test]
    fn unsupported_operation() {
        let err = loop_operation(Number::Int(1), "<<", Operand::Scalar(Number::Int(1)), 1).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported operation: <<");
    }

    #[test]
    fn mixed_operand_list() {
        let operand = Operand::List(vec![Number::Int(1), Number::Float(2.5)]);
        let err = loop_operation(Number::Int(0), "+", operand, 2).unwrap_err();
        assert!(err.to_string().starts_with("All operands in the list must be of the same type"));
    }

    #[test]
    fn zero_repeat_is_empty() {
        let out = loop_operation(Number::Int(1), "+", Operand::Scalar(Number::Int(1)), 0).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn modulo_floors() {
        let out = modulo(&[Number::Int(7), Number::Int(-7)], Number::Int(3)).unwrap();
        assert_eq!(out, vec![Number::Int(1), Number::Int(2)]);
    }

    #[test]
    fn modulo_empty_is_warning() {
        let err = modulo(&[], Number::Int(3)).unwrap_err();
        assert_eq!(err.severity(), Severity::Warning);
        assert_eq!(err.to_string(), "X is empty");
    }

    #[test]
    fn modulo_by_zero() {
        let err = modulo(&[Number::Int(1)], Number::Int(0)).unwrap_err();
        assert_eq!(err.severity(), Severity::Error);
        assert_eq!(err.to_string(), "Can't divide by zero");
    }

    #[test]
    fn split_pads_short_mask() {
        let mask = [MaskValue::Bool(true), MaskValue::Number(Number::Int(0))];
        let (yes, no) = split_by_mask(&["a", "b", "c"], &mask).unwrap();
        assert_eq!(yes, vec!["a"]);
        assert_eq!(no, vec!["b", "c"]);
    }

    #[test]
    fn split_empty_mask() {
        let (yes, no) = split_by_mask(&[1, 2], &[]).unwrap();
        assert!(yes.is_empty());
        assert_eq!(no, vec![1, 2]);
    }

    #[test]
    fn split_rejects_other_numbers() {
        let err = split_by_mask(&[1], &[MaskValue::Number(Number::Int(2))]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid mask value: 2. Only bool, 0, 1 allowed.");
    }

    #[test]
    fn split_empty_items_is_warning() {
        let err = split_by_mask::<i32>(&[], &[MaskValue::Bool(true)]).unwrap_err();
        assert_eq!(err.severity(), Severity::Warning);
    }
}
