//! Integration tests for the allow-list expression evaluator

#[path = "common/mod.rs"]
mod common;
#[allow(unused_imports)]
use common::{eval, Branch};

use cmdblock::{evaluate, Number};

fn err(input: &str) -> String {
    evaluate(input).unwrap_err().to_string()
}

fn float(input: &str) -> f64 {
    match evaluate(input).unwrap() {
        Number::Float(f) => f,
        Number::Int(n) => panic!("expected float, got int {}", n),
    }
}

#[test]
fn test_integer_arithmetic() {
    assert_eq!(evaluate("2+3*4").unwrap(), Number::Int(14));
    assert_eq!(evaluate("(2+3)*4").unwrap(), Number::Int(20));
    assert_eq!(evaluate("2**10").unwrap(), Number::Int(1024));
    assert_eq!(evaluate("-(3-5)").unwrap(), Number::Int(2));
}

#[test]
fn test_true_division() {
    assert_eq!(evaluate("10/4").unwrap(), Number::Float(2.5));
    assert_eq!(evaluate("8/2").unwrap(), Number::Float(4.0));
}

#[test]
fn test_floored_modulo() {
    assert_eq!(evaluate("10%3").unwrap(), Number::Int(1));
    assert_eq!(evaluate("-7%3").unwrap(), Number::Int(2));
    assert_eq!(evaluate("7%-3").unwrap(), Number::Int(-2));
    assert_eq!(evaluate("7.5%2").unwrap(), Number::Float(1.5));
}

#[test]
fn test_power_associativity() {
    // 2**(3**2), not (2**3)**2
    assert_eq!(evaluate("2**3**2").unwrap(), Number::Int(512));
    assert_eq!(evaluate("-2**2").unwrap(), Number::Int(-4));
    assert_eq!(evaluate("2**-1").unwrap(), Number::Float(0.5));
}

#[test]
fn test_functions_return_floats() {
    assert_eq!(evaluate("sqrt(16)").unwrap(), Number::Float(4.0));
    assert_eq!(evaluate("abs(-2)").unwrap(), Number::Float(2.0));
    assert_eq!(evaluate("pow(2, 3)").unwrap(), Number::Float(8.0));
    assert!((float("rad(180)") - std::f64::consts::PI).abs() < 1e-12);
    assert!((float("deg(pi)") - 180.0).abs() < 1e-9);
    assert!((float("log(8, 2)") - 3.0).abs() < 1e-12);
    assert!((float("log10(1000)") - 3.0).abs() < 1e-12);
    assert!((float("exp(0)") - 1.0).abs() < 1e-12);
    assert!(float("sin(0)").abs() < 1e-12);
}

#[test]
fn test_nested_calls() {
    assert_eq!(evaluate("sqrt(abs(-16))+1").unwrap(), Number::Float(5.0));
}

#[test]
fn test_constant() {
    assert_eq!(evaluate("pi").unwrap(), Number::Float(std::f64::consts::PI));
    assert_eq!(err("e"), "Unknown constant");
}

#[test]
fn test_disallowed_operators() {
    assert_eq!(err("2 << 1"), "Operator << not allowed");
    assert_eq!(err("7 // 2"), "Operator // not allowed");
    assert_eq!(err("6 & 3"), "Operator & not allowed");
    assert_eq!(err("~1"), "Unary operator ~ not allowed");
    assert_eq!(err("not 1"), "Unary operator not not allowed");
}

#[test]
fn test_disallowed_calls() {
    assert_eq!(err("__import__('os')"), "Function not allowed");
    assert_eq!(err("eval('1')"), "Function not allowed");
    assert_eq!(err("pi(1)"), "Function not allowed");
}

#[test]
fn test_disallowed_node_kinds() {
    assert_eq!(err("'abc'"), "Expression not allowed: Str");
    assert_eq!(err("True"), "Expression not allowed: Bool");
    assert_eq!(err("None"), "Expression not allowed: None");
    assert_eq!(err("1 < 2"), "Expression not allowed: Compare");
    assert_eq!(err("1 and 2"), "Expression not allowed: BoolOp");
    assert_eq!(err("pi.real"), "Expression not allowed: Attribute");
    assert_eq!(err("pi[0]"), "Expression not allowed: Subscript");
    assert_eq!(err("1, 2"), "Expression not allowed: Tuple");
}

#[test]
fn test_syntax_errors() {
    assert!(err("import os").starts_with("Syntax error"));
    assert!(err("1 +").starts_with("Syntax error"));
    assert!(err("(1 + 2").starts_with("Syntax error"));
    assert!(err("2 $ 3").starts_with("Syntax error"));
    assert!(err("").starts_with("Syntax error"));
}

#[test]
fn test_arity() {
    assert_eq!(err("sqrt(1, 2)"), "sqrt() takes exactly one argument (2 given)");
    assert_eq!(err("pow(2)"), "pow() takes exactly 2 arguments (1 given)");
    assert_eq!(err("log()"), "log() takes 1 or 2 arguments (0 given)");
}

#[test]
fn test_math_errors() {
    assert_eq!(err("1/0"), "division by zero");
    assert_eq!(err("1%0"), "division by zero");
    assert_eq!(err("0**-1"), "0.0 cannot be raised to a negative power");
    assert_eq!(err("(-8)**0.5"), "complex result not supported");
    assert_eq!(err("sqrt(-1)"), "math domain error");
    assert_eq!(err("log(0)"), "math domain error");
    assert_eq!(err("asin(2)"), "math domain error");
    assert_eq!(err("exp(1000)"), "math range error");
    assert_eq!(err("9223372036854775807+1"), "integer overflow");
}

#[test]
fn test_dispatcher_prefix() {
    let out = eval("sqrt(-1)");
    assert_eq!(out.branch, Branch::Expression);
    assert_eq!(out.string.as_deref(), Some("Calcul error: math domain error"));
}

#[test]
fn test_deep_nesting_is_an_error() {
    let too_deep = "expression too deeply nested";
    assert!(err(&format!("{}1", "-".repeat(200_000))).contains(too_deep));
    assert!(err(&format!("{}1+1{}", "(".repeat(100_000), ")".repeat(100_000))).contains(too_deep));
    assert!(err(&format!("1{}", "+1".repeat(300_000))).contains(too_deep));
}

#[test]
fn test_deep_nesting_through_dispatcher() {
    let out = eval(&format!("1{}", "+1".repeat(300_000)));
    assert_eq!(out.branch, Branch::Expression);
    assert_eq!(
        out.string.as_deref(),
        Some("Calcul error: Syntax error: expression too deeply nested")
    );
    assert!(out.is_error());
}

#[test]
fn test_moderate_nesting_evaluates() {
    assert_eq!(evaluate(&format!("1{}", "+1".repeat(499))).unwrap(), Number::Int(500));
    assert_eq!(
        evaluate(&format!("{}2{}", "(".repeat(60), ")".repeat(60))).unwrap(),
        Number::Int(2)
    );
    assert_eq!(evaluate(&format!("{}3", "-".repeat(400))).unwrap(), Number::Int(3));
}
