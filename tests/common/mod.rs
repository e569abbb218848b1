//! Common test utilities for cmdblock integration tests

pub use cmdblock::{Branch, CommandOutput, Config, Evaluator, Value};

/// Evaluator with a fixed seed so random draws repeat
pub fn seeded(seed: u64) -> Evaluator {
    Evaluator::with_config(Config { seed: Some(seed), ..Config::default() })
}

/// Helper to evaluate one command with a seeded evaluator
pub fn eval(input: &str) -> CommandOutput {
    seeded(1).run(input)
}

/// Helper to evaluate and get only the list output
#[allow(dead_code)]
pub fn eval_list(input: &str) -> Option<Vec<Value>> {
    eval(input).list
}

#[allow(dead_code)]
pub fn strings(items: &[&str]) -> Vec<Value> {
    items.iter().map(|s| Value::String(s.to_string())).collect()
}

#[allow(dead_code)]
pub fn ints(items: &[i64]) -> Vec<Value> {
    items.iter().copied().map(Value::Integer).collect()
}
