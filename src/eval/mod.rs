//! Evaluator for command blocks
//!
//! A command is one line of free text. The evaluator classifies it and routes
//! it to exactly one sub-engine:
//!
//! 1. `a..b`, `a..b..step`, `a..b..@n`, `a..@n..b` - sequence generator
//! 2. `x|y|z`                 - homogeneous list
//! 3. `rand(min,max,count)`   - unique random integers
//! 4. `randf(min,max,count[,precision])` - unique random doubles
//! 5. arithmetic              - allow-listed expression evaluator
//! 6. a float literal         - bare number
//! 7. anything else           - text
//!
//! # Branch Dispatch Pattern
//!
//! The branches live in one ordered table, `BRANCHES`, of
//! `(branch, predicate, handler)` triples. The first predicate that accepts
//! the text wins. Keep new branches in that table so the precedence stays
//! visible in a single place.
//!
//! # Error Channels
//!
//! Handlers never fail: errors become data on the returned `CommandOutput`.
//! Random and expression failures are reported as a `String` output carrying a
//! prefixed message plus an Error diagnostic. Sequence failures are reported
//! as all-absent outputs with no message; callers rely on that distinction.

mod expr;
mod list;
pub mod ops;
mod random;
mod sequence;

pub use expr::{call_function, evaluate, is_allowed_name, CONSTANTS, FUNCTIONS};
pub use list::normalize;
pub use random::{rand_unique, randf_unique};
pub use sequence::{alpha_to_num, generate, num_to_alpha};

use crate::ast::{Number, Value};
use crate::config::Config;
use crate::lexer::LexError;
use crate::parser::ParseError;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvalError {
    #[error("Syntax error: {0}")]
    Lex(#[from] LexError),
    #[error("Syntax error: {0}")]
    Parse(#[from] ParseError),
    #[error("Operator {0} not allowed")]
    OperatorNotAllowed(&'static str),
    #[error("Unary operator {0} not allowed")]
    UnaryOperatorNotAllowed(&'static str),
    #[error("Function not allowed")]
    FunctionNotAllowed,
    #[error("Unknown constant")]
    UnknownConstant,
    #[error("Expression not allowed: {0}")]
    ExpressionNotAllowed(&'static str),
    #[error("{name}() takes {expected} ({got} given)")]
    Arity { name: &'static str, expected: &'static str, got: usize },
    #[error("division by zero")]
    DivisionByZero,
    #[error("0.0 cannot be raised to a negative power")]
    ZeroNegativePower,
    #[error("complex result not supported")]
    ComplexResult,
    #[error("math domain error")]
    Domain,
    #[error("math range error")]
    Range,
    #[error("integer overflow")]
    Overflow,
    /// Degenerate but valid input; reported as a warning
    #[error("{0}")]
    Empty(&'static str),
    #[error("{0}")]
    Invalid(String),
}

impl EvalError {
    pub fn severity(&self) -> Severity {
        match self {
            EvalError::Empty(_) => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

pub(crate) fn invalid(message: impl Into<String>) -> EvalError {
    EvalError::Invalid(message.into())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// Message attached to an output; never aborts the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic { severity: Severity::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic { severity: Severity::Error, message: message.into() }
    }
}

impl From<&EvalError> for Diagnostic {
    fn from(e: &EvalError) -> Self {
        Diagnostic { severity: e.severity(), message: e.to_string() }
    }
}

/// Which dispatcher branch produced an output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Branch {
    Empty,
    Sequence,
    List,
    RandomInt,
    RandomFloat,
    Expression,
    Number,
    Text,
}

/// Result record of one command
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandOutput {
    pub branch: Branch,
    pub integer: Option<i64>,
    pub double: Option<f64>,
    pub string: Option<String>,
    pub list: Option<Vec<Value>>,
    pub diagnostic: Option<Diagnostic>,
}

impl CommandOutput {
    /// All outputs absent
    pub fn absent(branch: Branch) -> Self {
        CommandOutput {
            branch,
            integer: None,
            double: None,
            string: None,
            list: None,
            diagnostic: None,
        }
    }

    pub fn with_list(branch: Branch, list: Vec<Value>) -> Self {
        CommandOutput { list: Some(list), ..Self::absent(branch) }
    }

    /// Text result: the string itself plus a one-element list
    pub fn text(branch: Branch, text: &str) -> Self {
        CommandOutput {
            string: Some(text.to_string()),
            list: Some(vec![Value::String(text.to_string())]),
            ..Self::absent(branch)
        }
    }

    /// String-typed error: `"<prefix>: <message>"` in `string` and in the diagnostic
    pub fn failure(branch: Branch, prefix: &str, err: &EvalError) -> Self {
        let message = format!("{}: {}", prefix, err);
        CommandOutput {
            string: Some(message.clone()),
            diagnostic: Some(Diagnostic { severity: err.severity(), message }),
            ..Self::absent(branch)
        }
    }

    /// Scalar numeric result. Whole values expose both an integer and a
    /// double view; everything else only the double view.
    pub fn numeric(branch: Branch, n: Number) -> Self {
        match n.as_whole() {
            Some(i) => CommandOutput {
                integer: Some(i),
                double: Some(n.as_f64()),
                list: Some(vec![Value::Integer(i)]),
                ..Self::absent(branch)
            },
            None => CommandOutput {
                double: Some(n.as_f64()),
                list: Some(vec![Value::Double(n.as_f64())]),
                ..Self::absent(branch)
            },
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(&self.diagnostic, Some(d) if d.severity == Severity::Error)
    }
}

type Predicate = fn(&str) -> bool;
type Handler = fn(&mut Evaluator, &str) -> CommandOutput;

/// Dispatch table; order is precedence
const BRANCHES: &[(Branch, Predicate, Handler)] = &[
    (Branch::Sequence, is_sequence, Evaluator::run_sequence),
    (Branch::List, is_list, Evaluator::run_list),
    (Branch::RandomInt, is_rand_call, Evaluator::run_rand),
    (Branch::RandomFloat, is_randf_call, Evaluator::run_randf),
    (Branch::Expression, is_expression, Evaluator::run_expression),
    (Branch::Number, is_number, Evaluator::run_number),
    (Branch::Text, always, Evaluator::run_text),
];

fn always(_: &str) -> bool {
    true
}

fn is_sequence(text: &str) -> bool {
    text.contains("..")
}

fn is_list(text: &str) -> bool {
    text.contains('|')
}

fn has_call_prefix(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        && text.ends_with(')')
}

fn is_rand_call(text: &str) -> bool {
    has_call_prefix(text, "rand(")
}

fn is_randf_call(text: &str) -> bool {
    has_call_prefix(text, "randf(")
}

/// Only characters that can appear in allow-listed arithmetic
fn is_arithmetic_safe(text: &str) -> bool {
    !text.is_empty()
        && text.chars().all(|c| {
            c.is_ascii_alphanumeric() || c.is_whitespace() || "+-*/%(),.".contains(c)
        })
}

/// Whether some whole word of `text` is an allow-listed function or constant
fn has_allowed_name(text: &str) -> bool {
    text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .any(is_allowed_name)
}

fn is_expression(text: &str) -> bool {
    if !is_arithmetic_safe(text) {
        return false;
    }
    let has_digit = text.chars().any(|c| c.is_ascii_digit());
    let has_operator = text.chars().any(|c| "+-*/%".contains(c));
    has_allowed_name(text) || (has_digit && has_operator)
}

fn is_number(text: &str) -> bool {
    is_arithmetic_safe(text) && text.parse::<f64>().is_ok()
}

/// The evaluator owns the configuration and the random source; no other
/// state survives between commands.
pub struct Evaluator {
    pub(crate) config: Config,
    pub(crate) rng: StdRng,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Evaluator { config, rng }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Evaluate one command
    pub fn run(&mut self, command: &str) -> CommandOutput {
        let text = command.trim();
        if text.is_empty() {
            let err = EvalError::Empty("No instruction to execute");
            return CommandOutput {
                diagnostic: Some(Diagnostic::from(&err)),
                ..CommandOutput::absent(Branch::Empty)
            };
        }

        let (branch, _, handler) = BRANCHES
            .iter()
            .find(|(_, accepts, _)| accepts(text))
            .copied()
            .unwrap_or((Branch::Text, always, Evaluator::run_text));
        log::debug!("command {:?} dispatched to {:?}", text, branch);

        handler(self, text)
    }

    fn run_sequence(&mut self, text: &str) -> CommandOutput {
        match generate(text, self.config.max_sequence_len) {
            Ok(seq) => CommandOutput::with_list(Branch::Sequence, seq),
            Err(e) => {
                // Sequence failures stay silent on the output
                log::warn!("sequence {:?} failed: {}", text, e);
                CommandOutput::absent(Branch::Sequence)
            }
        }
    }

    fn run_list(&mut self, text: &str) -> CommandOutput {
        let items: Vec<&str> = text.split('|').collect();
        CommandOutput::with_list(Branch::List, normalize(&items))
    }

    fn run_rand(&mut self, text: &str) -> CommandOutput {
        match random::rand_command(&mut self.rng, text) {
            Ok(seq) => CommandOutput::with_list(Branch::RandomInt, seq),
            Err(e) => CommandOutput::failure(Branch::RandomInt, "Random error", &e),
        }
    }

    fn run_randf(&mut self, text: &str) -> CommandOutput {
        let config = &self.config;
        match random::randf_command(
            &mut self.rng,
            text,
            config.default_precision,
            config.max_sample_attempts,
        ) {
            Ok(seq) => CommandOutput::with_list(Branch::RandomFloat, seq),
            Err(e) => CommandOutput::failure(Branch::RandomFloat, "Random error", &e),
        }
    }

    fn run_expression(&mut self, text: &str) -> CommandOutput {
        match evaluate(text) {
            Ok(n) => CommandOutput::numeric(Branch::Expression, n),
            Err(e) => CommandOutput::failure(Branch::Expression, "Calcul error", &e),
        }
    }

    fn run_number(&mut self, text: &str) -> CommandOutput {
        match text.parse::<f64>() {
            Ok(f) => CommandOutput::numeric(Branch::Number, Number::Float(f)),
            Err(_) => self.run_text(text),
        }
    }

    fn run_text(&mut self, text: &str) -> CommandOutput {
        CommandOutput::text(Branch::Text, text)
    }
}
