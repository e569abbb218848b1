//! cmdblock - command block evaluator
//!
//! # Overview
//!
//! cmdblock reads one line of free text and turns it into a typed result
//! without ever handing the text to a general-purpose interpreter. The text
//! is classified by cheap structural checks and routed to one engine:
//!
//! ```text
//! A..E                 # letters        -> ["A", "B", "C", "D", "E"]
//! 0..1..@5             # evenly spaced  -> [0, 0.25, 0.5, 0.75, 1]
//! 3|1|2                # homogeneous    -> [1, 2, 3]
//! rand(1,10,3)         # unique ints    -> e.g. [2, 5, 9]
//! randf(0,1,2,2)       # unique doubles -> e.g. [0.13, 0.71]
//! 2+3*4                # arithmetic     -> 14
//! sqrt(16)             # allow-listed   -> 4 (integer and double views)
//! hello                # anything else  -> "hello"
//! ```
//!
//! ## Safe Arithmetic
//!
//! Expressions are lexed, parsed into an `Expr` tree and walked against
//! fixed allow-lists of operators, functions and constants. Every other
//! node kind is rejected, never executed:
//!
//! ```text
//! x+1                  # Calcul error: Unknown constant
//! 7//2                 # Calcul error: Operator // not allowed
//! sqrt(-1)             # Calcul error: math domain error
//! ```
//!
//! ## Errors Are Data
//!
//! Evaluation never fails. Random and arithmetic errors come back as a
//! prefixed string ("Random error: ...", "Calcul error: ...") plus an Error
//! diagnostic. A failed sequence comes back with every output absent.
//!
//! # Example
//!
//! ```rust
//! use cmdblock::{Evaluator, Value};
//!
//! let mut eval = Evaluator::new();
//! let out = eval.run("A..C");
//! assert_eq!(
//!     out.list,
//!     Some(vec![
//!         Value::String("A".into()),
//!         Value::String("B".into()),
//!         Value::String("C".into()),
//!     ])
//! );
//! ```

pub mod ast;
pub mod config;
pub mod display;
pub mod eval;
pub mod lexer;
pub mod parser;

// Re-export commonly used items
pub use ast::{Expr, Number, Value};
pub use config::{Config, ConfigError};
pub use eval::ops::{loop_operation, modulo, split_by_mask, MaskValue, Operand};
pub use eval::{
    alpha_to_num, evaluate, generate, normalize, num_to_alpha, rand_unique, randf_unique, Branch,
    CommandOutput, Diagnostic, EvalError, Evaluator, Severity,
};
pub use lexer::{lex, LexError, Operator, Token};
pub use parser::{parse, ParseError};

/// Convenience function to evaluate one command with the default config
pub fn run(input: &str) -> CommandOutput {
    Evaluator::new().run(input)
}
